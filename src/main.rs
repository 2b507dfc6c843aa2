//! CLI entry point for the bikeshare explorer.
//!
//! Provides an interactive session that prompts for a city and time window,
//! a non-interactive `report` subcommand, and a listing of supported cities.

use anyhow::{Result, bail};
use bikeshare_explorer::{
    calendar,
    config::CityTable,
    dataset::{Dataset, FilterCriteria, load, load_and_filter},
    output::{
        append_summary, render_duration, render_json, render_preview, render_station,
        render_text, render_time, render_user, rule,
    },
    reports::{AnalysisReport, DurationStats, StationStats, TimeStats, UserStats},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "bikeshare")]
#[command(about = "Explore US bikeshare trip data", long_about = None)]
struct Cli {
    /// Directory holding the city trip logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<String>,

    /// JSON file mapping city names to trip log locations
    #[arg(long, global = true)]
    cities: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively pick a city and time window, then print every report (default)
    Explore,
    /// Print every report for one city and time window
    Report {
        /// City to analyze, e.g. "new york city"
        city: String,

        /// Month to filter by (january-june), or "all"
        #[arg(short, long, default_value = "all")]
        month: String,

        /// Day of week to filter by (monday-sunday), or "all"
        #[arg(short = 'w', long, default_value = "all")]
        day: String,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Optional: CSV file to append a one-row summary to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List supported cities
    Cities,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: quiet stderr (the session prints to stdout) + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("warn".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var("BIKESHARE_DATA_DIR").ok())
        .unwrap_or_else(|| ".".to_string());
    let table = match &cli.cities {
        Some(path) => CityTable::load(path)?,
        None => CityTable::default(),
    };

    match cli.command.unwrap_or(Commands::Explore) {
        Commands::Explore => explore(&table, &data_dir)?,
        Commands::Report {
            city,
            month,
            day,
            format,
            output,
        } => {
            let criteria = FilterCriteria::from_names(&month, &day)?;
            let dataset = load(&table, &data_dir, &city, &criteria)?;
            let report = AnalysisReport::compute(&dataset, &criteria);

            match format {
                Format::Text => println!("{}", render_text(&report)),
                Format::Json => println!("{}", render_json(&report)?),
            }

            if let Some(path) = output {
                append_summary(&path, &report)?;
                info!(path = %path, "Summary appended");
            }
        }
        Commands::Cities => {
            for city in table.cities() {
                println!("{city}");
            }
        }
    }

    Ok(())
}

/// Prints `question` and reads one lowercased, trimmed answer from stdin.
fn ask(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_lowercase())
}

/// Re-asks with `retry` until `valid` accepts the answer.
fn ask_until(question: &str, retry: &str, valid: impl Fn(&str) -> bool) -> Result<String> {
    let mut answer = ask(question)?;
    while !valid(&answer) {
        answer = ask(retry)?;
    }
    Ok(answer)
}

/// Runs the interactive question/answer loop until the user declines a restart.
fn explore(table: &CityTable, data_dir: &str) -> Result<()> {
    let city_list = table.cities().collect::<Vec<_>>().join(", ");
    let month_list = calendar::month_names().collect::<Vec<_>>().join(", ");
    let day_list = calendar::day_names().collect::<Vec<_>>().join(", ");

    loop {
        println!("Hello! Let's explore some US bikeshare data!");

        let city = ask_until(
            &format!("Which city would you like to analyze? ({city_list}): "),
            &format!("Please enter one of these cities ({city_list}): "),
            |c| table.contains(c),
        )?;
        let month = ask_until(
            &format!("What month would you like to analyze? ({month_list}): "),
            &format!("Please enter one of these months ({month_list}): "),
            |m| calendar::month_to_code(m).is_some(),
        )?;
        let day = ask_until(
            &format!("What day would you like to analyze? ({day_list}): "),
            &format!("Please enter one of these days ({day_list}): "),
            |d| calendar::day_to_code(d).is_some(),
        )?;
        println!("{}", rule());

        match load_and_filter(table, data_dir, &city, &month, &day) {
            Ok(dataset) => {
                preview(&dataset)?;
                print_reports(&dataset);
            }
            Err(e) => {
                error!(city = %city, error = %e, "Failed to load trip data");
                println!("Could not load data for {city}: {e}");
            }
        }

        let restart = ask("\nWould you like to restart? Enter yes or no.\n")?;
        if restart != "yes" {
            break;
        }
    }

    Ok(())
}

/// Shows the filtered records a page at a time for as long as the user asks.
fn preview(dataset: &Dataset) -> Result<()> {
    let mut answer = ask("Would you like to see the first 5 rows of data? (yes or no): ")?;
    let mut start = 0;

    while answer == "yes" {
        let rows = dataset.preview(start, PREVIEW_ROWS);
        if rows.is_empty() {
            println!("No more rows.");
            break;
        }
        print!("{}", render_preview(dataset, start, rows));
        start += rows.len();
        answer = ask("Would you like to see 5 more rows of data? (yes or no): ")?;
    }

    println!("{}", rule());
    Ok(())
}

fn print_reports(dataset: &Dataset) {
    println!("{} trips in {}", dataset.len(), dataset.city());

    print_section(|| render_time(&TimeStats::compute(dataset)));
    print_section(|| render_station(&StationStats::compute(dataset)));
    print_section(|| render_duration(&DurationStats::compute(dataset)));
    print_section(|| render_user(&UserStats::compute(dataset)));
}

/// Computes and prints one report section followed by how long it took.
fn print_section(section: impl FnOnce() -> String) {
    let started = Instant::now();
    let text = section();
    let elapsed = started.elapsed();

    print!("{text}");
    println!("\nThis took {:.6} seconds.", elapsed.as_secs_f64());
    println!("{}", rule());
}
