use bikeshare_explorer::config::CityTable;
use bikeshare_explorer::dataset::{FilterCriteria, load, load_and_filter};
use bikeshare_explorer::error::LoadError;
use bikeshare_explorer::output::render_text;
use bikeshare_explorer::reports::{AnalysisReport, Metric, Unavailable};
use chrono::Datelike;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

fn fixtures() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

fn report(city: &str, month: &str, day: &str) -> AnalysisReport {
    let criteria = FilterCriteria::from_names(month, day).unwrap();
    let dataset =
        load(&CityTable::default(), &fixtures(), city, &criteria).expect("Failed to load fixture");
    AnalysisReport::compute(&dataset, &criteria)
}

#[test]
fn test_full_pipeline_chicago() {
    let report = report("chicago", "all", "all");

    // One row has no gender and one an unparseable start time.
    assert_eq!(report.trips, 6);

    let time = &report.time;
    assert_eq!(time.month.available().unwrap().value, "january");
    assert_eq!(time.month.available().unwrap().count, 2);
    assert_eq!(time.weekday.available().unwrap().value, "monday");
    assert_eq!(time.weekday.available().unwrap().count, 4);
    assert_eq!(time.hour.available().unwrap().value, 8);
    assert_eq!(time.hour.available().unwrap().count, 3);

    let station = &report.station;
    assert_eq!(station.start_station.available().unwrap().value, "Clark St & Elm St");
    assert_eq!(station.start_station.available().unwrap().count, 4);
    assert_eq!(station.end_station.available().unwrap().value, "Wells St & Concord Ln");
    assert_eq!(
        station.trip.available().unwrap().value,
        "Clark St & Elm St to Wells St & Concord Ln"
    );
    assert_eq!(station.trip.available().unwrap().count, 3);

    assert_eq!(report.duration.total, Metric::Available(3600.0));
    assert_eq!(report.duration.mean, Metric::Available(600.0));

    let user = &report.user;
    assert_eq!(user.user_types.available().unwrap()[0].value, "Subscriber");
    assert_eq!(user.user_types.available().unwrap()[0].count, 4);
    assert_eq!(user.genders.available().unwrap()[0].value, "Male");
    assert_eq!(user.latest_birth_year, Metric::Available(1992));
    assert_eq!(user.earliest_birth_year, Metric::Available(1970));
    assert_eq!(user.common_birth_year.available().unwrap().value, 1985);
    assert_eq!(user.common_birth_year.available().unwrap().count, 3);
}

#[test]
fn test_month_filter_keeps_only_that_month() {
    let dataset =
        load_and_filter(&CityTable::default(), &fixtures(), "chicago", "march", "all").unwrap();

    assert_eq!(dataset.len(), 2);
    assert!(dataset.records().iter().all(|r| r.start_time.month() == 3));
}

#[test]
fn test_month_and_day_filter() {
    let report = report("chicago", "march", "friday");
    assert_eq!(report.trips, 1);
    assert_eq!(report.duration.total, Metric::Available(900.0));
}

#[test]
fn test_washington_lacks_demographics() {
    let report = report("washington", "all", "all");

    assert_eq!(report.trips, 4);
    assert!(report.user.user_types.is_available());
    assert_eq!(report.user.user_types.available().unwrap()[0].count, 3);

    let gender = Unavailable::MissingField("Gender".into());
    let birth_year = Unavailable::MissingField("Birth Year".into());
    assert_eq!(report.user.genders.unavailable(), Some(&gender));
    assert_eq!(report.user.latest_birth_year.unavailable(), Some(&birth_year));
    assert_eq!(report.user.earliest_birth_year.unavailable(), Some(&birth_year));
    assert_eq!(report.user.common_birth_year.unavailable(), Some(&birth_year));

    assert_eq!(report.duration.total, Metric::Available(1001.0));
    assert_eq!(report.duration.mean, Metric::Available(250.25));

    let text = render_text(&report);
    assert!(text.contains("Gender: unavailable: Gender"));
    assert!(text.contains("Most common start station: Lincoln Memorial"));
}

#[test]
fn test_load_by_criteria_matches_load_by_names() {
    let criteria = FilterCriteria::new(3, 4).unwrap();
    let by_criteria = load(&CityTable::default(), &fixtures(), "chicago", &criteria).unwrap();
    let by_names =
        load_and_filter(&CityTable::default(), &fixtures(), "chicago", "march", "friday").unwrap();

    assert_eq!(by_criteria, by_names);
    assert_eq!(by_criteria.len(), 1);
}

#[test]
fn test_unknown_city() {
    let err = load_and_filter(&CityTable::default(), &fixtures(), "gotham", "all", "all")
        .unwrap_err();
    assert!(matches!(err, LoadError::UnknownCity(_)));
}

#[test]
fn test_invalid_time_filter() {
    let err = load_and_filter(&CityTable::default(), &fixtures(), "chicago", "july", "all")
        .unwrap_err();
    assert!(matches!(err, LoadError::InvalidTimeFilter { .. }));
}

#[test]
fn test_gzip_trip_log() {
    let csv = std::fs::read(format!("{}/washington.csv", fixtures())).unwrap();
    let path = format!(
        "{}/bikeshare_test_washington.csv.gz",
        std::env::temp_dir().display()
    );
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&csv).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let table = CityTable::from_entries([("washington".to_string(), path.clone())]);
    let dataset = load_and_filter(&table, ".", "washington", "april", "all").unwrap();
    assert_eq!(dataset.len(), 2);

    std::fs::remove_file(&path).unwrap();
}
