//! City → trip log location table.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::LoadError;

static DEFAULT_CITIES: &[(&str, &str)] = &[
    ("chicago", "chicago.csv"),
    ("new york city", "new_york_city.csv"),
    ("washington", "washington.csv"),
];

/// Maps supported city names to the location of their trip log.
///
/// Built once before any analysis and never mutated. An override can be
/// stored as a plain JSON object on disk:
/// ```json
/// {
///   "chicago": "chicago.csv.gz",
///   "washington": "https://example.org/bikeshare/washington.csv"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CityTable {
    entries: BTreeMap<String, String>,
}

impl Default for CityTable {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_CITIES
                .iter()
                .map(|(c, l)| (c.to_string(), l.to_string())),
        )
    }
}

impl CityTable {
    /// Builds a table from `(city, location)` pairs. City names are lowercased.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(c, l)| (c.trim().to_ascii_lowercase(), l))
                .collect(),
        }
    }

    /// Loads the table from a JSON file at `path`, replacing the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self::from_entries(entries))
    }

    /// Returns the configured location for `city`, if any.
    pub fn get(&self, city: &str) -> Option<&str> {
        self.entries
            .get(&city.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, city: &str) -> bool {
        self.get(city).is_some()
    }

    /// Supported city names in sorted order.
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolves `city` to a concrete location. Relative file paths are joined
    /// onto `data_dir`; URLs and absolute paths are returned as is.
    pub fn resolve(&self, city: &str, data_dir: &str) -> Result<String, LoadError> {
        let location = self
            .get(city)
            .ok_or_else(|| LoadError::UnknownCity(city.to_string()))?;

        if location.starts_with("http://")
            || location.starts_with("https://")
            || Path::new(location).is_absolute()
        {
            return Ok(location.to_string());
        }

        Ok(Path::new(data_dir)
            .join(location)
            .to_string_lossy()
            .into_owned())
    }
}
