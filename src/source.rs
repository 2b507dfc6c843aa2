//! Opens a trip log from a local file, a gzip-compressed file, or a URL.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use tracing::debug;

use crate::error::LoadError;

/// Opens `location` for reading.
///
/// `http://` and `https://` locations are fetched in full with a blocking
/// GET; paths ending in `.gz` are decompressed while reading.
pub fn open(location: &str) -> Result<Box<dyn Read>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let bytes = fetch_bytes(location)?;
        debug!(location, bytes = bytes.len(), "Trip log downloaded");
        return Ok(Box::new(Cursor::new(bytes)));
    }

    let file = File::open(location).map_err(|source| LoadError::Io {
        location: location.to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    if location.ends_with(".gz") {
        debug!(location, "Reading gzip-compressed trip log");
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn fetch_bytes(url: &str) -> Result<Vec<u8>, LoadError> {
    let http_error = |source| LoadError::Http {
        location: url.to_string(),
        source,
    };
    let resp = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(http_error)?;
    Ok(resp.bytes().map_err(http_error)?.to_vec())
}
