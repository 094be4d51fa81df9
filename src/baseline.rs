//! Best-effort file persistence for the IAQ compensation baseline.
//!
//! The file holds a JSON array of exactly two integers, the raw baseline
//! words as read from the sensor. A missing or malformed file is an expected
//! cold-start condition, not an error: `load` reports it as `None` and the
//! caller simply proceeds without a warm baseline.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::sgp30::Baseline;

/// Writes the baseline to `path` as a two-element JSON array, replacing any
/// previous content. Returns whether the write succeeded.
pub fn save<P: AsRef<Path>>(baseline: &Baseline, path: P) -> bool {
    let text = match serde_json::to_string(&[baseline.co2eq, baseline.tvoc]) {
        Ok(text) => text,
        Err(error) => {
            warn!("could not serialize baseline: {}", error);
            return false;
        }
    };
    match fs::write(&path, text) {
        Ok(()) => true,
        Err(error) => {
            warn!(
                "could not write baseline file {}: {}",
                path.as_ref().display(),
                error
            );
            false
        }
    }
}

/// Reads a baseline previously written by [`save`].
///
/// Returns `None` when the file is missing, unreadable, not JSON, or does
/// not hold exactly two numbers. Anything with the wrong shape is treated
/// as corrupt and discarded.
pub fn load<P: AsRef<Path>>(path: P) -> Option<Baseline> {
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(error) => {
            debug!(
                "no stored baseline at {}: {}",
                path.as_ref().display(),
                error
            );
            return None;
        }
    };
    let words: Vec<u16> = match serde_json::from_str(&text) {
        Ok(words) => words,
        Err(error) => {
            warn!(
                "discarding malformed baseline file {}: {}",
                path.as_ref().display(),
                error
            );
            return None;
        }
    };
    if words.len() != 2 {
        warn!(
            "discarding baseline file {}: expected 2 values, found {}",
            path.as_ref().display(),
            words.len()
        );
        return None;
    }
    Some(Baseline {
        co2eq: words[0],
        tvoc: words[1],
    })
}
