//! Append-only record of every value a store write added or modified.

use super::catalog::{Frequency, InstanceKey};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

/// One changed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub logged_at: DateTime<Utc>,
    pub series: String,
    pub source: String,
    pub measurand: String,
    pub frequency: Frequency,
    pub date: NaiveDate,
    /// `None` when the date had no value before
    pub old_value: Option<f64>,
    pub new_value: f64,
}

impl Change {
    #[must_use]
    pub fn new(logged_at: DateTime<Utc>, key: &InstanceKey, date: NaiveDate, old_value: Option<f64>, new_value: f64) -> Self {
        Self {
            logged_at,
            series: key.series.clone(),
            source: key.source.clone(),
            measurand: key.measurand.clone(),
            frequency: key.frequency,
            date,
            old_value,
            new_value,
        }
    }
}

pub fn append(path: &Path, changes: &[Change]) -> Result<()> {
    if changes.is_empty() {
        return Ok(());
    }

    let needs_header = fs::metadata(path).map_or(true, |m| m.len() == 0);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .into_app_err_with(|| format!("unable to open change log '{}'", path.display()))?;

    let mut writer = csv::WriterBuilder::new().has_headers(needs_header).from_writer(file);
    for change in changes {
        writer
            .serialize(change)
            .into_app_err_with(|| format!("unable to append to change log '{}'", path.display()))?;
    }

    writer
        .flush()
        .into_app_err_with(|| format!("unable to flush change log '{}'", path.display()))
}

pub fn read(path: &Path) -> Result<Vec<Change>> {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) if matches!(e.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound) => return Ok(Vec::new()),
        Err(e) => return Err(e).into_app_err_with(|| format!("unable to open change log '{}'", path.display())),
    };

    reader
        .deserialize()
        .collect::<Result<Vec<Change>, _>>()
        .into_app_err_with(|| format!("malformed change log '{}'", path.display()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("changes.csv");
        let key = InstanceKey::daily("a/x", "GITHUB", "C");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let now = Utc::now();

        append(&path, &[Change::new(now, &key, date, None, 3.0)]).unwrap();
        append(&path, &[Change::new(now, &key, date, Some(3.0), 4.0)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("logged_at").count(), 1, "header written once");

        let changes = read(&path).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].old_value, None);
        assert_eq!(changes[1].old_value, Some(3.0));
        assert_eq!(changes[1].series, "a/x");
        assert_eq!(changes[1].frequency, Frequency::Daily);
    }

    #[test]
    fn test_append_nothing_creates_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("changes.csv");
        append(&path, &[]).unwrap();
        assert!(!path.exists());
        assert!(read(&path).unwrap().is_empty());
    }
}
