//! CSV persistence of one series instance's values: a `date,value` row per day, sorted by date.

use super::doc::temp_path;
use crate::Result;
use chrono::NaiveDate;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    date: NaiveDate,
    value: f64,
}

/// Read all values of a series file; a missing file is an empty series
pub fn read(path: &Path) -> Result<BTreeMap<NaiveDate, f64>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e).into_app_err_with(|| format!("unable to open series file '{}'", path.display())),
    };

    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let mut values = BTreeMap::new();

    for row in reader.deserialize::<Row>() {
        let row = row.into_app_err_with(|| format!("malformed row in series file '{}'", path.display()))?;
        let _ = values.insert(row.date, row.value);
    }

    Ok(values)
}

/// Replace the content of a series file with `values`
pub fn write(path: &Path, values: &BTreeMap<NaiveDate, f64>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_app_err_with(|| format!("unable to create directory '{}'", parent.display()))?;
    }

    let tmp_path = temp_path(path);
    let mut writer = csv::Writer::from_path(&tmp_path).into_app_err_with(|| format!("unable to create series file '{}'", tmp_path.display()))?;

    for (&date, &value) in values {
        writer
            .serialize(Row { date, value })
            .into_app_err_with(|| format!("unable to write series file '{}'", tmp_path.display()))?;
    }

    writer
        .flush()
        .into_app_err_with(|| format!("unable to flush series file '{}'", tmp_path.display()))?;
    drop(writer);

    fs::rename(&tmp_path, path).into_app_err_with(|| format!("unable to replace series file '{}'", path.display()))
}
