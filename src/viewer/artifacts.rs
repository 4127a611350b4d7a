//! Lookup of archived payloads in the datastore tree.

use crate::Result;
use crate::ingest::PayloadKind;
use crate::misc::safe_component;
use chrono::{Datelike, NaiveDate};
use ohno::IntoAppError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Most recent artifact of `kind` for a repository, optionally restricted to one day.
///
/// Artifact names start with the run timestamp, so within the tree the greatest name is the
/// latest one.
pub fn latest_artifact(datastore: &Path, owner: &str, repo: &str, kind: PayloadKind, day: Option<NaiveDate>) -> Result<Option<PathBuf>> {
    let repo_dir = datastore.join(safe_component(owner)).join(safe_component(repo));
    let suffix = format!("_{}.json", kind.suffix());

    let month_dirs = match day {
        Some(day) => vec![repo_dir.join(day.year().to_string()).join(day.month().to_string())],
        None => {
            let mut dirs = Vec::new();
            for year_dir in numeric_subdirs(&repo_dir)? {
                dirs.extend(numeric_subdirs(&year_dir)?);
            }
            dirs
        }
    };

    let prefix = day.map(|d| d.format("%Y%m%d").to_string());
    let mut latest: Option<(String, PathBuf)> = None;

    for dir in month_dirs {
        for (name, path) in files_in(&dir)? {
            if !name.ends_with(&suffix) || prefix.as_deref().is_some_and(|p| !name.starts_with(p)) {
                continue;
            }

            if latest.as_ref().is_none_or(|(best, _)| name > *best) {
                latest = Some((name, path));
            }
        }
    }

    Ok(latest.map(|(_, path)| path))
}

fn read_dir_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .collect::<io::Result<Vec<_>>>()
            .into_app_err_with(|| format!("unable to list '{}'", dir.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).into_app_err_with(|| format!("unable to list '{}'", dir.display())),
    }
}

/// Subdirectories named by a number, such as year and month directories
fn numeric_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(read_dir_entries(dir)?
        .into_iter()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|e| e.file_name().to_str().is_some_and(|n| n.parse::<u32>().is_ok()))
        .map(|e| e.path())
        .collect())
}

fn files_in(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    Ok(read_dir_entries(dir)?
        .into_iter()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|e| e.file_name().into_string().ok().map(|name| (name, e.path())))
        .collect())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn touch(datastore: &Path, rel: &str) {
        let path = datastore.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "[]").unwrap();
    }

    #[test]
    fn test_latest_across_months_and_years() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(root, "a/x/2023/12/20231231_2300_referrer.json");
        touch(root, "a/x/2024/1/20240102_0900_referrer.json");
        touch(root, "a/x/2024/1/20240101_0900_referrer.json");
        touch(root, "a/x/2024/1/20240103_0900_path.json");

        let latest = latest_artifact(root, "a", "x", PayloadKind::Referrer, None).unwrap();
        assert_eq!(latest, Some(root.join("a/x/2024/1/20240102_0900_referrer.json")));

        let latest = latest_artifact(root, "a", "x", PayloadKind::Path, None).unwrap();
        assert_eq!(latest, Some(root.join("a/x/2024/1/20240103_0900_path.json")));
    }

    #[test]
    fn test_latest_of_one_day() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(root, "a/x/2024/6/20240601_0800_path.json");
        touch(root, "a/x/2024/6/20240601_1700_path.json");
        touch(root, "a/x/2024/6/20240602_0800_path.json");

        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let latest = latest_artifact(root, "a", "x", PayloadKind::Path, Some(day)).unwrap();
        assert_eq!(latest, Some(root.join("a/x/2024/6/20240601_1700_path.json")));
    }

    #[test]
    fn test_missing_artifacts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(root, "a/x/2024/6/20240601_0800_path.json");

        assert_eq!(latest_artifact(root, "a", "x", PayloadKind::Referrer, None).unwrap(), None);
        assert_eq!(latest_artifact(root, "b", "y", PayloadKind::Path, None).unwrap(), None);

        let day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(latest_artifact(root, "a", "x", PayloadKind::Path, Some(day)).unwrap(), None);
    }

    #[test]
    fn test_ignores_non_numeric_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(root, "a/x/notes/20240601_0800_path.json");

        assert_eq!(latest_artifact(root, "a", "x", PayloadKind::Path, None).unwrap(), None);
    }
}
