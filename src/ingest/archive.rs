//! Write-once archiving of raw API payloads.

use crate::Result;
use chrono::{DateTime, TimeZone};
use ohno::IntoAppError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "   archive";

/// The kinds of payload kept verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Referrer,
    Path,
}

impl PayloadKind {
    /// File name suffix of artifacts of this kind
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Referrer => "referrer",
            Self::Path => "path",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Written(PathBuf),

    /// An artifact with the same name already existed and was left untouched
    AlreadyPresent(PathBuf),
}

impl ArchiveOutcome {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(path) | Self::AlreadyPresent(path) => path,
        }
    }
}

/// Names artifacts after the start time of the run that produced them
#[derive(Debug, Clone)]
pub struct Archiver {
    stamp: String,
}

impl Archiver {
    #[must_use]
    pub fn new<Tz>(run_started: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: core::fmt::Display,
    {
        Self {
            stamp: run_started.format("%Y%m%d_%H%M").to_string(),
        }
    }

    #[must_use]
    pub fn file_name(&self, kind: PayloadKind) -> String {
        format!("{}_{}.json", self.stamp, kind.suffix())
    }

    /// Store `bytes` as an artifact of `kind` in `directory`, never replacing an existing file
    pub fn archive(&self, directory: &Path, kind: PayloadKind, bytes: &[u8]) -> Result<ArchiveOutcome> {
        let path = directory.join(self.file_name(kind));

        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::warn!(target: LOG_TARGET, "Artifact '{}' already exists, keeping it", path.display());
                return Ok(ArchiveOutcome::AlreadyPresent(path));
            }
            Err(e) => return Err(e).into_app_err_with(|| format!("unable to create artifact '{}'", path.display())),
        };

        write_or_discard(&path, file, bytes)?;

        log::debug!(target: LOG_TARGET, "Archived {} byte(s) to '{}'", bytes.len(), path.display());
        Ok(ArchiveOutcome::Written(path))
    }
}

/// Fill a freshly created artifact, removing it again if that fails so a rerun can retry
fn write_or_discard(path: &Path, mut file: impl Write, bytes: &[u8]) -> Result<()> {
    let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) else {
        return Ok(());
    };

    drop(file);
    if let Err(remove_err) = fs::remove_file(path) {
        log::warn!(target: LOG_TARGET, "Could not remove incomplete artifact '{}': {remove_err:#}", path.display());
    }

    Err(e).into_app_err_with(|| format!("unable to write artifact '{}'", path.display()))
}
