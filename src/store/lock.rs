//! Single-writer lock of a store.
//!
//! The lock is an exclusive advisory lock on `store.lock` in the store root. Acquiring it also
//! creates the root, so the decision whether a store still has to be initialized can be made
//! while holding it. The holder writes its process id into the file to help diagnose a stuck
//! collector.

use crate::Result;
use chrono::Utc;
use fs4::fs_std::FileExt;
use ohno::IntoAppError;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, Write};
use std::path::Path;

const LOG_TARGET: &str = "     store";

const LOCK_FILE: &str = "store.lock";

/// Held writer lock; released when dropped
#[derive(Debug)]
pub struct StoreLockGuard(File);

impl Drop for StoreLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            log::warn!(target: LOG_TARGET, "Could not release store lock: {e:#}");
        }
    }
}

/// Take the writer lock of the store rooted at `root`, creating the directory if needed.
///
/// Waits for as long as another collection run holds the store.
pub async fn acquire_store_lock(root: &Path) -> Result<StoreLockGuard> {
    fs::create_dir_all(root).into_app_err_with(|| format!("unable to create store directory '{}'", root.display()))?;
    let lock_path = root.join(LOCK_FILE);

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .into_app_err_with(|| format!("unable to open store lock file '{}'", lock_path.display()))?;

    let file = tokio::task::spawn_blocking(move || {
        log::debug!(target: LOG_TARGET, "Waiting for store lock at '{}'", lock_path.display());
        file.lock_exclusive()
            .into_app_err_with(|| format!("unable to lock store at '{}'", lock_path.display()))?;

        record_holder(&file).into_app_err_with(|| format!("unable to write store lock file '{}'", lock_path.display()))?;
        log::debug!(target: LOG_TARGET, "Acquired store lock at '{}'", lock_path.display());
        Ok::<_, ohno::AppError>(file)
    })
    .await
    .into_app_err("store lock task panicked")??;

    Ok(StoreLockGuard(file))
}

fn record_holder(mut file: &File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.rewind()?;
    writeln!(file, "pid {} since {}", std::process::id(), Utc::now().to_rfc3339())?;
    file.flush()
}
