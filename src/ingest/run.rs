//! One collection run over every repository the token can see.

use super::archive::Archiver;
use super::bootstrap::ensure_catalog;
use super::job::{RepoJob, RepoReport};
use crate::Result;
use crate::github::{Client, ClientSettings, RepoSummary};
use crate::misc::RepoName;
use chrono::{DateTime, Local};
use ohno::IntoAppError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "       run";

/// Name of the store directory inside the datastore
pub const STORE_DIR: &str = "gtc_store";

const REPOS_ENDPOINT: &str = "/user/repos";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub client: ClientSettings,

    /// Processing time shared by every repository of the run
    pub started_at: DateTime<Local>,
}

impl RunOptions {
    /// Options for a run starting now
    #[must_use]
    pub fn new(client: ClientSettings) -> Self {
        Self {
            client,
            started_at: Local::now(),
        }
    }
}

/// A repository whose job did not complete
#[derive(Debug)]
pub struct RepoFailure {
    pub repo: String,
    pub error: ohno::AppError,
}

/// Outcome of a collection run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<RepoReport>,
    pub failures: Vec<RepoFailure>,
}

impl RunSummary {
    #[must_use]
    pub fn repositories(&self) -> usize {
        self.reports.len() + self.failures.len()
    }
}

/// Location of the store within `datastore`
#[must_use]
pub fn store_location(datastore: &Path) -> PathBuf {
    datastore.join(STORE_DIR)
}

/// Collect the traffic of every repository visible to `token` into `datastore`.
///
/// Repositories are processed one after the other and a progress line is written to `out` for
/// each. A repository whose job fails is logged and recorded in the summary and the run moves on.
/// Failing to prepare the store or to list the repositories ends the run with an error.
pub async fn run(datastore: impl AsRef<Path>, token: &str, options: RunOptions, mut out: impl Write) -> Result<RunSummary> {
    let datastore = datastore.as_ref();
    fs::create_dir_all(datastore).into_app_err_with(|| format!("unable to create datastore directory '{}'", datastore.display()))?;

    let mut store = ensure_catalog(store_location(datastore)).await?;
    let client = Client::new(token, options.client)?;

    let repos: Vec<RepoSummary> = client.fetch_all(REPOS_ENDPOINT).await?;
    log::info!(target: LOG_TARGET, "Found {} repositories", repos.len());

    let archiver = Archiver::new(&options.started_at);
    let job = RepoJob::new(&client, datastore, &archiver, options.started_at.date_naive());
    let mut summary = RunSummary::default();

    for (index, repo) in repos.iter().enumerate() {
        let progress = format!("Processing {}/{}: {}", index + 1, repos.len(), repo.full_name);
        log::info!(target: LOG_TARGET, "{progress}");
        if let Err(e) = writeln!(out, "{progress}") {
            log::debug!(target: LOG_TARGET, "Could not write progress line: {e:#}");
        }

        let result = match RepoName::parse(&repo.full_name) {
            Ok(name) => job.run(&mut store, &name).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => summary.reports.push(report),
            Err(error) => {
                log::error!(target: LOG_TARGET, "Failed to process {}: {error:#}", repo.full_name);
                summary.failures.push(RepoFailure {
                    repo: repo.full_name.clone(),
                    error,
                });
            }
        }
    }

    log::info!(target: LOG_TARGET, "Processed {} repositories, {} failed", summary.repositories(), summary.failures.len());
    Ok(summary)
}
