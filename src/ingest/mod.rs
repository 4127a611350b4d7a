//! The collection pipeline: catalog setup, per-repository jobs and the run over all repositories.

mod archive;
mod bootstrap;
mod daily;
mod job;
mod measurand;
mod run;

pub use archive::{ArchiveOutcome, Archiver, PayloadKind};
pub use bootstrap::{ensure_catalog, ensure_measurand};
pub use daily::{DailyTraffic, reindex_daily};
pub use job::{RepoJob, RepoReport};
pub use measurand::{Measurand, SOURCE_CODE, SOURCE_DESCRIPTION};
pub use run::{RepoFailure, RunOptions, RunSummary, STORE_DIR, run, store_location};
