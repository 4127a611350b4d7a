//! A small file-backed time-series store.
//!
//! The store keeps a JSON catalog of data sources, measurands, series identities and series
//! instances, one CSV file of dated values per series instance, and an append-only log of
//! every value the store adds or changes. A writer holds an exclusive lock on the store for
//! as long as its handle lives; readers take no lock.

mod catalog;
mod change_log;
mod doc;
mod lock;
#[expect(clippy::module_inception, reason = "the store handle lives in the store module")]
mod store;
mod series_file;

pub use catalog::{Catalog, Frequency, InstanceKey, MeasurandRecord, SourceRecord};
pub use change_log::Change;
pub use store::{Store, WriteSummary};
