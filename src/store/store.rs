use super::catalog::{Catalog, FORMAT_VERSION, InstanceKey, MeasurandRecord};
use super::change_log::{self, Change};
use super::lock::{StoreLockGuard, acquire_store_lock};
use super::{doc, series_file};
use crate::Result;
use crate::misc::safe_component;
use chrono::{NaiveDate, Utc};
use ohno::{IntoAppError, bail};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "     store";

const CATALOG_FILE: &str = "catalog.json";
const DATA_DIR: &str = "data";
const CHANGES_FILE: &str = "changes.csv";

/// What a single [`Store::write`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Dates that had no value before
    pub added: usize,
    /// Dates whose stored value was replaced by a different one
    pub updated: usize,
    /// Dates whose stored value already matched
    pub unchanged: usize,
}

impl WriteSummary {
    #[must_use]
    pub const fn changed(&self) -> usize {
        self.added + self.updated
    }
}

/// Handle to an on-disk store.
///
/// A handle opened with [`Store::create`] or [`Store::open`] may modify the store and holds its
/// lock until dropped. [`Store::open_read_only`] handles see a snapshot of the catalog as of
/// opening and reject modifications.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    catalog: Catalog,
    lock: Option<StoreLockGuard>,
}

impl Store {
    /// Whether a store has been created at `root`
    #[must_use]
    pub fn exists(root: impl AsRef<Path>) -> bool {
        root.as_ref().join(CATALOG_FILE).is_file()
    }

    /// Initialize a new, empty store at `root`
    pub async fn create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if Self::exists(root) {
            bail!("a store already exists at '{}'", root.display());
        }

        let lock = acquire_store_lock(root).await?;

        // another writer may have initialized the store while we waited
        if Self::exists(root) {
            bail!("a store already exists at '{}'", root.display());
        }

        Self::initialize(root, lock)
    }

    /// Open an existing store for reading and writing
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !Self::exists(root) {
            bail!("no store found at '{}'", root.display());
        }

        let lock = acquire_store_lock(root).await?;
        Self::load(root, lock)
    }

    /// Open the store at `root` for writing, initializing it first if there is none.
    ///
    /// Whether a store exists is decided while holding the writer lock, so concurrent callers
    /// against a fresh location initialize it exactly once. Returns the handle and whether it
    /// was initialized by this call.
    pub async fn open_or_create(root: impl AsRef<Path>) -> Result<(Self, bool)> {
        let root = root.as_ref();
        let lock = acquire_store_lock(root).await?;

        if Self::exists(root) {
            Ok((Self::load(root, lock)?, false))
        } else {
            Ok((Self::initialize(root, lock)?, true))
        }
    }

    fn initialize(root: &Path, lock: StoreLockGuard) -> Result<Self> {
        let store = Self {
            root: root.to_path_buf(),
            catalog: Catalog::new(Utc::now()),
            lock: Some(lock),
        };
        store.save_catalog()?;

        log::info!(target: LOG_TARGET, "Created store at '{}'", root.display());
        Ok(store)
    }

    fn load(root: &Path, lock: StoreLockGuard) -> Result<Self> {
        let catalog = load_catalog(root)?;

        log::debug!(target: LOG_TARGET, "Opened store at '{}'", root.display());
        Ok(Self {
            root: root.to_path_buf(),
            catalog,
            lock: Some(lock),
        })
    }

    /// Open an existing store without taking the writer lock
    pub fn open_read_only(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !Self::exists(root) {
            bail!("no store found at '{}'", root.display());
        }

        Ok(Self {
            root: root.to_path_buf(),
            catalog: load_catalog(root)?,
            lock: None,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.lock.is_some()
    }

    /// Register a data source if it isn't already; returns whether it was created
    pub fn add_source(&mut self, code: &str, description: &str) -> Result<bool> {
        self.ensure_writable()?;
        let created = self.catalog.insert_source(code, description);
        self.commit(created, || format!("source '{code}'"))
    }

    /// Register a measurand if it isn't already; returns whether it was created
    pub fn add_measurand(&mut self, code: &str, name: &str, description: &str) -> Result<bool> {
        self.ensure_writable()?;
        let created = self.catalog.insert_measurand(code, name, description);
        self.commit(created, || format!("measurand '{code}' ({name})"))
    }

    /// Register a series identity if it isn't already; returns whether it was created
    pub fn add_series(&mut self, id: &str) -> Result<bool> {
        self.ensure_writable()?;
        let created = self.catalog.insert_series(id);
        self.commit(created, || format!("series '{id}'"))
    }

    /// Register a series instance if it isn't already; returns whether it was created
    pub fn add_series_instance(&mut self, key: &InstanceKey) -> Result<bool> {
        self.ensure_writable()?;
        let created = self.catalog.insert_instance(key)?;
        self.commit(created, || format!("series instance {key}"))
    }

    #[must_use]
    pub fn has_instance(&self, key: &InstanceKey) -> bool {
        self.catalog.contains_instance(key)
    }

    /// Registered data sources as `(code, description)`
    pub fn sources(&self) -> impl Iterator<Item = (&str, &str)> {
        self.catalog.sources.iter().map(|(code, s)| (code.as_str(), s.description.as_str()))
    }

    /// Registered measurands by code
    pub fn measurands(&self) -> impl Iterator<Item = (&str, &MeasurandRecord)> {
        self.catalog.measurands.iter().map(|(code, m)| (code.as_str(), m))
    }

    /// All registered series identities, in sorted order
    pub fn series_ids(&self) -> impl Iterator<Item = &str> {
        self.catalog.series.iter().map(String::as_str)
    }

    /// Merge dated values into a series instance.
    ///
    /// Each point replaces whatever was stored for its date; dates not mentioned keep their values.
    /// Every added or modified value is recorded in the change log.
    pub fn write(&mut self, key: &InstanceKey, points: &[(NaiveDate, f64)]) -> Result<WriteSummary> {
        self.ensure_writable()?;
        if !self.has_instance(key) {
            bail!("cannot write to {key}: series instance is not registered");
        }

        let path = self.instance_path(key);
        let mut values = series_file::read(&path)?;
        let mut summary = WriteSummary::default();
        let mut changes = Vec::new();
        let now = Utc::now();

        for &(date, value) in points {
            match values.insert(date, value) {
                None => {
                    summary.added += 1;
                    changes.push(Change::new(now, key, date, None, value));
                }
                Some(old) if (old - value).abs() <= f64::EPSILON => summary.unchanged += 1,
                Some(old) => {
                    summary.updated += 1;
                    changes.push(Change::new(now, key, date, Some(old), value));
                }
            }
        }

        if summary.changed() > 0 {
            series_file::write(&path, &values)?;
            change_log::append(&self.root.join(CHANGES_FILE), &changes)?;
        }

        log::debug!(target: LOG_TARGET, "Wrote {} point(s) to {key}: {} added, {} updated, {} unchanged",
            points.len(), summary.added, summary.updated, summary.unchanged);

        Ok(summary)
    }

    /// All values of a series instance in date order
    pub fn read(&self, key: &InstanceKey) -> Result<Vec<(NaiveDate, f64)>> {
        if !self.has_instance(key) {
            bail!("cannot read {key}: series instance is not registered");
        }

        Ok(series_file::read(&self.instance_path(key))?.into_iter().collect())
    }

    /// Every change recorded by writes to this store, oldest first
    pub fn changes(&self) -> Result<Vec<Change>> {
        change_log::read(&self.root.join(CHANGES_FILE))
    }

    fn instance_path(&self, key: &InstanceKey) -> PathBuf {
        let mut path = self.root.join(DATA_DIR);
        for component in key.series.split('/') {
            path.push(safe_component(component));
        }

        let mut file_name = format!("{}_{}_{}", key.source, key.measurand, key.frequency);
        if !key.subperiod.is_empty() {
            file_name.push('_');
            file_name.push_str(&key.subperiod);
        }
        file_name.push_str(".csv");

        path.join(safe_component(&file_name))
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.is_writable() {
            Ok(())
        } else {
            bail!("store at '{}' was opened read-only", self.root.display())
        }
    }

    fn commit(&self, created: bool, what: impl FnOnce() -> String) -> Result<bool> {
        if created {
            self.save_catalog()?;
            log::debug!(target: LOG_TARGET, "Registered {}", what());
        }

        Ok(created)
    }

    fn save_catalog(&self) -> Result<()> {
        doc::save(&self.catalog, self.root.join(CATALOG_FILE))
    }
}

fn load_catalog(root: &Path) -> Result<Catalog> {
    let catalog: Catalog = doc::load(root.join(CATALOG_FILE))?;

    if catalog.format_version > FORMAT_VERSION {
        bail!(
            "store at '{}' has format version {}, this build supports up to {FORMAT_VERSION}",
            root.display(),
            catalog.format_version
        );
    }

    Ok(catalog)
}
