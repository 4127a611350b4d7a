use crate::Result;
use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use ohno::bail;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;

/// Version of the catalog layout written by this build
pub const FORMAT_VERSION: u32 = 1;

/// Sampling frequency of a series instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "D")]
    Daily,
}

impl Frequency {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Daily => "D",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurandRecord {
    pub name: String,
    pub description: String,
}

/// Identifies one series instance: the concrete series values are written into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceKey {
    pub series: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub subperiod: String,
    pub source: String,
    pub measurand: String,
}

impl InstanceKey {
    /// A daily instance with no sub-period
    #[must_use]
    pub fn daily(series: impl Into<String>, source: impl Into<String>, measurand: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            frequency: Frequency::Daily,
            subperiod: String::new(),
            source: source.into(),
            measurand: measurand.into(),
        }
    }
}

impl Display for InstanceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} [{}", self.series, self.frequency)?;
        if !self.subperiod.is_empty() {
            write!(f, "/{}", self.subperiod)?;
        }
        write!(f, "] {}/{}", self.source, self.measurand)
    }
}

/// Everything registered in a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceRecord>,
    #[serde(default)]
    pub measurands: BTreeMap<String, MeasurandRecord>,
    #[serde(default)]
    pub series: BTreeSet<String>,
    #[serde(default)]
    pub instances: BTreeSet<InstanceKey>,
}

impl Catalog {
    #[must_use]
    pub const fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at,
            sources: BTreeMap::new(),
            measurands: BTreeMap::new(),
            series: BTreeSet::new(),
            instances: BTreeSet::new(),
        }
    }

    /// Register a data source; returns `false` if the code is already taken
    pub fn insert_source(&mut self, code: &str, description: &str) -> bool {
        match self.sources.entry(code.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                let _ = v.insert(SourceRecord {
                    description: description.to_string(),
                });
                true
            }
        }
    }

    /// Register a measurand; returns `false` if the code is already taken
    pub fn insert_measurand(&mut self, code: &str, name: &str, description: &str) -> bool {
        match self.measurands.entry(code.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                let _ = v.insert(MeasurandRecord {
                    name: name.to_string(),
                    description: description.to_string(),
                });
                true
            }
        }
    }

    /// Register a series identity; returns `false` if it already exists
    pub fn insert_series(&mut self, id: &str) -> bool {
        self.series.insert(id.to_string())
    }

    /// Register a series instance; returns `false` if it already exists.
    ///
    /// The series, source and measurand it refers to must all be registered.
    pub fn insert_instance(&mut self, key: &InstanceKey) -> Result<bool> {
        if !self.series.contains(&key.series) {
            bail!("cannot add instance {key}: series '{}' is not registered", key.series);
        }

        if !self.sources.contains_key(&key.source) {
            bail!("cannot add instance {key}: source '{}' is not registered", key.source);
        }

        if !self.measurands.contains_key(&key.measurand) {
            bail!("cannot add instance {key}: measurand '{}' is not registered", key.measurand);
        }

        Ok(self.instances.insert(key.clone()))
    }

    #[must_use]
    pub fn contains_instance(&self, key: &InstanceKey) -> bool {
        self.instances.contains(key)
    }

    /// Instances registered for one series identity
    pub fn instances_of<'a>(&'a self, series: &'a str) -> impl Iterator<Item = &'a InstanceKey> + 'a {
        self.instances.iter().filter(move |key| key.series == series)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn catalog_with_basics() -> Catalog {
        let mut catalog = Catalog::new(Utc::now());
        assert!(catalog.insert_source("GITHUB", "Github"));
        assert!(catalog.insert_measurand("C", "CLONES", "Total number of git clones"));
        assert!(catalog.insert_series("a/x"));
        catalog
    }

    #[test]
    fn test_duplicate_registrations_return_false() {
        let mut catalog = catalog_with_basics();
        assert!(!catalog.insert_source("GITHUB", "Github"));
        assert!(!catalog.insert_measurand("C", "CLONES", "different description"));
        assert!(!catalog.insert_series("a/x"));

        assert_eq!(catalog.sources.len(), 1);
        assert_eq!(catalog.measurands.len(), 1);
        assert_eq!(catalog.measurands["C"].description, "Total number of git clones");
        assert_eq!(catalog.series.len(), 1);
    }

    #[test]
    fn test_insert_instance_is_idempotent() {
        let mut catalog = catalog_with_basics();
        let key = InstanceKey::daily("a/x", "GITHUB", "C");

        assert!(catalog.insert_instance(&key).unwrap());
        assert!(!catalog.insert_instance(&key).unwrap());
        assert_eq!(catalog.instances.len(), 1);
        assert!(catalog.contains_instance(&key));
    }

    #[test]
    fn test_insert_instance_requires_references() {
        let mut catalog = catalog_with_basics();

        let err = catalog.insert_instance(&InstanceKey::daily("b/y", "GITHUB", "C")).unwrap_err();
        assert!(err.to_string().contains("series 'b/y'"));

        let err = catalog.insert_instance(&InstanceKey::daily("a/x", "GITLAB", "C")).unwrap_err();
        assert!(err.to_string().contains("source 'GITLAB'"));

        let err = catalog.insert_instance(&InstanceKey::daily("a/x", "GITHUB", "Z")).unwrap_err();
        assert!(err.to_string().contains("measurand 'Z'"));

        assert!(catalog.instances.is_empty());
    }

    #[test]
    fn test_instances_of() {
        let mut catalog = catalog_with_basics();
        assert!(catalog.insert_series("b/y"));
        let _ = catalog.insert_instance(&InstanceKey::daily("a/x", "GITHUB", "C")).unwrap();
        let _ = catalog.insert_instance(&InstanceKey::daily("b/y", "GITHUB", "C")).unwrap();

        let keys: Vec<_> = catalog.instances_of("b/y").collect();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].series, "b/y");
    }

    #[test]
    fn test_instance_key_display() {
        assert_eq!(InstanceKey::daily("a/x", "GITHUB", "UC").to_string(), "a/x [D] GITHUB/UC");

        let mut key = InstanceKey::daily("a/x", "GITHUB", "UC");
        key.subperiod = "Q1".to_string();
        assert_eq!(key.to_string(), "a/x [D/Q1] GITHUB/UC");
    }

    #[test]
    fn test_catalog_json_shape() {
        let mut catalog = catalog_with_basics();
        let _ = catalog.insert_instance(&InstanceKey::daily("a/x", "GITHUB", "C")).unwrap();

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["format_version"], 1);
        assert_eq!(json["sources"]["GITHUB"]["description"], "Github");
        assert_eq!(json["instances"][0]["frequency"], "D");
        assert_eq!(json["instances"][0]["subperiod"], "");

        let back: Catalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, catalog);
    }
}
