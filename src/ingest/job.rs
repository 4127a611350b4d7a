//! Collection of one repository's traffic into the store.

use super::archive::{ArchiveOutcome, Archiver, PayloadKind};
use super::daily::DailyTraffic;
use super::measurand::{Measurand, SOURCE_CODE};
use crate::Result;
use crate::github::{Client, ClonesResponse, Repository, ViewsResponse};
use crate::misc::{RepoName, safe_component};
use crate::store::{InstanceKey, Store, WriteSummary};
use chrono::{Datelike, NaiveDate};
use ohno::IntoAppError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "       job";

/// What processing one repository produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub repo: RepoName,
    pub artifacts: Vec<ArchiveOutcome>,
    pub writes: BTreeMap<Measurand, WriteSummary>,
}

impl RepoReport {
    fn new(repo: RepoName) -> Self {
        Self {
            repo,
            artifacts: Vec::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Number of points handed to the store for `measurand`
    #[must_use]
    pub fn points_written(&self, measurand: Measurand) -> usize {
        self.writes
            .get(&measurand)
            .map_or(0, |w| w.added + w.updated + w.unchanged)
    }
}

/// Everything shared by the jobs of one collection run
#[derive(Debug)]
pub struct RepoJob<'a> {
    client: &'a Client,
    datastore: &'a Path,
    archiver: &'a Archiver,
    processed_on: NaiveDate,
}

impl<'a> RepoJob<'a> {
    #[must_use]
    pub const fn new(client: &'a Client, datastore: &'a Path, archiver: &'a Archiver, processed_on: NaiveDate) -> Self {
        Self {
            client,
            datastore,
            archiver,
            processed_on,
        }
    }

    /// Directory the raw payloads of `repo` go to for the processing month
    #[must_use]
    pub fn artifact_dir(&self, repo: &RepoName) -> PathBuf {
        self.datastore
            .join(safe_component(repo.owner()))
            .join(safe_component(repo.repo()))
            .join(self.processed_on.year().to_string())
            .join(self.processed_on.month().to_string())
    }

    /// Archive the payloads of `repo` and write its series.
    ///
    /// The steps run in order and the first failure ends the job; whatever was written before
    /// that stays in place.
    pub async fn run(&self, store: &mut Store, repo: &RepoName) -> Result<RepoReport> {
        let series = repo.full_name();
        let base = format!("/repos/{}/{}", repo.owner(), repo.repo());
        let mut report = RepoReport::new(repo.clone());

        let dir = self.artifact_dir(repo);
        fs::create_dir_all(&dir).into_app_err_with(|| format!("unable to create artifact directory '{}'", dir.display()))?;

        for (kind, endpoint) in [(PayloadKind::Referrer, "traffic/popular/referrers"), (PayloadKind::Path, "traffic/popular/paths")] {
            let body = self.client.get_bytes(&format!("{base}/{endpoint}")).await?;
            report.artifacts.push(self.archiver.archive(&dir, kind, &body)?);
        }

        if store.add_series(&series)? {
            log::info!(target: LOG_TARGET, "Tracking new repository {series}");
        }

        ensure_instances(store, &series, &[Measurand::Clones, Measurand::UniqueClones, Measurand::Views, Measurand::UniqueViews])?;

        let clones: ClonesResponse = self.client.get_json(&format!("{base}/traffic/clones")).await?;
        let traffic = DailyTraffic::from_samples(&clones.clones);
        write_traffic(store, &series, &traffic, Measurand::Clones, Measurand::UniqueClones, &mut report)?;

        let views: ViewsResponse = self.client.get_json(&format!("{base}/traffic/views")).await?;
        let traffic = DailyTraffic::from_samples(&views.views);
        write_traffic(store, &series, &traffic, Measurand::Views, Measurand::UniqueViews, &mut report)?;

        let metadata: Repository = self.client.get_json(&base).await?;
        #[expect(clippy::cast_precision_loss, reason = "star and watcher counts stay far below 2^52")]
        let counts = [
            (Measurand::Stargazers, metadata.stargazers_count as f64),
            (Measurand::Watchers, metadata.subscribers_count as f64),
        ];

        for (measurand, value) in counts {
            ensure_instances(store, &series, &[measurand])?;
            let key = instance_key(&series, measurand);
            let summary = store.write(&key, &[(self.processed_on, value)])?;
            let _ = report.writes.insert(measurand, summary);
        }

        Ok(report)
    }
}

fn instance_key(series: &str, measurand: Measurand) -> InstanceKey {
    InstanceKey::daily(series, SOURCE_CODE, measurand.code())
}

/// Make sure each of the daily instances exists, trying all of them before reporting the first failure
fn ensure_instances(store: &mut Store, series: &str, measurands: &[Measurand]) -> Result<()> {
    let mut first_err = None;

    for &measurand in measurands {
        match store.add_series_instance(&instance_key(series, measurand)) {
            Ok(true) => log::debug!(target: LOG_TARGET, "Created {} instance for {series}", measurand.code()),
            Ok(false) => {}
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not create {} instance for {series}: {e:#}", measurand.code());
                let _ = first_err.get_or_insert(e);
            }
        }
    }

    first_err.map_or(Ok(()), Err)
}

fn write_traffic(
    store: &mut Store,
    series: &str,
    traffic: &DailyTraffic,
    total: Measurand,
    unique: Measurand,
    report: &mut RepoReport,
) -> Result<()> {
    if traffic.is_empty() {
        log::info!(target: LOG_TARGET, "No {} reported for {series}", total.name().to_lowercase());
        return Ok(());
    }

    for (measurand, points) in [(total, &traffic.count), (unique, &traffic.uniques)] {
        let summary = store.write(&instance_key(series, measurand), points)?;
        let _ = report.writes.insert(measurand, summary);
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::github::ClientSettings;
    use chrono::Utc;

    #[test]
    fn test_artifact_dir_is_not_zero_padded() {
        let client = Client::new("token", ClientSettings::default()).unwrap();
        let archiver = Archiver::new(&Utc::now());
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let job = RepoJob::new(&client, Path::new("/data"), &archiver, day);

        let repo = RepoName::parse("a/x").unwrap();
        assert_eq!(job.artifact_dir(&repo), Path::new("/data/a/x/2024/6"));
    }

    #[test]
    fn test_points_written_defaults_to_zero() {
        let mut report = RepoReport::new(RepoName::parse("a/x").unwrap());
        assert_eq!(report.points_written(Measurand::Clones), 0);

        let _ = report.writes.insert(
            Measurand::Clones,
            WriteSummary {
                added: 2,
                updated: 1,
                unchanged: 1,
            },
        );
        assert_eq!(report.points_written(Measurand::Clones), 4);
    }

    #[tokio::test]
    async fn test_failed_instance_does_not_stop_the_others() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = Store::create(temp_dir.path()).await.unwrap();
        let _ = store.add_source(SOURCE_CODE, "Github").unwrap();
        let _ = store.add_series("a/x").unwrap();
        for measurand in [Measurand::Clones, Measurand::UniqueClones, Measurand::UniqueViews] {
            let _ = store.add_measurand(measurand.code(), measurand.name(), measurand.description()).unwrap();
        }

        // V is not registered, so its instance cannot be created
        let batch = [Measurand::Clones, Measurand::Views, Measurand::UniqueClones, Measurand::UniqueViews];
        let _ = ensure_instances(&mut store, "a/x", &batch).unwrap_err();

        assert!(!store.has_instance(&instance_key("a/x", Measurand::Views)));
        for measurand in [Measurand::Clones, Measurand::UniqueClones, Measurand::UniqueViews] {
            assert!(store.has_instance(&instance_key("a/x", measurand)), "{measurand} instance missing");
        }
    }
}
