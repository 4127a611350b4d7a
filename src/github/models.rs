//! Response shapes for the endpoints the collector uses, keeping only the fields it needs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of `GET /user/repos`
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
}

/// A day's worth of clone or view activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TrafficSample {
    #[serde(deserialize_with = "deserialize_day")]
    pub timestamp: NaiveDate,
    pub count: u64,
    pub uniques: u64,
}

/// `GET /repos/{owner}/{repo}/traffic/clones`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClonesResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
    #[serde(default)]
    pub clones: Vec<TrafficSample>,
}

/// `GET /repos/{owner}/{repo}/traffic/views`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewsResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
    #[serde(default)]
    pub views: Vec<TrafficSample>,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub stargazers_count: u64,
    /// What the web UI calls watchers
    #[serde(default)]
    pub subscribers_count: u64,
}

/// One entry of `GET /repos/{owner}/{repo}/traffic/popular/referrers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    pub referrer: String,
    pub count: u64,
    pub uniques: u64,
}

/// One entry of `GET /repos/{owner}/{repo}/traffic/popular/paths`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularPath {
    pub path: String,
    #[serde(default)]
    pub title: String,
    pub count: u64,
    pub uniques: u64,
}

/// Parse a traffic timestamp into the UTC day it refers to.
///
/// GitHub sends full RFC 3339 timestamps at midnight UTC, but bare `YYYY-MM-DD` dates are accepted too.
#[must_use]
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_day(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid traffic timestamp '{s}'")))
}
