//! Mock API shared by the integration tests

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use core::time::Duration;
use github_traffic_collector::github::{ClientSettings, RetryPolicy};
use github_traffic_collector::ingest::RunOptions;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

pub const REFERRERS: &str = r#"[{"referrer":"google.com","count":4,"uniques":3}]"#;

pub const PATHS: &str = r#"[{"path":"/a/x","title":"a/x: an example","count":9,"uniques":2}]"#;

pub fn client_settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        retry: RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_millis(10),
        },
        ..ClientSettings::default()
    }
}

/// Runs start at noon on 2024-06-01
pub fn run_options(server: &MockServer) -> RunOptions {
    RunOptions {
        client: client_settings(server),
        started_at: processing_time(),
    }
}

pub fn processing_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn processing_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn mount_repo_list(server: &MockServer, names: &[&str]) {
    let body: Vec<Value> = names.iter().map(|name| json!({ "full_name": name })).collect();

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve every endpoint one repository's job uses
pub async fn mount_repo(server: &MockServer, full_name: &str, clones: Value, views: Value, metadata: Value) {
    mount_json(server, &format!("/repos/{full_name}/traffic/popular/referrers"), ResponseTemplate::new(200).set_body_raw(REFERRERS, "application/json")).await;
    mount_json(server, &format!("/repos/{full_name}/traffic/popular/paths"), ResponseTemplate::new(200).set_body_raw(PATHS, "application/json")).await;
    mount_json(server, &format!("/repos/{full_name}/traffic/clones"), ResponseTemplate::new(200).set_body_json(clones)).await;
    mount_json(server, &format!("/repos/{full_name}/traffic/views"), ResponseTemplate::new(200).set_body_json(views)).await;
    mount_json(server, &format!("/repos/{full_name}"), ResponseTemplate::new(200).set_body_json(metadata)).await;
}

async fn mount_json(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn no_traffic(list: &str) -> Value {
    json!({ "count": 0, "uniques": 0, list: [] })
}

pub fn metadata(stars: u64, watchers: u64) -> Value {
    json!({ "stargazers_count": stars, "subscribers_count": watchers, "watchers_count": stars })
}
