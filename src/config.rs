//! Collector settings kept alongside the data in `<datastore>/config.yaml`.

use crate::Result;
use crate::github::{ClientSettings, DEFAULT_API_URL, RetryPolicy};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Personal access token sent as a bearer token
    pub access_token: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Items requested per page from list endpoints (1..=100)
    #[serde(default = "default_page_size")]
    pub page_size: u8,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Extra attempts for requests that fail transiently
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_page_size() -> u8 {
    100
}

const fn default_request_timeout() -> u64 {
    60
}

const fn default_max_retries() -> u32 {
    3
}

impl Config {
    /// Default settings around the given token
    #[must_use]
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_url: default_api_url(),
            page_size: default_page_size(),
            request_timeout: default_request_timeout(),
            max_retries: default_max_retries(),
        }
    }

    #[must_use]
    pub fn path(datastore: &Utf8Path) -> Utf8PathBuf {
        datastore.join(CONFIG_FILE)
    }

    /// Load the configuration of `datastore`, or `None` if it has none yet
    pub fn load(datastore: &Utf8Path) -> Result<Option<Self>> {
        let path = Self::path(datastore);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
        };

        let config: Self = serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{path}'"))?;
        config.validate().into_app_err_with(|| format!("invalid configuration file '{path}'"))?;

        Ok(Some(config))
    }

    /// Write the configuration into `datastore`, replacing any existing one
    pub fn save(&self, datastore: &Utf8Path) -> Result<()> {
        self.validate()?;

        fs::create_dir_all(datastore).into_app_err_with(|| format!("creating datastore directory '{datastore}'"))?;
        let path = Self::path(datastore);
        let text = serde_yaml::to_string(self).into_app_err("serializing configuration")?;
        fs::write(&path, text).into_app_err_with(|| format!("writing configuration file '{path}'"))
    }

    fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(app_err!("access_token must not be empty"));
        }

        if !(1..=100).contains(&self.page_size) {
            return Err(app_err!("page_size must be between 1 and 100, got {}", self.page_size));
        }

        if self.request_timeout == 0 {
            return Err(app_err!("request_timeout must be at least one second"));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(app_err!("api_url must be an http or https URL, got '{}'", self.api_url));
        }

        Ok(())
    }

    #[must_use]
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_url.clone(),
            page_size: self.page_size,
            request_timeout: Duration::from_secs(self.request_timeout),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            },
        }
    }
}
