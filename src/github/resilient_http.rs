//! Retry and timeout middleware for API GET requests.
//!
//! Requests go through a [`seatbelt`] retry layer stacked on a timeout layer, so transient network
//! failures, server errors and rate limiting are retried a bounded number of times and one flaky
//! response doesn't cost a repository its data.

use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::app_err;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

const LOG_TARGET: &str = "      http";

/// Default maximum retry attempts (on top of the first request).
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff between retries.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Delay used for a 429 response that doesn't say how long to wait.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on a server-requested wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made after the first one fails
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each subsequent one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// What the retry layer should do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Retry after the policy's exponential backoff
    Backoff,

    /// Retry after a wait the server asked for
    After(Duration),

    /// Hand the response back to the caller
    Final,
}

/// Parse the `Retry-After` header value as seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let s = headers.get(RETRY_AFTER).and_then(|h| h.to_str().ok())?;
    s.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn disposition(status: StatusCode, headers: &HeaderMap) -> Disposition {
    match status {
        s if s.is_server_error() => Disposition::Backoff,

        StatusCode::TOO_MANY_REQUESTS => {
            Disposition::After(parse_retry_after(headers).unwrap_or(DEFAULT_RATE_LIMIT_DELAY).min(MAX_RETRY_AFTER))
        }

        // Secondary rate limit: only retried when GitHub says when.
        StatusCode::FORBIDDEN => {
            parse_retry_after(headers).map_or(Disposition::Final, |delay| Disposition::After(delay.min(MAX_RETRY_AFTER)))
        }

        _ => Disposition::Final,
    }
}

/// Classify a request outcome for the retry layer.
fn recovery(result: &crate::Result<reqwest::Response>) -> RecoveryInfo {
    let disposition = match result {
        // Network / connection errors are always transient.
        Err(_) => Disposition::Backoff,
        Ok(resp) => disposition(resp.status(), resp.headers()),
    };

    match disposition {
        Disposition::Backoff => RecoveryInfo::retry(),
        Disposition::After(delay) => RecoveryInfo::retry().delay(delay),
        Disposition::Final => RecoveryInfo::never(),
    }
}

/// Send an HTTP GET request with retry according to `policy`, bounding each attempt by `timeout`.
///
/// The final attempt's result is returned as is, whether that's an error or a non-success response.
pub async fn resilient_get(
    client: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
    timeout: Duration,
) -> crate::Result<reqwest::Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("github_get");

    let client = client.clone();
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &crate::Result<reqwest::Response>, _| recovery(result))
            .max_retry_attempts(policy.max_retries)
            .base_delay(policy.base_delay)
            .backoff(Backoff::Exponential)
            .on_retry(|output: &crate::Result<reqwest::Response>, args| match output {
                Ok(resp) => log::debug!(
                    target: LOG_TARGET,
                    "retrying GET after status {} (attempt {}, delay {}ms)",
                    resp.status(),
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                ),
                Err(e) => log::debug!(
                    target: LOG_TARGET,
                    "retrying GET after error: {e:#} (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                ),
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(|_| app_err!("HTTP request timed out"))
            .timeout(timeout),
        Execute::new(move |url: String| {
            let client = client.clone();
            async move { client.get(&url).send().await.map_err(ohno::AppError::from) }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
