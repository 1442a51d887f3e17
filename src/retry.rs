//! Fixed-delay retry for Dashboard API calls.
//!
//! The Dashboard answers rate limiting (429) and a fair amount of transient
//! validation noise with 4xx statuses, so a call that comes back 4xx is
//! re-issued after a constant wait until the retry budget is spent. Every
//! other outcome ends the loop on the spot:
//!
//! - 2xx: success
//! - 5xx (503 included): returned as-is, never retried
//! - no status at all (transport or decode failure): returned as-is
//!
//! The wrapper never inspects, wraps or replaces an error. When the budget is
//! exhausted the caller gets the last attempt's outcome verbatim.
//!
//! ```ignore
//! let policy = client.retry_policy();
//! let network = custom_http_request_retry(&policy, || client.get_network(&id))
//!     .await
//!     .map_err(|e| ProviderError::from_api("Failure when executing GetNetwork", e))?;
//! ```

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::client::ApiResponse;
use crate::error::ApiError;
use crate::schema::Diagnostics;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAXIMUM_RETRIES: u32 = 3;

/// Default wait between attempts.
pub const DEFAULT_RETRY_4XX_WAIT_TIME: Duration = Duration::from_secs(1);

/// How many times a call is re-issued and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` means a single attempt.
    pub max_retries: u32,
    /// Constant delay before each retry.
    pub wait_time: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, wait_time: Duration) -> Self {
        Self {
            max_retries,
            wait_time,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAXIMUM_RETRIES, DEFAULT_RETRY_4XX_WAIT_TIME)
    }
}

/// The outcome of one HTTP attempt, as far as the retry loop cares.
pub trait HttpOutcome {
    /// The HTTP status of the attempt, or `None` if no response arrived.
    fn http_status(&self) -> Option<StatusCode>;

    /// Whether this outcome should be re-attempted.
    fn is_retryable(&self) -> bool {
        self.http_status().is_some_and(|s| s.is_client_error())
    }
}

impl<T> HttpOutcome for Result<ApiResponse<T>, ApiError> {
    fn http_status(&self) -> Option<StatusCode> {
        match self {
            Ok(resp) => Some(resp.status),
            Err(err) => err.status(),
        }
    }
}

/// Run `operation`, re-invoking it while it returns a 4xx and retries remain.
///
/// Makes at most `policy.max_retries + 1` attempts, sleeping exactly
/// `policy.wait_time` before each retry. Returns the last attempt's outcome.
pub async fn custom_http_request_retry<R, F, Fut>(policy: &RetryPolicy, mut operation: F) -> R
where
    R: HttpOutcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = R>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = operation().await;
        if !outcome.is_retryable() || attempt >= policy.max_retries {
            if attempt > 0 {
                debug!(
                    attempts = attempt + 1,
                    status = ?outcome.http_status(),
                    "Dashboard call finished after retries"
                );
            }
            return outcome;
        }
        attempt += 1;
        warn!(
            attempt,
            max_retries = policy.max_retries,
            status = ?outcome.http_status(),
            wait_ms = policy.wait_time.as_millis() as u64,
            "Dashboard returned a client error, retrying"
        );
        tokio::time::sleep(policy.wait_time).await;
    }
}

/// Like [`custom_http_request_retry`], threading a [`Diagnostics`] accumulator.
///
/// Each attempt receives the accumulator and hands it back alongside its
/// outcome, so warnings gathered on earlier attempts survive into the final
/// result even when the call eventually succeeds.
pub async fn custom_http_request_retry_strong_typed<R, F, Fut>(
    policy: &RetryPolicy,
    diagnostics: Diagnostics,
    mut operation: F,
) -> (R, Diagnostics)
where
    R: HttpOutcome,
    F: FnMut(Diagnostics) -> Fut,
    Fut: Future<Output = (R, Diagnostics)>,
{
    let mut diagnostics = diagnostics;
    let mut attempt: u32 = 0;
    loop {
        let (outcome, returned) = operation(diagnostics).await;
        diagnostics = returned;
        if !outcome.is_retryable() || attempt >= policy.max_retries {
            return (outcome, diagnostics);
        }
        attempt += 1;
        warn!(
            attempt,
            max_retries = policy.max_retries,
            status = ?outcome.http_status(),
            wait_ms = policy.wait_time.as_millis() as u64,
            "Dashboard returned a client error, retrying"
        );
        tokio::time::sleep(policy.wait_time).await;
    }
}
