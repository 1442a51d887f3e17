//! Provider configuration.
//!
//! The host hands `configure` a JSON object shaped by
//! [`ProviderConfig::schema`]. Values missing from it fall back to
//! environment variables (`MERAKI_DASHBOARD_API_KEY`, `MERAKI_BASE_URL`) and
//! then to built-in defaults.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::retry::{RetryPolicy, DEFAULT_MAXIMUM_RETRIES};
use crate::schema::{Attribute, Diagnostic, Diagnostics, Schema};

/// Environment variable read when `meraki_dashboard_api_key` is unset.
pub const API_KEY_ENV: &str = "MERAKI_DASHBOARD_API_KEY";

/// Environment variable read when `meraki_base_url` is unset.
pub const BASE_URL_ENV: &str = "MERAKI_BASE_URL";

/// Dashboard host used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com";

/// Path prefix of the v1 Dashboard API.
pub const API_PATH: &str = "/api/v1";

const DEFAULT_TIMEOUT_SECS: i64 = 60;
const DEFAULT_WAIT_TIME_SECS: i64 = 1;

/// Raw provider configuration, as the user wrote it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Dashboard API key.
    pub meraki_dashboard_api_key: Option<String>,
    /// Dashboard host, with or without the `/api/v1` suffix.
    pub meraki_base_url: Option<String>,
    /// Retries after the first attempt of each call.
    pub meraki_maximum_retries: Option<i64>,
    /// Whether 4xx responses are retried at all.
    pub meraki_retry_4xx_error: Option<bool>,
    /// Seconds to wait between retries.
    pub meraki_retry_4xx_error_wait_time: Option<i64>,
    /// Per-request transport timeout in seconds.
    pub meraki_timeout: Option<i64>,
    /// Overrides the default `User-Agent`.
    pub meraki_user_agent: Option<String>,
}

/// Fully resolved settings used to build a [`DashboardClient`](crate::client::DashboardClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Dashboard API key.
    pub api_key: String,
    /// Base URL including the `/api/v1` prefix, without a trailing slash.
    pub base_url: String,
    /// Retry policy applied to every call.
    pub retry: RetryPolicy,
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ProviderConfig {
    /// Parse the `configure` payload. A null payload means "all defaults".
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The provider configuration schema.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "meraki_dashboard_api_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "Dashboard API key. Falls back to {}.",
                        API_KEY_ENV
                    )),
            )
            .with_attribute(
                "meraki_base_url",
                Attribute::optional_string().with_description(format!(
                    "Dashboard base URL. Falls back to {}, then {}.",
                    BASE_URL_ENV, DEFAULT_BASE_URL
                )),
            )
            .with_attribute(
                "meraki_maximum_retries",
                Attribute::optional_computed_int64()
                    .with_default(Value::from(DEFAULT_MAXIMUM_RETRIES))
                    .with_description("Retries after the first attempt of a call that returns 4xx."),
            )
            .with_attribute(
                "meraki_retry_4xx_error",
                Attribute::optional_computed_bool()
                    .with_default(Value::Bool(true))
                    .with_description("Retry calls that return a 4xx status."),
            )
            .with_attribute(
                "meraki_retry_4xx_error_wait_time",
                Attribute::optional_computed_int64()
                    .with_default(Value::from(DEFAULT_WAIT_TIME_SECS))
                    .with_description("Seconds to wait between retries."),
            )
            .with_attribute(
                "meraki_timeout",
                Attribute::optional_computed_int64()
                    .with_default(Value::from(DEFAULT_TIMEOUT_SECS))
                    .with_description("Per-request timeout in seconds."),
            )
            .with_attribute(
                "meraki_user_agent",
                Attribute::optional_string().with_description("Overrides the User-Agent header."),
            )
    }

    /// Check the configuration without touching the environment.
    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(url) = &self.meraki_base_url {
            if reqwest::Url::parse(url).is_err() {
                diags.push(
                    Diagnostic::error("Invalid Dashboard base URL")
                        .with_detail(format!("'{}' is not an absolute URL", url))
                        .with_attribute("meraki_base_url"),
                );
            }
        }
        let non_negative = [
            ("meraki_maximum_retries", self.meraki_maximum_retries),
            (
                "meraki_retry_4xx_error_wait_time",
                self.meraki_retry_4xx_error_wait_time,
            ),
            ("meraki_timeout", self.meraki_timeout),
        ];
        for (name, value) in non_negative {
            if let Some(v) = value.filter(|v| *v < 0) {
                diags.push(
                    Diagnostic::error(format!("Invalid value for '{}'", name))
                        .with_detail(format!("Must not be negative, got {}", v))
                        .with_attribute(name),
                );
            }
        }
        if let Some(v) = self
            .meraki_maximum_retries
            .filter(|v| *v > i64::from(u32::MAX))
        {
            diags.push(
                Diagnostic::error("Invalid value for 'meraki_maximum_retries'")
                    .with_detail(format!("Must be at most {}, got {}", u32::MAX, v))
                    .with_attribute("meraki_maximum_retries"),
            );
        }
        if let Some(agent) = &self.meraki_user_agent {
            if reqwest::header::HeaderValue::from_str(agent).is_err() {
                diags.push(
                    Diagnostic::error("Invalid User-Agent")
                        .with_detail("The value is not a valid HTTP header value")
                        .with_attribute("meraki_user_agent"),
                );
            }
        }
        diags
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> Result<ClientSettings, Diagnostics> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using `env` to look up fallbacks.
    pub fn resolve_with<F>(&self, env: F) -> Result<ClientSettings, Diagnostics>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diags = self.validate();

        let api_key = self
            .meraki_dashboard_api_key
            .clone()
            .or_else(|| env(API_KEY_ENV))
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            diags.push(
                Diagnostic::error("Missing Dashboard API key")
                    .with_detail(format!(
                        "Set meraki_dashboard_api_key or the {} environment variable",
                        API_KEY_ENV
                    ))
                    .with_attribute("meraki_dashboard_api_key"),
            );
        }

        let base = self
            .meraki_base_url
            .clone()
            .or_else(|| env(BASE_URL_ENV))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if self.meraki_base_url.is_none() && reqwest::Url::parse(&base).is_err() {
            diags.push(
                Diagnostic::error("Invalid Dashboard base URL")
                    .with_detail(format!("{} is set to '{}'", BASE_URL_ENV, base)),
            );
        }

        let (Some(api_key), false) = (api_key, diags.has_errors()) else {
            return Err(diags);
        };

        let retry_enabled = self.meraki_retry_4xx_error.unwrap_or(true);
        let Ok(max_retries) = self
            .meraki_maximum_retries
            .map_or(Ok(DEFAULT_MAXIMUM_RETRIES), u32::try_from)
        else {
            return Err(diags);
        };
        let wait_secs = self
            .meraki_retry_4xx_error_wait_time
            .unwrap_or(DEFAULT_WAIT_TIME_SECS);
        let retry = if retry_enabled {
            RetryPolicy::new(max_retries, Duration::from_secs(wait_secs as u64))
        } else {
            RetryPolicy::no_retry()
        };

        Ok(ClientSettings {
            api_key,
            base_url: normalize_base_url(&base),
            retry,
            timeout: Duration::from_secs(self.meraki_timeout.unwrap_or(DEFAULT_TIMEOUT_SECS) as u64),
            user_agent: self
                .meraki_user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        })
    }
}

/// Strip trailing slashes and make sure the URL ends in `/api/v1`.
pub fn normalize_base_url(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with(API_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PATH)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
