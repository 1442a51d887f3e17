//! Meraki Provider
//!
//! An infrastructure-as-code provider for the Cisco Meraki Dashboard API.
//! It serves resources (organizations, networks, devices, wireless SSIDs,
//! switch ports, organization SNMP and SAML settings) and read-only data
//! sources over a [`DashboardClient`](client::DashboardClient) whose every
//! call is wrapped in a fixed-delay, 4xx-only retry.
//!
//! # Overview
//!
//! - **Retry**: [`custom_http_request_retry`] and its diagnostics-threading
//!   twin [`custom_http_request_retry_strong_typed`]
//! - **Client**: typed Dashboard endpoints on top of `reqwest`
//! - **Configuration**: [`config::ProviderConfig`] with environment fallbacks
//! - **Resources and data sources**: one module per Dashboard object
//! - **ProviderService**: the host-facing surface, implemented by [`MerakiProvider`]
//! - **Logging**: `tracing` to stderr
//!
//! # Quick Start
//!
//! ```no_run
//! use meraki_provider::{init_logging, MerakiProvider, ProviderService};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), meraki_provider::ProviderError> {
//! init_logging();
//! let provider = MerakiProvider::new();
//!
//! // The key falls back to MERAKI_DASHBOARD_API_KEY when omitted.
//! let diagnostics = provider
//!     .configure(json!({"meraki_maximum_retries": 5}))
//!     .await?;
//! assert!(diagnostics.is_empty());
//!
//! let networks = provider
//!     .read_data_source("meraki_networks", json!({"organization_id": "123456"}))
//!     .await?;
//! println!("{}", networks["items"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Retry semantics
//!
//! | Outcome of an attempt       | What happens                          |
//! |-----------------------------|---------------------------------------|
//! | 2xx                         | returned                              |
//! | 4xx, retries left           | wait, then re-issue the same request  |
//! | 4xx, budget spent           | last response returned verbatim       |
//! | 5xx or transport failure    | returned immediately                  |
//!
//! A call is attempted at most `meraki_maximum_retries + 1` times.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Wire and state structs mirror Dashboard JSON field for field.
#[allow(missing_docs)]
pub mod client;
pub mod config;
#[allow(missing_docs)]
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
#[allow(missing_docs)]
pub mod resources;
pub mod retry;
pub mod schema;
pub mod testing;
pub mod validation;

// Re-export main types at crate root
pub use error::{ApiError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use plan::{plan_resource, AttributeChange, PlanResult};
pub use provider::{
    ApplyResult, ImportedResource, MerakiProvider, ProviderMetadata, ProviderService,
    ServerCapabilities,
};
pub use retry::{custom_http_request_retry, custom_http_request_retry_strong_typed, RetryPolicy};
pub use schema::ProviderSchema;
pub use validation::{is_valid, validate, validate_result};

pub use async_trait::async_trait;

pub use serde_json;
pub use tracing;
