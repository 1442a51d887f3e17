//! Managed Meraki resources.
//!
//! Every resource implements [`Resource`]. Handlers decode the JSON state into
//! a typed struct, build the request body from it, run the Dashboard call
//! through [`custom_http_request_retry`] with the client's policy and map the
//! answer back into state.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::client::{ApiResult, DashboardClient};
use crate::error::{ApiError, ProviderError};
use crate::retry::{custom_http_request_retry, custom_http_request_retry_strong_typed};
use crate::schema::{AttributeType, Diagnostics, Schema};

pub mod device;
pub mod network;
pub mod organization;
pub mod organization_saml;
pub mod organization_snmp;
pub mod switch_port;
pub mod wireless_ssid;

pub use device::DeviceResource;
pub use network::NetworkResource;
pub use organization::OrganizationResource;
pub use organization_saml::OrganizationSamlResource;
pub use organization_snmp::OrganizationSnmpResource;
pub use switch_port::SwitchPortResource;
pub use wireless_ssid::WirelessSsidResource;

/// A resource type the provider manages.
///
/// `read` returns [`Value::Null`] when the object no longer exists on the
/// Dashboard; the host drops it from state.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// The resource type name, e.g. `meraki_network`.
    fn type_name(&self) -> &'static str;

    /// The resource schema.
    fn schema(&self) -> Schema;

    /// Checks beyond what the schema can express (cross-attribute rules).
    fn validate(&self, config: &Value) -> Diagnostics {
        let _ = config;
        Diagnostics::new()
    }

    /// Create the object and return its state. Rejected attempts that were
    /// retried are added to `diags` as warnings.
    async fn create(
        &self,
        client: &DashboardClient,
        planned: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError>;

    /// Refresh state from the Dashboard.
    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError>;

    /// Apply the planned state to an existing object.
    async fn update(
        &self,
        client: &DashboardClient,
        prior: Value,
        planned: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError>;

    /// Delete the object, or reset it to defaults for objects that always exist.
    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        diags: &mut Diagnostics,
    ) -> Result<(), ProviderError>;

    /// Turn an import id into the minimal state `read` needs.
    fn import_state(&self, id: &str) -> Result<Value, ProviderError>;
}

/// Every resource this provider serves.
pub fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(OrganizationResource),
        Box::new(NetworkResource),
        Box::new(DeviceResource),
        Box::new(WirelessSsidResource),
        Box::new(SwitchPortResource),
        Box::new(OrganizationSnmpResource),
        Box::new(OrganizationSamlResource),
    ]
}

/// Decode JSON state into a typed state struct.
pub(crate) fn decode_state<T: DeserializeOwned>(value: Value) -> Result<T, ProviderError> {
    Ok(serde_json::from_value(value)?)
}

/// Encode a typed state struct back into JSON state.
pub(crate) fn encode_state<T: Serialize>(state: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(state)?)
}

/// Build the error returned when a Dashboard call fails.
pub(crate) fn api_failure(operation: &str, err: ApiError) -> ProviderError {
    ProviderError::from_api(&format!("Failure when executing {}", operation), err)
}

/// An identity attribute that must be known before calling the Dashboard.
pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ProviderError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProviderError::Validation(format!("'{}' is not set in state", name)))
}

/// Run one call with retries and unwrap its body.
pub(crate) async fn call<T, F, Fut>(
    client: &DashboardClient,
    operation: &str,
    f: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ApiResult<T>>,
{
    custom_http_request_retry(&client.retry_policy(), f)
        .await
        .map(|resp| resp.value)
        .map_err(|err| api_failure(operation, err))
}

/// Like [`call`], but a final 404 yields `None` instead of an error.
pub(crate) async fn call_found<T, F, Fut>(
    client: &DashboardClient,
    operation: &str,
    f: F,
) -> Result<Option<T>, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ApiResult<T>>,
{
    match custom_http_request_retry(&client.retry_policy(), f).await {
        Ok(resp) => Ok(Some(resp.value)),
        Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Ok(None),
        Err(err) => Err(api_failure(operation, err)),
    }
}

/// Run one call with retries, recording every rejected attempt as a warning.
///
/// Settings endpoints (SSIDs, switch ports, SNMP, SAML) are the ones that
/// answer a burst of writes with 4xx before accepting. The warnings are
/// logged and appended to `diags` even when the last attempt succeeds.
pub(crate) async fn call_with_warnings<T, F, Fut>(
    client: &DashboardClient,
    operation: &str,
    diags: &mut Diagnostics,
    mut f: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ApiResult<T>>,
{
    let (outcome, diagnostics) = custom_http_request_retry_strong_typed(
        &client.retry_policy(),
        Diagnostics::new(),
        |mut diags| {
            let attempt = f();
            async move {
                let outcome = attempt.await;
                if let Err(err) = &outcome {
                    if err.status().is_some_and(|s| s.is_client_error()) {
                        diags.warning(
                            format!("{} was rejected by the Dashboard", operation),
                            err.to_string(),
                        );
                    }
                }
                (outcome, diags)
            }
        },
    )
    .await;

    for diag in diagnostics.into_vec() {
        warn!(
            operation,
            summary = %diag.summary,
            detail = diag.detail.as_deref().unwrap_or_default(),
            "Dashboard call needed retries"
        );
        diags.push(diag);
    }
    outcome
        .map(|resp| resp.value)
        .map_err(|err| api_failure(operation, err))
}

/// Split a composite import id such as `"N_123,4"` into its parts.
pub(crate) fn split_import_id<'a>(
    id: &'a str,
    parts: &[&str],
) -> Result<Vec<&'a str>, ProviderError> {
    let values: Vec<&str> = id.split(',').map(str::trim).collect();
    if values.len() != parts.len() || values.iter().any(|v| v.is_empty()) {
        return Err(ProviderError::InvalidRequest(format!(
            "Unexpected import identifier '{}': expected {}",
            id,
            parts.join(",")
        )));
    }
    Ok(values)
}

/// The object type a resource's attributes form, for data source item lists.
pub(crate) fn object_type(schema: &Schema) -> AttributeType {
    AttributeType::object(
        schema
            .block
            .attributes
            .iter()
            .filter(|(_, attr)| !attr.flags.sensitive)
            .map(|(name, attr)| (name.clone(), attr.attr_type.clone())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_type_names_unique() {
        let names: HashSet<&str> = all().iter().map(|r| r.type_name()).collect();
        assert_eq!(names.len(), all().len());
        assert!(names.contains("meraki_wireless_ssid"));
    }

    #[test]
    fn test_split_import_id() {
        assert_eq!(
            split_import_id("N_1, 3", &["networkId", "number"]).unwrap(),
            vec!["N_1", "3"]
        );
        let err = split_import_id("N_1", &["networkId", "number"]).unwrap_err();
        assert!(err.message().contains("networkId,number"));
        assert!(split_import_id("N_1,", &["networkId", "number"]).is_err());
    }

    #[test]
    fn test_required_rejects_empty() {
        assert_eq!(required(&Some("N_1".into()), "id").unwrap(), "N_1");
        assert!(matches!(
            required(&Some(String::new()), "id"),
            Err(ProviderError::Validation(_))
        ));
        assert!(required(&None, "id").is_err());
    }

    #[tokio::test]
    async fn test_call_found_maps_404_to_none() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/networks/N_gone");
                then.status(404).json_body(json!({"errors": ["Not found"]}));
            })
            .await;

        let client = client_for(&server, 1);
        let found = call_found(&client, "GetNetwork", || client.get_network("N_gone"))
            .await
            .unwrap();

        assert!(found.is_none());
        // 404 is a client error, so it is retried like any other 4xx.
        assert_eq!(mock.hits_async().await, 2);
    }

    #[tokio::test]
    async fn test_call_with_warnings_exhausts_budget() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/v1/organizations/1/saml");
                then.status(429).json_body(json!({"errors": ["Too many requests"]}));
            })
            .await;

        let client = client_for(&server, 2);
        let body = crate::client::SamlUpdate { enabled: true };
        let mut diags = Diagnostics::new();
        let err = call_with_warnings(&client, "UpdateOrganizationSaml", &mut diags, || {
            client.update_organization_saml("1", &body)
        })
        .await
        .unwrap_err();

        assert_eq!(mock.hits_async().await, 3);
        assert!(matches!(err, ProviderError::ResourceExhausted(_)));
        assert!(err.message().contains("Too many requests"));
        // One warning per rejected attempt, the final one included.
        assert_eq!(diags.len(), 3);
        assert!(!diags.has_errors());
    }

    #[tokio::test]
    async fn test_call_with_warnings_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/v1/organizations/1/saml");
                then.status(200).json_body(json!({"enabled": true}));
            })
            .await;

        let client = client_for(&server, 2);
        let body = crate::client::SamlUpdate { enabled: true };
        let mut diags = Diagnostics::new();
        let saml = call_with_warnings(&client, "UpdateOrganizationSaml", &mut diags, || {
            client.update_organization_saml("1", &body)
        })
        .await
        .unwrap();
        assert!(saml.enabled);
        assert!(diags.is_empty());
    }

    #[tokio::test]
    async fn test_call_with_warnings_reports_rate_limit_then_success() {
        let calls = AtomicUsize::new(0);
        let client = client_for(&MockServer::start_async().await, 2);
        let mut diags = Diagnostics::new();

        let value = call_with_warnings(&client, "UpdateOrganizationSaml", &mut diags, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ApiError::Status {
                        status: StatusCode::TOO_MANY_REQUESTS,
                        body: r#"{"errors": ["Too many requests"]}"#.to_string(),
                    })
                } else {
                    Ok(crate::client::ApiResponse::new(json!({"enabled": true}), StatusCode::OK))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value["enabled"], true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(diags.len(), 1);
        let warning = diags.iter().next().unwrap();
        assert_eq!(warning.summary, "UpdateOrganizationSaml was rejected by the Dashboard");
        assert!(warning.detail.as_deref().unwrap().contains("429"));
    }

    #[tokio::test]
    async fn test_call_error_carries_operation() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations/1");
                then.status(500).body("boom");
            })
            .await;

        let client = client_for(&server, 3);
        let err = call(&client, "GetOrganization", || client.get_organization("1"))
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Failure when executing GetOrganization: HTTP 500: boom"
        );
    }
}
