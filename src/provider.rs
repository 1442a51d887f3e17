//! The provider service and the Meraki implementation of it.
//!
//! [`ProviderService`] is the surface a host drives: schema, configuration,
//! plan, CRUD, import and data source reads. [`MerakiProvider`] implements it
//! by dispatching each call to the registered [`Resource`] or [`DataSource`]
//! with the [`DashboardClient`] built in `configure`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::client::DashboardClient;
use crate::config::ProviderConfig;
use crate::data_sources::{self, DataSource};
use crate::error::ProviderError;
use crate::plan::{plan_resource, PlanResult};
use crate::resources::{self, Resource};
use crate::schema::{Diagnostic, Diagnostics, ProviderSchema};
use crate::validation::validate;

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// The outcome of a create or update: the new state plus any warnings the
/// Dashboard calls raised on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ApplyResult {
    /// The resource state after the change.
    pub state: Value,
    /// Warnings collected while applying, one per retried rejection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ApplyResult {
    /// Wrap a state with the diagnostics gathered for it.
    pub fn new(state: Value, diagnostics: Diagnostics) -> Self {
        Self {
            state,
            diagnostics: diagnostics.into_vec(),
        }
    }
}

/// Provider metadata: the type names it serves and what it supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
    /// Server capabilities.
    pub capabilities: ServerCapabilities,
}

/// Server capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Whether the provider supports planning destroy operations.
    pub plan_destroy: bool,
}

/// Turn a provider error into the diagnostic a host shows the user.
pub fn error_diagnostic(err: &ProviderError) -> Diagnostic {
    Diagnostic::error(err.to_string())
}

/// Operations a provider serves.
///
/// Defaults are supplied for everything a minimal provider can leave out.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.keys().cloned().collect();
        let mut data_sources: Vec<String> = schema.data_sources.keys().cloned().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            capabilities: Default::default(),
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Upgrade resource state from an older schema version.
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let _ = (resource_type, version);
        Ok(state)
    }

    /// Plan changes for a resource.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<ApplyResult, ProviderError>;

    /// Read the current state of a resource. `Value::Null` means it is gone.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<ApplyResult, ProviderError>;

    /// Delete a resource, returning any warnings raised on the way.
    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Read data from an external source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: Value,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "Unknown data source type: {}",
            data_source_type
        )))
    }
}

/// The Meraki Dashboard provider.
///
/// The Dashboard client is created by [`configure`](ProviderService::configure)
/// and shared read-only by every later call.
pub struct MerakiProvider {
    resources: HashMap<&'static str, Box<dyn Resource>>,
    data_sources: HashMap<&'static str, Box<dyn DataSource>>,
    client: RwLock<Option<Arc<DashboardClient>>>,
}

impl Default for MerakiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MerakiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut resources: Vec<_> = self.resources.keys().collect();
        resources.sort();
        f.debug_struct("MerakiProvider")
            .field("resources", &resources)
            .field("data_sources", &self.data_sources.len())
            .finish_non_exhaustive()
    }
}

impl MerakiProvider {
    /// A provider with every Meraki resource and data source registered.
    pub fn new() -> Self {
        Self {
            resources: resources::all()
                .into_iter()
                .map(|r| (r.type_name(), r))
                .collect(),
            data_sources: data_sources::all()
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
            client: RwLock::new(None),
        }
    }

    /// A provider that is already configured with `client`.
    pub fn with_client(client: DashboardClient) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
            ..Self::new()
        }
    }

    /// Whether `configure` has succeeded.
    pub async fn is_configured(&self) -> bool {
        self.client.read().await.is_some()
    }

    async fn client(&self) -> Result<Arc<DashboardClient>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "the provider has not been configured; configure must run first".to_string(),
            )
        })
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(|d| d.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderService for MerakiProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = self
            .resources
            .iter()
            .fold(schema, |s, (name, r)| s.with_resource(*name, r.schema()));
        self.data_sources
            .iter()
            .fold(schema, |s, (name, d)| s.with_data_source(*name, d.schema()))
    }

    fn metadata(&self) -> ProviderMetadata {
        let mut resources: Vec<String> = self.resources.keys().map(|k| k.to_string()).collect();
        let mut data_sources: Vec<String> =
            self.data_sources.keys().map(|k| k.to_string()).collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            capabilities: ServerCapabilities { plan_destroy: true },
        }
    }

    #[instrument(skip(self, config))]
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diags: Diagnostics = validate(&ProviderConfig::schema(), &config).into();
        diags.extend(ProviderConfig::from_value(config)?.validate());
        Ok(diags.into_vec())
    }

    #[instrument(skip(self, config))]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let settings = match ProviderConfig::from_value(config)?.resolve() {
            Ok(settings) => settings,
            Err(diags) => {
                warn!(errors = diags.len(), "Provider configuration rejected");
                return Ok(diags.into_vec());
            }
        };
        let client = match DashboardClient::new(&settings) {
            Ok(client) => client,
            Err(err) => {
                let err = ProviderError::Configuration(err.to_string());
                return Ok(vec![error_diagnostic(&err)]);
            }
        };
        info!(
            base_url = %settings.base_url,
            max_retries = settings.retry.max_retries,
            wait_ms = settings.retry.wait_time.as_millis() as u64,
            "Configured Dashboard client"
        );
        *self.client.write().await = Some(Arc::new(client));
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Stopping provider");
        self.client.write().await.take();
        Ok(())
    }

    #[instrument(skip(self, config))]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let mut diags: Diagnostics = validate(&resource.schema(), &config).into();
        diags.extend(resource.validate(&config));
        debug!(diagnostics = diags.len(), "Validated resource config");
        Ok(diags.into_vec())
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        let plan = plan_resource(&resource.schema(), prior_state.as_ref(), &proposed_state);
        debug!(
            changes = plan.changes.len(),
            requires_replace = plan.requires_replace,
            "Planned"
        );
        Ok(plan)
    }

    #[instrument(skip(self, planned_state))]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<ApplyResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        let mut diags = Diagnostics::new();
        let state = resource.create(&client, planned_state, &mut diags).await?;
        info!(warnings = diags.len(), "Created");
        Ok(ApplyResult::new(state, diags))
    }

    #[instrument(skip(self, current_state))]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        resource.read(&client, current_state).await
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<ApplyResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        let mut diags = Diagnostics::new();
        let state = resource
            .update(&client, prior_state, planned_state, &mut diags)
            .await?;
        info!(warnings = diags.len(), "Updated");
        Ok(ApplyResult::new(state, diags))
    }

    #[instrument(skip(self, current_state))]
    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        let mut diags = Diagnostics::new();
        resource.delete(&client, current_state, &mut diags).await?;
        info!(warnings = diags.len(), "Deleted");
        Ok(diags.into_vec())
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        let seed = resource.import_state(id)?;
        let state = resource.read(&client, seed).await?;
        if state.is_null() {
            return Err(ProviderError::NotFound(format!(
                "{} with id '{}'",
                resource_type, id
            )));
        }
        info!("Imported");
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    #[instrument(skip(self, config))]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        Ok(validate(&data_source.schema(), &config))
    }

    #[instrument(skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        let client = self.client().await?;
        data_source.read(&client, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use httpmock::prelude::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_metadata_lists_everything() {
        let metadata = MerakiProvider::new().metadata();
        assert_eq!(
            metadata.resources,
            vec![
                "meraki_device",
                "meraki_network",
                "meraki_organization",
                "meraki_organization_saml",
                "meraki_organization_snmp",
                "meraki_switch_port",
                "meraki_wireless_ssid",
            ]
        );
        assert_eq!(metadata.data_sources.len(), 5);
        assert!(metadata.capabilities.plan_destroy);
    }

    #[test]
    fn test_schema_contains_provider_config() {
        let schema = MerakiProvider::new().schema();
        assert!(schema
            .provider
            .attribute("meraki_dashboard_api_key")
            .is_some_and(|a| a.flags.sensitive));
        assert!(schema.resources.contains_key("meraki_network"));
        assert!(schema.data_sources.contains_key("meraki_switch_ports"));
    }

    #[tokio::test]
    async fn test_operations_before_configure_fail() {
        let provider = MerakiProvider::new();
        assert!(!provider.is_configured().await);

        let err = provider
            .read("meraki_network", json!({"id": "N_1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));

        let err = provider
            .read_data_source("meraki_organizations", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let provider = MerakiProvider::new();
        let err = provider.create("meraki_widget", json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        let err = provider
            .validate_data_source_config("meraki_widgets", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_configure_builds_client() {
        let provider = MerakiProvider::new();
        let diags = assert_ok!(
            provider
                .configure(json!({
                    "meraki_dashboard_api_key": "abc123",
                    "meraki_base_url": "http://127.0.0.1:9",
                    "meraki_retry_4xx_error": false
                }))
                .await
        );
        assert!(diags.is_empty());
        assert!(provider.is_configured().await);

        let client = provider.client().await.unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api/v1");
        assert_eq!(client.retry_policy().max_retries, 0);

        assert_ok!(provider.stop().await);
        assert!(!provider.is_configured().await);
    }

    #[tokio::test]
    async fn test_configure_rejects_bad_values() {
        let provider = MerakiProvider::new();
        let diags = provider
            .configure(json!({
                "meraki_dashboard_api_key": "abc123",
                "meraki_maximum_retries": -1
            }))
            .await
            .unwrap();
        assert!(diags.iter().any(Diagnostic::is_error));
        assert!(!provider.is_configured().await);
    }

    #[tokio::test]
    async fn test_validate_provider_config() {
        let provider = MerakiProvider::new();
        let diags = provider
            .validate_provider_config(json!({"meraki_timeout": "soon"}))
            .await;
        // A wrongly typed field fails to deserialize.
        assert_err!(diags);

        let diags = provider
            .validate_provider_config(json!({"meraki_base_url": "not a url"}))
            .await
            .unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("meraki_base_url"));
    }

    #[tokio::test]
    async fn test_validate_resource_config_combines_checks() {
        let provider = MerakiProvider::new();
        let diags = provider
            .validate_resource_config(
                "meraki_wireless_ssid",
                json!({"network_id": "N_1", "number": 20, "auth_mode": "psk"}),
            )
            .await
            .unwrap();

        let attributes: Vec<_> = diags.iter().filter_map(|d| d.attribute.as_deref()).collect();
        assert!(attributes.contains(&"number"));
        assert!(attributes.contains(&"psk"));
    }

    #[tokio::test]
    async fn test_plan_force_new() {
        let provider = MerakiProvider::new();
        let plan = provider
            .plan(
                "meraki_switch_port",
                Some(json!({"serial": "Q2HP-AAAA-BBBB", "port_id": "1", "vlan": 10})),
                json!({"serial": "Q2HP-AAAA-BBBB", "port_id": "2", "vlan": 10}),
                Value::Null,
            )
            .await
            .unwrap();
        assert!(plan.requires_replace);
    }

    #[tokio::test]
    async fn test_import_missing_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/networks/N_missing");
                then.status(404);
            })
            .await;

        let provider = MerakiProvider::with_client(client_for(&server, 0));
        let err = provider
            .import_resource("meraki_network", "N_missing")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_import_reads_state() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/devices/Q2HP-AAAA-BBBB/switch/ports/5");
                then.status(200)
                    .json_body(json!({"portId": "5", "type": "access", "vlan": 30}));
            })
            .await;

        let provider = MerakiProvider::with_client(client_for(&server, 0));
        let imported = provider
            .import_resource("meraki_switch_port", "Q2HP-AAAA-BBBB,5")
            .await
            .unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].resource_type, "meraki_switch_port");
        assert_eq!(imported[0].state["vlan"], 30);
    }
}
