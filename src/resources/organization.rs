//! `meraki_organization`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{call, call_found, decode_state, encode_state, required, Resource};
use crate::client::{
    DashboardClient, ManagementDetail, Organization, OrganizationApi, OrganizationCreate,
    OrganizationManagement, OrganizationUpdate,
};
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostics, Schema};

/// Dashboard organizations.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationResource;

/// State of one organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationState {
    /// Organization id.
    pub id: Option<String>,
    /// Organization name.
    pub name: String,
    /// Whether Dashboard API access is enabled.
    pub api_enabled: Option<bool>,
    /// Management details keyed by name.
    pub management_details: Option<BTreeMap<String, String>>,
    /// Dashboard URL of the organization.
    pub url: Option<String>,
    /// Licensing model (`co-term`, `per-device`, `subscription`).
    pub licensing_model: Option<String>,
    /// Cloud region hosting the organization.
    pub cloud_region_name: Option<String>,
}

impl OrganizationState {
    pub(crate) fn from_api(org: Organization) -> Self {
        let details: BTreeMap<String, String> = org
            .management
            .map(|m| m.details.into_iter().map(|d| (d.name, d.value)).collect())
            .unwrap_or_default();
        Self {
            id: Some(org.id),
            name: org.name,
            api_enabled: org.api.map(|a| a.enabled),
            management_details: (!details.is_empty()).then_some(details),
            url: org.url,
            licensing_model: org.licensing.and_then(|l| l.model),
            cloud_region_name: org.cloud.and_then(|c| c.region).and_then(|r| r.name),
        }
    }

    fn management(&self) -> Option<OrganizationManagement> {
        self.management_details
            .as_ref()
            .map(|details| OrganizationManagement {
                details: details
                    .iter()
                    .map(|(name, value)| ManagementDetail {
                        name: name.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            })
    }
}

impl From<&OrganizationState> for OrganizationCreate {
    fn from(state: &OrganizationState) -> Self {
        Self {
            name: state.name.clone(),
            management: state.management(),
        }
    }
}

impl From<&OrganizationState> for OrganizationUpdate {
    fn from(state: &OrganizationState) -> Self {
        Self {
            name: Some(state.name.clone()),
            api: state.api_enabled.map(|enabled| OrganizationApi { enabled }),
            management: state.management(),
        }
    }
}

#[async_trait::async_trait]
impl Resource for OrganizationResource {
    fn type_name(&self) -> &'static str {
        "meraki_organization"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A Dashboard organization.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Organization name"),
            )
            .with_attribute(
                "api_enabled",
                Attribute::optional_computed_bool()
                    .with_description("Enable Dashboard API access for the organization"),
            )
            .with_attribute(
                "management_details",
                Attribute::new(
                    AttributeType::map(AttributeType::String),
                    AttributeFlags::optional_computed(),
                )
                .with_description("Management details (for example MSP ID) keyed by name"),
            )
            .with_attribute("url", Attribute::computed_string())
            .with_attribute("licensing_model", Attribute::computed_string())
            .with_attribute("cloud_region_name", Attribute::computed_string())
    }

    async fn create(
        &self,
        client: &DashboardClient,
        planned: Value,
        _diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: OrganizationState = decode_state(planned)?;
        let body = OrganizationCreate::from(&state);
        let created = call(client, "CreateOrganization", || {
            client.create_organization(&body)
        })
        .await?;
        info!(organization_id = %created.id, "Created organization");

        // API access can only be toggled on an existing organization.
        let org = match state.api_enabled {
            Some(enabled) if created.api.as_ref().map(|a| a.enabled) != Some(enabled) => {
                let update = OrganizationUpdate {
                    api: Some(OrganizationApi { enabled }),
                    ..Default::default()
                };
                call(client, "UpdateOrganization", || {
                    client.update_organization(&created.id, &update)
                })
                .await?
            }
            _ => created,
        };
        encode_state(&OrganizationState::from_api(org))
    }

    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError> {
        let state: OrganizationState = decode_state(current)?;
        let id = required(&state.id, "id")?;
        match call_found(client, "GetOrganization", || client.get_organization(id)).await? {
            Some(org) => encode_state(&OrganizationState::from_api(org)),
            None => {
                debug!(organization_id = id, "Organization no longer exists");
                Ok(Value::Null)
            }
        }
    }

    async fn update(
        &self,
        client: &DashboardClient,
        prior: Value,
        planned: Value,
        _diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let prior: OrganizationState = decode_state(prior)?;
        let state: OrganizationState = decode_state(planned)?;
        let id = required(&prior.id, "id")?;
        let body = OrganizationUpdate::from(&state);
        let org = call(client, "UpdateOrganization", || {
            client.update_organization(id, &body)
        })
        .await?;
        encode_state(&OrganizationState::from_api(org))
    }

    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        _diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let state: OrganizationState = decode_state(current)?;
        let id = required(&state.id, "id")?;
        call(client, "DeleteOrganization", || client.delete_organization(id)).await?;
        info!(organization_id = id, "Deleted organization");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        Ok(json!({ "id": id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use httpmock::prelude::*;

    fn org_body() -> Value {
        json!({
            "id": "2930418",
            "name": "Acme",
            "url": "https://n1.meraki.com/o/abc/manage/organization/overview",
            "api": {"enabled": false},
            "licensing": {"model": "co-term"},
            "cloud": {"region": {"name": "North America"}},
            "management": {"details": [{"name": "MSP ID", "value": "123"}]}
        })
    }

    #[tokio::test]
    async fn test_create_maps_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/organizations").json_body(json!({
                    "name": "Acme",
                    "management": {"details": [{"name": "MSP ID", "value": "123"}]}
                }));
                then.status(201).json_body(org_body());
            })
            .await;

        let client = client_for(&server, 0);
        let state = OrganizationResource
            .create(
                &client,
                json!({"name": "Acme", "management_details": {"MSP ID": "123"}}),
                &mut Diagnostics::new(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(state["id"], "2930418");
        assert_eq!(state["licensing_model"], "co-term");
        assert_eq!(state["cloud_region_name"], "North America");
        assert_eq!(state["management_details"]["MSP ID"], "123");
    }

    #[tokio::test]
    async fn test_create_enables_api_afterwards() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/organizations");
                then.status(201).json_body(org_body());
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/organizations/2930418")
                    .json_body(json!({"api": {"enabled": true}}));
                then.status(200).json_body(json!({
                    "id": "2930418",
                    "name": "Acme",
                    "api": {"enabled": true}
                }));
            })
            .await;

        let client = client_for(&server, 0);
        let state = OrganizationResource
            .create(&client, json!({"name": "Acme", "api_enabled": true}), &mut Diagnostics::new())
            .await
            .unwrap();

        update.assert_async().await;
        assert_eq!(state["api_enabled"], true);
    }

    #[tokio::test]
    async fn test_read_missing_is_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations/404");
                then.status(404);
            })
            .await;

        let client = client_for(&server, 0);
        let state = OrganizationResource
            .read(&client, json!({"id": "404", "name": "Gone"}))
            .await
            .unwrap();
        assert!(state.is_null());
    }

    #[tokio::test]
    async fn test_delete() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/organizations/2930418");
                then.status(204);
            })
            .await;

        let client = client_for(&server, 0);
        OrganizationResource
            .delete(&client, json!({"id": "2930418", "name": "Acme"}), &mut Diagnostics::new())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_read_without_id_is_validation_error() {
        let state: OrganizationState = decode_state(json!({"name": "Acme"})).unwrap();
        assert!(matches!(
            required(&state.id, "id"),
            Err(ProviderError::Validation(_))
        ));
    }
}
