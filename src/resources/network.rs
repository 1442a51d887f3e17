//! `meraki_network`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{call, call_found, decode_state, encode_state, required, Resource};
use crate::client::{DashboardClient, Network, NetworkCreate, NetworkUpdate};
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostic, Diagnostics, Schema};

/// Product types a network can combine.
pub const PRODUCT_TYPES: &[&str] = &[
    "appliance",
    "camera",
    "campusGateway",
    "cellularGateway",
    "secureConnect",
    "sensor",
    "switch",
    "systemsManager",
    "wireless",
    "wirelessController",
];

/// Networks inside an organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkResource;

/// State of one network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkState {
    pub id: Option<String>,
    pub organization_id: Option<String>,
    pub name: String,
    pub product_types: Vec<String>,
    pub time_zone: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub enrollment_string: Option<String>,
    pub url: Option<String>,
    pub is_bound_to_config_template: Option<bool>,
}

impl NetworkState {
    pub(crate) fn from_api(network: Network) -> Self {
        Self {
            id: Some(network.id),
            organization_id: Some(network.organization_id),
            name: network.name,
            product_types: network.product_types,
            time_zone: network.time_zone,
            tags: Some(network.tags),
            notes: network.notes,
            enrollment_string: network.enrollment_string,
            url: network.url,
            is_bound_to_config_template: network.is_bound_to_config_template,
        }
    }
}

impl From<&NetworkState> for NetworkCreate {
    fn from(state: &NetworkState) -> Self {
        Self {
            name: state.name.clone(),
            product_types: state.product_types.clone(),
            tags: state.tags.clone(),
            time_zone: state.time_zone.clone(),
            notes: state.notes.clone(),
        }
    }
}

impl From<&NetworkState> for NetworkUpdate {
    fn from(state: &NetworkState) -> Self {
        Self {
            name: Some(state.name.clone()),
            tags: state.tags.clone(),
            time_zone: state.time_zone.clone(),
            enrollment_string: state.enrollment_string.clone(),
            notes: state.notes.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Resource for NetworkResource {
    fn type_name(&self) -> &'static str {
        "meraki_network"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A network inside an organization.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "organization_id",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Organization the network belongs to"),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "product_types",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::required(),
                )
                .with_force_new()
                .with_description("Product types combined in the network"),
            )
            .with_attribute(
                "time_zone",
                Attribute::optional_computed_string()
                    .with_description("IANA time zone, e.g. America/Los_Angeles"),
            )
            .with_attribute("tags", Attribute::optional_computed_string_list())
            .with_attribute("notes", Attribute::optional_computed_string())
            .with_attribute("enrollment_string", Attribute::optional_computed_string())
            .with_attribute("url", Attribute::computed_string())
            .with_attribute("is_bound_to_config_template", Attribute::computed_bool())
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(types) = config.get("product_types").and_then(Value::as_array) else {
            return diags;
        };
        if types.is_empty() {
            diags.push(
                Diagnostic::error("A network needs at least one product type")
                    .with_attribute("product_types"),
            );
        }
        for value in types.iter().filter_map(Value::as_str) {
            if !PRODUCT_TYPES.contains(&value) {
                diags.push(
                    Diagnostic::error(format!("Unknown product type \"{}\"", value))
                        .with_detail(format!("Expected one of [{}]", PRODUCT_TYPES.join(", ")))
                        .with_attribute("product_types"),
                );
            }
        }
        diags
    }

    async fn create(
        &self,
        client: &DashboardClient,
        planned: Value,
        _diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: NetworkState = decode_state(planned)?;
        let organization_id = required(&state.organization_id, "organization_id")?;
        let body = NetworkCreate::from(&state);
        let network = call(client, "CreateOrganizationNetwork", || {
            client.create_organization_network(organization_id, &body)
        })
        .await?;
        info!(network_id = %network.id, organization_id, "Created network");
        encode_state(&NetworkState::from_api(network))
    }

    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError> {
        let state: NetworkState = decode_state(current)?;
        let id = required(&state.id, "id")?;
        match call_found(client, "GetNetwork", || client.get_network(id)).await? {
            Some(network) => encode_state(&NetworkState::from_api(network)),
            None => {
                debug!(network_id = id, "Network no longer exists");
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
        let prior: NetworkState = decode_state(prior)?;
        let state: NetworkState = decode_state(planned)?;
        let id = required(&prior.id, "id")?;
        let body = NetworkUpdate::from(&state);
        let network = call(client, "UpdateNetwork", || client.update_network(id, &body)).await?;
        encode_state(&NetworkState::from_api(network))
    }

    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        _diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let state: NetworkState = decode_state(current)?;
        let id = required(&state.id, "id")?;
        call(client, "DeleteNetwork", || client.delete_network(id)).await?;
        info!(network_id = id, "Deleted network");
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
    use crate::plan::plan_resource;
    use httpmock::prelude::*;

    fn network_body(name: &str) -> Value {
        json!({
            "id": "N_24329156",
            "organizationId": "2930418",
            "name": name,
            "productTypes": ["appliance", "switch"],
            "timeZone": "America/Los_Angeles",
            "tags": ["tag1"],
            "enrollmentString": null,
            "url": "https://n1.meraki.com//n/manage/nodes/list",
            "notes": "Main office",
            "isBoundToConfigTemplate": false
        })
    }

    #[tokio::test]
    async fn test_create() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/organizations/2930418/networks")
                    .json_body(json!({
                        "name": "HQ",
                        "productTypes": ["appliance", "switch"],
                        "tags": ["tag1"],
                        "timeZone": "America/Los_Angeles"
                    }));
                then.status(201).json_body(network_body("HQ"));
            })
            .await;

        let client = client_for(&server, 0);
        let state = NetworkResource
            .create(
                &client,
                json!({
                    "organization_id": "2930418",
                    "name": "HQ",
                    "product_types": ["appliance", "switch"],
                    "tags": ["tag1"],
                    "time_zone": "America/Los_Angeles"
                }),
                &mut Diagnostics::new(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(state["id"], "N_24329156");
        assert_eq!(state["notes"], "Main office");
        assert_eq!(state["is_bound_to_config_template"], false);
    }

    #[tokio::test]
    async fn test_update_uses_prior_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/networks/N_24329156")
                    .json_body_partial(r#"{"name": "HQ West"}"#);
                then.status(200).json_body(network_body("HQ West"));
            })
            .await;

        let client = client_for(&server, 0);
        let prior = NetworkState::from_api(
            serde_json::from_value(network_body("HQ")).unwrap(),
        );
        let mut planned = prior.clone();
        planned.name = "HQ West".into();

        let state = NetworkResource
            .update(
                &client,
                serde_json::to_value(&prior).unwrap(),
                serde_json::to_value(&planned).unwrap(),
                &mut Diagnostics::new(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(state["name"], "HQ West");
    }

    #[tokio::test]
    async fn test_update_rejected_reports_dashboard_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/v1/networks/N_1");
                then.status(400)
                    .json_body(json!({"errors": ["Time zone is not valid"]}));
            })
            .await;

        let client = client_for(&server, 1);
        let err = NetworkResource
            .update(
                &client,
                json!({"id": "N_1", "name": "HQ", "product_types": ["switch"]}),
                json!({"name": "HQ", "product_types": ["switch"], "time_zone": "Mars/Olympus"}),
                &mut Diagnostics::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InvalidRequest(_)));
        assert_eq!(
            err.message(),
            "Failure when executing UpdateNetwork: HTTP 400: Time zone is not valid"
        );
    }

    #[test]
    fn test_validate_product_types() {
        let diags = NetworkResource.validate(&json!({"product_types": ["switch", "toaster"]}));
        assert_eq!(diags.len(), 1);
        assert!(diags.has_errors());

        let diags = NetworkResource.validate(&json!({"product_types": []}));
        assert!(diags.has_errors());

        assert!(NetworkResource
            .validate(&json!({"product_types": ["wireless"]}))
            .is_empty());
    }

    #[test]
    fn test_moving_organization_requires_replace() {
        let schema = NetworkResource.schema();
        let prior = json!({
            "id": "N_1",
            "organization_id": "1",
            "name": "HQ",
            "product_types": ["switch"]
        });
        let proposed = json!({
            "organization_id": "2",
            "name": "HQ",
            "product_types": ["switch"]
        });

        let plan = plan_resource(&schema, Some(&prior), &proposed);
        assert!(plan.requires_replace);
        assert_eq!(plan.planned_state["id"], "N_1");
    }
}
