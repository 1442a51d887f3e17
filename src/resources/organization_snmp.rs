//! `meraki_organization_snmp`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{call_found, call_with_warnings, decode_state, encode_state, required, Resource};
use crate::client::{DashboardClient, Snmp, SnmpUpdate};
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostic, Diagnostics, Schema};

const MIN_PASS_LEN: usize = 8;

/// Organization-wide SNMP settings. Delete disables SNMP.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationSnmpResource;

/// State of an organization's SNMP settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpState {
    pub organization_id: Option<String>,
    pub v2c_enabled: Option<bool>,
    pub v3_enabled: Option<bool>,
    pub v3_auth_mode: Option<String>,
    pub v3_auth_pass: Option<String>,
    pub v3_priv_mode: Option<String>,
    pub v3_priv_pass: Option<String>,
    pub peer_ips: Option<Vec<String>>,
    pub hostname: Option<String>,
    pub port: Option<i64>,
    pub v2_community_string: Option<String>,
    pub v3_user: Option<String>,
}

impl SnmpState {
    /// The passphrases are write-only and kept from `planned`.
    pub(crate) fn from_api(organization_id: &str, snmp: Snmp, planned: &SnmpState) -> Self {
        Self {
            organization_id: Some(organization_id.to_string()),
            v2c_enabled: snmp.v2c_enabled,
            v3_enabled: snmp.v3_enabled,
            v3_auth_mode: snmp.v3_auth_mode,
            v3_auth_pass: planned.v3_auth_pass.clone(),
            v3_priv_mode: snmp.v3_priv_mode,
            v3_priv_pass: planned.v3_priv_pass.clone(),
            peer_ips: snmp.peer_ips,
            hostname: snmp.hostname,
            port: snmp.port,
            v2_community_string: snmp.v2_community_string,
            v3_user: snmp.v3_user,
        }
    }
}

impl From<&SnmpState> for SnmpUpdate {
    fn from(state: &SnmpState) -> Self {
        Self {
            v2c_enabled: state.v2c_enabled,
            v3_enabled: state.v3_enabled,
            v3_auth_mode: state.v3_auth_mode.clone(),
            v3_auth_pass: state.v3_auth_pass.clone(),
            v3_priv_mode: state.v3_priv_mode.clone(),
            v3_priv_pass: state.v3_priv_pass.clone(),
            peer_ips: state.peer_ips.clone(),
        }
    }
}

impl OrganizationSnmpResource {
    async fn apply(
        &self,
        client: &DashboardClient,
        state: &SnmpState,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let organization_id = required(&state.organization_id, "organization_id")?;
        let body = SnmpUpdate::from(state);
        let snmp = call_with_warnings(client, "UpdateOrganizationSnmp", diags, || {
            client.update_organization_snmp(organization_id, &body)
        })
        .await?;
        encode_state(&SnmpState::from_api(organization_id, snmp, state))
    }
}

#[async_trait::async_trait]
impl Resource for OrganizationSnmpResource {
    fn type_name(&self) -> &'static str {
        "meraki_organization_snmp"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("SNMP settings of an organization.")
            .with_attribute(
                "organization_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("v2c_enabled", Attribute::optional_computed_bool())
            .with_attribute("v3_enabled", Attribute::optional_computed_bool())
            .with_attribute(
                "v3_auth_mode",
                Attribute::optional_computed_string().with_one_of(["MD5", "SHA"]),
            )
            .with_attribute("v3_auth_pass", Attribute::optional_string().sensitive())
            .with_attribute(
                "v3_priv_mode",
                Attribute::optional_computed_string().with_one_of(["DES", "AES128"]),
            )
            .with_attribute("v3_priv_pass", Attribute::optional_string().sensitive())
            .with_attribute(
                "peer_ips",
                Attribute::optional_computed_string_list()
                    .with_description("IPv4 addresses allowed to poll SNMP v3"),
            )
            .with_attribute("hostname", Attribute::computed_string())
            .with_attribute(
                "port",
                Attribute::new(AttributeType::Int64, AttributeFlags::computed())
                    .with_description("SNMP port"),
            )
            .with_attribute(
                "v2_community_string",
                Attribute::computed_string().sensitive(),
            )
            .with_attribute("v3_user", Attribute::computed_string())
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        for name in ["v3_auth_pass", "v3_priv_pass"] {
            if let Some(pass) = config.get(name).and_then(Value::as_str) {
                if pass.chars().count() < MIN_PASS_LEN {
                    diags.push(
                        Diagnostic::error(format!(
                            "{} must be at least {} characters",
                            name, MIN_PASS_LEN
                        ))
                        .with_attribute(name),
                    );
                }
            }
        }
        if config.get("v3_enabled").and_then(Value::as_bool) == Some(true)
            && config.get("v3_auth_pass").map_or(true, Value::is_null)
        {
            diags.push(
                Diagnostic::warning("SNMP v3 is enabled without v3_auth_pass")
                    .with_detail("The Dashboard keeps any passphrase set earlier")
                    .with_attribute("v3_auth_pass"),
            );
        }
        diags
    }

    async fn create(
        &self,
        client: &DashboardClient,
        planned: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: SnmpState = decode_state(planned)?;
        let value = self.apply(client, &state, diags).await?;
        info!(organization_id = ?state.organization_id, "Configured organization SNMP");
        Ok(value)
    }

    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError> {
        let state: SnmpState = decode_state(current)?;
        let organization_id = required(&state.organization_id, "organization_id")?;
        match call_found(client, "GetOrganizationSnmp", || {
            client.get_organization_snmp(organization_id)
        })
        .await?
        {
            Some(snmp) => encode_state(&SnmpState::from_api(organization_id, snmp, &state)),
            None => {
                debug!(organization_id, "Organization no longer exists");
                Ok(Value::Null)
            }
        }
    }

    async fn update(
        &self,
        client: &DashboardClient,
        _prior: Value,
        planned: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: SnmpState = decode_state(planned)?;
        self.apply(client, &state, diags).await
    }

    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let state: SnmpState = decode_state(current)?;
        let organization_id = required(&state.organization_id, "organization_id")?;
        let body = SnmpUpdate {
            v2c_enabled: Some(false),
            v3_enabled: Some(false),
            ..Default::default()
        };
        call_with_warnings(client, "UpdateOrganizationSnmp", diags, || {
            client.update_organization_snmp(organization_id, &body)
        })
        .await?;
        info!(organization_id, "Disabled organization SNMP");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        Ok(json!({ "organization_id": id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_read_preserves_passphrases() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations/1/snmp");
                then.status(200).json_body(json!({
                    "v2cEnabled": false,
                    "v3Enabled": true,
                    "v3AuthMode": "SHA",
                    "v3PrivMode": "AES128",
                    "peerIps": ["10.0.0.1"],
                    "hostname": "snmp.meraki.com",
                    "port": 16100,
                    "v3User": "o/abc"
                }));
            })
            .await;

        let client = client_for(&server, 0);
        let state = OrganizationSnmpResource
            .read(
                &client,
                json!({
                    "organization_id": "1",
                    "v3_auth_pass": "auth-secret",
                    "v3_priv_pass": "priv-secret"
                }),
            )
            .await
            .unwrap();

        assert_eq!(state["v3_auth_pass"], "auth-secret");
        assert_eq!(state["v3_priv_pass"], "priv-secret");
        assert_eq!(state["port"], 16100);
        assert_eq!(state["peer_ips"], json!(["10.0.0.1"]));
    }

    #[tokio::test]
    async fn test_delete_disables_both_versions() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/organizations/1/snmp")
                    .json_body(json!({"v2cEnabled": false, "v3Enabled": false}));
                then.status(200)
                    .json_body(json!({"v2cEnabled": false, "v3Enabled": false}));
            })
            .await;

        let client = client_for(&server, 0);
        OrganizationSnmpResource
            .delete(&client, json!({"organization_id": "1", "v3_enabled": true}), &mut Diagnostics::new())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_short_passphrase_rejected() {
        let diags = OrganizationSnmpResource.validate(&json!({
            "v3_enabled": true,
            "v3_auth_pass": "short",
            "v3_priv_pass": "long-enough"
        }));
        assert!(diags.has_errors());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_secrets_are_sensitive() {
        let schema = OrganizationSnmpResource.schema();
        for name in ["v2_community_string", "v3_auth_pass", "v3_priv_pass"] {
            assert!(
                schema.attribute(name).is_some_and(|a| a.flags.sensitive),
                "{} should be sensitive",
                name
            );
        }

        let crate::schema::AttributeType::Object(fields) = crate::resources::object_type(&schema)
        else {
            panic!("expected an object type");
        };
        assert!(!fields.contains_key("v2_community_string"));
        assert!(fields.contains_key("hostname"));
    }
}
