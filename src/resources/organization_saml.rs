//! `meraki_organization_saml`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{call_found, call_with_warnings, decode_state, encode_state, required, Resource};
use crate::client::{DashboardClient, Saml, SamlUpdate};
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostics, Schema};

/// Organization SAML SSO toggle. Delete turns SAML off.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationSamlResource;

/// State of an organization's SAML setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamlState {
    pub organization_id: Option<String>,
    pub enabled: Option<bool>,
}

impl SamlState {
    pub(crate) fn from_api(organization_id: &str, saml: Saml) -> Self {
        Self {
            organization_id: Some(organization_id.to_string()),
            enabled: Some(saml.enabled),
        }
    }
}

impl From<&SamlState> for SamlUpdate {
    fn from(state: &SamlState) -> Self {
        Self {
            enabled: state.enabled.unwrap_or(false),
        }
    }
}

impl OrganizationSamlResource {
    async fn apply(
        &self,
        client: &DashboardClient,
        state: &SamlState,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let organization_id = required(&state.organization_id, "organization_id")?;
        let body = SamlUpdate::from(state);
        let saml = call_with_warnings(client, "UpdateOrganizationSaml", diags, || {
            client.update_organization_saml(organization_id, &body)
        })
        .await?;
        encode_state(&SamlState::from_api(organization_id, saml))
    }
}

#[async_trait::async_trait]
impl Resource for OrganizationSamlResource {
    fn type_name(&self) -> &'static str {
        "meraki_organization_saml"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("SAML single sign-on for an organization.")
            .with_attribute(
                "organization_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute(
                "enabled",
                Attribute::optional_computed_bool().with_default(json!(false)),
            )
    }

    async fn create(
        &self,
        client: &DashboardClient,
        planned: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: SamlState = decode_state(planned)?;
        let value = self.apply(client, &state, diags).await?;
        info!(organization_id = ?state.organization_id, enabled = ?state.enabled, "Configured organization SAML");
        Ok(value)
    }

    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError> {
        let state: SamlState = decode_state(current)?;
        let organization_id = required(&state.organization_id, "organization_id")?;
        match call_found(client, "GetOrganizationSaml", || {
            client.get_organization_saml(organization_id)
        })
        .await?
        {
            Some(saml) => encode_state(&SamlState::from_api(organization_id, saml)),
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
        let state: SamlState = decode_state(planned)?;
        self.apply(client, &state, diags).await
    }

    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let state: SamlState = decode_state(current)?;
        let organization_id = required(&state.organization_id, "organization_id")?;
        let body = SamlUpdate { enabled: false };
        call_with_warnings(client, "UpdateOrganizationSaml", diags, || {
            client.update_organization_saml(organization_id, &body)
        })
        .await?;
        info!(organization_id, "Disabled organization SAML");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        Ok(json!({ "organization_id": id }))
    }
}
