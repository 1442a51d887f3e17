//! `meraki_switch_port`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{
    call_found, call_with_warnings, decode_state, encode_state, required, split_import_id,
    Resource,
};
use crate::client::{DashboardClient, SwitchPort, SwitchPortUpdate};
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Diagnostics, Schema};

const PORT_TYPES: &[&str] = &["access", "trunk", "stack", "routed"];

const STP_GUARDS: &[&str] = &["disabled", "root guard", "bpdu guard", "loop guard"];

/// Ports on a switch. Ports always exist; delete restores the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchPortResource;

/// State of one switch port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchPortState {
    pub serial: Option<String>,
    pub port_id: Option<String>,
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub enabled: Option<bool>,
    pub poe_enabled: Option<bool>,
    #[serde(rename = "type")]
    pub port_type: Option<String>,
    pub vlan: Option<i64>,
    pub voice_vlan: Option<i64>,
    pub allowed_vlans: Option<String>,
    pub isolation_enabled: Option<bool>,
    pub rstp_enabled: Option<bool>,
    pub stp_guard: Option<String>,
    pub link_negotiation: Option<String>,
    pub access_policy_type: Option<String>,
}

impl SwitchPortState {
    pub(crate) fn from_api(serial: &str, port: SwitchPort) -> Self {
        Self {
            serial: Some(serial.to_string()),
            port_id: Some(port.port_id),
            name: port.name,
            tags: Some(port.tags),
            enabled: port.enabled,
            poe_enabled: port.poe_enabled,
            port_type: port.port_type,
            vlan: port.vlan,
            voice_vlan: port.voice_vlan,
            allowed_vlans: port.allowed_vlans,
            isolation_enabled: port.isolation_enabled,
            rstp_enabled: port.rstp_enabled,
            stp_guard: port.stp_guard,
            link_negotiation: port.link_negotiation,
            access_policy_type: port.access_policy_type,
        }
    }
}

impl From<&SwitchPortState> for SwitchPortUpdate {
    fn from(state: &SwitchPortState) -> Self {
        Self {
            name: state.name.clone(),
            tags: state.tags.clone(),
            enabled: state.enabled,
            poe_enabled: state.poe_enabled,
            port_type: state.port_type.clone(),
            vlan: state.vlan,
            voice_vlan: state.voice_vlan,
            allowed_vlans: state.allowed_vlans.clone(),
            isolation_enabled: state.isolation_enabled,
            rstp_enabled: state.rstp_enabled,
            stp_guard: state.stp_guard.clone(),
            link_negotiation: state.link_negotiation.clone(),
        }
    }
}

/// Body that returns a port to its factory settings.
pub fn reset_body() -> SwitchPortUpdate {
    SwitchPortUpdate {
        name: Some(String::new()),
        tags: Some(Vec::new()),
        enabled: Some(true),
        poe_enabled: Some(true),
        port_type: Some("access".to_string()),
        vlan: Some(1),
        ..Default::default()
    }
}

impl SwitchPortResource {
    async fn apply(
        &self,
        client: &DashboardClient,
        state: &SwitchPortState,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let serial = required(&state.serial, "serial")?;
        let port_id = required(&state.port_id, "port_id")?;
        let body = SwitchPortUpdate::from(state);
        let port = call_with_warnings(client, "UpdateDeviceSwitchPort", diags, || {
            client.update_device_switch_port(serial, port_id, &body)
        })
        .await?;
        encode_state(&SwitchPortState::from_api(serial, port))
    }
}

#[async_trait::async_trait]
impl Resource for SwitchPortResource {
    fn type_name(&self) -> &'static str {
        "meraki_switch_port"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A port on a Meraki switch.")
            .with_attribute("serial", Attribute::required_string().with_force_new())
            .with_attribute("port_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::optional_computed_string())
            .with_attribute("tags", Attribute::optional_computed_string_list())
            .with_attribute("enabled", Attribute::optional_computed_bool())
            .with_attribute("poe_enabled", Attribute::optional_computed_bool())
            .with_attribute(
                "type",
                Attribute::optional_computed_string().with_one_of(PORT_TYPES.iter().copied()),
            )
            .with_attribute(
                "vlan",
                Attribute::optional_computed_int64().with_int_range(1, 4094),
            )
            .with_attribute(
                "voice_vlan",
                Attribute::optional_computed_int64().with_int_range(1, 4094),
            )
            .with_attribute(
                "allowed_vlans",
                Attribute::optional_computed_string()
                    .with_description("VLANs allowed on a trunk, e.g. \"1,3,5-10\" or \"all\""),
            )
            .with_attribute("isolation_enabled", Attribute::optional_computed_bool())
            .with_attribute("rstp_enabled", Attribute::optional_computed_bool())
            .with_attribute(
                "stp_guard",
                Attribute::optional_computed_string().with_one_of(STP_GUARDS.iter().copied()),
            )
            .with_attribute("link_negotiation", Attribute::optional_computed_string())
            .with_attribute("access_policy_type", Attribute::computed_string())
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let port_type = config.get("type").and_then(Value::as_str);
        let is_set = |name: &str| config.get(name).is_some_and(|v| !v.is_null());

        if is_set("voice_vlan") && port_type.is_some_and(|t| t != "access") {
            diags.push(
                Diagnostic::error("voice_vlan is only valid on access ports")
                    .with_attribute("voice_vlan"),
            );
        }
        if is_set("allowed_vlans") && port_type.is_some_and(|t| t != "trunk") {
            diags.push(
                Diagnostic::error("allowed_vlans is only valid on trunk ports")
                    .with_attribute("allowed_vlans"),
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
        let state: SwitchPortState = decode_state(planned)?;
        let value = self.apply(client, &state, diags).await?;
        info!(serial = ?state.serial, port_id = ?state.port_id, "Configured switch port");
        Ok(value)
    }

    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError> {
        let state: SwitchPortState = decode_state(current)?;
        let serial = required(&state.serial, "serial")?;
        let port_id = required(&state.port_id, "port_id")?;
        match call_found(client, "GetDeviceSwitchPort", || {
            client.get_device_switch_port(serial, port_id)
        })
        .await?
        {
            Some(port) => encode_state(&SwitchPortState::from_api(serial, port)),
            None => {
                debug!(serial, port_id, "Switch port no longer exists");
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
        let state: SwitchPortState = decode_state(planned)?;
        self.apply(client, &state, diags).await
    }

    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let state: SwitchPortState = decode_state(current)?;
        let serial = required(&state.serial, "serial")?;
        let port_id = required(&state.port_id, "port_id")?;
        let body = reset_body();
        call_with_warnings(client, "UpdateDeviceSwitchPort", diags, || {
            client.update_device_switch_port(serial, port_id, &body)
        })
        .await?;
        info!(serial, port_id, "Reset switch port to defaults");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        let parts = split_import_id(id, &["serial", "portId"])?;
        Ok(json!({ "serial": parts[0], "port_id": parts[1] }))
    }
}
