//! `meraki_wireless_ssid`
//!
//! SSID slots always exist, so create is an update of the slot and delete
//! puts it back to the Dashboard's factory settings.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{
    call_found, call_with_warnings, decode_state, encode_state, required, split_import_id,
    Resource,
};
use crate::client::{DashboardClient, Ssid, SsidUpdate};
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Diagnostics, Schema};

/// Highest SSID slot number.
pub const MAX_SSID_NUMBER: i64 = 14;

const AUTH_MODES: &[&str] = &[
    "open",
    "open-enhanced",
    "psk",
    "open-with-radius",
    "open-with-nac",
    "8021x-meraki",
    "8021x-nac",
    "8021x-radius",
    "8021x-google",
    "8021x-entra",
    "8021x-localradius",
    "ipsk-with-radius",
    "ipsk-without-radius",
    "ipsk-with-nac",
];

const ENCRYPTION_MODES: &[&str] = &["wep", "wpa", "wpa-eap"];

const WPA_ENCRYPTION_MODES: &[&str] = &[
    "WPA1 only",
    "WPA1 and WPA2",
    "WPA2 only",
    "WPA3 Transition Mode",
    "WPA3 only",
    "WPA3 192-bit Security",
];

const IP_ASSIGNMENT_MODES: &[&str] = &[
    "NAT mode",
    "Bridge mode",
    "Layer 3 roaming",
    "Ethernet over GRE",
    "Layer 3 roaming with a concentrator",
    "VPN",
];

const BAND_SELECTIONS: &[&str] = &[
    "Dual band operation",
    "5 GHz band only",
    "Dual band operation with Band Steering",
];

/// Wireless SSID slots of a network.
#[derive(Debug, Clone, Copy, Default)]
pub struct WirelessSsidResource;

/// State of one SSID slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsidState {
    pub network_id: Option<String>,
    pub number: i64,
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub auth_mode: Option<String>,
    pub psk: Option<String>,
    pub encryption_mode: Option<String>,
    pub wpa_encryption_mode: Option<String>,
    pub ip_assignment_mode: Option<String>,
    pub splash_page: Option<String>,
    pub visible: Option<bool>,
    pub available_on_all_aps: Option<bool>,
    pub band_selection: Option<String>,
    pub per_client_bandwidth_limit_up: Option<i64>,
    pub per_client_bandwidth_limit_down: Option<i64>,
}

impl SsidState {
    /// The Dashboard never returns the PSK; it is kept from `planned`.
    pub(crate) fn from_api(network_id: &str, ssid: Ssid, planned: &SsidState) -> Self {
        Self {
            network_id: Some(network_id.to_string()),
            number: ssid.number,
            name: Some(ssid.name),
            enabled: Some(ssid.enabled),
            auth_mode: ssid.auth_mode,
            psk: planned.psk.clone(),
            encryption_mode: ssid.encryption_mode,
            wpa_encryption_mode: ssid.wpa_encryption_mode,
            ip_assignment_mode: ssid.ip_assignment_mode,
            splash_page: ssid.splash_page,
            visible: ssid.visible,
            available_on_all_aps: ssid.available_on_all_aps,
            band_selection: ssid.band_selection,
            per_client_bandwidth_limit_up: ssid.per_client_bandwidth_limit_up,
            per_client_bandwidth_limit_down: ssid.per_client_bandwidth_limit_down,
        }
    }
}

impl From<&SsidState> for SsidUpdate {
    fn from(state: &SsidState) -> Self {
        Self {
            name: state.name.clone(),
            enabled: state.enabled,
            auth_mode: state.auth_mode.clone(),
            psk: state.psk.clone(),
            encryption_mode: state.encryption_mode.clone(),
            wpa_encryption_mode: state.wpa_encryption_mode.clone(),
            ip_assignment_mode: state.ip_assignment_mode.clone(),
            splash_page: state.splash_page.clone(),
            visible: state.visible,
            available_on_all_aps: state.available_on_all_aps,
            band_selection: state.band_selection.clone(),
            per_client_bandwidth_limit_up: state.per_client_bandwidth_limit_up,
            per_client_bandwidth_limit_down: state.per_client_bandwidth_limit_down,
        }
    }
}

/// Body that returns slot `number` to its factory settings.
pub fn reset_body(number: i64) -> SsidUpdate {
    SsidUpdate {
        name: Some(format!("Unconfigured SSID {}", number + 1)),
        enabled: Some(false),
        auth_mode: Some("open".to_string()),
        ..Default::default()
    }
}

impl WirelessSsidResource {
    async fn apply(
        &self,
        client: &DashboardClient,
        state: &SsidState,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let network_id = required(&state.network_id, "network_id")?;
        let body = SsidUpdate::from(state);
        let ssid = call_with_warnings(client, "UpdateNetworkWirelessSsid", diags, || {
            client.update_network_wireless_ssid(network_id, state.number, &body)
        })
        .await?;
        encode_state(&SsidState::from_api(network_id, ssid, state))
    }
}

#[async_trait::async_trait]
impl Resource for WirelessSsidResource {
    fn type_name(&self) -> &'static str {
        "meraki_wireless_ssid"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("One of the 15 SSID slots of a wireless network.")
            .with_attribute("network_id", Attribute::required_string().with_force_new())
            .with_attribute(
                "number",
                Attribute::required_int64()
                    .with_force_new()
                    .with_int_range(0, MAX_SSID_NUMBER)
                    .with_description("SSID slot, 0 through 14"),
            )
            .with_attribute("name", Attribute::optional_computed_string())
            .with_attribute("enabled", Attribute::optional_computed_bool())
            .with_attribute(
                "auth_mode",
                Attribute::optional_computed_string().with_one_of(AUTH_MODES.iter().copied()),
            )
            .with_attribute(
                "psk",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Pre-shared key; required when auth_mode is psk"),
            )
            .with_attribute(
                "encryption_mode",
                Attribute::optional_computed_string()
                    .with_one_of(ENCRYPTION_MODES.iter().copied()),
            )
            .with_attribute(
                "wpa_encryption_mode",
                Attribute::optional_computed_string()
                    .with_one_of(WPA_ENCRYPTION_MODES.iter().copied()),
            )
            .with_attribute(
                "ip_assignment_mode",
                Attribute::optional_computed_string()
                    .with_one_of(IP_ASSIGNMENT_MODES.iter().copied()),
            )
            .with_attribute("splash_page", Attribute::optional_computed_string())
            .with_attribute("visible", Attribute::optional_computed_bool())
            .with_attribute("available_on_all_aps", Attribute::optional_computed_bool())
            .with_attribute(
                "band_selection",
                Attribute::optional_computed_string()
                    .with_one_of(BAND_SELECTIONS.iter().copied()),
            )
            .with_attribute(
                "per_client_bandwidth_limit_up",
                Attribute::optional_computed_int64(),
            )
            .with_attribute(
                "per_client_bandwidth_limit_down",
                Attribute::optional_computed_int64(),
            )
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let auth_mode = config.get("auth_mode").and_then(Value::as_str);
        let psk = config.get("psk").and_then(Value::as_str);
        match (auth_mode, psk) {
            (Some("psk"), None) => diags.push(
                Diagnostic::error("psk is required when auth_mode is \"psk\"")
                    .with_attribute("psk"),
            ),
            (_, Some(key)) if !(8..=63).contains(&key.chars().count()) => diags.push(
                Diagnostic::error("psk must be between 8 and 63 characters")
                    .with_attribute("psk"),
            ),
            (mode, Some(_)) if mode != Some("psk") && !mode.is_some_and(|m| m.starts_with("ipsk")) => {
                diags.push(
                    Diagnostic::warning("psk is ignored unless auth_mode is \"psk\"")
                        .with_attribute("psk"),
                )
            }
            _ => {}
        }
        diags
    }

    async fn create(
        &self,
        client: &DashboardClient,
        planned: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: SsidState = decode_state(planned)?;
        let value = self.apply(client, &state, diags).await?;
        info!(network_id = ?state.network_id, number = state.number, "Configured SSID");
        Ok(value)
    }

    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError> {
        let state: SsidState = decode_state(current)?;
        let network_id = required(&state.network_id, "network_id")?;
        match call_found(client, "GetNetworkWirelessSsid", || {
            client.get_network_wireless_ssid(network_id, state.number)
        })
        .await?
        {
            Some(ssid) => encode_state(&SsidState::from_api(network_id, ssid, &state)),
            None => {
                debug!(network_id, number = state.number, "SSID no longer exists");
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
        let state: SsidState = decode_state(planned)?;
        self.apply(client, &state, diags).await
    }

    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let state: SsidState = decode_state(current)?;
        let network_id = required(&state.network_id, "network_id")?;
        let body = reset_body(state.number);
        call_with_warnings(client, "UpdateNetworkWirelessSsid", diags, || {
            client.update_network_wireless_ssid(network_id, state.number, &body)
        })
        .await?;
        info!(network_id, number = state.number, "Reset SSID to defaults");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        let parts = split_import_id(id, &["networkId", "number"])?;
        let number: i64 = parts[1].parse().map_err(|_| {
            ProviderError::InvalidRequest(format!("SSID number '{}' is not an integer", parts[1]))
        })?;
        if !(0..=MAX_SSID_NUMBER).contains(&number) {
            return Err(ProviderError::InvalidRequest(format!(
                "SSID number {} is out of range 0..={}",
                number, MAX_SSID_NUMBER
            )));
        }
        Ok(json!({ "network_id": parts[0], "number": number }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use crate::validation::validate;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_create_keeps_psk() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/networks/N_1/wireless/ssids/2")
                    .json_body(json!({
                        "name": "Guest",
                        "enabled": true,
                        "authMode": "psk",
                        "psk": "deadbeef1234",
                        "encryptionMode": "wpa"
                    }));
                then.status(200).json_body(json!({
                    "number": 2,
                    "name": "Guest",
                    "enabled": true,
                    "authMode": "psk",
                    "encryptionMode": "wpa",
                    "wpaEncryptionMode": "WPA2 only",
                    "visible": true
                }));
            })
            .await;

        let client = client_for(&server, 0);
        let state = WirelessSsidResource
            .create(
                &client,
                json!({
                    "network_id": "N_1",
                    "number": 2,
                    "name": "Guest",
                    "enabled": true,
                    "auth_mode": "psk",
                    "psk": "deadbeef1234",
                    "encryption_mode": "wpa"
                }),
                &mut Diagnostics::new(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(state["psk"], "deadbeef1234");
        assert_eq!(state["wpa_encryption_mode"], "WPA2 only");
    }

    #[tokio::test]
    async fn test_read_preserves_psk() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/networks/N_1/wireless/ssids/2");
                then.status(200).json_body(json!({
                    "number": 2,
                    "name": "Guest",
                    "enabled": true,
                    "authMode": "psk"
                }));
            })
            .await;

        let client = client_for(&server, 0);
        let state = WirelessSsidResource
            .read(
                &client,
                json!({"network_id": "N_1", "number": 2, "psk": "deadbeef1234"}),
            )
            .await
            .unwrap();
        assert_eq!(state["psk"], "deadbeef1234");
        assert_eq!(state["auth_mode"], "psk");
    }

    #[tokio::test]
    async fn test_delete_resets_slot() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/networks/N_1/wireless/ssids/4")
                    .json_body(json!({
                        "name": "Unconfigured SSID 5",
                        "enabled": false,
                        "authMode": "open"
                    }));
                then.status(200).json_body(json!({
                    "number": 4,
                    "name": "Unconfigured SSID 5",
                    "enabled": false,
                    "authMode": "open"
                }));
            })
            .await;

        let client = client_for(&server, 0);
        WirelessSsidResource
            .delete(&client, json!({"network_id": "N_1", "number": 4, "name": "Corp"}), &mut Diagnostics::new())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_number_out_of_range() {
        let schema = WirelessSsidResource.schema();
        let diags = validate(&schema, &json!({"network_id": "N_1", "number": 15}));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("number"));
        assert!(validate(&schema, &json!({"network_id": "N_1", "number": 14})).is_empty());
    }

    #[test]
    fn test_psk_rules() {
        let r = WirelessSsidResource;
        assert!(r.validate(&json!({"auth_mode": "psk"})).has_errors());
        assert!(r
            .validate(&json!({"auth_mode": "psk", "psk": "short"}))
            .has_errors());
        assert!(r
            .validate(&json!({"auth_mode": "psk", "psk": "longenough"}))
            .is_empty());

        let diags = r.validate(&json!({"auth_mode": "open", "psk": "longenough"}));
        assert!(!diags.has_errors());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_import_state() {
        let r = WirelessSsidResource;
        assert_eq!(
            r.import_state("N_1,3").unwrap(),
            json!({"network_id": "N_1", "number": 3})
        );
        assert!(r.import_state("N_1,15").is_err());
        assert!(r.import_state("N_1,x").is_err());
        assert!(r.import_state("N_1").is_err());
    }
}
