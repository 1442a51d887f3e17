//! Device endpoints and switch port configuration.

use serde::{Deserialize, Serialize};

use super::{segment, ApiResult, DashboardClient};

/// A device as returned by the Dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub serial: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub firmware: Option<String>,
    #[serde(default)]
    pub lan_ip: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PUT /devices/{serial}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_map_marker: Option<bool>,
}

/// A switch port as returned by the Dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPort {
    pub port_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub poe_enabled: Option<bool>,
    #[serde(default, rename = "type")]
    pub port_type: Option<String>,
    #[serde(default)]
    pub vlan: Option<i64>,
    #[serde(default)]
    pub voice_vlan: Option<i64>,
    #[serde(default)]
    pub allowed_vlans: Option<String>,
    #[serde(default)]
    pub isolation_enabled: Option<bool>,
    #[serde(default)]
    pub rstp_enabled: Option<bool>,
    #[serde(default)]
    pub stp_guard: Option<String>,
    #[serde(default)]
    pub link_negotiation: Option<String>,
    #[serde(default)]
    pub access_policy_type: Option<String>,
}

/// Body of `PUT /devices/{serial}/switch/ports/{portId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPortUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poe_enabled: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_vlan: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_vlans: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rstp_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stp_guard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_negotiation: Option<String>,
}

impl DashboardClient {
    /// `GET /devices/{serial}`
    pub async fn get_device(&self, serial: &str) -> ApiResult<Device> {
        self.get(&format!("/devices/{}", segment(serial))).await
    }

    /// `PUT /devices/{serial}`
    pub async fn update_device(&self, serial: &str, body: &DeviceUpdate) -> ApiResult<Device> {
        self.put(&format!("/devices/{}", segment(serial)), body).await
    }

    /// `GET /devices/{serial}/switch/ports`
    pub async fn get_device_switch_ports(&self, serial: &str) -> ApiResult<Vec<SwitchPort>> {
        self.get(&format!("/devices/{}/switch/ports", segment(serial)))
            .await
    }

    /// `GET /devices/{serial}/switch/ports/{portId}`
    pub async fn get_device_switch_port(&self, serial: &str, port_id: &str) -> ApiResult<SwitchPort> {
        self.get(&format!(
            "/devices/{}/switch/ports/{}",
            segment(serial),
            segment(port_id)
        ))
        .await
    }

    /// `PUT /devices/{serial}/switch/ports/{portId}`
    pub async fn update_device_switch_port(
        &self,
        serial: &str,
        port_id: &str,
        body: &SwitchPortUpdate,
    ) -> ApiResult<SwitchPort> {
        self.put(
            &format!(
                "/devices/{}/switch/ports/{}",
                segment(serial),
                segment(port_id)
            ),
            body,
        )
        .await
    }
}
