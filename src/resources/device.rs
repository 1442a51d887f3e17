//! `meraki_device`
//!
//! A device is identified by its serial. When `network_id` is set the device
//! is claimed into that network on create and removed from it on delete;
//! otherwise only its attributes are managed and delete just forgets it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{call, call_found, decode_state, encode_state, Resource};
use crate::client::{ClaimDevices, DashboardClient, Device, DeviceUpdate, RemoveDevice};
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostics, Schema};

/// Devices, addressed by serial.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceResource;

/// State of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceState {
    pub serial: String,
    pub network_id: Option<String>,
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub move_map_marker: Option<bool>,
    pub mac: Option<String>,
    pub model: Option<String>,
    pub product_type: Option<String>,
    pub firmware: Option<String>,
    pub lan_ip: Option<String>,
}

impl DeviceState {
    /// `move_map_marker` is write-only and kept from `planned`.
    pub(crate) fn from_api(device: Device, planned: &DeviceState) -> Self {
        Self {
            serial: device.serial,
            network_id: device.network_id,
            name: device.name,
            tags: Some(device.tags),
            address: device.address,
            notes: device.notes,
            lat: device.lat,
            lng: device.lng,
            move_map_marker: planned.move_map_marker,
            mac: device.mac,
            model: device.model,
            product_type: device.product_type,
            firmware: device.firmware,
            lan_ip: device.lan_ip,
        }
    }
}

impl From<&DeviceState> for DeviceUpdate {
    fn from(state: &DeviceState) -> Self {
        Self {
            name: state.name.clone(),
            tags: state.tags.clone(),
            address: state.address.clone(),
            notes: state.notes.clone(),
            lat: state.lat,
            lng: state.lng,
            move_map_marker: state.move_map_marker,
        }
    }
}

impl DeviceResource {
    async fn apply(&self, client: &DashboardClient, state: &DeviceState) -> Result<Value, ProviderError> {
        let body = DeviceUpdate::from(state);
        let device = call(client, "UpdateDevice", || {
            client.update_device(&state.serial, &body)
        })
        .await?;
        encode_state(&DeviceState::from_api(device, state))
    }
}

#[async_trait::async_trait]
impl Resource for DeviceResource {
    fn type_name(&self) -> &'static str {
        "meraki_device"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A device, optionally claimed into a network.")
            .with_attribute(
                "serial",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Device serial number"),
            )
            .with_attribute(
                "network_id",
                Attribute::optional_computed_string()
                    .with_force_new()
                    .with_description("Network to claim the device into"),
            )
            .with_attribute("name", Attribute::optional_computed_string())
            .with_attribute("tags", Attribute::optional_computed_string_list())
            .with_attribute("address", Attribute::optional_computed_string())
            .with_attribute("notes", Attribute::optional_computed_string())
            .with_attribute("lat", Attribute::optional_computed_float64())
            .with_attribute("lng", Attribute::optional_computed_float64())
            .with_attribute(
                "move_map_marker",
                Attribute::optional_computed_bool()
                    .with_description("Move the map marker to the geocoded address"),
            )
            .with_attribute("mac", Attribute::computed_string())
            .with_attribute("model", Attribute::computed_string())
            .with_attribute("product_type", Attribute::computed_string())
            .with_attribute("firmware", Attribute::computed_string())
            .with_attribute("lan_ip", Attribute::computed_string())
    }

    async fn create(
        &self,
        client: &DashboardClient,
        planned: Value,
        _diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: DeviceState = decode_state(planned)?;
        if let Some(network_id) = state.network_id.as_deref() {
            let body = ClaimDevices {
                serials: vec![state.serial.clone()],
            };
            call(client, "ClaimNetworkDevices", || {
                client.claim_network_devices(network_id, &body)
            })
            .await?;
            info!(serial = %state.serial, network_id, "Claimed device into network");
        }
        self.apply(client, &state).await
    }

    async fn read(&self, client: &DashboardClient, current: Value) -> Result<Value, ProviderError> {
        let state: DeviceState = decode_state(current)?;
        match call_found(client, "GetDevice", || client.get_device(&state.serial)).await? {
            Some(device) => encode_state(&DeviceState::from_api(device, &state)),
            None => {
                debug!(serial = %state.serial, "Device no longer exists");
                Ok(Value::Null)
            }
        }
    }

    async fn update(
        &self,
        client: &DashboardClient,
        _prior: Value,
        planned: Value,
        _diags: &mut Diagnostics,
    ) -> Result<Value, ProviderError> {
        let state: DeviceState = decode_state(planned)?;
        self.apply(client, &state).await
    }

    async fn delete(
        &self,
        client: &DashboardClient,
        current: Value,
        _diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let state: DeviceState = decode_state(current)?;
        match state.network_id.as_deref() {
            Some(network_id) => {
                let body = RemoveDevice {
                    serial: state.serial.clone(),
                };
                call(client, "RemoveNetworkDevices", || {
                    client.remove_network_devices(network_id, &body)
                })
                .await?;
                info!(serial = %state.serial, network_id, "Removed device from network");
            }
            None => debug!(serial = %state.serial, "Device is not in a network, nothing to remove"),
        }
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        Ok(json!({ "serial": id }))
    }
}
