//! `meraki_switch_ports`

use serde_json::Value;

use super::{input, items_attribute, with_items, DataSource};
use crate::client::DashboardClient;
use crate::error::ProviderError;
use crate::resources::switch_port::SwitchPortState;
use crate::resources::{call, encode_state, Resource, SwitchPortResource};
use crate::schema::{Attribute, Schema};

/// All ports of one switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchPortsDataSource;

#[async_trait::async_trait]
impl DataSource for SwitchPortsDataSource {
    fn type_name(&self) -> &'static str {
        "meraki_switch_ports"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Ports of a switch.")
            .with_attribute("serial", Attribute::required_string())
            .with_attribute("items", items_attribute(&SwitchPortResource.schema()))
    }

    async fn read(&self, client: &DashboardClient, config: Value) -> Result<Value, ProviderError> {
        let serial = input(&config, "serial")?;
        let ports = call(client, "GetDeviceSwitchPorts", || {
            client.get_device_switch_ports(serial)
        })
        .await?;
        let items = ports
            .into_iter()
            .map(|port| encode_state(&SwitchPortState::from_api(serial, port)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(with_items(config, items))
    }
}
