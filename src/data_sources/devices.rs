//! `meraki_devices`

use serde_json::Value;
use tracing::debug;

use super::{input, items_attribute, with_items, DataSource};
use crate::client::DashboardClient;
use crate::error::ProviderError;
use crate::resources::device::DeviceState;
use crate::resources::{call, encode_state, DeviceResource, Resource};
use crate::schema::{Attribute, Schema};

/// Devices of one organization, optionally narrowed to one network.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevicesDataSource;

#[async_trait::async_trait]
impl DataSource for DevicesDataSource {
    fn type_name(&self) -> &'static str {
        "meraki_devices"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Devices in an organization.")
            .with_attribute("organization_id", Attribute::required_string())
            .with_attribute(
                "network_id",
                Attribute::optional_string().with_description("Only list devices in this network"),
            )
            .with_attribute("items", items_attribute(&DeviceResource.schema()))
    }

    async fn read(&self, client: &DashboardClient, config: Value) -> Result<Value, ProviderError> {
        let organization_id = input(&config, "organization_id")?;
        let network_id = config.get("network_id").and_then(Value::as_str);
        let devices = call(client, "GetOrganizationDevices", || {
            client.get_organization_devices(organization_id)
        })
        .await?;
        debug!(organization_id, count = devices.len(), "Listed devices");

        let empty = DeviceState::default();
        let items = devices
            .into_iter()
            .filter(|d| network_id.is_none() || d.network_id.as_deref() == network_id)
            .map(|device| encode_state(&DeviceState::from_api(device, &empty)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(with_items(config, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_filters_by_network() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations/1/devices");
                then.status(200).json_body(json!([
                    {"serial": "Q2AA-0001", "networkId": "N_1", "model": "MR46"},
                    {"serial": "Q2AA-0002", "networkId": "N_2", "model": "MS120"},
                    {"serial": "Q2AA-0003", "model": "MX68"}
                ]));
            })
            .await;

        let client = client_for(&server, 0);
        let all = DevicesDataSource
            .read(&client, json!({"organization_id": "1"}))
            .await
            .unwrap();
        assert_eq!(all["items"].as_array().unwrap().len(), 3);

        let filtered = DevicesDataSource
            .read(&client, json!({"organization_id": "1", "network_id": "N_2"}))
            .await
            .unwrap();
        let items = filtered["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["serial"], "Q2AA-0002");
    }
}
