//! `meraki_wireless_ssids`

use serde_json::Value;

use super::{input, items_attribute, with_items, DataSource};
use crate::client::DashboardClient;
use crate::error::ProviderError;
use crate::resources::wireless_ssid::SsidState;
use crate::resources::{call, encode_state, Resource, WirelessSsidResource};
use crate::schema::{Attribute, Schema};

/// All SSID slots of a network.
#[derive(Debug, Clone, Copy, Default)]
pub struct WirelessSsidsDataSource;

#[async_trait::async_trait]
impl DataSource for WirelessSsidsDataSource {
    fn type_name(&self) -> &'static str {
        "meraki_wireless_ssids"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("SSID slots of a wireless network.")
            .with_attribute("network_id", Attribute::required_string())
            .with_attribute("items", items_attribute(&WirelessSsidResource.schema()))
    }

    async fn read(&self, client: &DashboardClient, config: Value) -> Result<Value, ProviderError> {
        let network_id = input(&config, "network_id")?;
        let ssids = call(client, "GetNetworkWirelessSsids", || {
            client.get_network_wireless_ssids(network_id)
        })
        .await?;

        let empty = SsidState::default();
        let items = ssids
            .into_iter()
            .map(|ssid| {
                let mut item = encode_state(&SsidState::from_api(network_id, ssid, &empty))?;
                if let Some(obj) = item.as_object_mut() {
                    obj.remove("psk");
                }
                Ok(item)
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;
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
    async fn test_lists_ssids_without_psk() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/networks/N_1/wireless/ssids");
                then.status(200).json_body(json!([
                    {"number": 0, "name": "Corp", "enabled": true, "authMode": "8021x-radius"}
                ]));
            })
            .await;

        let client = client_for(&server, 0);
        let out = WirelessSsidsDataSource
            .read(&client, json!({"network_id": "N_1"}))
            .await
            .unwrap();

        let item = &out["items"][0];
        assert_eq!(item["network_id"], "N_1");
        assert_eq!(item["auth_mode"], "8021x-radius");
        assert!(item.get("psk").is_none());
    }
}
