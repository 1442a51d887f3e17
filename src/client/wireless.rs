//! Wireless SSID endpoints.

use serde::{Deserialize, Serialize};

use super::{segment, ApiResult, DashboardClient};

/// An SSID slot as returned by the Dashboard. Every network has 15 slots,
/// numbered 0 through 14.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ssid {
    pub number: i64,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub auth_mode: Option<String>,
    #[serde(default)]
    pub encryption_mode: Option<String>,
    #[serde(default)]
    pub wpa_encryption_mode: Option<String>,
    #[serde(default)]
    pub ip_assignment_mode: Option<String>,
    #[serde(default)]
    pub splash_page: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub available_on_all_aps: Option<bool>,
    #[serde(default)]
    pub band_selection: Option<String>,
    #[serde(default)]
    pub per_client_bandwidth_limit_up: Option<i64>,
    #[serde(default)]
    pub per_client_bandwidth_limit_down: Option<i64>,
}

/// Body of `PUT /networks/{networkId}/wireless/ssids/{number}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SsidUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wpa_encryption_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_assignment_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splash_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_on_all_aps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_selection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_client_bandwidth_limit_up: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_client_bandwidth_limit_down: Option<i64>,
}

impl DashboardClient {
    /// `GET /networks/{networkId}/wireless/ssids`
    pub async fn get_network_wireless_ssids(&self, network_id: &str) -> ApiResult<Vec<Ssid>> {
        self.get(&format!("/networks/{}/wireless/ssids", segment(network_id)))
            .await
    }

    /// `GET /networks/{networkId}/wireless/ssids/{number}`
    pub async fn get_network_wireless_ssid(&self, network_id: &str, number: i64) -> ApiResult<Ssid> {
        self.get(&format!(
            "/networks/{}/wireless/ssids/{}",
            segment(network_id),
            number
        ))
        .await
    }

    /// `PUT /networks/{networkId}/wireless/ssids/{number}`
    pub async fn update_network_wireless_ssid(
        &self,
        network_id: &str,
        number: i64,
        body: &SsidUpdate,
    ) -> ApiResult<Ssid> {
        self.put(
            &format!(
                "/networks/{}/wireless/ssids/{}",
                segment(network_id),
                number
            ),
            body,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_ssids() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/networks/N_1/wireless/ssids");
                then.status(200).json_body(json!([
                    {"number": 0, "name": "Corp", "enabled": true, "authMode": "psk"},
                    {"number": 1, "name": "Unconfigured SSID 2", "enabled": false, "authMode": "open"}
                ]));
            })
            .await;

        let client = client_for(&server, 0);
        let ssids = client.get_network_wireless_ssids("N_1").await.unwrap().value;
        assert_eq!(ssids.len(), 2);
        assert_eq!(ssids[0].auth_mode.as_deref(), Some("psk"));
        assert!(!ssids[1].enabled);
    }
}
