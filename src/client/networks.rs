//! Network endpoints and device claim/removal.

use serde::{Deserialize, Serialize};

use super::{segment, ApiResult, DashboardClient};

/// A network as returned by the Dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub enrollment_string: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_bound_to_config_template: Option<bool>,
}

/// Body of `POST /organizations/{organizationId}/networks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCreate {
    pub name: String,
    pub product_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `PUT /networks/{networkId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body and response of `POST /networks/{networkId}/devices/claim`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimDevices {
    pub serials: Vec<String>,
}

/// Body of `POST /networks/{networkId}/devices/remove`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemoveDevice {
    pub serial: String,
}

impl DashboardClient {
    /// `GET /networks/{networkId}`
    pub async fn get_network(&self, network_id: &str) -> ApiResult<Network> {
        self.get(&format!("/networks/{}", segment(network_id))).await
    }

    /// `POST /organizations/{organizationId}/networks`
    pub async fn create_organization_network(
        &self,
        organization_id: &str,
        body: &NetworkCreate,
    ) -> ApiResult<Network> {
        self.post(
            &format!("/organizations/{}/networks", segment(organization_id)),
            body,
        )
        .await
    }

    /// `PUT /networks/{networkId}`
    pub async fn update_network(&self, network_id: &str, body: &NetworkUpdate) -> ApiResult<Network> {
        self.put(&format!("/networks/{}", segment(network_id)), body)
            .await
    }

    /// `DELETE /networks/{networkId}`
    pub async fn delete_network(&self, network_id: &str) -> ApiResult<()> {
        self.delete(&format!("/networks/{}", segment(network_id)))
            .await
    }

    /// `POST /networks/{networkId}/devices/claim`
    pub async fn claim_network_devices(
        &self,
        network_id: &str,
        body: &ClaimDevices,
    ) -> ApiResult<ClaimDevices> {
        self.post(
            &format!("/networks/{}/devices/claim", segment(network_id)),
            body,
        )
        .await
    }

    /// `POST /networks/{networkId}/devices/remove`
    pub async fn remove_network_devices(
        &self,
        network_id: &str,
        body: &RemoveDevice,
    ) -> ApiResult<()> {
        self.post_empty(
            &format!("/networks/{}/devices/remove", segment(network_id)),
            body,
        )
        .await
    }
}
