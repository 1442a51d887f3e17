//! Organization endpoints, including organization-wide SNMP and SAML settings.

use serde::{Deserialize, Serialize};

use super::{segment, ApiResult, DashboardClient, Device, Network};

/// An organization as returned by the Dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api: Option<OrganizationApi>,
    #[serde(default)]
    pub licensing: Option<Licensing>,
    #[serde(default)]
    pub cloud: Option<Cloud>,
    #[serde(default)]
    pub management: Option<OrganizationManagement>,
}

/// Whether API access is enabled for an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationApi {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Licensing {
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    #[serde(default)]
    pub region: Option<CloudRegion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudRegion {
    #[serde(default)]
    pub name: Option<String>,
}

/// Management metadata (MSP ids, customer numbers).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationManagement {
    #[serde(default)]
    pub details: Vec<ManagementDetail>,
}

/// One name/value management detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementDetail {
    pub name: String,
    pub value: String,
}

/// Body of `POST /organizations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management: Option<OrganizationManagement>,
}

/// Body of `PUT /organizations/{organizationId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<OrganizationApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management: Option<OrganizationManagement>,
}

/// Organization SNMP settings.
///
/// The passphrases are write-only: the Dashboard never returns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snmp {
    #[serde(default)]
    pub v2c_enabled: Option<bool>,
    #[serde(default)]
    pub v3_enabled: Option<bool>,
    #[serde(default)]
    pub v3_auth_mode: Option<String>,
    #[serde(default)]
    pub v3_priv_mode: Option<String>,
    #[serde(default)]
    pub peer_ips: Option<Vec<String>>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub v2_community_string: Option<String>,
    #[serde(default)]
    pub v3_user: Option<String>,
}

/// Body of `PUT /organizations/{organizationId}/snmp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v2c_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v3_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v3_auth_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v3_auth_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v3_priv_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v3_priv_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_ips: Option<Vec<String>>,
}

/// Organization SAML toggle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Saml {
    #[serde(default)]
    pub enabled: bool,
}

/// Body of `PUT /organizations/{organizationId}/saml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SamlUpdate {
    pub enabled: bool,
}

impl DashboardClient {
    /// `GET /organizations`
    pub async fn get_organizations(&self) -> ApiResult<Vec<Organization>> {
        self.get("/organizations").await
    }

    /// `GET /organizations/{organizationId}`
    pub async fn get_organization(&self, organization_id: &str) -> ApiResult<Organization> {
        self.get(&format!("/organizations/{}", segment(organization_id)))
            .await
    }

    /// `POST /organizations`
    pub async fn create_organization(&self, body: &OrganizationCreate) -> ApiResult<Organization> {
        self.post("/organizations", body).await
    }

    /// `PUT /organizations/{organizationId}`
    pub async fn update_organization(
        &self,
        organization_id: &str,
        body: &OrganizationUpdate,
    ) -> ApiResult<Organization> {
        self.put(&format!("/organizations/{}", segment(organization_id)), body)
            .await
    }

    /// `DELETE /organizations/{organizationId}`
    pub async fn delete_organization(&self, organization_id: &str) -> ApiResult<()> {
        self.delete(&format!("/organizations/{}", segment(organization_id)))
            .await
    }

    /// `GET /organizations/{organizationId}/networks`
    pub async fn get_organization_networks(&self, organization_id: &str) -> ApiResult<Vec<Network>> {
        self.get(&format!(
            "/organizations/{}/networks",
            segment(organization_id)
        ))
        .await
    }

    /// `GET /organizations/{organizationId}/devices`
    pub async fn get_organization_devices(&self, organization_id: &str) -> ApiResult<Vec<Device>> {
        self.get(&format!("/organizations/{}/devices", segment(organization_id)))
            .await
    }

    /// `GET /organizations/{organizationId}/snmp`
    pub async fn get_organization_snmp(&self, organization_id: &str) -> ApiResult<Snmp> {
        self.get(&format!("/organizations/{}/snmp", segment(organization_id)))
            .await
    }

    /// `PUT /organizations/{organizationId}/snmp`
    pub async fn update_organization_snmp(
        &self,
        organization_id: &str,
        body: &SnmpUpdate,
    ) -> ApiResult<Snmp> {
        self.put(
            &format!("/organizations/{}/snmp", segment(organization_id)),
            body,
        )
        .await
    }

    /// `GET /organizations/{organizationId}/saml`
    pub async fn get_organization_saml(&self, organization_id: &str) -> ApiResult<Saml> {
        self.get(&format!("/organizations/{}/saml", segment(organization_id)))
            .await
    }

    /// `PUT /organizations/{organizationId}/saml`
    pub async fn update_organization_saml(
        &self,
        organization_id: &str,
        body: &SamlUpdate,
    ) -> ApiResult<Saml> {
        self.put(
            &format!("/organizations/{}/saml", segment(organization_id)),
            body,
        )
        .await
    }
}
