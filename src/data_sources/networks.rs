//! `meraki_networks`

use serde_json::Value;
use tracing::debug;

use super::{input, items_attribute, with_items, DataSource};
use crate::client::DashboardClient;
use crate::error::ProviderError;
use crate::resources::network::NetworkState;
use crate::resources::{call, encode_state, NetworkResource, Resource};
use crate::schema::{Attribute, Schema};

/// Networks of one organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworksDataSource;

#[async_trait::async_trait]
impl DataSource for NetworksDataSource {
    fn type_name(&self) -> &'static str {
        "meraki_networks"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Networks in an organization.")
            .with_attribute("organization_id", Attribute::required_string())
            .with_attribute("items", items_attribute(&NetworkResource.schema()))
    }

    async fn read(&self, client: &DashboardClient, config: Value) -> Result<Value, ProviderError> {
        let organization_id = input(&config, "organization_id")?;
        let networks = call(client, "GetOrganizationNetworks", || {
            client.get_organization_networks(organization_id)
        })
        .await?;
        debug!(organization_id, count = networks.len(), "Listed networks");
        let items = networks
            .into_iter()
            .map(|network| encode_state(&NetworkState::from_api(network)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(with_items(config, items))
    }
}
