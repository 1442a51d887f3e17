//! `meraki_organizations`

use serde_json::Value;
use tracing::debug;

use super::{items_attribute, with_items, DataSource};
use crate::client::DashboardClient;
use crate::error::ProviderError;
use crate::resources::organization::OrganizationState;
use crate::resources::{call, encode_state, OrganizationResource, Resource};
use crate::schema::Schema;

/// Every organization the API key can see.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationsDataSource;

#[async_trait::async_trait]
impl DataSource for OrganizationsDataSource {
    fn type_name(&self) -> &'static str {
        "meraki_organizations"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Organizations accessible with the configured API key.")
            .with_attribute("items", items_attribute(&OrganizationResource.schema()))
    }

    async fn read(&self, client: &DashboardClient, config: Value) -> Result<Value, ProviderError> {
        let orgs = call(client, "GetOrganizations", || client.get_organizations()).await?;
        debug!(count = orgs.len(), "Listed organizations");
        let items = orgs
            .into_iter()
            .map(|org| encode_state(&OrganizationState::from_api(org)))
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
    async fn test_lists_organizations() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations");
                then.status(200).json_body(json!([
                    {"id": "1", "name": "Acme", "api": {"enabled": true}},
                    {"id": "2", "name": "Globex"}
                ]));
            })
            .await;

        let client = client_for(&server, 0);
        let out = OrganizationsDataSource
            .read(&client, Value::Null)
            .await
            .unwrap();

        let items = out["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["api_enabled"], true);
        assert_eq!(items[1]["name"], "Globex");
    }
}
