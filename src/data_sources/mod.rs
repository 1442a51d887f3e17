//! Read-only Meraki data sources.
//!
//! Each data source echoes its inputs and adds an `items` list whose entries
//! have the same shape as the matching resource's state.

use serde_json::{Map, Value};

use crate::client::DashboardClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

pub mod devices;
pub mod networks;
pub mod organizations;
pub mod switch_ports;
pub mod wireless_ssids;

pub use devices::DevicesDataSource;
pub use networks::NetworksDataSource;
pub use organizations::OrganizationsDataSource;
pub use switch_ports::SwitchPortsDataSource;
pub use wireless_ssids::WirelessSsidsDataSource;

/// A data source type the provider serves.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// The data source type name, e.g. `meraki_networks`.
    fn type_name(&self) -> &'static str;

    /// The data source schema.
    fn schema(&self) -> Schema;

    /// Query the Dashboard.
    async fn read(&self, client: &DashboardClient, config: Value) -> Result<Value, ProviderError>;
}

/// Every data source this provider serves.
pub fn all() -> Vec<Box<dyn DataSource>> {
    vec![
        Box::new(OrganizationsDataSource),
        Box::new(NetworksDataSource),
        Box::new(DevicesDataSource),
        Box::new(WirelessSsidsDataSource),
        Box::new(SwitchPortsDataSource),
    ]
}

/// The `items` attribute for entries shaped like `resource`.
pub(crate) fn items_attribute(resource: &Schema) -> Attribute {
    Attribute::computed_object_list(crate::resources::object_type(resource))
}

/// Read a required string input.
pub(crate) fn input<'a>(config: &'a Value, name: &str) -> Result<&'a str, ProviderError> {
    config
        .get(name)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProviderError::Validation(format!("'{}' is required", name)))
}

/// Echo `config` back with `items` attached.
pub(crate) fn with_items(config: Value, items: Vec<Value>) -> Value {
    let mut out = match config {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    out.insert("items".to_string(), Value::Array(items));
    Value::Object(out)
}
