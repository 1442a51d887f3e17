//! Planning: diffing prior state against proposed configuration.
//!
//! Dashboard objects have many attributes the API fills in on its own
//! (`url`, `enrollment_string`, default VLANs). Those are `computed` in the
//! schema; when the configuration leaves them null the plan carries the prior
//! value forward instead of reporting a spurious change.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::Schema;

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The attribute name.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<Value>,
    /// The value after the change (None if deleting or unknown until apply).
    pub after: Option<Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// A change that introduces a value.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// A change that drops a value.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// A change that replaces one value with another.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource must be destroyed and recreated.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Whether anything will change.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Compute the plan for one resource instance.
///
/// - `prior == None`: create; every non-null planned attribute is an addition.
/// - `proposed` is null: destroy; every non-null prior attribute is a removal.
/// - otherwise: update; computed attributes left null keep their prior value,
///   and any change to a `force_new` attribute sets `requires_replace`.
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    if proposed.is_null() {
        let changes = prior
            .and_then(Value::as_object)
            .map(|obj| {
                sorted_keys(obj)
                    .into_iter()
                    .filter_map(|k| {
                        let v = &obj[k];
                        (!v.is_null()).then(|| AttributeChange::removed(k, v.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        return PlanResult {
            planned_state: Value::Null,
            changes,
            requires_replace: false,
        };
    }

    let empty = Map::new();
    let proposed_obj = proposed.as_object().unwrap_or(&empty);
    let prior_obj = prior.and_then(Value::as_object);
    let mut planned = proposed_obj.clone();

    for (name, attr) in &schema.block.attributes {
        let current = planned.get(name).filter(|v| !v.is_null());
        if current.is_some() {
            continue;
        }
        let carried = if attr.flags.computed {
            prior_obj
                .and_then(|p| p.get(name))
                .filter(|v| !v.is_null())
                .cloned()
        } else {
            None
        };
        if let Some(value) = carried.or_else(|| attr.default.clone()) {
            planned.insert(name.clone(), value);
        }
    }

    let mut names: Vec<&String> = schema
        .block
        .attributes
        .keys()
        .chain(schema.block.blocks.keys())
        .collect();
    names.sort();

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in names {
        let before = prior_obj
            .and_then(|p| p.get(name))
            .filter(|v| !v.is_null())
            .cloned();
        let after = planned.get(name).filter(|v| !v.is_null()).cloned();
        if before == after {
            continue;
        }
        if prior_obj.is_some() && schema.attribute(name).is_some_and(|a| a.force_new) {
            requires_replace = true;
        }
        changes.push(AttributeChange::new(name.as_str(), before, after));
    }

    PlanResult {
        planned_state: Value::Object(planned),
        changes,
        requires_replace,
    }
}

fn sorted_keys(obj: &Map<String, Value>) -> Vec<&str> {
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use serde_json::json;

    fn network_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "organization_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute("time_zone", Attribute::optional_computed_string())
            .with_attribute(
                "notes",
                Attribute::optional_computed_string().with_default(json!("")),
            )
    }

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("HQ"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("HQ")));

        let removed = AttributeChange::removed("name", json!("old"));
        assert_eq!(removed.before, Some(json!("old")));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("vlan", json!(1), json!(20));
        assert_eq!(modified.before, Some(json!(1)));
        assert_eq!(modified.after, Some(json!(20)));
    }

    #[test]
    fn test_plan_create() {
        let plan = plan_resource(
            &network_schema(),
            None,
            &json!({"organization_id": "O1", "name": "HQ"}),
        );

        assert!(!plan.requires_replace);
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "notes", "organization_id"]);
        // Unknown until the Dashboard assigns it.
        assert!(plan.planned_state.get("id").is_none());
        assert_eq!(plan.planned_state["notes"], "");
    }

    #[test]
    fn test_plan_no_change_keeps_computed() {
        let prior = json!({
            "id": "N1",
            "organization_id": "O1",
            "name": "HQ",
            "time_zone": "America/Los_Angeles",
            "notes": ""
        });
        let plan = plan_resource(
            &network_schema(),
            Some(&prior),
            &json!({"organization_id": "O1", "name": "HQ"}),
        );

        assert!(!plan.has_changes());
        assert_eq!(plan.planned_state["id"], "N1");
        assert_eq!(plan.planned_state["time_zone"], "America/Los_Angeles");
    }

    #[test]
    fn test_plan_update_in_place() {
        let prior = json!({"id": "N1", "organization_id": "O1", "name": "HQ", "notes": ""});
        let plan = plan_resource(
            &network_schema(),
            Some(&prior),
            &json!({"organization_id": "O1", "name": "Branch"}),
        );

        assert!(!plan.requires_replace);
        assert_eq!(
            plan.changes,
            vec![AttributeChange::modified("name", json!("HQ"), json!("Branch"))]
        );
    }

    #[test]
    fn test_plan_force_new_requires_replace() {
        let prior = json!({"id": "N1", "organization_id": "O1", "name": "HQ", "notes": ""});
        let plan = plan_resource(
            &network_schema(),
            Some(&prior),
            &json!({"organization_id": "O2", "name": "HQ"}),
        );

        assert!(plan.requires_replace);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "organization_id");
    }

    #[test]
    fn test_plan_destroy() {
        let prior = json!({"id": "N1", "name": "HQ", "notes": null});
        let plan = plan_resource(&network_schema(), Some(&prior), &Value::Null);

        assert!(plan.planned_state.is_null());
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["id", "name"]);
        assert!(plan.changes.iter().all(|c| c.after.is_none()));
    }
}
