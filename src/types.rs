//! Plan and lifecycle value types exchanged with the host.

use serde::{Deserialize, Serialize};

/// A change to a single attribute discovered during planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Path of the attribute that changed.
    pub path: String,
    /// Value before the change (`None` when the attribute is being added).
    pub before: Option<serde_json::Value>,
    /// Value after the change (`None` when the attribute is being removed).
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// A change with explicit before and after values.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// An attribute being added.
    pub fn added(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// An attribute being removed.
    pub fn removed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// An attribute changing value.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// What a plan decided: the state after apply, the attribute-level diff,
/// and whether the change can be applied in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The state the resource will have after apply.
    pub planned_state: serde_json::Value,
    /// Attribute-level changes between prior and planned state.
    pub changes: Vec<AttributeChange>,
    /// The change needs a destroy-and-recreate instead of an update.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan that leaves the resource untouched.
    pub fn no_change(state: serde_json::Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// A plan carrying changes.
    pub fn with_changes(
        planned_state: serde_json::Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }
}

/// A resource brought under management by an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type, e.g. `signalfx_log_view`.
    pub resource_type: String,
    /// State read from the remote API.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// An imported resource of the given type with the given state.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// What the provider supports, reported to the host once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Resource type names this provider serves.
    pub resources: Vec<String>,
    /// Capability flags.
    pub capabilities: ServerCapabilities,
}

/// Capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// The provider can plan destroy operations (a `plan` call with null
    /// proposed state).
    pub plan_destroy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", serde_json::json!("Chart Name"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(serde_json::json!("Chart Name")));

        let removed = AttributeChange::removed("default_connection", serde_json::json!("Cosmicbat"));
        assert_eq!(removed.before, Some(serde_json::json!("Cosmicbat")));
        assert!(removed.after.is_none());

        let modified =
            AttributeChange::modified("time_range", serde_json::json!(900), serde_json::json!(3600));
        assert_eq!(modified.before, Some(serde_json::json!(900)));
        assert_eq!(modified.after, Some(serde_json::json!(3600)));
    }

    #[test]
    fn test_plan_result() {
        let no_change = PlanResult::no_change(serde_json::json!({"id": "chart-123"}));
        assert!(no_change.changes.is_empty());
        assert!(!no_change.requires_replace);

        let with_changes = PlanResult::with_changes(
            serde_json::json!({"id": "chart-123", "name": "Chart Name NEW"}),
            vec![AttributeChange::modified(
                "name",
                serde_json::json!("Chart Name"),
                serde_json::json!("Chart Name NEW"),
            )],
            false,
        );
        assert_eq!(with_changes.changes.len(), 1);
        assert!(!with_changes.requires_replace);
    }

    #[test]
    fn test_imported_resource() {
        let imported =
            ImportedResource::new("signalfx_log_view", serde_json::json!({"id": "GvmZ0BcAcAA"}));
        assert_eq!(imported.resource_type, "signalfx_log_view");
        assert_eq!(imported.state["id"], "GvmZ0BcAcAA");
    }

    #[test]
    fn test_metadata_defaults() {
        let metadata = ProviderMetadata::default();
        assert!(metadata.resources.is_empty());
        assert!(!metadata.capabilities.plan_destroy);
    }
}
