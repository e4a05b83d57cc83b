//! Resource implementations and the trait they share.

mod log_view;

pub use log_view::{LogViewColumn, LogViewResource, LogViewSortOption, LogViewState, LOG_VIEW_TYPE};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;
use crate::meta::Meta;
use crate::schema::{Diagnostic, Schema};

/// One managed resource type: its schema plus the remote CRUD calls.
///
/// The provider owns the generic machinery (schema validation, planning,
/// dispatch); a resource only translates between state values and API
/// calls. Every operation borrows the shared [`Meta`] for its client and
/// URLs.
#[async_trait]
pub trait Resource: std::fmt::Debug + Send + Sync + 'static {
    /// The type name used in config, e.g. `signalfx_log_view`.
    fn type_name(&self) -> &'static str;

    /// The resource schema.
    fn schema(&self) -> Schema;

    /// Config checks beyond what the schema expresses, e.g. mutually
    /// exclusive attributes.
    fn validate_config(&self, config: &Value) -> Vec<Diagnostic> {
        let _ = config;
        Vec::new()
    }

    /// Create the remote object from planned state. Returns the full state
    /// including computed attributes.
    async fn create(&self, meta: &Meta, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh state from the remote API. Returns `Value::Null` when the
    /// remote object is gone.
    async fn read(&self, meta: &Meta, current_state: Value) -> Result<Value, ProviderError>;

    /// Update the remote object to match planned state. Returns the full
    /// state including computed attributes.
    async fn update(
        &self,
        meta: &Meta,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the remote object.
    async fn delete(&self, meta: &Meta, current_state: Value) -> Result<(), ProviderError>;

    /// Fetch state for an existing remote object by id.
    async fn import(&self, meta: &Meta, id: &str) -> Result<Value, ProviderError>;
}
