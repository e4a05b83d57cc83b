//! The SignalFx provider: registry, configuration, and dispatch.
//!
//! [`SignalFxProvider`] implements [`ProviderService`] by decoding the
//! provider config into a [`Meta`], exchanging credentials for a session
//! when needed, and dispatching each resource operation to the matching
//! [`Resource`] implementation. Planning is generic: a top-level diff of
//! prior against proposed state, informed by the resource schema.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::meta::{Meta, DEFAULT_API_URL, DEFAULT_CUSTOM_APP_URL};
use crate::resource::{LogViewResource, Resource};
use crate::schema::{Attribute, Diagnostic, ProviderSchema, Schema};
use crate::service::ProviderService;
use crate::types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
};
use crate::validation;

/// Provider for SignalFx (Splunk Observability Cloud).
///
/// Holds the resource registry and, once `configure` has run, the shared
/// [`Meta`]. The meta sits behind a `tokio` lock that is never held across
/// an API call; operations clone the `Arc` out and release it.
pub struct SignalFxProvider {
    resources: Vec<Arc<dyn Resource>>,
    meta: RwLock<Option<Arc<Meta>>>,
}

impl SignalFxProvider {
    /// A provider with all built-in resource types registered.
    pub fn new() -> Self {
        Self {
            resources: vec![Arc::new(LogViewResource)],
            meta: RwLock::new(None),
        }
    }

    /// The shared session state built by `configure`.
    ///
    /// Fails with [`ProviderError::MetaNotProvided`] when the host calls a
    /// resource operation before configuring; logged rather than panicked
    /// so the mis-sequencing is diagnosable from the provider log.
    pub async fn meta(&self) -> Result<Arc<Meta>, ProviderError> {
        match self.meta.read().await.as_ref() {
            Some(meta) => Ok(Arc::clone(meta)),
            None => {
                error!("provider is not configured, no meta available");
                Err(ProviderError::MetaNotProvided)
            },
        }
    }

    fn resource(&self, resource_type: &str) -> Result<Arc<dyn Resource>, ProviderError> {
        self.resources
            .iter()
            .find(|resource| resource.type_name() == resource_type)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn provider_config_schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "auth_token",
                Attribute::optional_string().sensitive().with_description(
                    "SignalFx auth token; falls back to the SFX_AUTH_TOKEN environment variable",
                ),
            )
            .with_attribute(
                "api_url",
                Attribute::optional_string()
                    .with_default(json!(DEFAULT_API_URL))
                    .with_description(
                        "API URL for your SignalFx realm; falls back to SFX_API_URL",
                    ),
            )
            .with_attribute(
                "custom_app_url",
                Attribute::optional_string()
                    .with_default(json!(DEFAULT_CUSTOM_APP_URL))
                    .with_description(
                        "Application URL used for deep links; falls back to SFX_CUSTOM_APP_URL",
                    ),
            )
            .with_attribute(
                "email",
                Attribute::optional_string()
                    .with_description("Account email, used with password when no auth token is set"),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Account password, used with email when no auth token is set"),
            )
            .with_attribute(
                "organization_id",
                Attribute::optional_string()
                    .with_description("Organization to scope email/password sessions to"),
            )
    }
}

impl Default for SignalFxProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_meta(config: Value) -> Result<Meta, ProviderError> {
    if config.is_null() {
        Ok(Meta::default())
    } else {
        Ok(serde_json::from_value(config)?)
    }
}

/// Top-level diff of prior against proposed state.
///
/// Computed attributes the config cannot express (ids, URLs) are carried
/// from prior state into the planned state, so updates keep their identity.
/// `requires_replace` is set when a changed attribute is marked force-new
/// in the schema. A null proposed state plans a destroy.
fn plan_changes(schema: &Schema, prior_state: Option<&Value>, proposed_state: Value) -> PlanResult {
    if proposed_state.is_null() {
        let mut changes = Vec::new();
        if let Some(Value::Object(prior)) = prior_state {
            for (key, value) in prior {
                changes.push(AttributeChange::removed(key.clone(), value.clone()));
            }
        }
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let mut planned = proposed_state;
    if let (Some(Value::Object(prior)), Value::Object(planned_map)) = (prior_state, &mut planned) {
        for name in schema.computed_attributes() {
            if !planned_map.contains_key(name) {
                if let Some(value) = prior.get(name) {
                    planned_map.insert(name.to_string(), value.clone());
                }
            }
        }
    }

    let prior = match prior_state {
        Some(Value::Object(map)) => map,
        _ => {
            // Create plan: every configured attribute is an addition
            let changes = planned
                .as_object()
                .map(|map| {
                    map.iter()
                        .filter(|(_, value)| !value.is_null())
                        .map(|(key, value)| AttributeChange::added(key.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default();
            return PlanResult::with_changes(planned, changes, false);
        },
    };

    let force_new = schema.force_new_attributes();
    let mut changes = Vec::new();
    let mut requires_replace = false;

    if let Some(planned_map) = planned.as_object() {
        for (key, before) in prior {
            match planned_map.get(key) {
                Some(after) if after == before => {},
                Some(after) => {
                    changes.push(AttributeChange::modified(
                        key.clone(),
                        before.clone(),
                        after.clone(),
                    ));
                    requires_replace |= force_new.contains(&key.as_str());
                },
                None => {
                    changes.push(AttributeChange::removed(key.clone(), before.clone()));
                    requires_replace |= force_new.contains(&key.as_str());
                },
            }
        }
        for (key, after) in planned_map {
            if !prior.contains_key(key) && !after.is_null() {
                changes.push(AttributeChange::added(key.clone(), after.clone()));
                requires_replace |= force_new.contains(&key.as_str());
            }
        }
    }

    if changes.is_empty() {
        PlanResult::no_change(planned)
    } else {
        PlanResult::with_changes(planned, changes, requires_replace)
    }
}

#[async_trait::async_trait]
impl ProviderService for SignalFxProvider {
    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(Self::provider_config_schema());
        for resource in &self.resources {
            schema = schema.with_resource(resource.type_name(), resource.schema());
        }
        schema
    }

    fn metadata(&self) -> ProviderMetadata {
        let mut resources: Vec<String> = self
            .resources
            .iter()
            .map(|resource| resource.type_name().to_string())
            .collect();
        resources.sort();
        ProviderMetadata {
            resources,
            capabilities: ServerCapabilities { plan_destroy: true },
        }
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let meta = decode_meta(config)?.with_env_fallbacks().with_defaults();
        Ok(meta
            .validation_errors()
            .into_iter()
            .map(Diagnostic::error)
            .collect())
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut meta = decode_meta(config)?.with_env_fallbacks().with_defaults();

        let violations = meta.validation_errors();
        if !violations.is_empty() {
            return Ok(violations.into_iter().map(Diagnostic::error).collect());
        }

        let token = meta.load_session_token().await?;
        let client = ApiClient::builder(meta.api_url.as_str())
            .with_auth_token(token)
            .build()?;
        meta.attach_client(client);

        info!(api_url = %meta.api_url, "provider configured");
        *self.meta.write().await = Some(Arc::new(meta));
        Ok(Vec::new())
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        self.meta.write().await.take();
        info!("provider stopped");
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let mut diagnostics = validation::validate(&resource.schema(), &config);
        diagnostics.extend(resource.validate_config(&config));
        Ok(diagnostics)
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        Ok(plan_changes(
            &resource.schema(),
            prior_state.as_ref(),
            proposed_state,
        ))
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let meta = self.meta().await?;
        resource.create(&meta, planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let meta = self.meta().await?;
        resource.read(&meta, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let meta = self.meta().await?;
        resource.update(&meta, prior_state, planned_state).await
    }

    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        let meta = self.meta().await?;
        resource.delete(&meta, current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let meta = self.meta().await?;
        let state = resource.import(&meta, id).await?;
        Ok(vec![ImportedResource::new(resource.type_name(), state)])
    }
}
