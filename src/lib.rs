//! Hemmer provider for SignalFx (Splunk Observability Cloud).
//!
//! The provider manages SignalFx chart resources over the REST API. The
//! host owns the plugin wire protocol and the state engine; this crate
//! supplies the [`ProviderService`] implementation the host drives.
//!
//! # Overview
//!
//! - **[`SignalFxProvider`]**: the provider, serving the
//!   `signalfx_log_view` resource type
//! - **[`Meta`]**: resolved credentials, endpoint URLs, and the shared
//!   API client, assembled once during `configure`
//! - **[`ApiClient`]**: a `reqwest` client for the session and chart
//!   endpoints
//! - **Schema types**: describe the provider config block and each
//!   resource, driving validation and the replace-or-update decision
//! - **[`testing`]**: a harness that runs the full resource lifecycle
//!   the way a host would
//!
//! # Quick Start
//!
//! ```ignore
//! use hemmer_provider_signalfx::{init_logging, ProviderService, SignalFxProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = SignalFxProvider::new();
//!     provider.configure(json!({"auth_token": "abc123"})).await?;
//!
//!     let state = provider
//!         .create("signalfx_log_view", json!({
//!             "name": "Service logs",
//!             "program_text": "logs().publish()"
//!         }))
//!         .await?;
//!     println!("created {}", state["url"]);
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The provider config block accepts `auth_token`, `api_url`,
//! `custom_app_url`, `email`, `password`, and `organization_id`. Empty
//! fields fall back to the `SFX_AUTH_TOKEN`, `SFX_API_URL`, and
//! `SFX_CUSTOM_APP_URL` environment variables, then to the public
//! SignalFx endpoints. Without an auth token, `configure` exchanges the
//! email/password pair for a session token via `POST /v2/session`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod logging;
pub mod meta;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::ApiClient;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use meta::Meta;
pub use provider::SignalFxProvider;
pub use resource::LOG_VIEW_TYPE;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for provider implementations
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
