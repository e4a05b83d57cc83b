//! Provider configuration and session state.
//!
//! [`Meta`] is the state `configure` assembles once and every resource
//! operation borrows afterwards: resolved credentials, endpoint URLs, and
//! the shared API client. It is deserialized straight from the provider
//! config block, then filled in from environment fallbacks and defaults
//! before validation.

use std::env;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

use crate::client::{ApiClient, SessionTokenRequest};
use crate::error::ProviderError;

/// Environment variable consulted when `auth_token` is not configured.
pub const AUTH_TOKEN_ENV: &str = "SFX_AUTH_TOKEN";

/// Environment variable consulted when `api_url` is not configured.
pub const API_URL_ENV: &str = "SFX_API_URL";

/// Environment variable consulted when `custom_app_url` is not configured.
pub const CUSTOM_APP_URL_ENV: &str = "SFX_CUSTOM_APP_URL";

/// API endpoint used when neither config nor environment supplies one.
pub const DEFAULT_API_URL: &str = "https://api.signalfx.com";

/// Application URL used when neither config nor environment supplies one.
pub const DEFAULT_CUSTOM_APP_URL: &str = "https://app.signalfx.com";

/// Resolved provider configuration shared by all resource operations.
///
/// Field names match the provider config block one to one, so a `Meta` can
/// be deserialized directly from the `configure` payload. The API client is
/// attached separately once a session token is available; it never comes
/// from config.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Org or session token presented in the `X-SF-TOKEN` header.
    pub auth_token: String,
    /// Base URL of the REST API, e.g. `https://api.eu0.signalfx.com`.
    pub api_url: String,
    /// Base URL of the web application, used to build deep links.
    pub custom_app_url: String,
    /// Account email, used with `password` when `auth_token` is unset.
    pub email: String,
    /// Account password, used with `email` when `auth_token` is unset.
    pub password: String,
    /// Organization to scope email/password sessions to.
    pub organization_id: String,
    #[serde(skip)]
    client: Option<Arc<ApiClient>>,
}

impl Meta {
    /// Fill empty credential and URL fields from `SFX_*` environment
    /// variables.
    pub fn with_env_fallbacks(self) -> Self {
        self.with_env_lookup(|key| env::var(key).ok())
    }

    fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fallback(&mut self.auth_token, lookup(AUTH_TOKEN_ENV));
        fallback(&mut self.api_url, lookup(API_URL_ENV));
        fallback(&mut self.custom_app_url, lookup(CUSTOM_APP_URL_ENV));
        self
    }

    /// Fill empty URL fields with the public SignalFx endpoints.
    pub fn with_defaults(mut self) -> Self {
        if self.api_url.is_empty() {
            self.api_url = DEFAULT_API_URL.to_string();
        }
        if self.custom_app_url.is_empty() {
            self.custom_app_url = DEFAULT_CUSTOM_APP_URL.to_string();
        }
        self
    }

    /// Attach the API client built for this session.
    pub fn attach_client(&mut self, client: ApiClient) {
        self.client = Some(Arc::new(client));
    }

    /// The shared API client.
    ///
    /// Fails with [`ProviderError::MetaNotProvided`] when `configure` has
    /// not attached one, which is logged rather than panicked so a
    /// mis-sequenced host call surfaces as a diagnosable error.
    pub fn client(&self) -> Result<Arc<ApiClient>, ProviderError> {
        match &self.client {
            Some(client) => Ok(Arc::clone(client)),
            None => {
                error!("provider meta has no attached api client");
                Err(ProviderError::MetaNotProvided)
            }
        }
    }

    /// Return a token usable in the `X-SF-TOKEN` header.
    ///
    /// A configured `auth_token` is returned as-is. Otherwise the
    /// email/password credentials are exchanged for a fresh session token
    /// against `api_url`; any exchange failure is surfaced unchanged.
    pub async fn load_session_token(&self) -> Result<String, ProviderError> {
        if !self.auth_token.is_empty() {
            return Ok(self.auth_token.clone());
        }
        let client = ApiClient::builder(self.api_url.as_str()).build()?;
        let session = client
            .create_session_token(&SessionTokenRequest {
                email: self.email.clone(),
                password: self.password.clone(),
                organization_id: self.organization_id.clone(),
            })
            .await?;
        info!("created new session token");
        Ok(session.access_token)
    }

    /// Every configuration violation, one message per violation.
    ///
    /// The provider needs either an auth token or an email/password pair,
    /// and an API URL. All failures are reported together rather than
    /// stopping at the first.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.auth_token.is_empty() && (self.email.is_empty() || self.password.is_empty()) {
            errors.push("missing auth token or email and password".to_string());
        }
        if self.api_url.is_empty() {
            errors.push("api url is not set".to_string());
        }
        errors
    }

    /// Like [`Meta::validation_errors`], folded into a single
    /// [`ProviderError::Configuration`].
    pub fn validate(&self) -> Result<(), ProviderError> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Configuration(errors.join("; ")))
        }
    }

    /// Build a deep link into the web application.
    ///
    /// The fragments are joined with `/` into the URL fragment, and the
    /// path is given a trailing `/` so the fragment resolves against the
    /// application root. An unparseable `custom_app_url` yields an empty
    /// string, logged as an error; link building is best-effort and must
    /// not fail an apply.
    pub fn load_application_url(&self, fragments: &[&str]) -> String {
        let mut url = match Url::parse(&self.custom_app_url) {
            Ok(url) => url,
            Err(err) => {
                error!(custom_app_url = %self.custom_app_url, %err, "failed to parse custom app url");
                return String::new();
            }
        };
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let fragment = fragments
            .iter()
            .copied()
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        if fragment.is_empty() {
            url.set_fragment(None);
        } else {
            url.set_fragment(Some(&fragment));
        }
        url.to_string()
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("auth_token", &redacted(&self.auth_token))
            .field("api_url", &self.api_url)
            .field("custom_app_url", &self.custom_app_url)
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .field("organization_id", &self.organization_id)
            .field("client", &self.client.is_some())
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

fn fallback(value: &mut String, from_env: Option<String>) {
    if value.is_empty() {
        if let Some(from_env) = from_env.filter(|v| !v.is_empty()) {
            *value = from_env;
        }
    }
}
