//! Thin HTTP client for the SignalFx REST API.
//!
//! The provider only needs a small slice of the API surface: session token
//! exchange and chart CRUD. Everything here speaks the API's camelCase JSON
//! and millisecond timestamps; translating those into resource state is the
//! job of the resource modules.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::ProviderError;

/// Header carrying the session or org token on authenticated requests.
pub const AUTH_HEADER: &str = "X-SF-TOKEN";

/// Chart type the API uses for log views.
pub const LOGS_CHART_TYPE: &str = "LogsChart";

const DEFAULT_USER_AGENT: &str = concat!("hemmer-provider-signalfx/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials for a session token exchange (`POST /v2/session`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionTokenRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Organization to scope the session to. Omitted from the request when
    /// empty; the API then picks the account's default organization.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organization_id: String,
}

/// Session created by the API in exchange for credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionToken {
    /// Token to present in the [`AUTH_HEADER`] header.
    pub access_token: String,
}

/// Body of `POST /v2/chart` and `PUT /v2/chart/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartRequest {
    /// Display name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// SignalFlow program backing the chart.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub program_text: String,
    /// Visualization options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChartOptions>,
}

/// Chart visualization options.
///
/// Only the fields the log view resource reads and writes are modeled; the
/// API accepts and returns more, which serde ignores on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartOptions {
    /// Chart type discriminator, e.g. [`LOGS_CHART_TYPE`].
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub chart_type: String,
    /// Log observer connection the chart queries.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_connection: String,
    /// Table columns, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ChartColumn>,
    /// Sort order applied to the table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_options: Vec<ChartSortOption>,
    /// Time window the chart displays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<ChartTime>,
}

/// One column of a log view table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartColumn {
    /// Log field the column displays.
    pub name: String,
}

/// Sort applied to a log view table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartSortOption {
    /// Sort descending instead of ascending.
    pub descending: bool,
    /// Log field to sort by.
    pub field: String,
}

/// Time window of a chart. All timestamps and ranges are in milliseconds,
/// which is the API convention; resource state uses seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartTime {
    /// Either `"relative"` or `"absolute"`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub time_type: String,
    /// Length of a relative window, in milliseconds before now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<i64>,
    /// Start of an absolute window, Unix milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// End of an absolute window, Unix milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl ChartTime {
    /// A relative window covering the last `range_millis` milliseconds.
    pub fn relative(range_millis: i64) -> Self {
        Self {
            time_type: "relative".to_string(),
            range: Some(range_millis),
            ..Self::default()
        }
    }

    /// An absolute window between two Unix-millisecond timestamps.
    pub fn absolute(start_millis: i64, end_millis: i64) -> Self {
        Self {
            time_type: "absolute".to_string(),
            start: Some(start_millis),
            end: Some(end_millis),
            ..Self::default()
        }
    }
}

/// A chart as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chart {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// SignalFlow program backing the chart.
    pub program_text: String,
    /// Visualization options.
    pub options: Option<ChartOptions>,
}

/// Builder for [`ApiClient`].
#[derive(Clone)]
pub struct ApiClientBuilder {
    api_url: String,
    auth_token: String,
    user_agent: String,
    timeout: Duration,
}

impl ApiClientBuilder {
    /// Attach the token sent in the [`AUTH_HEADER`] header. A client built
    /// without a token can still call [`ApiClient::create_session_token`].
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Override the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the per-request timeout (default 5 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client, validating the API URL up front.
    pub fn build(self) -> Result<ApiClient, ProviderError> {
        let base_url = self.api_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| {
            ProviderError::Configuration(format!("invalid api url {:?}: {}", self.api_url, err))
        })?;
        let http = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .build()?;
        Ok(ApiClient {
            http,
            base_url,
            auth_token: self.auth_token,
        })
    }
}

impl fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Async client for the SignalFx REST API.
///
/// Cheap to clone behind an `Arc`; the underlying connection pool is shared.
/// The client holds no interior mutability, so concurrent requests need no
/// locking.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl ApiClient {
    /// Start building a client against `api_url`, e.g.
    /// `https://api.signalfx.com` or a realm endpoint.
    pub fn builder(api_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            api_url: api_url.into(),
            auth_token: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The API base URL this client talks to, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange email/password credentials for a session token.
    pub async fn create_session_token(
        &self,
        request: &SessionTokenRequest,
    ) -> Result<SessionToken, ProviderError> {
        debug!(email = %request.email, "requesting session token");
        let response = self
            .request(Method::POST, "/v2/session")
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Create a chart and return it with its server-assigned id.
    pub async fn create_chart(&self, request: &ChartRequest) -> Result<Chart, ProviderError> {
        debug!(name = %request.name, "creating chart");
        let response = self
            .request(Method::POST, "/v2/chart")
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Fetch a chart by id.
    pub async fn get_chart(&self, id: &str) -> Result<Chart, ProviderError> {
        debug!(id = %id, "fetching chart");
        let response = self
            .request(Method::GET, &format!("/v2/chart/{}", id))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Replace a chart's definition.
    pub async fn update_chart(
        &self,
        id: &str,
        request: &ChartRequest,
    ) -> Result<Chart, ProviderError> {
        debug!(id = %id, "updating chart");
        let response = self
            .request(Method::PUT, &format!("/v2/chart/{}", id))
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Delete a chart by id.
    pub async fn delete_chart(&self, id: &str) -> Result<(), ProviderError> {
        debug!(id = %id, "deleting chart");
        let response = self
            .request(Method::DELETE, &format!("/v2/chart/{}", id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if !self.auth_token.is_empty() {
            builder = builder.header(AUTH_HEADER, &self.auth_token);
        }
        builder
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    async fn api_error(response: Response) -> ProviderError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable response body>".to_string());
        if status == StatusCode::NOT_FOUND {
            ProviderError::NotFound(message)
        } else {
            ProviderError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
