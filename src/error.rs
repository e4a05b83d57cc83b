//! Error types for the SignalFx provider.

use thiserror::Error;

/// Errors that can occur while serving provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The provider was asked to act before `configure` attached its
    /// session state.
    #[error("Provider meta was not provided")]
    MetaNotProvided,

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An HTTP transport error occurred while talking to the SignalFx API.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The SignalFx API rejected a request.
    #[error("API request failed (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body, verbatim.
        message: String,
    },

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Get the error message as a string.
    ///
    /// Returns a reference to the error message for any variant.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::MetaNotProvided => "provider meta was not provided",
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Http(_err) => "http transport error (see Debug output)",
            Self::Api { message, .. } => message,
            Self::Unimplemented(msg) => msg,
        }
    }

    /// Whether this error means the remote object does not exist.
    ///
    /// Covers both the client-side [`ProviderError::NotFound`] and an API
    /// response with status 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("chart-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: chart-123");

        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");

        let err = ProviderError::UnknownResource("signalfx_custom".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: signalfx_custom");

        let err = ProviderError::MetaNotProvided;
        assert_eq!(format!("{}", err), "Provider meta was not provided");
    }

    #[test]
    fn test_api_error_display() {
        let err = ProviderError::Api {
            status: 400,
            message: "Bad input".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "API request failed (status 400): Bad input"
        );
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::NotFound("chart-123".to_string());
        assert_eq!(err.message(), "chart-123");

        let err = ProviderError::Configuration("invalid config".to_string());
        assert_eq!(err.message(), "invalid config");

        let err = ProviderError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.message(), "boom");

        let err = ProviderError::MetaNotProvided;
        assert_eq!(err.message(), "provider meta was not provided");
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProviderError::NotFound("gone".to_string()).is_not_found());
        assert!(ProviderError::Api {
            status: 404,
            message: "Not Found".to_string()
        }
        .is_not_found());

        assert!(!ProviderError::Api {
            status: 500,
            message: "server error".to_string()
        }
        .is_not_found());
        assert!(!ProviderError::MetaNotProvided.is_not_found());
    }

    #[test]
    fn test_serialization_error_from() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ProviderError = parse_err.into();
        assert!(matches!(err, ProviderError::Serialization(_)));
        assert!(format!("{}", err).starts_with("Serialization error:"));
    }
}
