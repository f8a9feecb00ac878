//! Gateway error taxonomy

use thiserror::Error;

use crate::config::ProviderKind;

/// Every way a `generate` call can fail.
///
/// Precondition failures (`InvalidRequest`, `UnsupportedCapability`,
/// `MissingCredential`) are raised before any network traffic.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{env_var} missing")]
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },

    #[error("image input only supported by the multimodal provider (active provider: {provider})")]
    UnsupportedCapability { provider: ProviderKind },

    #[error("{provider} error: {status}{}", body_suffix(.body))]
    Upstream {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("no model on this credential supports content generation")]
    NoUsableModel { provider: ProviderKind },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to reach {provider}")]
    Transport {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {provider} response")]
    MalformedResponse {
        provider: ProviderKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {}", body)
    }
}

impl GatewayError {
    /// Provider the failure is attributed to, when there is one
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            Self::MissingCredential { provider, .. }
            | Self::UnsupportedCapability { provider }
            | Self::Upstream { provider, .. }
            | Self::NoUsableModel { provider }
            | Self::Transport { provider, .. }
            | Self::MalformedResponse { provider, .. } => Some(*provider),
            Self::InvalidRequest(_) | Self::HttpClient(_) => None,
        }
    }

    /// HTTP status of an upstream rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream said the requested model does not exist (HTTP 404)
    pub fn is_model_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingCredential { .. })
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_env_var() {
        let err = GatewayError::MissingCredential {
            provider: ProviderKind::Gemini,
            env_var: "GEMINI_API_KEY",
        };
        assert_eq!(err.to_string(), "GEMINI_API_KEY missing");
        assert!(err.is_missing_credential());
        assert_eq!(err.provider(), Some(ProviderKind::Gemini));
    }

    #[test]
    fn test_upstream_display_includes_body() {
        let err = GatewayError::Upstream {
            provider: ProviderKind::Groq,
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "groq error: 429 - rate limited");
        assert_eq!(err.status(), Some(429));
        assert!(!err.is_model_not_found());
    }

    #[test]
    fn test_upstream_display_without_body() {
        let err = GatewayError::Upstream {
            provider: ProviderKind::Gemini,
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "gemini error: 404");
        assert!(err.is_model_not_found());
    }

    #[test]
    fn test_source_is_not_repeated_in_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let source_text = source.to_string();
        let err = GatewayError::MalformedResponse {
            provider: ProviderKind::OpenAi,
            source,
        };
        assert_eq!(err.to_string(), "failed to parse openai response");
        let chained = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(chained, Some(source_text));
    }

    #[test]
    fn test_invalid_request_has_no_provider() {
        let err = GatewayError::InvalidRequest("Message required".to_string());
        assert_eq!(err.provider(), None);
        assert_eq!(err.status(), None);
    }
}
