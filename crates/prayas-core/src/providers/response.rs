//! Shared response-body handling for all providers

use serde::de::DeserializeOwned;

use crate::config::ProviderKind;
use crate::error::{GatewayError, Result};

/// Wrap a reqwest failure. The URL is dropped because Gemini carries the
/// API key in the query string.
pub(crate) fn transport_error(provider: ProviderKind, source: reqwest::Error) -> GatewayError {
    GatewayError::Transport {
        provider,
        source: source.without_url(),
    }
}

/// Read the body of a response.
///
/// A non-success status becomes `Upstream`; its body is best effort and an
/// unreadable one is reported as empty. On success a failed read (reset,
/// truncated body) is a transport error.
pub(crate) async fn read_response(provider: ProviderKind, response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Upstream {
            provider,
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    response
        .text()
        .await
        .map_err(|source| transport_error(provider, source))
}

/// Parse a success body. An empty body yields the type's default, so
/// missing fields end up as "no content" rather than an error.
pub(crate) fn parse_body<T>(provider: ProviderKind, raw: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(raw).map_err(|source| GatewayError::MalformedResponse { provider, source })
}
