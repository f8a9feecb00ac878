//! OpenAI chat-completions provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::{GatewayError, Result};

use super::response::{parse_body, read_response, transport_error};
use super::types::{GenerationRequest, TextProvider};

/// Speaks the OpenAI chat-completions wire format against a configurable base URL
pub struct OpenAiProvider {
    client: Client,
    kind: ProviderKind,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self::with_kind(client, ProviderKind::OpenAi, api_key, model, base_url)
    }

    /// Same wire format, attributed to another provider (used by Groq)
    pub(crate) fn with_kind(
        client: Client,
        kind: ProviderKind,
        api_key: String,
        model: String,
        base_url: String,
    ) -> Self {
        Self {
            client,
            kind,
            api_key,
            base_url,
            model,
        }
    }

    /// Build from configuration, failing when no key is set
    pub fn from_settings(client: Client, settings: &ProviderSettings) -> Result<Self> {
        let (api_key, model, base_url) = split_settings(ProviderKind::OpenAi, settings)?;
        Ok(Self::new(client, api_key, model, base_url))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// System instruction first, then the user prompt
    fn to_openai_body(&self, request: &GenerationRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: self.model.clone(),
            temperature: request.temperature,
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: request.system_instruction.clone(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
        }
    }

    /// First choice's text, or empty when the upstream left it out
    fn from_openai_response(resp: OpenAiApiResponse) -> String {
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}

/// Pull key, model and base URL out of settings for an OpenAI-shaped provider
pub(crate) fn split_settings(
    kind: ProviderKind,
    settings: &ProviderSettings,
) -> Result<(String, String, String)> {
    let api_key = settings
        .api_key()
        .ok_or(GatewayError::MissingCredential {
            provider: kind,
            env_var: kind.api_key_var(),
        })?
        .to_string();
    Ok((api_key, settings.model.clone(), settings.base_url.clone()))
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if request.image().is_some() {
            return Err(GatewayError::UnsupportedCapability {
                provider: self.kind,
            });
        }

        let body = self.to_openai_body(request);
        debug!(
            "{} request: model={}, messages={}",
            self.kind,
            self.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| transport_error(self.kind, source))?;

        let raw = read_response(self.kind, response).await?;
        let api_response: OpenAiApiResponse = parse_body(self.kind, &raw)?;
        debug!(
            "{} response: choices={}",
            self.kind,
            api_response.choices.len()
        );

        Ok(Self::from_openai_response(api_response))
    }
}

// ── OpenAI wire types ──

#[derive(Debug, Clone, Serialize)]
struct OpenAiRequest {
    model: String,
    temperature: f32,
    messages: Vec<OpenAiMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OpenAiApiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::Attachment;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn provider(base_url: &str) -> OpenAiProvider {
        OpenAiProvider::new(
            Client::new(),
            "sk-test".to_string(),
            "gpt-4o-mini".to_string(),
            base_url.to_string(),
        )
    }

    #[test]
    fn test_to_openai_body_orders_messages() {
        let p = provider("http://unused");
        let req = GenerationRequest::new("You are helpful.", "hello").with_temperature(0.25);
        let body = serde_json::to_value(p.to_openai_body(&req)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "temperature": 0.25,
                "messages": [
                    {"role": "system", "content": "You are helpful."},
                    {"role": "user", "content": "hello"}
                ]
            })
        );
    }

    #[test]
    fn test_from_openai_response_missing_content() {
        let resp: OpenAiApiResponse =
            serde_json::from_value(json!({"choices": [{"message": {"role": "assistant"}}]})).unwrap();
        assert_eq!(OpenAiProvider::from_openai_response(resp), "");

        let resp: OpenAiApiResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(OpenAiProvider::from_openai_response(resp), "");

        let resp: OpenAiApiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(OpenAiProvider::from_openai_response(resp), "");
    }

    #[test]
    fn test_from_settings_requires_key() {
        let settings = ProviderSettings::defaults(ProviderKind::OpenAi);
        let err = OpenAiProvider::from_settings(Client::new(), &settings).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::MissingCredential {
                provider: ProviderKind::OpenAi,
                env_var: "OPENAI_API_KEY"
            }
        ));
    }

    #[test]
    fn test_openai_provider_debug_hides_key() {
        let p = OpenAiProvider::new(
            Client::new(),
            "sk-secret-key".to_string(),
            "gpt-4o".to_string(),
            "https://api.openai.com/v1".to_string(),
        );
        let debug = format!("{:?}", p);
        assert!(!debug.contains("sk-secret-key"));
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-4o-mini"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"X"}}]}"#)
            .create_async()
            .await;

        let text = provider(&server.url())
            .generate(&GenerationRequest::new("sys", "hi"))
            .await
            .unwrap();
        assert_eq!(text, "X");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_upstream_error_keeps_status_and_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let err = provider(&server.url())
            .generate(&GenerationRequest::new("sys", "hi"))
            .await
            .unwrap_err();
        match err {
            GatewayError::Upstream {
                provider,
                status,
                body,
            } => {
                assert_eq!(provider, ProviderKind::OpenAi);
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_image_without_calling() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let req = GenerationRequest::new("sys", "hi")
            .with_attachment(Attachment::new("aGVsbG8=", "image/png"));
        let err = provider(&server.url()).generate(&req).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedCapability { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = provider(&server.url())
            .generate(&GenerationRequest::new("sys", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let err = provider("http://127.0.0.1:1")
            .generate(&GenerationRequest::new("sys", "hi"))
            .await
            .unwrap_err();
        match err {
            GatewayError::Transport { provider, source } => {
                assert_eq!(provider, ProviderKind::OpenAi);
                assert!(source.url().is_none());
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
