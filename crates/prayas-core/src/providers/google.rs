//! Google Gemini provider
//!
//! The only multimodal provider, and the only one with a two-phase call:
//! a 404 on the configured model triggers model discovery and one retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::{GatewayError, Result};

use super::discovery::{self, GeminiModelList, ModelCatalogEntry};
use super::response::{parse_body, read_response, transport_error};
use super::types::{GenerationRequest, TextProvider};

/// Google Gemini provider
pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GoogleProvider {
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    pub fn from_settings(client: Client, settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings
            .api_key()
            .ok_or(GatewayError::MissingCredential {
                provider: ProviderKind::Gemini,
                env_var: ProviderKind::Gemini.api_key_var(),
            })?
            .to_string();
        Ok(Self::new(
            client,
            api_key,
            settings.model.clone(),
            settings.base_url.clone(),
        ))
    }

    /// `{base}/{path}?key={api_key}`
    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| {
            GatewayError::InvalidRequest(format!("invalid Gemini endpoint {}: {}", raw, e))
        })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// System instruction and prompt share one text part, the image (if any)
    /// follows as inline data
    fn to_gemini_body(request: &GenerationRequest) -> GeminiRequest {
        let mut parts = vec![GeminiPart::Text {
            text: format!(
                "{}\n\n{}",
                request.system_instruction, request.user_prompt
            ),
        }];
        if let Some(image) = request.image() {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    data: image.data.clone(),
                    mime_type: image.effective_mime_type().to_string(),
                },
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
            },
        }
    }

    /// `candidates[0].content.parts[0].text`, or empty
    fn from_gemini_response(resp: GeminiApiResponse) -> String {
        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }

    /// One generateContent call against a specific model
    async fn generate_with_model(&self, model: &str, request: &GenerationRequest) -> Result<String> {
        let url = self.endpoint(&format!("models/{}:generateContent", model))?;
        let body = Self::to_gemini_body(request);

        debug!(
            "Gemini request: model={}, parts={}",
            model,
            body.contents[0].parts.len()
        );

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|source| transport_error(ProviderKind::Gemini, source))?;

        let raw = read_response(ProviderKind::Gemini, response).await?;
        let api_response: GeminiApiResponse = parse_body(ProviderKind::Gemini, &raw)?;
        debug!(
            "Gemini response: candidates={}",
            api_response.candidates.len()
        );

        Ok(Self::from_gemini_response(api_response))
    }

    /// Fetch the models visible to this key
    pub async fn list_models(&self) -> Result<Vec<ModelCatalogEntry>> {
        let url = self.endpoint("models")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| transport_error(ProviderKind::Gemini, source))?;

        let raw = read_response(ProviderKind::Gemini, response).await?;
        let list: GeminiModelList = parse_body(ProviderKind::Gemini, &raw)?;
        debug!("Gemini models.list: models={}", list.models.len());
        Ok(list.into_catalog())
    }

    /// Discover a replacement for a model the upstream rejected.
    /// Returns `None` when discovery lands on the model that just failed.
    async fn resolve_fallback_model(&self) -> Result<Option<String>> {
        let catalog = self.list_models().await?;
        let resolved = discovery::select_fallback_model(&catalog)?;
        if resolved == self.model {
            debug!("Fallback resolution returned the failing model {}", resolved);
            return Ok(None);
        }
        Ok(Some(resolved))
    }
}

#[async_trait]
impl TextProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        match self.generate_with_model(&self.model, request).await {
            Err(err) if err.is_model_not_found() => {
                let Some(fallback) = self.resolve_fallback_model().await? else {
                    return Err(err);
                };
                debug!(
                    "Gemini model {} not found, retrying with {}",
                    self.model, fallback
                );
                self.generate_with_model(&fallback, request).await
            }
            other => other,
        }
    }
}

// ── Gemini wire types ──

#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
struct GeminiInlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GeminiApiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}
