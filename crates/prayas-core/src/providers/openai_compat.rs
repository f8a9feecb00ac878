//! Groq provider
//!
//! Groq exposes the OpenAI chat-completions wire format on its own host, so
//! this wraps [`OpenAiProvider`] and only changes attribution and defaults.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::Result;

use super::openai::{OpenAiProvider, split_settings};
use super::types::{GenerationRequest, TextProvider};

pub struct GroqProvider {
    inner: OpenAiProvider,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field("inner", &self.inner)
            .finish()
    }
}

impl GroqProvider {
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            inner: OpenAiProvider::with_kind(client, ProviderKind::Groq, api_key, model, base_url),
        }
    }

    pub fn from_settings(client: Client, settings: &ProviderSettings) -> Result<Self> {
        let (api_key, model, base_url) = split_settings(ProviderKind::Groq, settings)?;
        Ok(Self::new(client, api_key, model, base_url))
    }
}

#[async_trait]
impl TextProvider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.inner.generate(request).await
    }
}
