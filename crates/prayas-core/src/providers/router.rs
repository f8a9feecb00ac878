//! Provider router: the gateway's single entry point

use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::config::{GatewayConfig, ProviderKind};
use crate::error::{GatewayError, Result};

use super::google::GoogleProvider;
use super::openai::OpenAiProvider;
use super::openai_compat::GroqProvider;
use super::types::{GenerationRequest, TextProvider};

/// Sent on every upstream request
pub const USER_AGENT: &str = "prayas";

/// Dispatches abstract generation requests to the configured provider.
///
/// Holds only an HTTP connection pool; configuration is supplied on every
/// call, so one gateway can be shared freely across tasks.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
}

impl Gateway {
    pub fn new() -> Result<Self> {
        let client = build_client(Client::builder().user_agent(USER_AGENT))?;
        Ok(Self { client })
    }

    /// Use a pre-built client (custom proxies, TLS roots, timeouts)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Build the strategy for the configured provider.
    ///
    /// Checks run in order: request shape, image support, API key. All of
    /// them happen before any network traffic.
    pub fn route(
        &self,
        config: &GatewayConfig,
        request: &GenerationRequest,
    ) -> Result<Box<dyn TextProvider>> {
        request.validate()?;

        let kind = config.active_provider;
        if request.image().is_some() && !kind.supports_images() {
            return Err(GatewayError::UnsupportedCapability { provider: kind });
        }

        let settings = config.settings(kind);
        let client = self.client.clone();
        let provider: Box<dyn TextProvider> = match kind {
            ProviderKind::OpenAi => Box::new(OpenAiProvider::from_settings(client, settings)?),
            ProviderKind::Groq => Box::new(GroqProvider::from_settings(client, settings)?),
            ProviderKind::Gemini => Box::new(GoogleProvider::from_settings(client, settings)?),
        };
        Ok(provider)
    }

    /// Generate text for `request` using the provider selected by `config`.
    ///
    /// Returns `""` when the upstream answered without text.
    pub async fn generate(
        &self,
        config: &GatewayConfig,
        request: &GenerationRequest,
    ) -> Result<String> {
        let provider = self.route(config, request)?;
        debug!(
            "Routing request to {} ({})",
            provider.kind(),
            provider.model()
        );
        provider.generate(request).await
    }

    /// Same as [`Gateway::generate`], re-reading the process environment on
    /// every call
    pub async fn generate_from_env(&self, request: &GenerationRequest) -> Result<String> {
        let config = GatewayConfig::from_env();
        self.generate(&config, request).await
    }
}

fn build_client(builder: ClientBuilder) -> Result<Client> {
    builder.build().map_err(GatewayError::HttpClient)
}
