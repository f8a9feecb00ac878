//! Provider-agnostic request type and the strategy trait every provider implements

use async_trait::async_trait;

use crate::config::ProviderKind;
use crate::error::{GatewayError, Result};

pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Inline image sent alongside the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Base64-encoded bytes
    pub data: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Mime type to put on the wire; empty falls back to JPEG
    pub fn effective_mime_type(&self) -> &str {
        if self.mime_type.is_empty() {
            DEFAULT_IMAGE_MIME_TYPE
        } else {
            &self.mime_type
        }
    }
}

/// One abstract "generate text" call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub attachment: Option<Attachment>,
}

impl GenerationRequest {
    pub fn new(system_instruction: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_prompt: user_prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            attachment: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// The attachment, ignoring one that carries no data
    pub fn image(&self) -> Option<&Attachment> {
        self.attachment.as_ref().filter(|a| !a.data.is_empty())
    }

    /// Check the caller-side invariants before anything leaves the process
    pub fn validate(&self) -> Result<()> {
        if self.system_instruction.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "system instruction must not be empty".to_string(),
            ));
        }
        if self.user_prompt.is_empty() && self.image().is_none() {
            return Err(GatewayError::InvalidRequest(
                "prompt may only be empty when an image is attached".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait that all upstream text providers implement
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Model identifier the provider was configured with
    fn model(&self) -> &str;

    /// Whether requests may carry an inline image
    fn supports_images(&self) -> bool {
        self.kind().supports_images()
    }

    /// Run the request and return the generated text, or `""` when the
    /// upstream answered without any
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
