//! prayas-core - AI provider gateway for the Prayas study companion
//!
//! This crate provides:
//! - A gateway that turns one abstract text-generation request into a call to
//!   OpenAI, Groq or Gemini and normalizes the answer to plain text
//! - Gemini model discovery with a single fallback retry when the configured
//!   model is not found
//! - Per-call configuration read from the environment or built explicitly
//! - Request builders for the mentor, affirmation and answer-evaluator features

pub mod config;
pub mod error;
pub mod providers;
pub mod study;

pub use config::{GatewayConfig, ProviderKind, ProviderSettings};
pub use error::{GatewayError, Result};
pub use providers::{Attachment, Gateway, GenerationRequest, ModelCatalogEntry, TextProvider};
pub use study::MentorMode;
