//! Provider gateway
//!
//! One abstract [`GenerationRequest`] in, plain text out. Providers implement
//! the [`TextProvider`] strategy and [`Gateway`] picks one per call from the
//! supplied [`GatewayConfig`](crate::config::GatewayConfig).

pub mod discovery;
pub mod google;
pub mod openai;
pub mod openai_compat;
mod response;
pub mod router;
pub mod types;

pub use discovery::{ModelCatalogEntry, select_fallback_model};
pub use google::GoogleProvider;
pub use openai::OpenAiProvider;
pub use openai_compat::GroqProvider;
pub use router::{Gateway, USER_AGENT};
pub use types::{Attachment, GenerationRequest, TextProvider};
