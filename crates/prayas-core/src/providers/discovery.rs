//! Gemini model catalog and fallback model selection
//!
//! When the configured Gemini model is rejected with a 404, the provider
//! lists the models available to its key and picks a replacement here.

use serde::Deserialize;

use crate::config::ProviderKind;
use crate::error::{GatewayError, Result};

/// Capability token a model must advertise to be usable for generation
pub const GENERATE_CONTENT: &str = "generateContent";

/// Preferred models, newest first and flash before pro within a generation.
/// Matched by substring against the raw upstream name.
pub const PREFERRED_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-2.5-pro",
    "gemini-2.0-pro",
    "gemini-1.5-pro",
    "gemini-pro",
    "gemini",
];

const MODEL_PREFIX: &str = "models/";

/// One entry of the upstream model list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalogEntry {
    /// Raw identifier, e.g. `models/gemini-2.0-flash`
    pub name: String,
    pub supports_generation: bool,
}

/// Pick the model to retry with.
///
/// Only generation-capable entries with a name are considered. Each
/// preferred token is tried in order against the candidates in upstream
/// order; if none matches, the first candidate wins. The `models/` prefix
/// is stripped from the result.
pub fn select_fallback_model(catalog: &[ModelCatalogEntry]) -> Result<String> {
    let candidates: Vec<&str> = catalog
        .iter()
        .filter(|m| m.supports_generation && !m.name.is_empty())
        .map(|m| m.name.as_str())
        .collect();

    let first = candidates.first().ok_or(GatewayError::NoUsableModel {
        provider: ProviderKind::Gemini,
    })?;

    let chosen = PREFERRED_MODELS
        .iter()
        .find_map(|pref| candidates.iter().find(|name| name.contains(pref)))
        .unwrap_or(first);

    Ok(strip_model_prefix(chosen).to_string())
}

/// `models/gemini-pro` → `gemini-pro`
pub fn strip_model_prefix(name: &str) -> &str {
    name.strip_prefix(MODEL_PREFIX).unwrap_or(name)
}

// ── Gemini models.list wire types ──

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeminiModelList {
    #[serde(default)]
    pub(crate) models: Vec<GeminiModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeminiModel {
    pub(crate) name: Option<String>,
    #[serde(rename = "supportedGenerationMethods", default)]
    pub(crate) supported_generation_methods: Vec<String>,
}

impl GeminiModelList {
    pub(crate) fn into_catalog(self) -> Vec<ModelCatalogEntry> {
        self.models.into_iter().map(GeminiModel::into_entry).collect()
    }
}

impl GeminiModel {
    fn into_entry(self) -> ModelCatalogEntry {
        let supports_generation = self
            .supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT);
        ModelCatalogEntry {
            name: self.name.unwrap_or_default(),
            supports_generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, generates: bool) -> ModelCatalogEntry {
        ModelCatalogEntry {
            name: name.to_string(),
            supports_generation: generates,
        }
    }

    #[test]
    fn test_priority_beats_list_order() {
        let catalog = vec![
            entry("models/gemini-1.5-flash", true),
            entry("models/gemini-2.0-flash", true),
        ];
        assert_eq!(select_fallback_model(&catalog).unwrap(), "gemini-2.0-flash");
    }

    #[test]
    fn test_flash_preferred_over_newer_pro() {
        let catalog = vec![
            entry("models/gemini-2.5-pro", true),
            entry("models/gemini-1.5-flash-latest", true),
        ];
        assert_eq!(
            select_fallback_model(&catalog).unwrap(),
            "gemini-1.5-flash-latest"
        );
    }

    #[test]
    fn test_same_token_keeps_list_order() {
        let catalog = vec![
            entry("models/gemini-2.0-flash-lite", true),
            entry("models/gemini-2.0-flash", true),
        ];
        assert_eq!(
            select_fallback_model(&catalog).unwrap(),
            "gemini-2.0-flash-lite"
        );
    }

    #[test]
    fn test_generic_gemini_match() {
        let catalog = vec![
            entry("models/custom-model", true),
            entry("models/gemini-exp-1206", true),
        ];
        assert_eq!(select_fallback_model(&catalog).unwrap(), "gemini-exp-1206");
    }

    #[test]
    fn test_no_preferred_match_takes_first() {
        let catalog = vec![entry("models/custom-model", true), entry("models/other", true)];
        assert_eq!(select_fallback_model(&catalog).unwrap(), "custom-model");
    }

    #[test]
    fn test_non_generating_models_are_skipped() {
        let catalog = vec![
            entry("models/gemini-2.5-flash", false),
            entry("models/embedding-001", false),
            entry("models/custom-model", true),
        ];
        assert_eq!(select_fallback_model(&catalog).unwrap(), "custom-model");
    }

    #[test]
    fn test_no_generating_models() {
        let catalog = vec![entry("models/embedding-001", false)];
        let err = select_fallback_model(&catalog).unwrap_err();
        assert!(matches!(err, GatewayError::NoUsableModel { .. }));
        assert!(select_fallback_model(&[]).is_err());
    }

    #[test]
    fn test_unnamed_entries_are_skipped() {
        let catalog = vec![entry("", true)];
        assert!(matches!(
            select_fallback_model(&catalog),
            Err(GatewayError::NoUsableModel { .. })
        ));
    }

    #[test]
    fn test_strip_model_prefix() {
        assert_eq!(strip_model_prefix("models/gemini-pro"), "gemini-pro");
        assert_eq!(strip_model_prefix("gemini-pro"), "gemini-pro");
    }

    #[test]
    fn test_catalog_from_wire() {
        let list: GeminiModelList = serde_json::from_str(
            r#"{"models":[
                {"name":"models/gemini-2.0-flash","supportedGenerationMethods":["generateContent","countTokens"]},
                {"name":"models/embedding-001","supportedGenerationMethods":["embedContent"]},
                {"name":"models/aqa"}
            ]}"#,
        )
        .unwrap();
        let catalog = list.into_catalog();
        assert_eq!(catalog.len(), 3);
        assert!(catalog[0].supports_generation);
        assert!(!catalog[1].supports_generation);
        assert!(!catalog[2].supports_generation);
    }
}
