//! Gateway configuration
//!
//! A [`GatewayConfig`] is an immutable snapshot of provider selection, keys,
//! models and endpoints. Callers build one per call (usually via
//! [`GatewayConfig::from_env`]) and hand it to the gateway, so configuration
//! changes are picked up on the next call without any caching.

use std::fmt;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Which upstream service handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Gemini,
    Groq,
}

impl ProviderKind {
    /// Parse a selection key. Anything other than `gemini` or `groq`
    /// (including absent or misspelled values) selects OpenAI.
    pub fn from_selection(value: Option<&str>) -> Self {
        match value {
            Some("gemini") => Self::Gemini,
            Some("groq") => Self::Groq,
            _ => Self::OpenAi,
        }
    }

    /// Canonical selection key, the inverse of [`ProviderKind::from_selection`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Groq => "groq",
        }
    }

    /// Only Gemini accepts inline image data
    pub fn supports_images(&self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// Environment variable that carries this provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }

    fn model_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_MODEL",
            Self::Gemini => "GEMINI_MODEL",
            Self::Groq => "GROQ_MODEL",
        }
    }

    fn base_url_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_BASE_URL",
            Self::Gemini => "GEMINI_BASE_URL",
            Self::Groq => "GROQ_BASE_URL",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::Groq => DEFAULT_GROQ_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => DEFAULT_OPENAI_BASE_URL,
            Self::Gemini => DEFAULT_GEMINI_BASE_URL,
            Self::Groq => DEFAULT_GROQ_BASE_URL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials and endpoint for one provider
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderSettings {
    /// Settings with the provider's default model and endpoint and no key
    pub fn defaults(kind: ProviderKind) -> Self {
        Self {
            api_key: None,
            model: kind.default_model().to_string(),
            base_url: kind.default_base_url().to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_empty(Some(api_key.into()));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The API key, if one is configured and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Immutable per-call configuration for the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub active_provider: ProviderKind,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub groq: ProviderSettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            active_provider: ProviderKind::default(),
            openai: ProviderSettings::defaults(ProviderKind::OpenAi),
            gemini: ProviderSettings::defaults(ProviderKind::Gemini),
            groq: ProviderSettings::defaults(ProviderKind::Groq),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    ///
    /// Recognized variables: `AI_PROVIDER`, `{OPENAI,GEMINI,GROQ}_API_KEY`,
    /// `{OPENAI,GEMINI,GROQ}_MODEL` and `{OPENAI,GEMINI,GROQ}_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));
        let settings = |kind: ProviderKind| ProviderSettings {
            api_key: get(kind.api_key_var()),
            model: get(kind.model_var()).unwrap_or_else(|| kind.default_model().to_string()),
            base_url: get(kind.base_url_var())
                .unwrap_or_else(|| kind.default_base_url().to_string()),
        };

        Self {
            active_provider: ProviderKind::from_selection(get("AI_PROVIDER").as_deref()),
            openai: settings(ProviderKind::OpenAi),
            gemini: settings(ProviderKind::Gemini),
            groq: settings(ProviderKind::Groq),
        }
    }

    pub fn with_active_provider(mut self, kind: ProviderKind) -> Self {
        self.active_provider = kind;
        self
    }

    pub fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Groq => &self.groq,
        }
    }

    pub fn settings_mut(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::Gemini => &mut self.gemini,
            ProviderKind::Groq => &mut self.groq,
        }
    }

    /// Settings of the currently selected provider
    pub fn active_settings(&self) -> &ProviderSettings {
        self.settings(self.active_provider)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Mask a secret for Debug output and logs.
/// Keeps the first 3 and last 4 chars of keys longer than 7 chars.
pub fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}
