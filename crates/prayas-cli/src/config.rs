use anyhow::{Context, Result};
use prayas_core::{GatewayConfig, ProviderKind, ProviderSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// On-disk CLI configuration (`~/.prayas/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrayasConfig {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiConfig {
    /// `openai`, `gemini` or `groq`; anything else means openai
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: Option<ProviderEntry>,
    #[serde(default)]
    pub gemini: Option<ProviderEntry>,
    #[serde(default)]
    pub groq: Option<ProviderEntry>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderEntry {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field(
                "api_key",
                &self.api_key.as_deref().map(prayas_core::config::mask_secret),
            )
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderEntry {
    fn apply(&self, mut settings: ProviderSettings) -> ProviderSettings {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            settings = settings.with_api_key(key);
        }
        if let Some(model) = self.model.as_deref().filter(|m| !m.is_empty()) {
            settings = settings.with_model(model);
        }
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.is_empty()) {
            settings = settings.with_base_url(url);
        }
        settings
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".prayas")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

impl PrayasConfig {
    /// Load the config file, or `None` when no file exists at the default
    /// location. An explicit path that does not exist is an error.
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Option<Self>> {
        let path = match custom_path {
            Some(path) => path.clone(),
            None => {
                let path = default_config_path();
                if !path.exists() {
                    return Ok(None);
                }
                path
            }
        };
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read config at {}. Run `prayas init` first.",
                path.display()
            )
        })?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        for (name, entry) in config.providers.entries() {
            if let Some(key) = entry.api_key.as_deref() {
                if !key.is_empty() && !content_references_env(&content, name) {
                    warn!(
                        "{} API key is hardcoded in config file. For security, use environment variables: api_key = \"${{{}}}\"",
                        name,
                        name.api_key_var()
                    );
                }
            }
        }

        Ok(config)
    }

    /// Parse TOML after expanding allowlisted `${VAR}` references
    pub fn parse(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    /// Resolve into the gateway's per-call configuration. File values win;
    /// anything the file leaves out keeps the provider default.
    pub fn to_gateway_config(&self) -> GatewayConfig {
        let mut gateway = GatewayConfig::default().with_active_provider(
            ProviderKind::from_selection(self.ai.provider.as_deref()),
        );
        for (kind, entry) in self.providers.entries() {
            let settings = entry.apply(gateway.settings(kind).clone());
            *gateway.settings_mut(kind) = settings;
        }
        gateway
    }
}

impl ProvidersConfig {
    fn entries(&self) -> impl Iterator<Item = (ProviderKind, &ProviderEntry)> {
        [
            (ProviderKind::OpenAi, self.openai.as_ref()),
            (ProviderKind::Gemini, self.gemini.as_ref()),
            (ProviderKind::Groq, self.groq.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, entry)| entry.map(|e| (kind, e)))
    }
}

fn content_references_env(content: &str, kind: ProviderKind) -> bool {
    content.contains(&format!("${{{}}}", kind.api_key_var()))
}

/// Resolve the configuration for one invocation: the config file if there
/// is one, otherwise the environment. `--provider` overrides either.
pub fn resolve(custom_path: &Option<PathBuf>, provider: Option<&str>) -> Result<GatewayConfig> {
    let mut gateway = match PrayasConfig::load(custom_path)? {
        Some(file) => file.to_gateway_config(),
        None => GatewayConfig::from_env(),
    };
    if let Some(name) = provider {
        gateway = gateway.with_active_provider(ProviderKind::from_selection(Some(name)));
    }
    Ok(gateway)
}

/// Allowlist of environment variable names that may be expanded in config files.
const ALLOWED_ENV_VARS: &[&str] = &[
    "AI_PROVIDER",
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
    "OPENAI_BASE_URL",
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "GROQ_API_KEY",
    "GROQ_MODEL",
    "GROQ_BASE_URL",
    "HOME",
    "USER",
];

fn expand_env_vars(s: &str) -> String {
    expand_with(s, |name| std::env::var(name).ok())
}

fn expand_with<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = s.to_string();
    let mut pos = 0;
    while pos < result.len() {
        let Some(start) = result[pos..].find("${") else {
            break;
        };
        let abs_start = pos + start;
        let Some(end) = result[abs_start..].find('}') else {
            break;
        };
        let var_name = result[abs_start + 2..abs_start + end].to_string();

        if !ALLOWED_ENV_VARS.contains(&var_name.as_str()) {
            warn!(
                "Skipping expansion of unrecognized env var '{}' in config (not in allowlist)",
                var_name
            );
            pos = abs_start + end + 1;
            continue;
        }

        let value = lookup(&var_name).unwrap_or_default();
        let value_len = value.len();
        result = format!(
            "{}{}{}",
            &result[..abs_start],
            value,
            &result[abs_start + end + 1..]
        );
        pos = abs_start + value_len;
    }
    result
}
