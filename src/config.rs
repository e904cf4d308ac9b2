//! Configuration helpers for the tool agent SDK

use std::env;

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the provider endpoint.
pub const BASE_URL_ENV: &str = "TOOL_AGENT_BASE_URL";

/// Environment variable overriding the model id.
pub const MODEL_ENV: &str = "TOOL_AGENT_MODEL";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Output token budget used when none is configured.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Value sent in the `anthropic-version` header.
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Supported providers.
///
/// The wire format modeled by this crate is the Anthropic Messages API, so
/// there is a single variant. It is kept as an enum so configuration reads
/// the same way as `with_model(Provider::Anthropic, "...")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Anthropic,
}

impl Provider {
    /// Get the default base URL for this provider
    pub fn default_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Lowercase provider id
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
        }
    }

    /// Parse a provider from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Provider::Anthropic),
            _ => None,
        }
    }
}

/// Get the base URL from environment variable or provider default
///
/// Priority:
/// 1. TOOL_AGENT_BASE_URL environment variable
/// 2. Provider default URL (if provider is Some)
/// 3. fallback parameter
/// 4. Anthropic default
///
/// # Examples
///
/// ```rust,no_run
/// use tool_agent::{get_base_url, Provider};
///
/// let url = get_base_url(Some(Provider::Anthropic), None);
/// let url = get_base_url(None, Some("http://localhost:8080/v1"));
/// ```
pub fn get_base_url(provider: Option<Provider>, fallback: Option<&str>) -> String {
    if let Ok(url) = env::var(BASE_URL_ENV) {
        return url;
    }

    if let Some(p) = provider {
        return p.default_url().to_string();
    }

    fallback
        .unwrap_or(Provider::Anthropic.default_url())
        .to_string()
}

/// Get the model name from environment variable or fallback
///
/// Priority:
/// 1. TOOL_AGENT_MODEL environment variable (if prefer_env is true)
/// 2. fallback parameter
pub fn get_model(fallback: Option<&str>, prefer_env: bool) -> Option<String> {
    if prefer_env {
        if let Ok(model) = env::var(MODEL_ENV) {
            return Some(model);
        }
    }

    fallback.map(|s| s.to_string())
}

/// Read the provider credential from `ANTHROPIC_API_KEY`.
///
/// Empty values count as absent.
pub fn get_api_key() -> Option<String> {
    env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty())
}
