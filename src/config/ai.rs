//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::ai_engine::TierModels;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key. Wrapped in a secret once handed to the adapter.
    pub openai_api_key: Option<String>,

    /// API base URL (OpenAI-compatible)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used at the compact tier and for classification
    #[serde(default = "default_compact_model")]
    pub compact_model: String,

    #[serde(default = "default_advanced_model")]
    pub advanced_model: String,

    #[serde(default = "default_premium_model")]
    pub premium_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn tier_models(&self) -> TierModels {
        TierModels {
            compact: Some(self.compact_model.clone()),
            advanced: Some(self.advanced_model.clone()),
            premium: Some(self.premium_model.clone()),
        }
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() {
            return Err(ValidationError::MissingRequired("SITE_COPILOT__AI__OPENAI_API_KEY"));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ai.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            compact_model: default_compact_model(),
            advanced_model: default_advanced_model(),
            premium_model: default_premium_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_compact_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_advanced_model() -> String {
    "gpt-4o".to_string()
}

fn default_premium_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    2
}
