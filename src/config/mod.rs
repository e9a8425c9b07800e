//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! and an optional TOML file using the `config` and `dotenvy` crates. Environment
//! variables use the `SITE_COPILOT` prefix and `__` between nested keys; the file
//! path, if any, comes from `SITE_COPILOT_CONFIG`.
//!
//! # Example
//!
//! ```no_run
//! use site_copilot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Premium model: {}", config.ai.premium_model);
//! ```

mod ai;
mod error;
mod logging;
mod orchestration;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use orchestration::OrchestrationConfig;

use serde::Deserialize;
use std::path::Path;

use crate::application::OrchestratorSettings;

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_FILE_ENV: &str = "SITE_COPILOT_CONFIG";

/// Root application configuration
///
/// Load using [`AppConfig::load()`]; every section has defaults except the
/// API key, which [`AppConfig::validate()`] requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (OpenAI-compatible endpoint and models)
    #[serde(default)]
    pub ai: AiConfig,

    /// Orchestration timeouts and temperatures
    #[serde(default)]
    pub orchestration: OrchestrationConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the TOML file named by `SITE_COPILOT_CONFIG`, if set
    /// 3. Overlays environment variables with the `SITE_COPILOT` prefix,
    ///    `__` (double underscore) separating nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SITE_COPILOT__AI__OPENAI_API_KEY=sk-...` -> `ai.openai_api_key = ...`
    /// - `SITE_COPILOT__ORCHESTRATION__GENERATION_TIMEOUT_SECS=90`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or values cannot be
    /// parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = std::env::var(CONFIG_FILE_ENV).ok();
        Self::load_from(file.as_deref().map(Path::new))
    }

    /// Load configuration from an explicit file plus the environment
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("SITE_COPILOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing API key, a zero timeout, a
    /// temperature out of range or an unparseable log filter.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.orchestration.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Settings for the orchestration core
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            classification_timeout: self.orchestration.classification_timeout(),
            generation_timeout: self.orchestration.generation_timeout(),
            context_snippet_chars: self.orchestration.context_snippet_chars,
            specialist_temperature: self.orchestration.specialist_temperature,
            conversation_temperature: self.orchestration.conversation_temperature,
            classifier_model: Some(self.ai.compact_model.clone()),
            models: self.ai.tier_models(),
        }
    }
}
