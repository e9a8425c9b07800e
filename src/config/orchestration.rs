//! Orchestration configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timeouts and sampling settings of the orchestration core
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestrationConfig {
    /// Timeout for intent, sub-task, sufficiency and corpus selection calls
    #[serde(default = "default_classification_timeout")]
    pub classification_timeout_secs: u64,

    /// Timeout for specialist generation
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Characters of the last AI reply given to intent detection
    #[serde(default = "default_snippet_chars")]
    pub context_snippet_chars: usize,

    /// How long a corpus listing is reused
    #[serde(default = "default_corpus_ttl")]
    pub corpus_cache_ttl_secs: u64,

    #[serde(default = "default_specialist_temperature")]
    pub specialist_temperature: f32,

    #[serde(default = "default_conversation_temperature")]
    pub conversation_temperature: f32,
}

impl OrchestrationConfig {
    pub fn classification_timeout(&self) -> Duration {
        Duration::from_secs(self.classification_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn corpus_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.corpus_cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.classification_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("orchestration.classification_timeout_secs"));
        }
        if self.generation_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("orchestration.generation_timeout_secs"));
        }
        for (field, value) in [
            ("orchestration.specialist_temperature", self.specialist_temperature),
            ("orchestration.conversation_temperature", self.conversation_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ValidationError::InvalidTemperature { field, value });
            }
        }
        Ok(())
    }
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            classification_timeout_secs: default_classification_timeout(),
            generation_timeout_secs: default_generation_timeout(),
            context_snippet_chars: default_snippet_chars(),
            corpus_cache_ttl_secs: default_corpus_ttl(),
            specialist_temperature: default_specialist_temperature(),
            conversation_temperature: default_conversation_temperature(),
        }
    }
}

fn default_classification_timeout() -> u64 {
    20
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_snippet_chars() -> usize {
    500
}

fn default_corpus_ttl() -> u64 {
    300
}

fn default_specialist_temperature() -> f32 {
    0.2
}

fn default_conversation_temperature() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestrationConfig::default();
        assert_eq!(config.classification_timeout(), Duration::from_secs(20));
        assert_eq!(config.generation_timeout(), Duration::from_secs(120));
        assert_eq!(config.context_snippet_chars, 500);
        assert_eq!(config.corpus_cache_ttl(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = OrchestrationConfig {
            generation_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("orchestration.generation_timeout_secs"))
        );
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let config = OrchestrationConfig {
            conversation_temperature: 2.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTemperature { field: "orchestration.conversation_temperature", .. })
        ));
    }
}
