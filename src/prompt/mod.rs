mod fallback;
mod openai;

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

pub use fallback::StaticPrompts;
pub use openai::OpenAiProvider;

/// Result type for prompt generation
pub type PromptResult<T> = Result<T, PromptError>;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Response parsing failed: {0}")]
    Parse(String),
}

/// Prompt categories a round draws from
pub const CATEGORIES: &[&str] = &["opinion", "sensory", "cultural", "player-based"];

/// Pick a category uniformly at random
pub fn pick_category() -> &'static str {
    let mut rng = rand::rng();
    CATEGORIES[rng.random_range(0..CATEGORIES.len())]
}

/// One base question plus subtly different variants for impostor seats.
/// `variants` may come back shorter than requested; the round controller
/// falls back to the base prompt for any unfilled seat.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub base: String,
    pub variants: Vec<String>,
}

/// Source of prompt sets for a round
#[async_trait]
pub trait PromptProvider: Send + Sync {
    async fn generate(&self, category: &str, impostor_count: usize) -> PromptResult<PromptSet>;

    fn name(&self) -> &str;
}

/// Configuration for the prompt provider stack
#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub timeout: Duration,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4.1-nano".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl PromptConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().and_then(|key| {
            let trimmed = key.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let openai_model = std::env::var("OPENAI_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "gpt-4.1-nano".to_string());

        Self {
            openai_api_key,
            openai_model,
            timeout: std::env::var("PROMPT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
        }
    }

    /// Build the provider for this configuration. Without an API key the
    /// built-in static banks serve every round.
    pub fn build_provider(&self) -> Arc<dyn PromptProvider> {
        match &self.openai_api_key {
            Some(api_key) => Arc::new(OpenAiProvider::new(
                api_key.clone(),
                self.openai_model.clone(),
                self.timeout,
            )),
            None => {
                tracing::warn!("OPENAI_API_KEY not set, using built-in prompt banks");
                Arc::new(StaticPrompts)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = PromptConfig::default();
        assert_eq!(config.openai_model, "gpt-4.1-nano");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_from_env_without_key_builds_static_provider() {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_MODEL");
        std::env::remove_var("PROMPT_TIMEOUT");

        let config = PromptConfig::from_env();
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.build_provider().name(), "static");
    }

    #[test]
    #[serial]
    fn test_from_env_reads_timeout() {
        std::env::set_var("PROMPT_TIMEOUT", "3");
        let config = PromptConfig::from_env();
        assert_eq!(config.timeout, Duration::from_secs(3));
        std::env::remove_var("PROMPT_TIMEOUT");
    }

    #[test]
    fn test_pick_category_is_known() {
        for _ in 0..20 {
            assert!(CATEGORIES.contains(&pick_category()));
        }
    }
}
