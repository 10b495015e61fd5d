use super::*;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::Deserialize;
use std::time::Instant;

/// OpenAI-backed prompt provider
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self {
            client,
            model,
            timeout,
        }
    }
}

/// Expected completion shape
#[derive(Debug, Deserialize)]
struct PromptSetPayload {
    base: String,
    variants: Vec<String>,
}

const SYSTEM_PROMPT: &str = "You are a prompt generator for a social deception party game. \
    Generate one main question that everyone answers, then alternate versions of that same \
    question that sound similar but may lead to different answers. \
    Respond with strict JSON only, no prose and no code fences, in this shape: \
    {\"base\": \"Main question here\", \"variants\": [\"Alt 1\", \"Alt 2\"]}";

#[async_trait]
impl PromptProvider for OpenAiProvider {
    async fn generate(&self, category: &str, impostor_count: usize) -> PromptResult<PromptSet> {
        let start = Instant::now();

        let user_content = format!(
            "Category: {}. Generate the main question and exactly {} variant question(s).",
            category, impostor_count
        );

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.8)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(|e| PromptError::Api(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_content)
                    .build()
                    .map_err(|e| PromptError::Api(e.to_string()))?
                    .into(),
            ])
            .build()
            .map_err(|e| PromptError::Api(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| PromptError::Timeout(self.timeout))?
            .map_err(|e| PromptError::Api(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PromptError::Parse("No content in response".to_string()))?;

        let payload: PromptSetPayload = serde_json::from_str(content.trim())
            .map_err(|e| PromptError::Parse(format!("Invalid prompt set JSON: {}", e)))?;

        if payload.base.trim().is_empty() {
            return Err(PromptError::Parse("Empty base prompt".to_string()));
        }

        tracing::debug!(
            "Generated prompt set for category '{}' in {}ms ({} variants)",
            category,
            start.elapsed().as_millis(),
            payload.variants.len()
        );

        Ok(PromptSet {
            base: payload.base,
            variants: payload.variants,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_parses_expected_shape() {
        let json = r#"{"base": "What's your comfort food?", "variants": ["What food comforts nobody?"]}"#;
        let payload: PromptSetPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.base, "What's your comfort food?");
        assert_eq!(payload.variants.len(), 1);
    }

    #[tokio::test]
    #[ignore] // Only run with actual API key
    async fn test_openai_generate() {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let provider = OpenAiProvider::new(
            api_key,
            "gpt-4.1-nano".to_string(),
            Duration::from_secs(30),
        );

        let set = provider.generate("opinion", 2).await.unwrap();

        assert!(!set.base.is_empty());
        println!("Base: {}", set.base);
        println!("Variants: {:?}", set.variants);
    }
}
