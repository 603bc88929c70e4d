//! Provider registry and factory.
//!
//! Maps provider names to concrete [`LlmProvider`] implementations.

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::AgentError;

/// Creates an [`LlmProvider`] based on the configured provider name.
///
/// # Supported Providers
///
/// - `"openai"` (default): `OpenAI` chat completions via `async-openai`
/// - `"gemini"`: Gemini through its `OpenAI`-compatible endpoint
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown provider names
/// and [`AgentError::ApiKeyMissing`] when no key is configured.
pub fn create_provider(config: &AgentConfig) -> Result<Box<dyn LlmProvider>, AgentError> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(config, "openai")?)),
        "gemini" => Ok(Box::new(OpenAiProvider::new(config, "gemini")?)),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}
