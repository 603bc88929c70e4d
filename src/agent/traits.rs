//! Reasoning role trait.
//!
//! The planner and synthesizer implement this trait, which gives them a
//! uniform way to turn a user message into a completion.

use async_trait::async_trait;

use super::message::{ChatRequest, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from a reasoning role.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The completion text.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// A role with a fixed system prompt and model configuration.
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    /// Role name for logging.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this role.
    fn model(&self) -> &str;

    /// System prompt that defines the role.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature.
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Builds the request this role sends for `user_msg`.
    fn request(&self, user_msg: &str) -> ChatRequest {
        ChatRequest {
            model: self.model().to_string(),
            messages: vec![system_message(self.system_prompt()), user_message(user_msg)],
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
        }
    }

    /// Sends `user_msg` to the provider under this role's system prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let response = provider.chat(&self.request(user_msg)).await?;

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}
