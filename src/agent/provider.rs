//! Pluggable reasoning-service trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls, keeping the planner and synthesizer
//! decoupled from any particular LLM vendor.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for reasoning-service backends.
///
/// The contract is "submit a prompt, receive a completion". Prompt
/// construction and completion parsing stay with the callers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`, `"gemini"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or timeouts.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
