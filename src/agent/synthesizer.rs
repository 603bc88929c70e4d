//! Synthesizer role.
//!
//! Combines the query and every step result into one answer. The prompt
//! is built deterministically from the results in plan order; the
//! completion is returned verbatim.

use async_trait::async_trait;
use tracing::info;

use super::config::AgentConfig;
use super::prompt::build_synthesizer_prompt;
use super::provider::LlmProvider;
use super::traits::{AgentResponse, ReasoningAgent};
use crate::core::StepResult;
use crate::error::AgentError;

/// Role that writes the final answer.
pub struct SynthesizerAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl SynthesizerAgent {
    /// Creates a synthesizer with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.synthesizer_model.clone(),
            max_tokens: config.synthesizer_max_tokens,
            system_prompt,
        }
    }

    /// Synthesizes the final answer from `results`.
    ///
    /// Failed steps are included as explicit markers, so a partial answer
    /// is still produced when some steps failed.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Synthesis`] if the service call fails.
    pub async fn synthesize(
        &self,
        provider: &dyn LlmProvider,
        query: &str,
        results: &[StepResult],
    ) -> Result<(String, AgentResponse), AgentError> {
        let user_msg = build_synthesizer_prompt(query, results);
        info!(
            results = results.len(),
            failed = results.iter().filter(|r| !r.outcome.is_success()).count(),
            "synthesis issued"
        );
        let response = self
            .execute(provider, &user_msg)
            .await
            .map_err(|e| AgentError::Synthesis {
                message: e.to_string(),
            })?;
        Ok((response.content.clone(), response))
    }
}

#[async_trait]
impl ReasoningAgent for SynthesizerAgent {
    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
