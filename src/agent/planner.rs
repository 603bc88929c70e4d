//! Planner role.
//!
//! Turns a user query and the discovered agents into an ordered list of
//! [`PlanStep`]s. The completion is loosely structured: the plan is the
//! JSON array found between the first `[` and the last `]`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::config::AgentConfig;
use super::prompt::build_planner_prompt;
use super::provider::LlmProvider;
use super::traits::{AgentResponse, ReasoningAgent};
use crate::acp::AgentDescriptor;
use crate::core::PlanStep;
use crate::error::AgentError;

/// Role that plans which agents to ask, and what.
pub struct PlannerAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

/// A step as the model writes it, before validation.
#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default, alias = "agent")]
    agent_name: Option<String>,
    #[serde(default)]
    question: Option<String>,
}

impl PlannerAgent {
    /// Creates a planner with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.planner_model.clone(),
            max_tokens: config.planner_max_tokens,
            system_prompt,
        }
    }

    /// Asks the reasoning service for a plan and parses it.
    ///
    /// Agent names are not checked against `agents`; unknown names surface
    /// as failed steps at execution time.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Planning`] if the service call fails or the
    /// completion does not hold a valid plan. Not retried.
    pub async fn plan(
        &self,
        provider: &dyn LlmProvider,
        query: &str,
        agents: &[AgentDescriptor],
    ) -> Result<(Vec<PlanStep>, AgentResponse), AgentError> {
        let user_msg = build_planner_prompt(query, agents);
        let response = self
            .execute(provider, &user_msg)
            .await
            .map_err(|e| AgentError::Planning {
                message: format!("reasoning service call failed: {e}"),
                raw: String::new(),
            })?;

        let steps = parse_plan(&response.content).inspect_err(|e| {
            warn!(error = %e, "planner completion rejected");
        })?;
        debug!(steps = steps.len(), "plan parsed");
        Ok((steps, response))
    }
}

/// Returns the slice from the first `[` to the last `]`, inclusive.
#[must_use]
pub fn extract_step_list(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    (start < end).then(|| &content[start..=end])
}

/// Parses a planner completion into validated steps.
///
/// Accepts surrounding prose and code fences. Each step needs a non-blank
/// `agent_name` (or `agent`) and `question`; values are trimmed and extra
/// keys are ignored.
///
/// # Errors
///
/// Returns [`AgentError::Planning`] carrying `content` verbatim when no
/// bracketed list is found, the list is not valid JSON, a step is
/// or incomplete. An empty list is a valid plan with no steps.
pub fn parse_plan(content: &str) -> Result<Vec<PlanStep>, AgentError> {
    let fail = |message: String| AgentError::Planning {
        message,
        raw: content.to_string(),
    };

    let list = extract_step_list(content)
        .ok_or_else(|| fail("completion contains no JSON array".to_string()))?;

    let raw: Vec<RawStep> =
        serde_json::from_str(list).map_err(|e| fail(format!("invalid plan JSON: {e}")))?;

    raw.into_iter()
        .enumerate()
        .map(|(i, step)| {
            let agent_name = step
                .agent_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| fail(format!("step {} has no agent_name", i + 1)))?;
            let question = step
                .question
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| fail(format!("step {} has no question", i + 1)))?;
            Ok(PlanStep::new(agent_name, question))
        })
        .collect()
}

#[async_trait]
impl ReasoningAgent for PlannerAgent {
    fn name(&self) -> &'static str {
        "planner"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.0
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
