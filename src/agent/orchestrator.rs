//! Orchestrator for the hierarchical and sequential workflows.
//!
//! Hierarchical: discover → plan → execute every step → synthesize.
//! The sequential chain lives in [`super::chain`]; it needs no reasoning
//! service.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use super::config::AgentConfig;
use super::executor::PlanExecutor;
use super::planner::PlannerAgent;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::synthesizer::SynthesizerAgent;
use crate::acp::AgentEndpoint;
use crate::core::QueryReport;
use crate::error::AgentError;

/// Maximum accepted query length in bytes.
const MAX_QUERY_LEN: usize = 10_000;

/// Runs workflows against a reasoning service and a set of endpoints.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates an orchestrator, loading prompt templates from
    /// [`AgentConfig::prompt_dir`] with compiled-in fallbacks.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self::with_prompts(provider, config, prompts)
    }

    /// Creates an orchestrator with explicit prompts.
    #[must_use]
    pub fn with_prompts(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        prompts: PromptSet,
    ) -> Self {
        Self {
            provider,
            config,
            prompts,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Runs the hierarchical workflow.
    ///
    /// Step failures are carried into synthesis; only the conditions
    /// below end the run early.
    ///
    /// # Errors
    ///
    /// - [`AgentError::InvalidQuery`] for an empty or oversized query
    /// - [`AgentError::NoAgentsAvailable`] when discovery finds nothing;
    ///   the reasoning service is never called
    /// - [`AgentError::Planning`] when no usable plan is produced
    /// - [`AgentError::Synthesis`] when the final call fails
    pub async fn hierarchical(
        &self,
        query: &str,
        endpoints: &[Arc<dyn AgentEndpoint>],
    ) -> Result<QueryReport, AgentError> {
        validate_query(query)?;
        let start = Instant::now();

        let agents = self.config.registry().discover(endpoints).await;
        if agents.is_empty() {
            return Err(AgentError::NoAgentsAvailable {
                endpoints: endpoints.iter().map(|e| e.url().to_string()).collect(),
            });
        }

        let planner = PlannerAgent::new(&self.config, self.prompts.planner.clone());
        let (plan, plan_response) = planner.plan(&*self.provider, query, &agents).await?;
        info!(steps = plan.len(), agents = agents.len(), "plan ready");

        let executor =
            PlanExecutor::new(self.config.invoker()).with_concurrency(self.config.step_concurrency);
        let results = executor.execute(&plan, &agents).await;

        let synthesizer = SynthesizerAgent::new(&self.config, self.prompts.synthesizer.clone());
        let (answer, synth_response) = synthesizer
            .synthesize(&*self.provider, query, &results)
            .await?;

        let steps_succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        let steps_failed = results.len() - steps_succeeded;
        let total_tokens = plan_response
            .usage
            .total_tokens
            .saturating_add(synth_response.usage.total_tokens);

        info!(
            steps_succeeded,
            steps_failed,
            total_tokens,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "hierarchical query complete"
        );

        Ok(QueryReport {
            query: query.to_string(),
            agents: agents.iter().map(|a| a.name.clone()).collect(),
            plan,
            results,
            answer,
            steps_succeeded,
            steps_failed,
            total_tokens,
            elapsed: start.elapsed(),
        })
    }
}

/// Rejects empty and oversized queries.
///
/// # Errors
///
/// Returns [`AgentError::InvalidQuery`] describing the problem.
pub fn validate_query(query: &str) -> Result<(), AgentError> {
    if query.trim().is_empty() {
        return Err(AgentError::InvalidQuery {
            message: "query cannot be empty".to_string(),
        });
    }
    if query.len() > MAX_QUERY_LEN {
        return Err(AgentError::InvalidQuery {
            message: format!(
                "query exceeds maximum length ({} bytes, max {MAX_QUERY_LEN})",
                query.len()
            ),
        });
    }
    Ok(())
}
