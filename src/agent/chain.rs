//! Fixed two-stage sequential workflow.
//!
//! Stage 1 answers the user's question. Stage 2 receives a prompt built
//! from the follow-up template with stage 1's raw output as context. No
//! planner or synthesizer is involved.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::config::{AgentConfig, ChainConfig};
use super::orchestrator::validate_query;
use super::prompt::build_follow_up_prompt;
use crate::acp::{AcpHttpEndpoint, AgentDescriptor, AgentEndpoint, AgentInvoker};
use crate::core::{ChainReport, ChainStage, StageReport, StepOutcome};
use crate::error::AgentError;

/// One stage: the agent to call and where it lives.
#[derive(Clone)]
pub struct ChainStageSpec {
    /// Agent name sent in the run request.
    pub agent: String,
    /// Endpoint hosting the agent.
    pub endpoint: Arc<dyn AgentEndpoint>,
}

impl ChainStageSpec {
    /// Creates a stage definition.
    #[must_use]
    pub fn new(agent: impl Into<String>, endpoint: Arc<dyn AgentEndpoint>) -> Self {
        Self {
            agent: agent.into(),
            endpoint,
        }
    }

    fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor::new(self.agent.clone(), String::new(), Arc::clone(&self.endpoint))
    }
}

impl std::fmt::Debug for ChainStageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainStageSpec")
            .field("agent", &self.agent)
            .field("endpoint", &self.endpoint.url())
            .finish()
    }
}

/// The two stages plus the follow-up question put to stage 2.
#[derive(Debug, Clone)]
pub struct ChainSpec {
    /// Stage 1.
    pub first: ChainStageSpec,
    /// Stage 2.
    pub second: ChainStageSpec,
    /// Question appended to stage 1's output for stage 2.
    pub follow_up: String,
}

impl ChainSpec {
    /// Both stages reached over ACP HTTP at the configured endpoints.
    #[must_use]
    pub fn over_http(chain: &ChainConfig) -> Self {
        Self {
            first: ChainStageSpec::new(
                chain.first_agent.clone(),
                Arc::new(AcpHttpEndpoint::new(chain.first_endpoint.as_str())),
            ),
            second: ChainStageSpec::new(
                chain.second_agent.clone(),
                Arc::new(AcpHttpEndpoint::new(chain.second_endpoint.as_str())),
            ),
            follow_up: chain.follow_up.clone(),
        }
    }
}

/// Runs the sequential workflow: validates `question`, then runs the chain
/// with `config`'s agent timeout and retry policy.
///
/// # Errors
///
/// Returns [`AgentError::InvalidQuery`] for an empty or oversized
/// question. Stage failures are reported in the [`ChainReport`].
pub async fn run_sequential(
    config: &AgentConfig,
    template: &str,
    question: &str,
    spec: &ChainSpec,
) -> Result<ChainReport, AgentError> {
    validate_query(question)?;
    Ok(run_chain(&config.invoker(), template, question, spec).await)
}

/// Runs the chain. Never fails: a failed stage is reported in the result.
pub async fn run_chain(
    invoker: &AgentInvoker,
    template: &str,
    question: &str,
    spec: &ChainSpec,
) -> ChainReport {
    let start = Instant::now();

    info!(stage = 1, agent = %spec.first.agent, "chain stage dispatched");
    let first_outcome = invoker.invoke(&spec.first.descriptor(), question).await;
    let first = StageReport {
        stage: ChainStage::First,
        agent: spec.first.agent.clone(),
        input: question.to_string(),
        outcome: first_outcome,
    };

    let context = match &first.outcome {
        StepOutcome::Success(text) => text.clone(),
        StepOutcome::Failure(failure) => {
            warn!(stage = 1, kind = failure.kind(), error = %failure, "chain stage failed");
            let fallback = stage_failed(ChainStage::First, &first);
            return ChainReport {
                question: question.to_string(),
                first,
                second: None,
                answer: None,
                fallback: Some(fallback),
                elapsed: start.elapsed(),
            };
        }
    };

    let input = build_follow_up_prompt(template, question, &context, &spec.follow_up);
    info!(stage = 2, agent = %spec.second.agent, "chain stage dispatched");
    let second_outcome = invoker.invoke(&spec.second.descriptor(), &input).await;
    let second = StageReport {
        stage: ChainStage::Second,
        agent: spec.second.agent.clone(),
        input,
        outcome: second_outcome,
    };

    let (answer, fallback) = match &second.outcome {
        StepOutcome::Success(text) => (Some(text.clone()), None),
        StepOutcome::Failure(failure) => {
            warn!(stage = 2, kind = failure.kind(), error = %failure, "chain stage failed");
            (None, Some(stage_failed(ChainStage::Second, &second)))
        }
    };

    ChainReport {
        question: question.to_string(),
        first,
        second: Some(second),
        answer,
        fallback,
        elapsed: start.elapsed(),
    }
}

fn stage_failed(stage: ChainStage, report: &StageReport) -> String {
    report.outcome.failure().map_or_else(String::new, |failure| {
        format!(
            "{stage} ({agent}) failed: {kind}: {failure}",
            agent = report.agent,
            kind = failure.kind(),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::acp::RetryPolicy;
    use crate::agent::prompt::FOLLOW_UP_TEMPLATE;
    use crate::testing::{MockEndpoint, Reply};

    fn invoker() -> AgentInvoker {
        AgentInvoker::new(Duration::from_millis(100), RetryPolicy::none())
    }

    fn spec(web: &Arc<MockEndpoint>, rag: &Arc<MockEndpoint>) -> ChainSpec {
        ChainSpec {
            first: ChainStageSpec::new("health_agent", Arc::clone(web) as Arc<dyn AgentEndpoint>),
            second: ChainStageSpec::new("rag_agent", Arc::clone(rag) as Arc<dyn AgentEndpoint>),
            follow_up: "What is the waiting period for rehabilitation?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_chain_threads_first_output() {
        let web = Arc::new(
            MockEndpoint::new("http://web").reply("health_agent", Reply::text("Yes, 6 weeks.")),
        );
        let rag = Arc::new(
            MockEndpoint::new("http://rag").reply("rag_agent", Reply::text("Two months.")),
        );

        let report = run_chain(
            &invoker(),
            FOLLOW_UP_TEMPLATE,
            "Do I need rehab?",
            &spec(&web, &rag),
        )
        .await;

        assert!(report.is_complete());
        assert_eq!(report.answer.as_deref(), Some("Two months."));
        assert_eq!(report.first_output(), Some("Yes, 6 weeks."));
        assert_eq!(
            rag.inputs()[0].1,
            "Context: Yes, 6 weeks.\n\nWhat is the waiting period for rehabilitation?"
        );
        assert!(report.fallback.is_none());
    }

    #[tokio::test]
    async fn test_second_stage_timeout_keeps_first_output() {
        let web = Arc::new(
            MockEndpoint::new("http://web").reply("health_agent", Reply::text("Rehab advised.")),
        );
        let rag = Arc::new(MockEndpoint::new("http://rag").reply("rag_agent", Reply::Hang));

        let report = run_chain(&invoker(), FOLLOW_UP_TEMPLATE, "q", &spec(&web, &rag)).await;

        assert!(!report.is_complete());
        assert_eq!(report.first_output(), Some("Rehab advised."));
        let fallback = report.fallback.unwrap_or_default();
        assert!(fallback.starts_with("stage 2 (rag_agent) failed: timeout"));
    }

    #[tokio::test]
    async fn test_first_stage_failure_skips_second() {
        let web = Arc::new(
            MockEndpoint::new("http://web").reply("health_agent", Reply::status(503)),
        );
        let rag = Arc::new(MockEndpoint::new("http://rag"));

        let report = run_chain(&invoker(), FOLLOW_UP_TEMPLATE, "q", &spec(&web, &rag)).await;

        assert!(report.second.is_none());
        assert!(report.answer.is_none());
        assert!(
            report
                .fallback
                .unwrap_or_default()
                .starts_with("stage 1 (health_agent) failed: communication")
        );
        assert_eq!(
            rag.run_calls.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_run_sequential_validates_then_runs() {
        let config = AgentConfig::builder()
            .agent_timeout(Duration::from_millis(100))
            .max_retries(0)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let web = Arc::new(MockEndpoint::new("http://web").reply("health_agent", Reply::text("A")));
        let rag = Arc::new(MockEndpoint::new("http://rag").reply("rag_agent", Reply::text("B")));
        let spec = spec(&web, &rag);

        let rejected = run_sequential(&config, "{question} => {context}", "  ", &spec).await;
        assert!(matches!(rejected, Err(AgentError::InvalidQuery { .. })));
        assert_eq!(web.run_calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        let report = run_sequential(&config, "{question} => {context}", "Q", &spec)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.answer.as_deref(), Some("B"));
        assert_eq!(rag.inputs()[0].1, "Q => A");
    }

    #[test]
    fn test_spec_over_http_uses_configured_stages() {
        let chain = ChainConfig::default();
        let spec = ChainSpec::over_http(&chain);
        assert_eq!(spec.first.agent, chain.first_agent);
        assert_eq!(spec.first.endpoint.url(), chain.first_endpoint.trim_end_matches('/'));
        assert_eq!(spec.second.agent, chain.second_agent);
        assert_eq!(spec.follow_up, chain.follow_up);
    }
}
