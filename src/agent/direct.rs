//! Direct questions to a single named agent, without planning.

use std::sync::Arc;

use tracing::{debug, info};

use crate::acp::{AgentDirectory, AgentEndpoint, AgentInvoker, AgentRegistry};
use crate::core::{PlanStep, StepOutcome, StepResult};
use crate::error::{AgentError, StepFailure};

/// Discovers agents, then asks `agent` each question in turn.
///
/// `delay` is slept between consecutive questions. Each question yields one
/// [`StepResult`]; an agent missing from discovery fails every question with
/// [`StepFailure::AgentNotFound`] without contacting any endpoint.
///
/// # Errors
///
/// Returns [`AgentError::NoAgentsAvailable`] when discovery finds nothing.
pub async fn ask_agent(
    registry: &AgentRegistry,
    invoker: &AgentInvoker,
    endpoints: &[Arc<dyn AgentEndpoint>],
    agent: &str,
    questions: &[String],
    delay: std::time::Duration,
) -> Result<Vec<StepResult>, AgentError> {
    let agents = registry.discover(endpoints).await;
    if agents.is_empty() {
        return Err(AgentError::NoAgentsAvailable {
            endpoints: endpoints.iter().map(|e| e.url().to_string()).collect(),
        });
    }
    let directory = AgentDirectory::new(&agents);
    let target = directory.resolve(agent);

    let mut results = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            debug!(?delay, "pausing between questions");
            tokio::time::sleep(delay).await;
        }
        let outcome = match target {
            Some(descriptor) => invoker.invoke(descriptor, question).await,
            None => StepOutcome::Failure(StepFailure::AgentNotFound {
                agent: agent.to_string(),
            }),
        };
        results.push(StepResult::new(PlanStep::new(agent, question.as_str()), outcome));
    }

    info!(
        agent,
        questions = questions.len(),
        answered = results.iter().filter(|r| r.outcome.is_success()).count(),
        "direct questions complete"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::acp::{AgentManifest, RetryPolicy};
    use crate::testing::{MockEndpoint, Reply};

    fn setup() -> (AgentRegistry, AgentInvoker) {
        (
            AgentRegistry::new(Duration::from_millis(200)),
            AgentInvoker::new(Duration::from_millis(200), RetryPolicy::none()),
        )
    }

    #[tokio::test]
    async fn test_questions_in_order() {
        let (registry, invoker) = setup();
        let endpoint = Arc::new(
            MockEndpoint::new("http://rag")
                .with_agent(AgentManifest::new("rag_agent", "policies"))
                .reply("rag_agent", Reply::text("one"))
                .reply("rag_agent", Reply::text("two")),
        );
        let endpoints = vec![Arc::clone(&endpoint) as Arc<dyn AgentEndpoint>];
        let questions = vec!["first?".to_string(), "second?".to_string()];

        let results = ask_agent(
            &registry,
            &invoker,
            &endpoints,
            "RAG_agent",
            &questions,
            Duration::from_millis(1),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].outcome.text(), Some("one"));
        assert_eq!(results[1].outcome.text(), Some("two"));
        assert_eq!(results[1].step.question, "second?");
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let (registry, invoker) = setup();
        let endpoint = Arc::new(
            MockEndpoint::new("http://rag").with_agent(AgentManifest::new("rag_agent", "")),
        );
        let endpoints = vec![Arc::clone(&endpoint) as Arc<dyn AgentEndpoint>];

        let results = ask_agent(
            &registry,
            &invoker,
            &endpoints,
            "nobody",
            &["q".to_string()],
            Duration::ZERO,
        )
        .await
        .unwrap_or_else(|_| unreachable!());

        assert!(matches!(
            results[0].outcome,
            StepOutcome::Failure(StepFailure::AgentNotFound { .. })
        ));
        assert_eq!(endpoint.run_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_agents() {
        let (registry, invoker) = setup();
        let result = ask_agent(&registry, &invoker, &[], "x", &[], Duration::ZERO).await;
        assert!(matches!(result, Err(AgentError::NoAgentsAvailable { .. })));
    }
}
