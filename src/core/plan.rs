//! Plan steps and their outcomes.

use serde::{Deserialize, Serialize};

use crate::error::StepFailure;

/// One step of a plan: which agent to ask, and what.
///
/// Steps execute in plan order. A step's output is never threaded into the
/// next step's question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Name of the agent to call, matched case-insensitively.
    pub agent_name: String,
    /// Sub-question sent to the agent.
    pub question: String,
}

impl PlanStep {
    /// Creates a step.
    #[must_use]
    pub fn new(agent_name: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            question: question.into(),
        }
    }
}

/// Result of calling one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The agent answered with non-blank text.
    Success(String),
    /// The step failed; see [`StepFailure`].
    Failure(StepFailure),
}

impl StepOutcome {
    /// Whether the step produced text.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Answer text, if the step succeeded.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success(text) => Some(text),
            Self::Failure(_) => None,
        }
    }

    /// Failure reason, if the step failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&StepFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f),
        }
    }
}

/// A plan step paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// The step as planned.
    pub step: PlanStep,
    /// What happened.
    pub outcome: StepOutcome,
}

impl StepResult {
    /// Creates a result.
    #[must_use]
    pub const fn new(step: PlanStep, outcome: StepOutcome) -> Self {
        Self { step, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let ok = StepOutcome::Success("answer".to_string());
        assert!(ok.is_success());
        assert_eq!(ok.text(), Some("answer"));
        assert!(ok.failure().is_none());

        let failed = StepOutcome::Failure(StepFailure::EmptyResponse);
        assert!(!failed.is_success());
        assert!(failed.text().is_none());
        assert_eq!(failed.failure().map(StepFailure::kind), Some("empty_response"));
    }

    #[test]
    fn test_step_result_serialization() {
        let result = StepResult::new(
            PlanStep::new("rag_agent", "What is the waiting period?"),
            StepOutcome::Failure(StepFailure::AgentNotFound {
                agent: "rag_agent".to_string(),
            }),
        );
        let json = serde_json::to_value(&result).unwrap_or_default();
        assert_eq!(json["step"]["agent_name"], "rag_agent");
        assert_eq!(json["outcome"]["failure"]["kind"], "agent_not_found");
    }

    #[test]
    fn test_plan_step_deserialize_ignores_unknown_fields() {
        let step: PlanStep =
            serde_json::from_str(r#"{"agent_name":"a","question":"q","why":"because"}"#)
                .unwrap_or_else(|_| unreachable!());
        assert_eq!(step, PlanStep::new("a", "q"));
    }
}
