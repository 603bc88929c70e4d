//! Workflow reports.
//!
//! [`QueryReport`] is returned by the hierarchical workflow and
//! [`ChainReport`] by the sequential two-stage chain.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::plan::{PlanStep, StepOutcome, StepResult};

/// Final result of a hierarchical run.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    /// The user's query.
    pub query: String,
    /// Names of the agents discovered for this run, in endpoint order.
    pub agents: Vec<String>,
    /// The plan produced by the planner.
    pub plan: Vec<PlanStep>,
    /// One result per plan step, in plan order.
    pub results: Vec<StepResult>,
    /// Synthesized answer.
    pub answer: String,
    /// Steps that produced text.
    pub steps_succeeded: usize,
    /// Steps that failed.
    pub steps_failed: usize,
    /// Reasoning-service tokens used by planning and synthesis.
    pub total_tokens: u32,
    /// Wall-clock time of the run.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

/// Position of a stage in the sequential chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStage {
    /// Stage 1: called with the user's question.
    First,
    /// Stage 2: called with stage 1's output embedded.
    Second,
}

impl ChainStage {
    /// 1-based stage number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}", self.number())
    }
}

/// What one chain stage was asked and how it answered.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    /// Which stage.
    pub stage: ChainStage,
    /// Agent called for this stage.
    pub agent: String,
    /// Exact input sent to the agent.
    pub input: String,
    /// Outcome of the call.
    pub outcome: StepOutcome,
}

/// Final result of a sequential chain run.
///
/// Stage 2 failing never hides stage 1's output; `fallback` then names
/// the failed stage and the failure kind.
#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    /// The user's question.
    pub question: String,
    /// Stage 1 report.
    pub first: StageReport,
    /// Stage 2 report, absent when stage 1 failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<StageReport>,
    /// Stage 2's answer when the chain completed.
    pub answer: Option<String>,
    /// Explanation when the chain did not complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// Wall-clock time of the run.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

impl ChainReport {
    /// Whether stage 2 produced the final answer.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.answer.is_some()
    }

    /// Stage 1's text, if it succeeded.
    #[must_use]
    pub fn first_output(&self) -> Option<&str> {
        self.first.outcome.text()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}
