//! Plan executor.
//!
//! Runs each [`PlanStep`] against the agent it names and records exactly
//! one [`StepResult`] per step, in plan order. A failed step never stops
//! the steps after it.

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::acp::{AgentDescriptor, AgentDirectory, AgentInvoker};
use crate::core::{PlanStep, StepOutcome, StepResult};
use crate::error::StepFailure;

/// Executes plans through an [`AgentInvoker`].
#[derive(Debug, Clone, Copy)]
pub struct PlanExecutor {
    invoker: AgentInvoker,
    concurrency: usize,
}

impl PlanExecutor {
    /// Creates an executor that runs steps one at a time.
    #[must_use]
    pub const fn new(invoker: AgentInvoker) -> Self {
        Self {
            invoker,
            concurrency: 1,
        }
    }

    /// Allows up to `n` steps in flight at once.
    ///
    /// Only use this when the plan's steps are independent. Results are
    /// still returned in plan order. `0` is treated as `1`.
    #[must_use]
    pub const fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = if n == 0 { 1 } else { n };
        self
    }

    /// Runs `plan` against `agents`.
    ///
    /// Steps are polled in place rather than spawned, so dropping the
    /// returned future cancels every call still in flight.
    pub async fn execute(&self, plan: &[PlanStep], agents: &[AgentDescriptor]) -> Vec<StepResult> {
        let directory = AgentDirectory::new(agents);
        let directory = &directory;

        let outcomes: Vec<StepOutcome> = stream::iter(plan.iter().enumerate())
            .map(move |(i, step)| self.run_step(i, step, directory))
            .buffered(self.concurrency)
            .collect()
            .await;

        let results: Vec<StepResult> = plan
            .iter()
            .zip(outcomes)
            .map(|(step, outcome)| StepResult::new(step.clone(), outcome))
            .collect();

        let failed = results.iter().filter(|r| !r.outcome.is_success()).count();
        info!(
            steps = results.len(),
            succeeded = results.len() - failed,
            failed,
            "plan executed"
        );
        results
    }

    async fn run_step(
        &self,
        i: usize,
        step: &PlanStep,
        directory: &AgentDirectory<'_>,
    ) -> StepOutcome {
        let outcome = match directory.resolve(&step.agent_name) {
            Some(agent) => {
                debug!(step = i + 1, agent = %agent.name, "step dispatched");
                self.invoker.invoke(agent, &step.question).await
            }
            None => not_found(i, step),
        };
        log_failure(i, step, &outcome);
        outcome
    }
}

fn not_found(i: usize, step: &PlanStep) -> StepOutcome {
    debug!(step = i + 1, agent = %step.agent_name, "no agent with that name");
    StepOutcome::Failure(StepFailure::AgentNotFound {
        agent: step.agent_name.clone(),
    })
}

fn log_failure(i: usize, step: &PlanStep, outcome: &StepOutcome) {
    if let Some(failure) = outcome.failure() {
        warn!(
            step = i + 1,
            agent = %step.agent_name,
            kind = failure.kind(),
            error = %failure,
            "step failed"
        );
    }
}
