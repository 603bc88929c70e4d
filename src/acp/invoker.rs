//! Uniform call interface to a discovered agent.
//!
//! Every agent call goes through [`AgentInvoker::invoke`], which applies the
//! per-attempt timeout and the [`RetryPolicy`], and turns whatever happened
//! into a [`StepOutcome`]. Nothing here returns `Err`: failures are data.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::registry::AgentDescriptor;
use super::retry::RetryPolicy;
use crate::core::StepOutcome;
use crate::error::{StepFailure, TransportError};

/// Calls agents with a timeout and bounded retries.
#[derive(Debug, Clone, Copy)]
pub struct AgentInvoker {
    timeout: Duration,
    retry: RetryPolicy,
}

impl AgentInvoker {
    /// Creates an invoker.
    #[must_use]
    pub const fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }

    /// Per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `question` to `agent` and classifies the answer.
    ///
    /// - blank text: [`StepFailure::EmptyResponse`] (not retried)
    /// - attempt timeout: retried, then [`StepFailure::Timeout`]
    /// - transport or run failure: retried if retryable, then
    ///   [`StepFailure::Communication`]
    pub async fn invoke(&self, agent: &AgentDescriptor, question: &str) -> StepOutcome {
        let mut attempt: u32 = 1;
        loop {
            let started = Instant::now();
            let result = tokio::time::timeout(self.timeout, agent.endpoint.run(&agent.name, question))
                .await
                .unwrap_or_else(|_| {
                    Err(TransportError::Timeout {
                        endpoint: agent.endpoint.url().to_string(),
                    })
                });

            match result {
                Ok(text) if text.trim().is_empty() => {
                    warn!(agent = %agent.name, "agent returned blank text");
                    return StepOutcome::Failure(StepFailure::EmptyResponse);
                }
                Ok(text) => {
                    debug!(
                        agent = %agent.name,
                        attempt,
                        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                        chars = text.len(),
                        "agent answered"
                    );
                    return StepOutcome::Success(text);
                }
                Err(err) if self.retry.should_retry(attempt, &err) => {
                    let delay = self.retry.delay_for(attempt - 1);
                    warn!(
                        agent = %agent.name,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        ?delay,
                        error = %err,
                        "agent call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return StepOutcome::Failure(self.classify(err)),
            }
        }
    }

    fn classify(&self, err: TransportError) -> StepFailure {
        match err {
            TransportError::Timeout { .. } => StepFailure::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            },
            other => StepFailure::Communication {
                detail: other.to_string(),
            },
        }
    }
}

impl Default for AgentInvoker {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), RetryPolicy::default())
    }
}
