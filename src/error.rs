//! Error types for acp-conductor.
//!
//! Three layers of failure are kept apart:
//!
//! - [`AgentError`] ends a workflow run (no agents, unparseable plan,
//!   reasoning-service or configuration failure).
//! - [`StepFailure`] is per-step data recorded on a
//!   [`StepResult`](crate::core::StepResult); it never aborts a plan.
//! - [`TransportError`] describes what went wrong on the wire to an ACP
//!   endpoint, before the invoker classifies it into a [`StepFailure`].

use serde::Serialize;
use thiserror::Error;

/// Result type alias for CLI-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Workflow or reasoning-service failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// `2` for usage and configuration problems, `1` for runs that
    /// terminated before producing an answer.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Agent(e) if e.is_configuration() => 2,
            Self::Agent(AgentError::InvalidQuery { .. }) => 2,
            Self::Command(CommandError::InvalidArgument(_)) => 2,
            Self::Agent(_) | Self::Command(_) => 1,
        }
    }
}

/// Errors that terminate a workflow run.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured for the reasoning service.
    #[error("no API key configured (set OPENAI_API_KEY, GEMINI_API_KEY or CONDUCTOR_API_KEY)")]
    ApiKeyMissing,

    /// Unknown reasoning-service provider name.
    #[error("unsupported LLM provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// A configuration value is out of range or malformed.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// The reasoning service rejected or failed a request.
    #[error("LLM request failed: {message}")]
    ApiRequest {
        /// Provider error text.
        message: String,
        /// HTTP status, when the provider reported one.
        status: Option<u16>,
    },

    /// Discovery produced zero agents across every endpoint.
    #[error("no agents available (queried {} endpoint(s): {})", .endpoints.len(), .endpoints.join(", "))]
    NoAgentsAvailable {
        /// Endpoints that were queried.
        endpoints: Vec<String>,
    },

    /// The planner's completion could not be turned into a plan.
    #[error("planning failed: {message}")]
    Planning {
        /// Why the completion was rejected.
        message: String,
        /// The raw completion, verbatim.
        raw: String,
    },

    /// The synthesizer could not produce an answer.
    #[error("synthesis failed: {message}")]
    Synthesis {
        /// Underlying failure.
        message: String,
    },

    /// The query is empty or too long to send anywhere.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// What is wrong with it.
        message: String,
    },
}

impl AgentError {
    /// Names the component that failed, for user-facing explanations.
    #[must_use]
    pub const fn component(&self) -> &'static str {
        match self {
            Self::ApiKeyMissing | Self::UnsupportedProvider { .. } | Self::InvalidConfig { .. } => {
                "configuration"
            }
            Self::ApiRequest { .. } => "reasoning service",
            Self::NoAgentsAvailable { .. } => "registry",
            Self::Planning { .. } => "planner",
            Self::Synthesis { .. } => "synthesizer",
            Self::InvalidQuery { .. } => "orchestrator",
        }
    }

    /// Whether this is a configuration problem rather than a runtime failure.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ApiKeyMissing | Self::UnsupportedProvider { .. } | Self::InvalidConfig { .. }
        )
    }
}

/// Why a single plan step did not produce an answer.
///
/// Recorded as data on the step's result; the remaining steps still run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepFailure {
    /// No discovered agent matches the step's agent name.
    #[error("agent '{agent}' not found")]
    AgentNotFound {
        /// Name requested by the plan.
        agent: String,
    },

    /// Transport failure, malformed response or failed run.
    #[error("communication error: {detail}")]
    Communication {
        /// Error detail from the transport layer.
        detail: String,
    },

    /// The agent did not answer within the configured timeout.
    #[error("timed out after {after_ms} ms")]
    Timeout {
        /// Per-attempt timeout that elapsed.
        after_ms: u64,
    },

    /// The agent answered with blank text.
    #[error("agent returned an empty response")]
    EmptyResponse,
}

impl StepFailure {
    /// Short machine-readable kind, e.g. `"timeout"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AgentNotFound { .. } => "agent_not_found",
            Self::Communication { .. } => "communication",
            Self::Timeout { .. } => "timeout",
            Self::EmptyResponse => "empty_response",
        }
    }
}

/// Wire-level errors talking to an ACP endpoint.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection could not be established or was reset.
    #[error("connection to {endpoint} failed: {message}")]
    Connect {
        /// Endpoint base URL.
        endpoint: String,
        /// Underlying error text.
        message: String,
    },

    /// The request did not complete in time.
    #[error("request to {endpoint} timed out")]
    Timeout {
        /// Endpoint base URL.
        endpoint: String,
    },

    /// Non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Endpoint base URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Response body did not match the expected ACP shape.
    #[error("malformed response from {endpoint}: {message}")]
    Malformed {
        /// Endpoint base URL.
        endpoint: String,
        /// Decode error text.
        message: String,
    },

    /// The agent reported its run as failed or cancelled.
    #[error("run {status}: {message}")]
    RunFailed {
        /// Run status reported by the agent.
        status: String,
        /// Agent-supplied error message.
        message: String,
    },
}

impl TransportError {
    /// Whether the error is transient and worth another attempt.
    ///
    /// Connection failures, timeouts and 408/429/5xx gateway statuses
    /// are retryable; malformed responses and failed runs are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Connect { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504 | 520..=524)
            }
            Self::Malformed { .. } | Self::RunFailed { .. } => false,
        }
    }
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command failed while running.
    #[error("command failed: {0}")]
    ExecutionFailed(String),

    /// Output could not be rendered.
    #[error("output format error: {0}")]
    OutputFormat(String),
}
