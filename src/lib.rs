//! acp-conductor: orchestration of remote ACP specialist agents.
//!
//! A user query goes through agent discovery, a planner that splits it into
//! per-agent sub-questions, fault-tolerant execution of every step, and a
//! synthesizer that writes one answer. A fixed two-stage chain is available
//! as the sequential alternative.
//!
//! # Modules
//!
//! - [`acp`]: ACP transport, discovery, invocation with timeout and retry
//! - [`agent`]: reasoning roles, configuration, and the orchestrator
//! - [`core`]: plan, step result and report types
//! - [`cli`]: the `acp-conductor` command line
//! - [`error`]: error types
//! - `mcp` (feature `mcp`): MCP server exposing the workflows as tools

pub mod acp;
pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
#[cfg(feature = "mcp")]
pub mod mcp;

#[cfg(test)]
pub(crate) mod testing;

pub use acp::{AcpHttpEndpoint, AgentDescriptor, AgentEndpoint, AgentInvoker, AgentRegistry};
pub use agent::{AgentConfig, LlmProvider, Orchestrator, PromptSet};
pub use core::{ChainReport, PlanStep, QueryReport, StepOutcome, StepResult};
pub use error::{AgentError, Error, Result, StepFailure, TransportError};
