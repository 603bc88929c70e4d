//! Agent endpoint trait.
//!
//! An endpoint is one ACP server hosting one or more agents. The trait keeps
//! the orchestration code independent of HTTP so workflows can be driven
//! against in-memory endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// An agent as advertised by its endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentManifest {
    /// Agent name used for invocation.
    pub name: String,
    /// Capability description shown to the planner.
    #[serde(default)]
    pub description: String,
}

impl AgentManifest {
    /// Creates a manifest.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Transport to one ACP endpoint.
#[async_trait]
pub trait AgentEndpoint: Send + Sync {
    /// Base URL (or other identifier) for logs and error messages.
    fn url(&self) -> &str;

    /// Lists the agents hosted at this endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the endpoint is unreachable or the
    /// listing is malformed.
    async fn list_agents(&self) -> Result<Vec<AgentManifest>, TransportError>;

    /// Runs `agent_name` synchronously with a single text input and
    /// returns the agent's text output.
    ///
    /// Blank output is returned as-is; classifying it is the invoker's job.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on transport failure, non-success status,
    /// malformed response, or a run reported as failed.
    async fn run(&self, agent_name: &str, input: &str) -> Result<String, TransportError>;
}
