//! Agent discovery and name resolution.
//!
//! [`AgentRegistry::discover`] asks every endpoint for its agents
//! concurrently and reassembles the answers in endpoint order. An endpoint
//! that fails or times out is logged and skipped; discovery itself never
//! fails. [`AgentDirectory`] then resolves plan step names to descriptors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::endpoint::AgentEndpoint;

/// A discovered agent and the endpoint that hosts it.
#[derive(Clone)]
pub struct AgentDescriptor {
    /// Agent name as advertised.
    pub name: String,
    /// Capability description.
    pub description: String,
    /// Shared handle to the hosting endpoint.
    pub endpoint: Arc<dyn AgentEndpoint>,
}

impl AgentDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        endpoint: Arc<dyn AgentEndpoint>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            endpoint,
        }
    }
}

impl fmt::Debug for AgentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("endpoint", &self.endpoint.url())
            .finish()
    }
}

/// Per-endpoint discovery outcome, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    /// Endpoint URL.
    pub endpoint: String,
    /// Agent names found there.
    pub agents: Vec<String>,
    /// Why the endpoint was skipped, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Discovery result with per-endpoint detail.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// All agents found, in endpoint order then listing order.
    pub agents: Vec<AgentDescriptor>,
    /// One report per endpoint queried, in endpoint order.
    pub endpoints: Vec<EndpointReport>,
}

/// Discovers agents across endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AgentRegistry {
    timeout: Duration,
}

impl AgentRegistry {
    /// Creates a registry that gives each endpoint `timeout` to answer.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Returns every agent reachable through `endpoints`.
    ///
    /// Zero endpoints, or zero reachable agents, yields an empty list.
    pub async fn discover(&self, endpoints: &[Arc<dyn AgentEndpoint>]) -> Vec<AgentDescriptor> {
        self.discover_detailed(endpoints).await.agents
    }

    /// Like [`discover`](Self::discover), also reporting what happened at
    /// each endpoint.
    pub async fn discover_detailed(&self, endpoints: &[Arc<dyn AgentEndpoint>]) -> Discovery {
        let timeout = self.timeout;
        let lookups = endpoints.iter().map(|endpoint| async move {
            let outcome = tokio::time::timeout(timeout, endpoint.list_agents()).await;
            (endpoint, outcome)
        });

        let mut agents = Vec::new();
        let mut reports = Vec::with_capacity(endpoints.len());

        for (endpoint, outcome) in join_all(lookups).await {
            let url = endpoint.url().to_string();
            let manifests = match outcome {
                Ok(Ok(manifests)) => manifests,
                Ok(Err(e)) => {
                    warn!(endpoint = %url, error = %e, "skipping endpoint: discovery failed");
                    reports.push(EndpointReport {
                        endpoint: url,
                        agents: Vec::new(),
                        error: Some(e.to_string()),
                    });
                    continue;
                }
                Err(_) => {
                    warn!(endpoint = %url, ?timeout, "skipping endpoint: discovery timed out");
                    reports.push(EndpointReport {
                        endpoint: url,
                        agents: Vec::new(),
                        error: Some(format!("timed out after {} ms", timeout.as_millis())),
                    });
                    continue;
                }
            };

            let mut names = Vec::with_capacity(manifests.len());
            for manifest in manifests {
                if manifest.name.trim().is_empty() {
                    warn!(endpoint = %url, "ignoring agent with blank name");
                    continue;
                }
                debug!(endpoint = %url, agent = %manifest.name, "discovered agent");
                names.push(manifest.name.clone());
                agents.push(AgentDescriptor {
                    name: manifest.name,
                    description: manifest.description,
                    endpoint: Arc::clone(endpoint),
                });
            }
            reports.push(EndpointReport {
                endpoint: url,
                agents: names,
                error: None,
            });
        }

        info!(
            endpoints = endpoints.len(),
            agents = agents.len(),
            "discovery complete"
        );

        Discovery {
            agents,
            endpoints: reports,
        }
    }
}

/// Case-insensitive lookup from agent name to descriptor.
///
/// Built once per run. When several descriptors share a name, the first
/// one in discovery order wins.
#[derive(Debug)]
pub struct AgentDirectory<'a> {
    agents: &'a [AgentDescriptor],
    index: HashMap<String, usize>,
}

impl<'a> AgentDirectory<'a> {
    /// Indexes `agents` by lower-cased name.
    #[must_use]
    pub fn new(agents: &'a [AgentDescriptor]) -> Self {
        let mut index = HashMap::with_capacity(agents.len());
        for (i, agent) in agents.iter().enumerate() {
            index.entry(agent.name.to_lowercase()).or_insert(i);
        }
        Self { agents, index }
    }

    /// Finds the agent named `name`, ignoring case.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&'a AgentDescriptor> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|&i| self.agents.get(i))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no agents are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
