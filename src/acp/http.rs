//! ACP REST client.
//!
//! Discovery is `GET {base}/agents`; invocation is a synchronous
//! `POST {base}/runs` carrying one user message with one `text/plain` part.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::endpoint::{AgentEndpoint, AgentManifest};
use crate::error::TransportError;

/// Maximum characters of an error body kept in [`TransportError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct AgentsResponse {
    #[serde(default)]
    agents: Vec<WireAgent>,
}

#[derive(Debug, Deserialize)]
struct WireAgent {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunCreateRequest<'a> {
    agent_name: &'a str,
    input: Vec<WireMessage>,
    mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct WireRun {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<WireMessage>,
    #[serde(default)]
    error: Option<WireRunError>,
}

#[derive(Debug, Deserialize)]
struct WireRunError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl WireMessage {
    fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![WirePart {
                content: Some(text.to_string()),
                content_type: Some("text/plain".to_string()),
            }],
        }
    }
}

impl WirePart {
    /// Parts without a content type are treated as plain text.
    fn is_text(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ct| ct.trim_start().starts_with("text/"))
    }
}

/// Joins every text part of every output message, in order.
fn join_output(output: &[WireMessage]) -> String {
    output
        .iter()
        .flat_map(|m| m.parts.iter())
        .filter(|p| p.is_text())
        .filter_map(|p| p.content.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// ACP endpoint reached over HTTP.
#[derive(Debug, Clone)]
pub struct AcpHttpEndpoint {
    base_url: String,
    client: reqwest::Client,
}

impl AcpHttpEndpoint {
    /// Creates an endpoint with its own HTTP client.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Creates an endpoint sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    fn classify(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                endpoint: self.base_url.clone(),
            }
        } else if err.is_decode() {
            TransportError::Malformed {
                endpoint: self.base_url.clone(),
                message: err.to_string(),
            }
        } else {
            TransportError::Connect {
                endpoint: self.base_url.clone(),
                message: err.to_string(),
            }
        }
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            endpoint: self.base_url.clone(),
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        })
    }

    fn malformed(&self, err: &reqwest::Error) -> TransportError {
        TransportError::Malformed {
            endpoint: self.base_url.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl AgentEndpoint for AcpHttpEndpoint {
    fn url(&self) -> &str {
        &self.base_url
    }

    async fn list_agents(&self) -> Result<Vec<AgentManifest>, TransportError> {
        let url = format!("{}/agents", self.base_url);
        debug!(%url, "listing agents");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;
        let listing: AgentsResponse = self
            .check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| self.malformed(&e))?;

        Ok(listing
            .agents
            .into_iter()
            .map(|a| AgentManifest {
                name: a.name,
                description: a.description.unwrap_or_default(),
            })
            .collect())
    }

    async fn run(&self, agent_name: &str, input: &str) -> Result<String, TransportError> {
        let url = format!("{}/runs", self.base_url);
        let body = RunCreateRequest {
            agent_name,
            input: vec![WireMessage::user_text(input)],
            mode: "sync",
        };
        debug!(%url, agent = agent_name, input_len = input.len(), "creating run");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;
        let run: WireRun = self
            .check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| self.malformed(&e))?;

        if let Some(status) = run.status.as_deref()
            && matches!(status, "failed" | "cancelled")
        {
            let message = run
                .error
                .map(|e| match (e.code, e.message) {
                    (Some(code), Some(msg)) => format!("{code}: {msg}"),
                    (None, Some(msg)) => msg,
                    (Some(code), None) => code,
                    (None, None) => "no error detail".to_string(),
                })
                .unwrap_or_else(|| "no error detail".to_string());
            return Err(TransportError::RunFailed {
                status: status.to_string(),
                message,
            });
        }

        Ok(join_output(&run.output))
    }
}

/// Builds one endpoint per URL, all sharing a single HTTP client.
#[must_use]
pub fn connect_all(urls: &[String]) -> Vec<Arc<dyn AgentEndpoint>> {
    let client = reqwest::Client::new();
    urls.iter()
        .map(|url| {
            Arc::new(AcpHttpEndpoint::with_client(url.as_str(), client.clone()))
                as Arc<dyn AgentEndpoint>
        })
        .collect()
}
