//! In-memory test doubles for endpoints and the reasoning service.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::acp::{AgentEndpoint, AgentManifest};
use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::error::{AgentError, TransportError};

/// Scripted answer for one `run` call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with text.
    Text(String),
    /// Fail with a transport error.
    Error(TransportError),
    /// Never answer.
    Hang,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub fn status(code: u16) -> Self {
        Self::Error(TransportError::Status {
            endpoint: "mock".to_string(),
            status: code,
            body: String::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiscoveryMode {
    Ok,
    Fail,
    Hang,
}

/// Endpoint whose agents answer from a per-agent script, then echo.
#[derive(Debug)]
pub struct MockEndpoint {
    url: String,
    agents: Vec<AgentManifest>,
    discovery: DiscoveryMode,
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    inputs: Mutex<Vec<(String, String)>>,
    pub list_calls: AtomicUsize,
    pub run_calls: AtomicUsize,
}

impl MockEndpoint {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            agents: Vec::new(),
            discovery: DiscoveryMode::Ok,
            scripts: Mutex::new(HashMap::new()),
            inputs: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            run_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_agent(mut self, manifest: AgentManifest) -> Self {
        self.agents.push(manifest);
        self
    }

    pub fn failing_discovery(mut self) -> Self {
        self.discovery = DiscoveryMode::Fail;
        self
    }

    pub fn hanging_discovery(mut self) -> Self {
        self.discovery = DiscoveryMode::Hang;
        self
    }

    /// Queues a reply for `agent`. Unscripted calls echo the input.
    pub fn reply(self, agent: &str, reply: Reply) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.entry(agent.to_string()).or_default().push_back(reply);
        }
        self
    }

    /// `(agent, input)` pairs in call order.
    pub fn inputs(&self) -> Vec<(String, String)> {
        self.inputs.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AgentEndpoint for MockEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn list_agents(&self) -> Result<Vec<AgentManifest>, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match self.discovery {
            DiscoveryMode::Ok => Ok(self.agents.clone()),
            DiscoveryMode::Fail => Err(TransportError::Connect {
                endpoint: self.url.clone(),
                message: "connection refused".to_string(),
            }),
            DiscoveryMode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn run(&self, agent_name: &str, input: &str) -> Result<String, TransportError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push((agent_name.to_string(), input.to_string()));
        }
        let scripted = self
            .scripts
            .lock()
            .ok()
            .and_then(|mut s| s.get_mut(agent_name).and_then(VecDeque::pop_front));
        match scripted {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error(err)) => Err(err),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
            None => Ok(format!("{agent_name} answered: {input}")),
        }
    }
}

/// Reasoning service returning queued completions in order.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    completions: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(completions: &[&str]) -> Self {
        Self {
            completions: Mutex::new(completions.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.fail {
            return Err(AgentError::ApiRequest {
                message: "service unavailable".to_string(),
                status: Some(503),
            });
        }
        let content = self
            .completions
            .lock()
            .ok()
            .and_then(|mut c| c.pop_front())
            .unwrap_or_default();
        Ok(ChatResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: Some("stop".to_string()),
        })
    }
}
