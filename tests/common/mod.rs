//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use acp_conductor::acp::{AgentEndpoint, AgentManifest};
use acp_conductor::agent::{ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use acp_conductor::error::{AgentError, TransportError};
use async_trait::async_trait;

/// What an agent does when called.
#[derive(Debug, Clone)]
pub enum Behaviour {
    Answer(String),
    Fail(u16),
    Hang,
}

/// In-memory ACP endpoint.
#[derive(Debug, Default)]
pub struct FakeEndpoint {
    pub url: String,
    pub agents: Vec<AgentManifest>,
    pub unreachable: bool,
    behaviours: HashMap<String, Behaviour>,
    calls: Mutex<Vec<(String, String)>>,
    pub run_calls: AtomicUsize,
}

impl FakeEndpoint {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn unreachable(url: &str) -> Self {
        Self {
            unreachable: true,
            ..Self::new(url)
        }
    }

    pub fn agent(mut self, name: &str, description: &str, behaviour: Behaviour) -> Self {
        self.agents.push(AgentManifest::new(name, description));
        self.behaviours.insert(name.to_string(), behaviour);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AgentEndpoint for FakeEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn list_agents(&self) -> Result<Vec<AgentManifest>, TransportError> {
        if self.unreachable {
            return Err(TransportError::Connect {
                endpoint: self.url.clone(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.agents.clone())
    }

    async fn run(&self, agent_name: &str, input: &str) -> Result<String, TransportError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((agent_name.to_string(), input.to_string()));
        }
        match self.behaviours.get(agent_name) {
            Some(Behaviour::Answer(text)) => Ok(text.clone()),
            Some(Behaviour::Fail(status)) => Err(TransportError::Status {
                endpoint: self.url.clone(),
                status: *status,
                body: "boom".to_string(),
            }),
            Some(Behaviour::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
            None => Err(TransportError::Status {
                endpoint: self.url.clone(),
                status: 404,
                body: "unknown agent".to_string(),
            }),
        }
    }
}

/// Reasoning service returning queued completions.
#[derive(Debug, Default)]
pub struct QueuedProvider {
    completions: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl QueuedProvider {
    pub fn new(completions: &[&str]) -> Self {
        Self {
            completions: Mutex::new(completions.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    /// User messages received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for QueuedProvider {
    fn name(&self) -> &'static str {
        "queued"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let (Ok(mut prompts), Some(last)) = (self.prompts.lock(), request.messages.last()) {
            prompts.push(last.content.clone());
        }
        let content = self
            .completions
            .lock()
            .ok()
            .and_then(|mut c| c.pop_front())
            .ok_or_else(|| AgentError::ApiRequest {
                message: "no completion queued".to_string(),
                status: None,
            })?;
        Ok(ChatResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: 20,
                completion_tokens: 10,
                total_tokens: 30,
            },
            finish_reason: Some("stop".to_string()),
        })
    }
}
