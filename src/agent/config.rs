//! Conductor configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::acp::{AgentInvoker, AgentRegistry, RetryPolicy};
use crate::error::AgentError;

/// `OpenAI`-compatible base URL for Gemini.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Default ACP endpoints: the retrieval server, then the web-search server.
pub const DEFAULT_ENDPOINTS: [&str; 2] = ["http://localhost:8001", "http://localhost:8000"];

/// Default planner max tokens.
const DEFAULT_PLANNER_MAX_TOKENS: u32 = 1024;
/// Default synthesizer max tokens.
const DEFAULT_SYNTHESIZER_MAX_TOKENS: u32 = 4096;
/// Default reasoning-service timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default per-attempt agent call timeout in seconds.
const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 60;
/// Default retries after the first agent call attempt.
const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default delay before the first retry, in milliseconds.
const DEFAULT_RETRY_BASE_MS: u64 = 5_000;
/// Default cap on retry delay, in milliseconds.
const DEFAULT_RETRY_MAX_MS: u64 = 60_000;
/// Default number of plan steps executed at once.
const DEFAULT_STEP_CONCURRENCY: usize = 1;

/// Default stage 1 agent of the sequential chain.
const DEFAULT_FIRST_AGENT: &str = "health_agent";
/// Default stage 1 endpoint.
const DEFAULT_FIRST_ENDPOINT: &str = "http://localhost:8000";
/// Default stage 2 agent of the sequential chain.
const DEFAULT_SECOND_AGENT: &str = "rag_agent";
/// Default stage 2 endpoint.
const DEFAULT_SECOND_ENDPOINT: &str = "http://localhost:8001";
/// Default follow-up question put to stage 2.
pub const DEFAULT_FOLLOW_UP: &str = "What is the waiting period for rehabilitation?";

/// Stage definitions for the sequential two-stage chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Agent called with the user's question.
    pub first_agent: String,
    /// Endpoint hosting the first agent.
    pub first_endpoint: String,
    /// Agent called with the first agent's output as context.
    pub second_agent: String,
    /// Endpoint hosting the second agent.
    pub second_endpoint: String,
    /// Question asked of the second agent alongside the context.
    pub follow_up: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            first_agent: DEFAULT_FIRST_AGENT.to_string(),
            first_endpoint: DEFAULT_FIRST_ENDPOINT.to_string(),
            second_agent: DEFAULT_SECOND_AGENT.to_string(),
            second_endpoint: DEFAULT_SECOND_ENDPOINT.to_string(),
            follow_up: DEFAULT_FOLLOW_UP.to_string(),
        }
    }
}

/// Configuration for the conductor.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Reasoning-service provider name (`"openai"` or `"gemini"`).
    pub provider: String,
    /// API key for the provider. Only required by workflows that plan or
    /// synthesize.
    pub api_key: Option<String>,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the planner.
    pub planner_model: String,
    /// Model for the synthesizer.
    pub synthesizer_model: String,
    /// Maximum tokens for planner responses.
    pub planner_max_tokens: u32,
    /// Maximum tokens for synthesizer responses.
    pub synthesizer_max_tokens: u32,
    /// Reasoning-service request timeout.
    pub timeout: Duration,
    /// Per-attempt timeout for agent calls and discovery.
    pub agent_timeout: Duration,
    /// Retries after the first failed agent call attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub retry_base_delay: Duration,
    /// Cap on any single retry delay.
    pub retry_max_delay: Duration,
    /// Plan steps executed at once. `1` runs the plan strictly in order;
    /// larger values assert that the steps are independent.
    pub step_concurrency: usize,
    /// ACP endpoint base URLs queried during discovery.
    pub endpoints: Vec<String>,
    /// Directory containing prompt template files.
    ///
    /// When set, prompts are loaded from markdown files in this directory,
    /// falling back to compiled-in defaults for any missing files.
    pub prompt_dir: Option<PathBuf>,
    /// Pause between consecutive direct questions to one agent.
    pub request_delay: Duration,
    /// Sequential chain stages.
    pub chain: ChainConfig,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] for out-of-range values.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Retry policy for agent calls.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries.saturating_add(1), self.retry_base_delay)
            .with_max_delay(self.retry_max_delay)
    }

    /// Agent invoker using the configured timeout and retry policy.
    #[must_use]
    pub fn invoker(&self) -> AgentInvoker {
        AgentInvoker::new(self.agent_timeout, self.retry_policy())
    }

    /// Registry using the configured agent timeout.
    #[must_use]
    pub const fn registry(&self) -> AgentRegistry {
        AgentRegistry::new(self.agent_timeout)
    }
}

/// Splits a comma-separated endpoint list, dropping blanks.
#[must_use]
pub fn parse_endpoint_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    gemini_key: bool,
    base_url: Option<String>,
    planner_model: Option<String>,
    synthesizer_model: Option<String>,
    planner_max_tokens: Option<u32>,
    synthesizer_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    agent_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_base_delay: Option<Duration>,
    retry_max_delay: Option<Duration>,
    step_concurrency: Option<usize>,
    endpoints: Option<Vec<String>>,
    prompt_dir: Option<PathBuf>,
    request_delay: Option<Duration>,
    first_agent: Option<String>,
    first_endpoint: Option<String>,
    second_agent: Option<String>,
    second_endpoint: Option<String>,
    follow_up: Option<String>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(self) -> Self {
        self.from_lookup(|key| std::env::var(key).ok())
    }

    /// Populates unset fields from `var`, keyed by environment variable name.
    #[must_use]
    pub(crate) fn from_lookup(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| var(key).and_then(|v| v.trim().parse::<u64>().ok());
        if self.provider.is_none() {
            self.provider = var("CONDUCTOR_PROVIDER");
        }
        if self.api_key.is_none() {
            self.api_key = var("CONDUCTOR_API_KEY").or_else(|| var("OPENAI_API_KEY"));
            if self.api_key.is_none() {
                self.api_key = var("GEMINI_API_KEY");
                self.gemini_key = self.api_key.is_some();
            }
        }
        if self.base_url.is_none() {
            self.base_url = var("CONDUCTOR_BASE_URL").or_else(|| var("OPENAI_BASE_URL"));
        }
        if self.planner_model.is_none() {
            self.planner_model = var("CONDUCTOR_PLANNER_MODEL");
        }
        if self.synthesizer_model.is_none() {
            self.synthesizer_model = var("CONDUCTOR_SYNTHESIZER_MODEL");
        }
        if self.timeout.is_none() {
            self.timeout = parse("CONDUCTOR_TIMEOUT_SECS").map(Duration::from_secs);
        }
        if self.agent_timeout.is_none() {
            self.agent_timeout = parse("CONDUCTOR_AGENT_TIMEOUT_SECS").map(Duration::from_secs);
        }
        if self.max_retries.is_none() {
            self.max_retries = parse("CONDUCTOR_MAX_RETRIES").and_then(|n| u32::try_from(n).ok());
        }
        if self.retry_base_delay.is_none() {
            self.retry_base_delay = parse("CONDUCTOR_RETRY_BASE_MS").map(Duration::from_millis);
        }
        if self.retry_max_delay.is_none() {
            self.retry_max_delay = parse("CONDUCTOR_RETRY_MAX_MS").map(Duration::from_millis);
        }
        if self.step_concurrency.is_none() {
            self.step_concurrency =
                parse("CONDUCTOR_STEP_CONCURRENCY").and_then(|n| usize::try_from(n).ok());
        }
        if self.endpoints.is_none() {
            self.endpoints = var("CONDUCTOR_ENDPOINTS").map(|v| parse_endpoint_list(&v));
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = var("CONDUCTOR_PROMPT_DIR").map(PathBuf::from);
        }
        if self.first_agent.is_none() {
            self.first_agent = var("CONDUCTOR_FIRST_AGENT");
        }
        if self.first_endpoint.is_none() {
            self.first_endpoint = var("CONDUCTOR_FIRST_ENDPOINT");
        }
        if self.second_agent.is_none() {
            self.second_agent = var("CONDUCTOR_SECOND_AGENT");
        }
        if self.second_endpoint.is_none() {
            self.second_endpoint = var("CONDUCTOR_SECOND_ENDPOINT");
        }
        if self.follow_up.is_none() {
            self.follow_up = var("CONDUCTOR_FOLLOW_UP");
        }
        self
    }

    /// Sets the provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the planner model.
    #[must_use]
    pub fn planner_model(mut self, model: impl Into<String>) -> Self {
        self.planner_model = Some(model.into());
        self
    }

    /// Sets the synthesizer model.
    #[must_use]
    pub fn synthesizer_model(mut self, model: impl Into<String>) -> Self {
        self.synthesizer_model = Some(model.into());
        self
    }

    /// Sets the planner max tokens.
    #[must_use]
    pub const fn planner_max_tokens(mut self, n: u32) -> Self {
        self.planner_max_tokens = Some(n);
        self
    }

    /// Sets the synthesizer max tokens.
    #[must_use]
    pub const fn synthesizer_max_tokens(mut self, n: u32) -> Self {
        self.synthesizer_max_tokens = Some(n);
        self
    }

    /// Sets the reasoning-service timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the per-attempt agent call timeout.
    #[must_use]
    pub const fn agent_timeout(mut self, duration: Duration) -> Self {
        self.agent_timeout = Some(duration);
        self
    }

    /// Sets the retries after a failed agent call attempt.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub const fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    /// Sets the cap on retry delay.
    #[must_use]
    pub const fn retry_max_delay(mut self, delay: Duration) -> Self {
        self.retry_max_delay = Some(delay);
        self
    }

    /// Sets how many plan steps run at once.
    #[must_use]
    pub const fn step_concurrency(mut self, n: usize) -> Self {
        self.step_concurrency = Some(n);
        self
    }

    /// Replaces the endpoint list.
    #[must_use]
    pub fn endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = Some(endpoints.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Sets the pause between consecutive direct questions.
    #[must_use]
    pub const fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    /// Sets the chain's first agent.
    #[must_use]
    pub fn first_agent(mut self, name: impl Into<String>) -> Self {
        self.first_agent = Some(name.into());
        self
    }

    /// Sets the chain's first endpoint.
    #[must_use]
    pub fn first_endpoint(mut self, url: impl Into<String>) -> Self {
        self.first_endpoint = Some(url.into());
        self
    }

    /// Sets the chain's second agent.
    #[must_use]
    pub fn second_agent(mut self, name: impl Into<String>) -> Self {
        self.second_agent = Some(name.into());
        self
    }

    /// Sets the chain's second endpoint.
    #[must_use]
    pub fn second_endpoint(mut self, url: impl Into<String>) -> Self {
        self.second_endpoint = Some(url.into());
        self
    }

    /// Sets the chain's follow-up question.
    #[must_use]
    pub fn follow_up(mut self, question: impl Into<String>) -> Self {
        self.follow_up = Some(question.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// A key that came from `GEMINI_API_KEY` selects the `gemini` provider
    /// unless one was set explicitly. The `gemini` provider defaults to
    /// Gemini's `OpenAI`-compatible base URL and models.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] for zero timeouts or zero
    /// step concurrency.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let provider = self.provider.unwrap_or_else(|| {
            if self.gemini_key {
                "gemini".to_string()
            } else {
                "openai".to_string()
            }
        });
        let gemini = provider == "gemini";

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let agent_timeout = self
            .agent_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_AGENT_TIMEOUT_SECS));
        if timeout.is_zero() || agent_timeout.is_zero() {
            return Err(AgentError::InvalidConfig {
                message: "timeouts must be greater than zero".to_string(),
            });
        }

        let step_concurrency = self.step_concurrency.unwrap_or(DEFAULT_STEP_CONCURRENCY);
        if step_concurrency == 0 {
            return Err(AgentError::InvalidConfig {
                message: "step concurrency must be at least 1".to_string(),
            });
        }

        let default_model = |openai: &str| {
            if gemini {
                "gemini-2.5-flash".to_string()
            } else {
                openai.to_string()
            }
        };

        let defaults = ChainConfig::default();

        Ok(AgentConfig {
            base_url: self
                .base_url
                .or_else(|| gemini.then(|| GEMINI_OPENAI_BASE_URL.to_string())),
            planner_model: self
                .planner_model
                .unwrap_or_else(|| default_model("gpt-4o-mini")),
            synthesizer_model: self
                .synthesizer_model
                .unwrap_or_else(|| default_model("gpt-4o")),
            provider,
            api_key: self.api_key,
            planner_max_tokens: self
                .planner_max_tokens
                .unwrap_or(DEFAULT_PLANNER_MAX_TOKENS),
            synthesizer_max_tokens: self
                .synthesizer_max_tokens
                .unwrap_or(DEFAULT_SYNTHESIZER_MAX_TOKENS),
            timeout,
            agent_timeout,
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_base_delay: self
                .retry_base_delay
                .unwrap_or(Duration::from_millis(DEFAULT_RETRY_BASE_MS)),
            retry_max_delay: self
                .retry_max_delay
                .unwrap_or(Duration::from_millis(DEFAULT_RETRY_MAX_MS)),
            step_concurrency,
            endpoints: self.endpoints.unwrap_or_else(|| {
                DEFAULT_ENDPOINTS.iter().map(ToString::to_string).collect()
            }),
            prompt_dir: self.prompt_dir,
            request_delay: self.request_delay.unwrap_or(Duration::ZERO),
            chain: ChainConfig {
                first_agent: self.first_agent.unwrap_or(defaults.first_agent),
                first_endpoint: self.first_endpoint.unwrap_or(defaults.first_endpoint),
                second_agent: self.second_agent.unwrap_or(defaults.second_agent),
                second_endpoint: self.second_endpoint.unwrap_or(defaults.second_endpoint),
                follow_up: self.follow_up.unwrap_or(defaults.follow_up),
            },
        })
    }
}
