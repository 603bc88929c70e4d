//! MCP server implementation for acp-conductor.
//!
//! Exposes the hierarchical and sequential workflows as MCP tools. The
//! reasoning-service provider is created per hierarchical call, so the
//! sequential tool works without an API key.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use tracing::warn;

use crate::acp::connect_all;
use crate::agent::chain::{ChainSpec, run_sequential};
use crate::agent::client::create_provider;
use crate::agent::config::AgentConfig;
use crate::agent::orchestrator::Orchestrator;
use crate::agent::prompt::PromptSet;
use crate::error::AgentError;

use super::params::{ChainParams, QueryParams};

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {e}"), None))
}

/// Reports a workflow that ended early as a tool-level error naming the
/// failed component, rather than a protocol error.
fn workflow_failure(err: &AgentError) -> CallToolResult {
    warn!(component = err.component(), error = %err, "workflow terminated");
    let mut text = format!("{} failed: {err}", err.component());
    if let AgentError::Planning { raw, .. } = err
        && !raw.is_empty()
    {
        text.push_str("\n\nRaw planner completion:\n");
        text.push_str(raw);
    }
    CallToolResult::error(vec![Content::text(text)])
}

/// acp-conductor MCP server.
#[derive(Clone)]
pub struct ConductorMcpServer {
    tool_router: ToolRouter<Self>,
    config: AgentConfig,
    prompts: Arc<PromptSet>,
}

#[tool_router]
impl ConductorMcpServer {
    /// Discover agents, plan, run every step, and synthesize an answer.
    #[tool(
        name = "hierarchical_query",
        description = "Answer a question with a team of remote ACP agents. Discovers the agents on the configured endpoints, asks a reasoning model to split the question into per-agent sub-questions, calls each agent, and synthesizes one answer. Failed steps are reported alongside the answer. Returns JSON with the answer, the plan and every step result."
    )]
    async fn hierarchical_query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let provider = match create_provider(&self.config) {
            Ok(provider) => provider,
            Err(e) => return Ok(workflow_failure(&e)),
        };
        let orchestrator = Orchestrator::with_prompts(
            Arc::from(provider),
            self.config.clone(),
            (*self.prompts).clone(),
        );
        let urls = params
            .endpoints
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| self.config.endpoints.clone());
        let endpoints = connect_all(&urls);

        match orchestrator.hierarchical(&params.query, &endpoints).await {
            Ok(report) => Ok(CallToolResult::success(vec![Content::text(to_json(
                &report,
            )?)])),
            Err(e) => Ok(workflow_failure(&e)),
        }
    }

    /// Run the fixed two-stage chain.
    #[tool(
        name = "sequential_query",
        description = "Run the fixed two-stage agent chain. The first agent answers the question; the second agent receives that answer as context together with a follow-up question. If the second stage fails, the first stage's answer is still returned with a note naming the failed stage. Returns JSON with both stages and the final answer."
    )]
    async fn sequential_query(
        &self,
        Parameters(params): Parameters<ChainParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut spec = ChainSpec::over_http(&self.config.chain);
        if let Some(follow_up) = params.follow_up {
            spec.follow_up = follow_up;
        }

        let report = match run_sequential(
            &self.config,
            &self.prompts.follow_up,
            &params.question,
            &spec,
        )
        .await
        {
            Ok(report) => report,
            Err(e) => return Ok(workflow_failure(&e)),
        };
        Ok(CallToolResult::success(vec![Content::text(to_json(
            &report,
        )?)]))
    }
}

#[tool_handler]
impl ServerHandler for ConductorMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "acp-conductor".to_string(),
                title: Some("ACP Conductor MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "acp-conductor: coordinates remote ACP specialist agents. Use \
                 `hierarchical_query` for open questions that may need several agents, and \
                 `sequential_query` for the fixed two-stage chain."
                    .to_string(),
            ),
        }
    }
}

impl ConductorMcpServer {
    /// Configuration the server runs with.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Creates a new MCP server, loading prompt templates from the
    /// configured prompt directory.
    #[must_use]
    pub fn new(config: AgentConfig) -> Self {
        let prompts = Arc::new(PromptSet::load(config.prompt_dir.as_deref()));
        Self {
            tool_router: Self::tool_router(),
            config,
            prompts,
        }
    }
}
