//! CLI command implementations.
//!
//! Each command builds its configuration (explicit flags → environment →
//! defaults), bridges into async with a tokio runtime, and renders the
//! result with [`OutputFormat`].

#![allow(clippy::uninlined_format_args)]

use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::acp::{AgentEndpoint, connect_all};
use crate::agent::orchestrator::validate_query;
use crate::agent::{
    AgentConfig, ChainSpec, Orchestrator, PromptSet, ask_agent, create_provider, run_sequential,
};
use crate::cli::output::{
    OutputFormat, format_ask_results, format_chain_report, format_discovery, format_query_report,
};
#[cfg(feature = "mcp")]
use crate::cli::parser::McpCommands;
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};

/// Rendered command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Text to print on stdout.
    pub text: String,
    /// Whether the command produced its answer. Drives the exit code.
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// Parameters for the `query` command.
#[derive(Debug, Clone, Default)]
pub struct QueryCommandParams<'a> {
    /// The user's question.
    pub query: &'a str,
    /// Endpoint overrides; empty means configured endpoints.
    pub endpoints: &'a [String],
    /// Step concurrency override.
    pub parallel: Option<usize>,
    /// Prompt directory override.
    pub prompt_dir: Option<&'a Path>,
    /// Planner model override.
    pub planner_model: Option<&'a str>,
    /// Synthesizer model override.
    pub synthesizer_model: Option<&'a str>,
    /// Show per-step detail.
    pub verbose: bool,
}

/// Parameters for the `chain` command.
#[derive(Debug, Clone, Default)]
pub struct ChainCommandParams<'a> {
    /// The user's question.
    pub question: &'a str,
    /// Stage 1 agent override.
    pub first_agent: Option<&'a str>,
    /// Stage 1 endpoint override.
    pub first_endpoint: Option<&'a str>,
    /// Stage 2 agent override.
    pub second_agent: Option<&'a str>,
    /// Stage 2 endpoint override.
    pub second_endpoint: Option<&'a str>,
    /// Follow-up question override.
    pub follow_up: Option<&'a str>,
    /// Prompt directory override.
    pub prompt_dir: Option<&'a Path>,
}

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the workflow terminates
/// before producing an answer.
pub fn execute(cli: &Cli) -> Result<CommandOutput> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Query {
            query,
            endpoints,
            parallel,
            prompt_dir,
            planner_model,
            synthesizer_model,
        } => cmd_query(
            &QueryCommandParams {
                query,
                endpoints,
                parallel: *parallel,
                prompt_dir: prompt_dir.as_deref(),
                planner_model: planner_model.as_deref(),
                synthesizer_model: synthesizer_model.as_deref(),
                verbose: cli.verbose,
            },
            format,
        ),
        Commands::Chain {
            question,
            first_agent,
            first_endpoint,
            second_agent,
            second_endpoint,
            follow_up,
            prompt_dir,
        } => cmd_chain(
            &ChainCommandParams {
                question,
                first_agent: first_agent.as_deref(),
                first_endpoint: first_endpoint.as_deref(),
                second_agent: second_agent.as_deref(),
                second_endpoint: second_endpoint.as_deref(),
                follow_up: follow_up.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
            },
            format,
        ),
        Commands::Agents { endpoints } => cmd_agents(endpoints, format),
        Commands::Ask {
            agent,
            questions,
            endpoints,
            delay_ms,
        } => cmd_ask(agent, questions, endpoints, *delay_ms, format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
        #[cfg(feature = "mcp")]
        Commands::Mcp(cmd) => cmd_mcp(cmd),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn resolve_endpoints(overrides: &[String], config: &AgentConfig) -> Vec<Arc<dyn AgentEndpoint>> {
    if overrides.is_empty() {
        connect_all(&config.endpoints)
    } else {
        connect_all(overrides)
    }
}

fn cmd_query(params: &QueryCommandParams<'_>, format: OutputFormat) -> Result<CommandOutput> {
    let mut builder = AgentConfig::builder().from_env();
    if let Some(n) = params.parallel {
        if n == 0 {
            return Err(
                CommandError::InvalidArgument("--parallel must be at least 1".to_string()).into(),
            );
        }
        builder = builder.step_concurrency(n);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    if let Some(model) = params.planner_model {
        builder = builder.planner_model(model);
    }
    if let Some(model) = params.synthesizer_model {
        builder = builder.synthesizer_model(model);
    }
    let config = builder.build()?;

    let provider = create_provider(&config)?;
    let endpoints = resolve_endpoints(params.endpoints, &config);
    debug!(
        provider = provider.name(),
        endpoints = endpoints.len(),
        concurrency = config.step_concurrency,
        "starting hierarchical query"
    );
    let orchestrator = Orchestrator::new(Arc::from(provider), config);

    let report = runtime()?.block_on(orchestrator.hierarchical(params.query, &endpoints))?;
    Ok(CommandOutput::ok(format_query_report(
        &report,
        format,
        params.verbose,
    )))
}

fn cmd_chain(params: &ChainCommandParams<'_>, format: OutputFormat) -> Result<CommandOutput> {
    let mut builder = AgentConfig::builder().from_env();
    if let Some(v) = params.first_agent {
        builder = builder.first_agent(v);
    }
    if let Some(v) = params.first_endpoint {
        builder = builder.first_endpoint(v);
    }
    if let Some(v) = params.second_agent {
        builder = builder.second_agent(v);
    }
    if let Some(v) = params.second_endpoint {
        builder = builder.second_endpoint(v);
    }
    if let Some(v) = params.follow_up {
        builder = builder.follow_up(v);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    let config = builder.build()?;

    let prompts = PromptSet::load(config.prompt_dir.as_deref());
    let spec = ChainSpec::over_http(&config.chain);
    let report = runtime()?.block_on(run_sequential(
        &config,
        &prompts.follow_up,
        params.question,
        &spec,
    ))?;
    Ok(CommandOutput {
        text: format_chain_report(&report, format),
        success: report.is_complete(),
    })
}

fn cmd_agents(endpoints: &[String], format: OutputFormat) -> Result<CommandOutput> {
    let config = AgentConfig::from_env()?;
    let endpoints = resolve_endpoints(endpoints, &config);

    let discovery = runtime()?.block_on(config.registry().discover_detailed(&endpoints));
    let descriptions: Vec<(String, String)> = discovery
        .agents
        .iter()
        .map(|a| (a.name.clone(), a.description.clone()))
        .collect();

    Ok(CommandOutput {
        text: format_discovery(&discovery.endpoints, &descriptions, format),
        success: !discovery.agents.is_empty(),
    })
}

fn cmd_ask(
    agent: &str,
    questions: &[String],
    endpoints: &[String],
    delay_ms: u64,
    format: OutputFormat,
) -> Result<CommandOutput> {
    if agent.trim().is_empty() {
        return Err(CommandError::InvalidArgument("agent name cannot be empty".to_string()).into());
    }
    for question in questions {
        validate_query(question)?;
    }
    let config = AgentConfig::builder()
        .from_env()
        .request_delay(Duration::from_millis(delay_ms))
        .build()?;
    let endpoints = resolve_endpoints(endpoints, &config);

    let results = runtime()?.block_on(ask_agent(
        &config.registry(),
        &config.invoker(),
        &endpoints,
        agent,
        questions,
        config.request_delay,
    ))?;

    Ok(CommandOutput {
        text: format_ask_results(&results, format),
        success: results.iter().all(|r| r.outcome.is_success()),
    })
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<CommandOutput> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    let text = match format {
        OutputFormat::Text => {
            if written.is_empty() {
                format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                )
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    let _ = writeln!(
                        output,
                        "  {}",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    );
                }
                output.push_str("\nEdit these files to customise the planner, synthesizer and chain follow-up.\n");
                output
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            format.to_json(&json)
        }
    };
    Ok(CommandOutput::ok(text))
}

/// Starts the MCP server with the specified transport.
///
/// Runs until the client disconnects (stdio) or the server is stopped (HTTP).
#[cfg(feature = "mcp")]
fn cmd_mcp(cmd: &McpCommands) -> Result<CommandOutput> {
    use crate::mcp::{ConductorMcpServer, serve_sse, serve_stdio};

    let config = AgentConfig::from_env()?;
    let server = ConductorMcpServer::new(config);

    runtime()?
        .block_on(async {
            match cmd {
                McpCommands::Stdio => serve_stdio(server).await,
                McpCommands::Sse { host, port } => serve_sse(server, host, *port).await,
            }
        })
        .map_err(|e| CommandError::ExecutionFailed(format!("MCP server error: {e}")))?;

    Ok(CommandOutput::ok(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_cmd_init_prompts() {
        let temp_dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let output = cmd_init_prompts(Some(temp_dir.path()), OutputFormat::Text)
            .unwrap_or_else(|_| unreachable!());
        assert!(output.success);
        assert!(output.text.contains("Wrote 3 prompt template(s)"));
        assert!(temp_dir.path().join("planner.md").exists());

        let again = cmd_init_prompts(Some(temp_dir.path()), OutputFormat::Json)
            .unwrap_or_else(|_| unreachable!());
        assert!(again.text.contains("\"count\": 0"));
    }

    #[test]
    fn test_cmd_query_rejects_zero_parallel() {
        let params = QueryCommandParams {
            query: "q",
            parallel: Some(0),
            ..QueryCommandParams::default()
        };
        let err = cmd_query(&params, OutputFormat::Text).err();
        assert!(matches!(
            err,
            Some(Error::Command(CommandError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn test_cmd_ask_rejects_blank_agent() {
        let err = cmd_ask(" ", &["q".to_string()], &[], 0, OutputFormat::Text).err();
        assert_eq!(err.map(|e| e.exit_code()), Some(2));
    }

    #[test]
    fn test_cmd_chain_rejects_blank_question() {
        let params = ChainCommandParams {
            question: "   ",
            first_endpoint: Some("http://127.0.0.1:9"),
            second_endpoint: Some("http://127.0.0.1:9"),
            ..ChainCommandParams::default()
        };
        let err = cmd_chain(&params, OutputFormat::Text).err();
        assert!(matches!(
            err,
            Some(Error::Agent(crate::error::AgentError::InvalidQuery { .. }))
        ));
        assert_eq!(err.map(|e| e.exit_code()), Some(2));
    }
}
