//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// acp-conductor: answer questions with a team of remote ACP agents.
///
/// Discovers specialist agents, plans which of them to ask, runs the
/// plan, and synthesizes one answer.
#[derive(Parser, Debug)]
#[command(name = "acp-conductor")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a query with the hierarchical workflow.
    ///
    /// Discovers agents, asks the reasoning service for a plan, runs every
    /// step, and synthesizes the answer. Failed steps are reported, not fatal.
    #[command(after_help = r#"Examples:
  acp-conductor query "Do I need checkups after pregnancy, and what is my waiting period?"
  acp-conductor query "..." --endpoint http://localhost:8001 --endpoint http://localhost:8000
  acp-conductor query "..." --parallel 4          # Steps are independent
  acp-conductor --format json query "..." | jq .answer
"#)]
    Query {
        /// The user's question.
        query: String,

        /// ACP endpoint base URL (repeatable). Overrides `CONDUCTOR_ENDPOINTS`.
        #[arg(short, long = "endpoint")]
        endpoints: Vec<String>,

        /// Run up to N independent plan steps at once.
        #[arg(long)]
        parallel: Option<usize>,

        /// Directory containing prompt template files.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,

        /// Model for the planner.
        #[arg(long)]
        planner_model: Option<String>,

        /// Model for the synthesizer.
        #[arg(long)]
        synthesizer_model: Option<String>,
    },

    /// Run the fixed two-stage chain.
    ///
    /// Stage 1 answers the question; stage 2 gets stage 1's output as
    /// context together with the follow-up question.
    #[command(after_help = r#"Examples:
  acp-conductor chain "Do I need rehabilitation after a shoulder reconstruction?"
  acp-conductor chain "..." --follow-up "Is physiotherapy covered?"
"#)]
    Chain {
        /// The user's question, sent to stage 1.
        question: String,

        /// Stage 1 agent name.
        #[arg(long)]
        first_agent: Option<String>,

        /// Stage 1 endpoint base URL.
        #[arg(long)]
        first_endpoint: Option<String>,

        /// Stage 2 agent name.
        #[arg(long)]
        second_agent: Option<String>,

        /// Stage 2 endpoint base URL.
        #[arg(long)]
        second_endpoint: Option<String>,

        /// Follow-up question put to stage 2.
        #[arg(long)]
        follow_up: Option<String>,

        /// Directory containing prompt template files.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },

    /// List the agents each endpoint offers.
    #[command(after_help = r#"Examples:
  acp-conductor agents
  acp-conductor agents --endpoint http://localhost:8001
"#)]
    Agents {
        /// ACP endpoint base URL (repeatable).
        #[arg(short, long = "endpoint")]
        endpoints: Vec<String>,
    },

    /// Ask one agent one or more questions directly.
    #[command(after_help = r#"Examples:
  acp-conductor ask rag_agent "What is the waiting period for rehabilitation?"
  acp-conductor ask health_agent "First question?" "Second question?" --delay-ms 2000
"#)]
    Ask {
        /// Agent name, matched case-insensitively.
        agent: String,

        /// Questions, asked in order.
        #[arg(required = true)]
        questions: Vec<String>,

        /// ACP endpoint base URL (repeatable).
        #[arg(short, long = "endpoint")]
        endpoints: Vec<String>,

        /// Pause between questions, in milliseconds.
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
    },

    /// Write the default prompt templates for customisation.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory. Defaults to `~/.config/acp-conductor/prompts/`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Start MCP (Model Context Protocol) server.
    #[cfg(feature = "mcp")]
    #[command(subcommand)]
    Mcp(McpCommands),
}

/// MCP server subcommands.
#[cfg(feature = "mcp")]
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start MCP server with stdio transport.
    ///
    /// Reads JSON-RPC messages from stdin, writes responses to stdout.
    #[command(after_help = r#"Examples:
  acp-conductor mcp stdio
  GEMINI_API_KEY=... acp-conductor mcp stdio
"#)]
    Stdio,

    /// Start MCP server with streamable HTTP transport.
    #[command(after_help = r#"Examples:
  acp-conductor mcp sse                            # Listen on 127.0.0.1:3000
  acp-conductor mcp sse --host 0.0.0.0 --port 8080
"#)]
    Sse {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to.
        #[arg(long, default_value = "3000")]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_args() {
        let cli = Cli::try_parse_from([
            "acp-conductor",
            "--format",
            "json",
            "query",
            "what?",
            "-e",
            "http://a:1",
            "--endpoint",
            "http://b:2",
            "--parallel",
            "3",
        ])
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Query {
                query,
                endpoints,
                parallel,
                ..
            } => {
                assert_eq!(query, "what?");
                assert_eq!(endpoints, vec!["http://a:1", "http://b:2"]);
                assert_eq!(parallel, Some(3));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["acp-conductor", "ask", "rag_agent"]).is_err());
        let cli = Cli::try_parse_from(["acp-conductor", "ask", "rag_agent", "q1", "q2"])
            .unwrap_or_else(|_| unreachable!());
        match cli.command {
            Commands::Ask {
                questions,
                delay_ms,
                ..
            } => {
                assert_eq!(questions, vec!["q1", "q2"]);
                assert_eq!(delay_ms, 1000);
            }
            _ => unreachable!(),
        }
    }
}
