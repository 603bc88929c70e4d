//! CLI layer for acp-conductor.
//!
//! Provides the command-line interface using clap, with commands for the
//! hierarchical and sequential workflows, discovery, and direct questions.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{CommandOutput, execute};
#[cfg(feature = "mcp")]
pub use parser::McpCommands;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
