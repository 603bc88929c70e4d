//! MCP (Model Context Protocol) server for acp-conductor.
//!
//! Exposes the two workflows as MCP tools so other agents can delegate
//! multi-agent questions to the conductor.
//!
//! # Feature Gate
//!
//! Requires the `mcp` feature:
//! ```toml
//! [dependencies]
//! acp-conductor = { version = "...", features = ["mcp"] }
//! ```
//!
//! # Architecture
//!
//! ```text
//! MCP client
//!   ├─ hierarchical_query(query, endpoints?) → Orchestrator::hierarchical
//!   └─ sequential_query(question, follow_up?) → run_sequential
//!   ↓
//! QueryReport / ChainReport JSON → MCP client
//! ```

pub mod params;
pub mod server;
pub mod transport;

pub use params::{ChainParams, QueryParams};
pub use server::ConductorMcpServer;
pub use transport::{serve_sse, serve_stdio};
