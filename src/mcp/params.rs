//! MCP tool parameter types.
//!
//! Input schemas for the MCP tools, generated with `schemars` as the MCP
//! protocol requires.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `hierarchical_query` MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// The user's question.
    pub query: String,

    /// ACP endpoint base URLs to discover agents on. Defaults to the
    /// server's configured endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<String>>,
}

/// Parameters for the `sequential_query` MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChainParams {
    /// The user's question, sent to the first stage.
    pub question: String,

    /// Follow-up question for the second stage. Defaults to the server's
    /// configured follow-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
}
