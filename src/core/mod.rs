//! Core data model shared by the workflows.
//!
//! Plans, per-step results and the reports returned by the hierarchical
//! and sequential workflows. These types carry no behaviour beyond small
//! accessors so they can be serialized for JSON output and MCP responses.

pub mod plan;
pub mod report;

pub use plan::{PlanStep, StepOutcome, StepResult};
pub use report::{ChainReport, ChainStage, QueryReport, StageReport};
