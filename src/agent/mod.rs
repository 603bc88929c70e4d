//! Workflow layer: reasoning roles and the orchestrator.
//!
//! The planner and synthesizer talk to a reasoning service through the
//! pluggable [`LlmProvider`] abstraction, backed by `OpenAI`-compatible
//! APIs (`OpenAI` itself, or Gemini's compatible endpoint).
//!
//! # Architecture
//!
//! ```text
//! query → Orchestrator::hierarchical
//!   ├── AgentRegistry::discover (all endpoints, concurrently)
//!   ├── PlannerAgent → Vec<PlanStep>
//!   ├── PlanExecutor → Vec<StepResult> (one per step, plan order)
//!   └── SynthesizerAgent → final answer
//!
//! question → run_sequential
//!   ├── stage 1 agent(question)
//!   └── stage 2 agent(follow-up template with stage 1 output)
//! ```

pub mod chain;
pub mod client;
pub mod config;
pub mod direct;
pub mod executor;
pub mod message;
pub mod orchestrator;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod synthesizer;
pub mod traits;

pub use chain::{ChainSpec, ChainStageSpec, run_chain, run_sequential};
pub use client::create_provider;
pub use config::{AgentConfig, ChainConfig};
pub use direct::ask_agent;
pub use executor::PlanExecutor;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::Orchestrator;
pub use planner::{PlannerAgent, extract_step_list, parse_plan};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use synthesizer::SynthesizerAgent;
pub use traits::{AgentResponse, ReasoningAgent};
