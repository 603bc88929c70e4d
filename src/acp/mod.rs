//! Remote specialist agents over the Agent Communication Protocol (ACP).
//!
//! # Architecture
//!
//! ```text
//! endpoints ─► AgentRegistry::discover ─► Vec<AgentDescriptor>
//!                                             │
//!                   AgentDirectory (lower-cased name → descriptor)
//!                                             │
//! PlanStep ──────────────────────────► AgentInvoker::invoke
//!                                             │  timeout + RetryPolicy
//!                                             ▼
//!                                  AgentEndpoint::run (HTTP)
//! ```
//!
//! [`AgentEndpoint`] is the seam between orchestration and the wire:
//! [`AcpHttpEndpoint`] speaks ACP REST, tests substitute in-memory fakes.

pub mod endpoint;
pub mod http;
pub mod invoker;
pub mod registry;
pub mod retry;

pub use endpoint::{AgentEndpoint, AgentManifest};
pub use http::{AcpHttpEndpoint, connect_all};
pub use invoker::AgentInvoker;
pub use registry::{AgentDescriptor, AgentDirectory, AgentRegistry, Discovery, EndpointReport};
pub use retry::RetryPolicy;
