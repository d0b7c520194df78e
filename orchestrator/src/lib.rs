//! Orchestrator entry point: routes a request, builds and runs a workflow,
//! and attaches schema/evidence validation to its outputs. The
//! newline-delimited JSON-RPC transport (`rpc`) and CLI config loading
//! (`config`) are the thin edges around that core.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod response;
pub mod rpc;

pub use config::AppConfig;
pub use error::OrchestratorError;
pub use orchestrator::Orchestrator;
pub use response::{OrchestratorResponse, StepAnnotation};
