//! Executes a single workflow step against a registered agent: retry
//! with backoff on recoverable errors, surfaces escalation markers.

pub mod agent;
pub mod error;
pub mod executor;

pub use agent::{AgentInvoker, AgentRegistry};
pub use error::ExecutionError;
pub use executor::{AgentExecutor, ExecutorConfig};
