//! Shared data-model contracts for the orchestration runtime.
//!
//! Strongly typed records so the router, executor, engine, escalation
//! handler, and orchestrator exchange data without re-deriving shape
//! rules in each crate.

pub mod agent_io;
pub mod agent_output;
pub mod error;
pub mod escalation;
pub mod lines;
pub mod paths;
pub mod step_result;
pub mod workflow;

pub use agent_io::{
    AgentContext, AgentError, AgentRequest, AgentResponse, AgentStatus, AgentTask,
    EscalationMarker,
};
pub use agent_output::{
    AgentOutput, CallGraphEdge, ConcurrencyMechanism, ConfigurationInfluence, DataFlow,
    DataFlowItem, EntryPoint, ErrorHandler, EvidenceEntry, ExternalDependency, Pattern,
    SideEffect, StateOperation, AGENT_OUTPUT_VERSION,
};
pub use error::{ContractError, ContractKind, ValidationIssue};
pub use escalation::{EscalationDecision, EscalationHistoryEntry, EscalationRequest};
pub use lines::LineRange;
pub use step_result::{ExecutionResult, ExecutionStatus, StepResult, StepStatus};
pub use workflow::{Condition, ExecutionMode, Permissions, Request, Step, Workflow};
