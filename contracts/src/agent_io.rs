use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent_output::AgentOutput;
use crate::workflow::Permissions;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentTask {
    pub specific_request: String,
}

/// Distilled context handed to an agent: the original user request, the
/// agents completed so far, and an accumulated context bag built from
/// their outputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentContext {
    pub user_request: String,
    #[serde(default)]
    pub previous_agents: Vec<String>,
    #[serde(default)]
    pub accumulated_context: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRequest {
    pub task: AgentTask,
    pub permissions: Permissions,
    pub context: AgentContext,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Complete,
    Error,
    EscalationRequired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentError {
    pub code: String,
    pub message: String,
    pub recoverable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EscalationMarker {
    pub required: bool,
    #[serde(default)]
    pub target_agent: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub required_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResponse {
    pub request_id: String,
    pub agent_id: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub output: Option<AgentOutput>,
    #[serde(default)]
    pub error: Option<AgentError>,
    #[serde(default)]
    pub escalation: Option<EscalationMarker>,
    pub timestamp: DateTime<Utc>,
}
