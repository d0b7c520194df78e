use serde::{Deserialize, Serialize};

use crate::agent_output::AgentOutput;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
    Escalated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepResult {
    pub step_id: String,
    pub agent: String,
    pub status: StepStatus,
    #[serde(default)]
    pub output: Option<AgentOutput>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub escalation_target: Option<String>,
    #[serde(default)]
    pub escalation_reason: Option<String>,
}

impl StepResult {
    pub fn completed(step_id: impl Into<String>, agent: impl Into<String>, output: AgentOutput) -> Self {
        Self {
            step_id: step_id.into(),
            agent: agent.into(),
            status: StepStatus::Completed,
            output: Some(output),
            error: None,
            escalation_target: None,
            escalation_reason: None,
        }
    }

    pub fn failed(step_id: impl Into<String>, agent: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            agent: agent.into(),
            status: StepStatus::Failed,
            output: None,
            error: Some(error.into()),
            escalation_target: None,
            escalation_reason: None,
        }
    }

    pub fn skipped(step_id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            agent: agent.into(),
            status: StepStatus::Skipped,
            output: None,
            error: None,
            escalation_target: None,
            escalation_reason: None,
        }
    }

    pub fn escalated(
        step_id: impl Into<String>,
        agent: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            agent: agent.into(),
            status: StepStatus::Escalated,
            output: None,
            error: None,
            escalation_target: Some(target.into()),
            escalation_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    pub workflow_id: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub step_results: Vec<StepResult>,
    #[serde(default)]
    pub aggregated_output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            status: ExecutionStatus::Running,
            step_results: Vec::new(),
            aggregated_output: None,
            error: None,
        }
    }

    pub fn find(&self, step_id: &str) -> Option<&StepResult> {
        self.step_results.iter().find(|r| r.step_id == step_id)
    }
}
