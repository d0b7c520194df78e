use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflow::Permissions;

/// A request from one agent/step to transfer work to a more appropriate
/// agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EscalationRequest {
    pub source: String,
    pub reason: String,
    #[serde(default)]
    pub suggested_target: Option<String>,
    pub original_task: String,
    pub permissions: Permissions,
    #[serde(default)]
    pub context: HashMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// The handler's verdict on an `EscalationRequest`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EscalationDecision {
    pub approved: bool,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl EscalationDecision {
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            target: None,
            task: None,
            reason: reason.into(),
            fallbacks: Vec::new(),
        }
    }

    pub fn approve(target: impl Into<String>, task: impl Into<String>, fallbacks: Vec<String>) -> Self {
        Self {
            approved: true,
            target: Some(target.into()),
            task: Some(task.into()),
            reason: "approved".to_string(),
            fallbacks,
        }
    }
}

/// An append-only history record: the request, the decision, and the
/// wall-clock time it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EscalationHistoryEntry {
    pub request: EscalationRequest,
    pub decision: EscalationDecision,
    pub timestamp: DateTime<Utc>,
}
