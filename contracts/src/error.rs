use std::fmt;

/// Contract artifact categories handled by the data-model layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    AgentOutput,
    Workflow,
    Permissions,
    LineRange,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContractKind::AgentOutput => "agent-output",
            ContractKind::Workflow => "workflow",
            ContractKind::Permissions => "permissions",
            ContractKind::LineRange => "line-range",
        };
        write!(f, "{}", label)
    }
}

/// A single structured validation failure, addressable by field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while constructing or parsing data-model contracts.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("{kind} contract malformed: {issue}")]
    Malformed {
        kind: ContractKind,
        issue: ValidationIssue,
    },
}

impl ContractError {
    pub fn malformed(kind: ContractKind, issue: ValidationIssue) -> Self {
        Self::Malformed { kind, issue }
    }
}
