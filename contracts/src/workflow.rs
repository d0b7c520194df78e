use serde::{Deserialize, Serialize};

use crate::error::ContractError;
use crate::paths::{check_agent_name, check_path_safety};

/// Allowed root directories and a read-only flag, carried from a `Request`
/// through every `Step` to the agent boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Permissions {
    pub allowed_directories: Vec<String>,
    pub read_only: bool,
}

impl Permissions {
    /// Validates every allowed directory against the path-safety rule.
    pub fn validate(&self) -> Result<(), ContractError> {
        for dir in &self.allowed_directories {
            check_path_safety(dir)?;
        }
        Ok(())
    }
}

/// A free-form user task plus the permissions it was granted. Immutable
/// for the duration of its workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub text: String,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    Parallel,
    Conditional,
}

/// A predicate evaluated against the current `ExecutionResult` snapshot.
/// Pure: no side effects, no mutation of the snapshot it inspects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Condition {
    /// True iff the named step completed successfully.
    StepSucceeded { step_id: String },
    /// True iff the named step's output has a top-level JSON field equal
    /// to the given value.
    OutputFieldEquals {
        step_id: String,
        field: String,
        value: serde_json::Value,
    },
}

/// One node of a workflow: an agent target, its input, permissions, an
/// optional condition, and dependency step ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub id: String,
    pub agent: String,
    pub input: String,
    pub permissions: Permissions,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Step {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.id.is_empty() {
            return Err(ContractError::malformed(
                crate::error::ContractKind::Workflow,
                crate::error::ValidationIssue::new("id", "step id must be non-empty"),
            ));
        }
        check_agent_name(&self.agent)?;
        self.permissions.validate()
    }
}

/// An ordered, mode-tagged plan of steps. `steps` is mutable only in
/// sequential/conditional mode, where the engine appends materialized
/// escalation steps during execution; parallel workflows never mutate
/// after scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workflow {
    pub id: String,
    pub mode: ExecutionMode,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
}

impl Workflow {
    /// Checks: step ids unique, agent names well-formed, dependencies
    /// refer to existing steps, and the induced dependency graph is
    /// acyclic.
    pub fn validate(&self) -> Result<(), ContractError> {
        use std::collections::{HashMap, HashSet};

        let mut seen = HashSet::new();
        let mut index = HashMap::new();
        for (i, step) in self.steps.iter().enumerate() {
            step.validate()?;
            if !seen.insert(step.id.clone()) {
                return Err(ContractError::malformed(
                    crate::error::ContractKind::Workflow,
                    crate::error::ValidationIssue::new(
                        "steps",
                        format!("duplicate step id {:?}", step.id),
                    ),
                ));
            }
            index.insert(step.id.clone(), i);
        }

        for step in &self.steps {
            for dep in &step.depends_on {
                if !index.contains_key(dep) {
                    return Err(ContractError::malformed(
                        crate::error::ContractKind::Workflow,
                        crate::error::ValidationIssue::new(
                            format!("steps[{}].depends_on", step.id),
                            format!("unknown dependency {:?}", dep),
                        ),
                    ));
                }
            }
        }

        detect_cycle(&self.steps, &index).map_err(|id| {
            ContractError::malformed(
                crate::error::ContractKind::Workflow,
                crate::error::ValidationIssue::new(
                    "steps",
                    format!("dependency cycle involving step {:?}", id),
                ),
            )
        })
    }
}

fn detect_cycle(
    steps: &[Step],
    index: &std::collections::HashMap<String, usize>,
) -> Result<(), String> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Visiting,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; steps.len()];

    fn visit(
        i: usize,
        steps: &[Step],
        index: &std::collections::HashMap<String, usize>,
        marks: &mut Vec<Mark>,
    ) -> Result<(), String> {
        match marks[i] {
            Mark::Done => return Ok(()),
            Mark::Visiting => return Err(steps[i].id.clone()),
            Mark::Unvisited => {}
        }
        marks[i] = Mark::Visiting;
        for dep in &steps[i].depends_on {
            let j = index[dep];
            visit(j, steps, index, marks)?;
        }
        marks[i] = Mark::Done;
        Ok(())
    }

    for i in 0..steps.len() {
        visit(i, steps, index, &mut marks)?;
    }
    Ok(())
}
