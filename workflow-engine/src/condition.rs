use agency_contracts::{Condition, ExecutionResult, StepStatus};

/// Evaluates a `Condition` against a snapshot of the current
/// `ExecutionResult`. Pure: no side effects, never mutates the snapshot.
pub fn evaluate(condition: &Condition, snapshot: &ExecutionResult) -> bool {
    match condition {
        Condition::StepSucceeded { step_id } => snapshot
            .find(step_id)
            .map(|r| r.status == StepStatus::Completed)
            .unwrap_or(false),
        Condition::OutputFieldEquals {
            step_id,
            field,
            value,
        } => snapshot
            .find(step_id)
            .and_then(|r| r.output.as_ref())
            .and_then(|out| serde_json::to_value(out).ok())
            .and_then(|json| json.get(field).cloned())
            .map(|actual| &actual == value)
            .unwrap_or(false),
    }
}
