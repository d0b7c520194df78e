use std::sync::Arc;

use agency_contracts::{
    EscalationRequest, ExecutionMode, ExecutionResult, ExecutionStatus, Step, StepResult,
    StepStatus, Workflow,
};
use agency_escalation::EscalationHandler;
use agency_execution::AgentExecutor;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::condition;
use crate::error::EngineError;

/// Drives a `Workflow` to completion against its declared `ExecutionMode`.
/// Validates the workflow up front; never executes a single step of a
/// workflow that fails validation.
pub struct WorkflowEngine {
    executor: Arc<AgentExecutor>,
    escalations: Arc<EscalationHandler>,
}

impl WorkflowEngine {
    pub fn new(executor: Arc<AgentExecutor>, escalations: Arc<EscalationHandler>) -> Self {
        Self {
            executor,
            escalations,
        }
    }

    pub async fn run(
        &self,
        workflow: Workflow,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResult, EngineError> {
        workflow
            .validate()
            .map_err(|e| EngineError::InvalidWorkflow(e.to_string()))?;

        match workflow.mode {
            ExecutionMode::Sequential => {
                Ok(self.run_linear(workflow, cancellation, false).await)
            }
            ExecutionMode::Conditional => {
                Ok(self.run_linear(workflow, cancellation, true).await)
            }
            ExecutionMode::Parallel => Ok(self.run_parallel(workflow, cancellation).await),
        }
    }

    /// Shared driver for sequential and conditional modes: index-based
    /// iteration over a step list the engine may append to as escalations
    /// are approved. `evaluate_conditions` gates execution behind a
    /// `Condition` check when set.
    async fn run_linear(
        &self,
        workflow: Workflow,
        cancellation: CancellationToken,
        evaluate_conditions: bool,
    ) -> ExecutionResult {
        let mut steps = workflow.steps;
        let mut result = ExecutionResult::new(workflow.id.clone());
        let mut escalation_count = 0usize;
        let mut i = 0;
        let mut failure: Option<String> = None;

        while i < steps.len() {
            if cancellation.is_cancelled() {
                result.status = ExecutionStatus::Cancelled;
                result.error = Some("workflow cancelled".to_string());
                return result;
            }

            let step = steps[i].clone();

            if evaluate_conditions {
                if let Some(cond) = &step.condition {
                    if !condition::evaluate(cond, &result) {
                        result
                            .step_results
                            .push(StepResult::skipped(&step.id, &step.agent));
                        i += 1;
                        continue;
                    }
                }
            }

            let step_result = self
                .executor
                .execute_step(&step, &result, &cancellation)
                .await;

            match step_result.status {
                StepStatus::Failed => {
                    let step_id = step_result.step_id.clone();
                    result.step_results.push(step_result);
                    if failure.is_none() {
                        failure = Some(format!("step {:?} failed at index {}", step_id, i));
                    }
                    // Sequential mode stops here; conditional mode keeps
                    // walking so later steps still get their skip/run
                    // decision recorded, per the condition-skip scenario.
                    if !evaluate_conditions {
                        result.status = ExecutionStatus::Failed;
                        result.error = failure;
                        return result;
                    }
                    i += 1;
                    continue;
                }
                StepStatus::Escalated => {
                    let target = step_result.escalation_target.clone();
                    let reason = step_result.escalation_reason.clone().unwrap_or_default();
                    result.step_results.push(step_result);

                    let request = EscalationRequest {
                        source: step.agent.clone(),
                        reason: reason.clone(),
                        suggested_target: target.filter(|t| !t.is_empty()),
                        original_task: step.input.clone(),
                        permissions: step.permissions.clone(),
                        context: Default::default(),
                        timestamp: chrono::Utc::now(),
                    };

                    match self.escalations.handle(request).await {
                        Ok(decision) if decision.approved => {
                            let target = decision.target.unwrap_or_default();
                            escalation_count += 1;
                            let new_step = Step {
                                id: format!("{}-escalated-{}", step.id, escalation_count),
                                agent: target,
                                input: reason,
                                permissions: step.permissions.clone(),
                                condition: None,
                                depends_on: Vec::new(),
                            };
                            info!(parent = %step.id, new_step = %new_step.id, agent = %new_step.agent, "materialized escalation step");
                            steps.push(new_step);
                        }
                        Ok(decision) => {
                            warn!(step = %step.id, reason = %decision.reason, "escalation denied, not materialized");
                        }
                        Err(err) => {
                            warn!(step = %step.id, error = %err, "escalation handler rejected malformed request");
                        }
                    }
                    i += 1;
                }
                _ => {
                    result.step_results.push(step_result);
                    i += 1;
                }
            }
        }

        match failure {
            Some(err) => {
                result.status = ExecutionStatus::Failed;
                result.error = Some(err);
            }
            None => result.status = ExecutionStatus::Completed,
        }
        result
    }

    /// One cooperative task per step, each seeing an empty `ExecutionResult`
    /// snapshot (parallel steps never observe each other's output). Results
    /// are reassembled in original step order regardless of completion
    /// order. Escalations are recorded as status only; the step list is
    /// never mutated.
    async fn run_parallel(
        &self,
        workflow: Workflow,
        cancellation: CancellationToken,
    ) -> ExecutionResult {
        let empty = ExecutionResult::new(workflow.id.clone());
        let mut handles = Vec::with_capacity(workflow.steps.len());

        for step in workflow.steps.into_iter() {
            let executor = Arc::clone(&self.executor);
            let empty = empty.clone();
            let token = cancellation.clone();
            handles.push(tokio::spawn(async move {
                executor.execute_step(&step, &empty, &token).await
            }));
        }

        let mut step_results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(step_result) => step_results.push(step_result),
                Err(join_error) => step_results.push(StepResult::failed(
                    "unknown",
                    "unknown",
                    format!("step task panicked: {join_error}"),
                )),
            }
        }

        let mut result = ExecutionResult::new(workflow.id);
        let first_failure = step_results
            .iter()
            .enumerate()
            .find(|(_, r)| r.status == StepStatus::Failed)
            .map(|(i, r)| format!("step {:?} failed at index {}", r.step_id, i));
        result.step_results = step_results;
        result.status = if cancellation.is_cancelled() {
            ExecutionStatus::Cancelled
        } else if first_failure.is_some() {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Completed
        };
        if result.status == ExecutionStatus::Failed {
            result.error = first_failure;
        }
        result
    }
}
