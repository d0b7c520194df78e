use std::sync::Arc;
use std::time::Duration;

use agency_contracts::step_result::StepStatus;
use agency_contracts::{
    AgentContext, AgentRequest, AgentStatus, AgentTask, ExecutionResult, Step, StepResult,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agent::AgentRegistry;
use crate::error::ExecutionError;

/// Up to `max_attempts` total tries; retried only when the agent's error
/// is marked `recoverable`. `max_attempts = 1` means exactly one attempt,
/// no retry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub max_attempts: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Invokes a named agent for a single step, retrying recoverable errors
/// with quadratic backoff and surfacing escalation markers. Never
/// rewrites the agent's output; schema/evidence validation is the
/// orchestrator's job.
pub struct AgentExecutor {
    registry: Arc<AgentRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(registry: Arc<AgentRegistry>, config: ExecutorConfig) -> Self {
        Self { registry, config }
    }

    pub async fn execute_step(
        &self,
        step: &Step,
        execution_so_far: &ExecutionResult,
        cancellation: &CancellationToken,
    ) -> StepResult {
        let Some(agent) = self.registry.get(&step.agent) else {
            let err = ExecutionError::AgentNotFound(step.agent.clone());
            warn!(step = %step.id, agent = %step.agent, "agent not registered");
            return StepResult::failed(&step.id, &step.agent, err.to_string());
        };

        let previous_agents: Vec<String> = execution_so_far
            .step_results
            .iter()
            .filter(|r| r.status == StepStatus::Completed)
            .map(|r| r.agent.clone())
            .collect();

        let accumulated_context = execution_so_far
            .step_results
            .iter()
            .filter(|r| r.status == StepStatus::Completed)
            .filter_map(|r| r.output.as_ref())
            .filter_map(|out| serde_json::to_value(out).ok())
            .collect();

        let request = AgentRequest {
            task: AgentTask {
                specific_request: step.input.clone(),
            },
            permissions: step.permissions.clone(),
            context: AgentContext {
                user_request: step.input.clone(),
                previous_agents,
                accumulated_context,
            },
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            if cancellation.is_cancelled() {
                return StepResult::failed(&step.id, &step.agent, "cancelled before invocation");
            }

            let response = agent.invoke(request.clone()).await;

            if let Some(escalation) = &response.escalation {
                if escalation.required {
                    return StepResult::escalated(
                        &step.id,
                        &step.agent,
                        escalation.target_agent.clone().unwrap_or_default(),
                        escalation.reason.clone().unwrap_or_default(),
                    );
                }
            }

            match response.status {
                AgentStatus::Complete => {
                    let Some(output) = response.output else {
                        return StepResult::failed(&step.id, &step.agent, "agent reported complete with no output");
                    };
                    info!(step = %step.id, agent = %step.agent, attempt, "step completed");
                    return StepResult::completed(&step.id, &step.agent, output);
                }
                AgentStatus::EscalationRequired => {
                    let escalation = response.escalation.unwrap_or(agency_contracts::EscalationMarker {
                        required: true,
                        target_agent: None,
                        reason: None,
                        required_info: None,
                    });
                    return StepResult::escalated(
                        &step.id,
                        &step.agent,
                        escalation.target_agent.unwrap_or_default(),
                        escalation.reason.unwrap_or_default(),
                    );
                }
                AgentStatus::Error => {
                    let err = response.error.unwrap_or(agency_contracts::AgentError {
                        code: "unknown".to_string(),
                        message: "agent returned no error detail".to_string(),
                        recoverable: false,
                    });

                    if err.recoverable && attempt < self.config.max_attempts {
                        let delay = Duration::from_millis(10 * (attempt as u64).pow(2));
                        warn!(step = %step.id, agent = %step.agent, attempt, delay_ms = delay.as_millis() as u64, "retrying recoverable agent error");
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = cancellation.cancelled() => {
                                return StepResult::failed(&step.id, &step.agent, "cancelled during retry backoff");
                            }
                        }
                        continue;
                    }

                    return StepResult::failed(&step.id, &step.agent, err.message);
                }
            }
        }
    }
}
