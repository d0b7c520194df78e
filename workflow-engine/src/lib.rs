//! Drives a validated `Workflow` through its declared `ExecutionMode`,
//! routing agent-raised escalations through the escalation handler and
//! materializing approved ones as new steps.

pub mod condition;
pub mod engine;
pub mod error;

pub use engine::WorkflowEngine;
pub use error::EngineError;

#[cfg(test)]
mod tests {
    use super::*;
    use agency_contracts::agent_output::AGENT_OUTPUT_VERSION;
    use agency_contracts::{
        AgentOutput, AgentRequest, AgentResponse, AgentStatus, Condition, EscalationMarker,
        ExecutionMode, ExecutionStatus, Permissions, Step, StepStatus, Workflow,
    };
    use agency_escalation::{EscalationHandler, EscalationHistory, EscalationPolicy};
    use agency_execution::{AgentExecutor, AgentInvoker, AgentRegistry, ExecutorConfig};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;
    use tokio_util::sync::CancellationToken;

    fn output(component: &str) -> AgentOutput {
        AgentOutput {
            version: AGENT_OUTPUT_VERSION.to_string(),
            component: component.to_string(),
            scope: String::new(),
            overview: String::new(),
            raw_evidence: vec![],
            entry_points: vec![],
            call_graph: vec![],
            data_flow: Default::default(),
            state_operations: vec![],
            side_effects: vec![],
            error_handlers: vec![],
            configuration_influence: vec![],
            patterns: vec![],
            concurrency_mechanisms: vec![],
            external_dependencies: vec![],
        }
    }

    struct Succeeds(String);

    #[async_trait]
    impl AgentInvoker for Succeeds {
        async fn invoke(&self, _request: AgentRequest) -> AgentResponse {
            AgentResponse {
                request_id: "r".to_string(),
                agent_id: self.0.clone(),
                status: AgentStatus::Complete,
                output: Some(output(&self.0)),
                error: None,
                escalation: None,
                timestamp: Utc::now(),
            }
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl AgentInvoker for AlwaysFails {
        async fn invoke(&self, _request: AgentRequest) -> AgentResponse {
            AgentResponse {
                request_id: "r".to_string(),
                agent_id: "locator".to_string(),
                status: AgentStatus::Error,
                output: None,
                error: Some(agency_contracts::AgentError {
                    code: "broken".to_string(),
                    message: "cannot proceed".to_string(),
                    recoverable: false,
                }),
                escalation: None,
                timestamp: Utc::now(),
            }
        }
    }

    struct EscalatesWithoutTarget;

    #[async_trait]
    impl AgentInvoker for EscalatesWithoutTarget {
        async fn invoke(&self, _request: AgentRequest) -> AgentResponse {
            AgentResponse {
                request_id: "r".to_string(),
                agent_id: "locator".to_string(),
                status: AgentStatus::EscalationRequired,
                output: None,
                error: None,
                escalation: Some(EscalationMarker {
                    required: true,
                    target_agent: None,
                    reason: Some("need to analyze code structure".to_string()),
                    required_info: None,
                }),
                timestamp: Utc::now(),
            }
        }
    }

    struct EscalatesWithDisallowedTarget;

    #[async_trait]
    impl AgentInvoker for EscalatesWithDisallowedTarget {
        async fn invoke(&self, _request: AgentRequest) -> AgentResponse {
            AgentResponse {
                request_id: "r".to_string(),
                agent_id: "locator".to_string(),
                status: AgentStatus::EscalationRequired,
                output: None,
                error: None,
                escalation: Some(EscalationMarker {
                    required: true,
                    target_agent: Some("nonexistent".to_string()),
                    reason: Some("need help".to_string()),
                    required_info: None,
                }),
                timestamp: Utc::now(),
            }
        }
    }

    fn step(id: &str, agent: &str) -> Step {
        Step {
            id: id.to_string(),
            agent: agent.to_string(),
            input: "do work".to_string(),
            permissions: Permissions::default(),
            condition: None,
            depends_on: vec![],
        }
    }

    fn engine_with(registry: AgentRegistry) -> WorkflowEngine {
        let executor = Arc::new(AgentExecutor::new(Arc::new(registry), ExecutorConfig::default()));
        let handler = Arc::new(EscalationHandler::new(
            Arc::new(RwLock::new(EscalationPolicy::default_topology())),
            Arc::new(EscalationHistory::new(Duration::from_secs(300))),
        ));
        WorkflowEngine::new(executor, handler)
    }

    #[tokio::test]
    async fn sequential_runs_steps_in_order_and_completes() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(Succeeds("locator".to_string())));
        registry.register("analyzer", Arc::new(Succeeds("analyzer".to_string())));
        let engine = engine_with(registry);

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Sequential,
            steps: vec![step("s1", "locator"), step("s2", "analyzer")],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.step_results.len(), 2);
        assert_eq!(result.step_results[0].step_id, "s1");
        assert_eq!(result.step_results[1].step_id, "s2");
    }

    #[tokio::test]
    async fn sequential_stops_on_failure_with_index_in_error() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(AlwaysFails));
        registry.register("analyzer", Arc::new(Succeeds("analyzer".to_string())));
        let engine = engine_with(registry);

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Sequential,
            steps: vec![step("s1", "locator"), step("s2", "analyzer")],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.step_results.len(), 1);
        assert!(result.error.unwrap().contains("index 0"));
    }

    #[tokio::test]
    async fn sequential_escalation_materializes_approved_step_and_executes_it() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(EscalatesWithoutTarget));
        registry.register("analyzer", Arc::new(Succeeds("analyzer".to_string())));
        let engine = engine_with(registry);

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Sequential,
            steps: vec![step("s1", "locator")],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.step_results.len(), 2);
        assert_eq!(result.step_results[0].status, StepStatus::Escalated);
        assert_eq!(result.step_results[1].step_id, "s1-escalated-1");
        assert_eq!(result.step_results[1].agent, "analyzer");
        assert_eq!(result.step_results[1].status, StepStatus::Completed);
        assert_eq!(result.status, ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn sequential_denied_escalation_is_not_materialized() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(EscalatesWithDisallowedTarget));
        let engine = engine_with(registry);

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Sequential,
            steps: vec![step("s1", "locator")],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.step_results.len(), 1);
        assert_eq!(result.step_results[0].status, StepStatus::Escalated);
        assert_eq!(result.status, ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn conditional_skips_step_when_condition_false() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(Succeeds("locator".to_string())));
        registry.register("analyzer", Arc::new(Succeeds("analyzer".to_string())));
        let engine = engine_with(registry);

        let mut gated = step("s2", "analyzer");
        gated.depends_on = vec!["s1".to_string()];
        gated.condition = Some(Condition::OutputFieldEquals {
            step_id: "s1".to_string(),
            field: "component".to_string(),
            value: serde_json::json!("nonexistent-component"),
        });

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Conditional,
            steps: vec![step("s1", "locator"), gated],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.step_results.len(), 2);
        assert_eq!(result.step_results[1].status, StepStatus::Skipped);
        assert_eq!(result.status, ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn conditional_mode_records_skip_after_earlier_step_fails() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(AlwaysFails));
        registry.register("analyzer", Arc::new(Succeeds("analyzer".to_string())));
        let engine = engine_with(registry);

        let mut gated = step("s2", "analyzer");
        gated.condition = Some(Condition::StepSucceeded {
            step_id: "s1".to_string(),
        });

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Conditional,
            steps: vec![step("s1", "locator"), gated],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.step_results.len(), 2);
        assert_eq!(result.step_results[0].status, StepStatus::Failed);
        assert_eq!(result.step_results[1].status, StepStatus::Skipped);
        assert_eq!(result.status, ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn parallel_runs_disjoint_and_preserves_step_order() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(Succeeds("locator".to_string())));
        registry.register("analyzer", Arc::new(Succeeds("analyzer".to_string())));
        let engine = engine_with(registry);

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Parallel,
            steps: vec![step("s1", "locator"), step("s2", "analyzer")],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.step_results[0].step_id, "s1");
        assert_eq!(result.step_results[1].step_id, "s2");
    }

    #[tokio::test]
    async fn parallel_failure_reports_first_error_by_declared_order() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(AlwaysFails));
        registry.register("analyzer", Arc::new(Succeeds("analyzer".to_string())));
        let engine = engine_with(registry);

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Parallel,
            steps: vec![step("s1", "locator"), step("s2", "analyzer")],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, CancellationToken::new()).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.error.unwrap().contains("s1"));
    }

    #[tokio::test]
    async fn invalid_workflow_is_rejected_before_any_step_runs() {
        let registry = AgentRegistry::new();
        let engine = engine_with(registry);

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Sequential,
            steps: vec![step("s1", ""), step("s1", "locator")],
            metadata: Default::default(),
        };

        let err = engine.run(workflow, CancellationToken::new()).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn cancelled_token_yields_cancelled_status() {
        let mut registry = AgentRegistry::new();
        registry.register("locator", Arc::new(Succeeds("locator".to_string())));
        let engine = engine_with(registry);
        let token = CancellationToken::new();
        token.cancel();

        let workflow = Workflow {
            id: "w1".to_string(),
            mode: ExecutionMode::Sequential,
            steps: vec![step("s1", "locator")],
            metadata: Default::default(),
        };

        let result = engine.run(workflow, token).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Cancelled);
        assert!(result.step_results.is_empty());
    }
}
