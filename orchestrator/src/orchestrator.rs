use std::sync::Arc;
use std::time::Duration;

use agency_contracts::{ExecutionMode, Permissions, Step, Workflow};
use agency_escalation::{EscalationHandler, EscalationHistory, EscalationPolicy};
use agency_execution::{AgentExecutor, AgentRegistry};
use agency_router::Router;
use agency_validation::{EvidenceValidator, SchemaValidator};
use agency_workflow_engine::WorkflowEngine;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::OrchestratorError;
use crate::response::{OrchestratorResponse, StepAnnotation};

/// Entry point: routes a request, builds and runs a workflow, and attaches
/// schema/evidence validation to every StepResult that produced an output.
pub struct Orchestrator {
    router: Router,
    engine: WorkflowEngine,
    schema_validator: SchemaValidator,
    evidence_validator: EvidenceValidator,
}

impl Orchestrator {
    pub fn new(config: AppConfig, registry: AgentRegistry) -> Self {
        let router = Router::with_rules(config.router, agency_router::default_rules());

        let executor = Arc::new(AgentExecutor::new(Arc::new(registry), config.executor));
        let policy = EscalationPolicy::default_topology();
        let mut policy = policy;
        policy.set_max_depth(config.escalation.max_depth as i64);
        let history = EscalationHistory::new(Duration::from_secs(config.escalation.history_window_secs));
        let handler = Arc::new(EscalationHandler::new(
            Arc::new(RwLock::new(policy)),
            Arc::new(history),
        ));
        let engine = WorkflowEngine::new(executor, handler);

        Self {
            router,
            engine,
            schema_validator: SchemaValidator::new(config.validation_mode),
            evidence_validator: EvidenceValidator::new(config.validation_mode),
        }
    }

    #[cfg(test)]
    fn with_validation_mode(
        config: AppConfig,
        registry: AgentRegistry,
        mode: agency_validation::ValidationMode,
    ) -> Self {
        let mut config = config;
        config.validation_mode = mode;
        Self::new(config, registry)
    }

    /// Routes `text` to a primary agent and runs it as a trivial single-step
    /// sequential workflow.
    pub async fn handle_request(
        &self,
        text: &str,
        permissions: Permissions,
        cancellation: CancellationToken,
    ) -> Result<OrchestratorResponse, OrchestratorError> {
        let agent = self.router.route(text);
        let workflow = Workflow {
            id: format!("req-{}", Uuid::new_v4()),
            mode: ExecutionMode::Sequential,
            steps: vec![Step {
                id: "s1".to_string(),
                agent,
                input: text.to_string(),
                permissions,
                condition: None,
                depends_on: Vec::new(),
            }],
            metadata: Default::default(),
        };
        self.execute_workflow(workflow, cancellation).await
    }

    /// Lower-level entry for caller-constructed workflows; same validation
    /// pass on the way out as `handle_request`.
    pub async fn execute_workflow(
        &self,
        workflow: Workflow,
        cancellation: CancellationToken,
    ) -> Result<OrchestratorResponse, OrchestratorError> {
        let execution = self.engine.run(workflow, cancellation).await?;

        let mut annotations = Vec::new();
        for step_result in &execution.step_results {
            if let Some(output) = &step_result.output {
                annotations.push(StepAnnotation {
                    step_id: step_result.step_id.clone(),
                    schema: self.schema_validator.validate(output),
                    evidence: self.evidence_validator.validate(output),
                });
            }
        }

        Ok(OrchestratorResponse {
            execution,
            annotations,
        })
    }
}
