use agency_contracts::ExecutionResult;
use agency_validation::{EvidenceReport, SchemaReport};
use serde::Serialize;

/// Schema + evidence findings for one StepResult that carried an output.
#[derive(Debug, Clone, Serialize)]
pub struct StepAnnotation {
    pub step_id: String,
    pub schema: SchemaReport,
    pub evidence: EvidenceReport,
}

/// The Orchestrator's aggregated response to `HandleRequest`/`ExecuteWorkflow`:
/// the raw execution plus per-step validation findings.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorResponse {
    pub execution: ExecutionResult,
    pub annotations: Vec<StepAnnotation>,
}

impl OrchestratorResponse {
    /// True iff every annotated step passed both schema and evidence
    /// validation. A response with no annotated steps (e.g. nothing but
    /// failed steps) is vacuously valid here.
    pub fn all_valid(&self) -> bool {
        self.annotations
            .iter()
            .all(|a| a.schema.valid && a.evidence.valid)
    }
}
