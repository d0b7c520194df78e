#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Engine(#[from] agency_workflow_engine::EngineError),
    #[error("config error: {0}")]
    Config(String),
}
