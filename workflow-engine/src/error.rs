#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("workflow failed validation: {0}")]
    InvalidWorkflow(String),
}
