#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("agent {0:?} is not registered")]
    AgentNotFound(String),
}
