#[derive(Debug, thiserror::Error)]
pub enum EscalationError {
    #[error("escalation request is malformed: {0}")]
    Malformed(String),
}
