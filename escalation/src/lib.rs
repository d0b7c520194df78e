//! Escalation policy, append-only history, and the handler that decides
//! on an `EscalationRequest` using both.

pub mod error;
pub mod handler;
pub mod history;
pub mod policy;

pub use error::EscalationError;
pub use handler::EscalationHandler;
pub use history::{EscalationHistory, DEFAULT_WINDOW};
pub use policy::EscalationPolicy;
