//! Two-stage output validation: shape first (`schema`), backing second
//! (`evidence`). Neither validator mutates the `AgentOutput` it inspects.

pub mod error;
pub mod evidence;
pub mod schema;

pub use error::FieldError;
pub use evidence::{EvidenceReport, EvidenceValidator, UnbackedClaim};
pub use schema::{SchemaReport, SchemaValidator, ValidationMode};
