//! Generation-time error taxonomy.
//!
//! Runtime failures (kind mismatches, unrecognized tags) belong to the
//! *emitted* code and surface there as `ParseError` values; nothing in this
//! crate ever constructs them directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// A grammar definition is structurally inconsistent with what the
    /// generator can represent. Aborts the offending unit, no partial output.
    #[error("schema violation in `{node}`: {detail}")]
    SchemaViolation { node: String, detail: String },

    /// The schema or config document failed to deserialize.
    #[error("failed to load {what}: {detail}")]
    SchemaLoad { what: &'static str, detail: String },
}

impl GenError {
    pub fn violation(node: impl Into<String>, detail: impl Into<String>) -> Self {
        GenError::SchemaViolation {
            node: node.into(),
            detail: detail.into(),
        }
    }
}
