//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repo(String),

    /// A referenced record (disorder, entry, medication, alter) does not exist.
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// Input rejected at the storage boundary (severity out of range, empty name, ...).
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("UI error: {0}")]
    Ui(String),

    /// The user backed out of a prompt.
    #[error("Cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }
}
