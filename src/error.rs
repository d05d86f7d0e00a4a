use thiserror::Error;

/// Conditions a ledger operation reports back to the caller without
/// mutating anything.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Nothing to undo: the assessment is empty")]
    EmptyUndo,
}
