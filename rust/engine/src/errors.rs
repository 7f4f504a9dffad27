use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Session already finalized")]
    Finalized,
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Chip amount out of range")]
    Overflow,
}
