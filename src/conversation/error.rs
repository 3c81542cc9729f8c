//! Submission errors.

use thiserror::Error;

use super::input::InputKind;
use crate::document::ValidationError;
use crate::workflow::PhaseError;

/// Result type for conversation submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// A submission that was not accepted.
///
/// None of these are fatal: the thread keeps its prompt and the document is
/// left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Submitted to a thread that is no longer the active one.
    #[error("Thread {0} is no longer active")]
    StaleThreadSubmission(u32),

    /// The input surface is locked while a reply is pending or revealing.
    #[error("Input is locked until the current reply finishes")]
    InputLocked,

    /// Nothing is being asked right now.
    #[error("There is no question to answer")]
    NoActivePrompt,

    #[error("Unknown thread {0}")]
    UnknownThread(u32),

    #[error("Unknown message {0}")]
    UnknownMessage(u64),

    /// The answer does not fit the active input.
    #[error("Expected a {expected} answer")]
    WrongShape { expected: InputKind },

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Option '{0}' is not available")]
    OptionDisabled(String),

    /// A list must keep at least one entry.
    #[error("The last entry cannot be removed")]
    LastEntry,

    #[error("No entry at position {0}")]
    UnknownEntry(usize),

    /// The answer was empty where content is required.
    #[error("Please enter an answer")]
    Blank,

    /// The document rejected the change.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Phase(#[from] PhaseError),
}
