//! Submission errors.

use strand_arena::ArenaError;
use strand_command::ExecuteError;

/// Errors from [`SubmissionThread`](crate::SubmissionThread).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// A list was submitted between `begin()` and `end()`. The list is
    /// dropped.
    #[error("command list submitted while still recording")]
    StillRecording,
    /// The submission thread has stopped.
    #[error("submission thread has shut down")]
    Disconnected,
    /// The submission thread panicked; its executor is lost.
    #[error("submission thread panicked")]
    ThreadPanicked,
    /// A submitted list failed to execute.
    #[error("execution failed: {0}")]
    Execute(#[from] ExecuteError),
    /// A fresh list could not be created.
    #[error("command list allocation failed: {0}")]
    Arena(#[from] ArenaError),
}
