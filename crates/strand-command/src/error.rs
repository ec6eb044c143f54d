//! Errors surfaced when replaying a command list.

/// Errors from [`CommandListExecutor`](crate::CommandListExecutor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    /// No context is bound to the executor.
    #[error("no command context is bound to the executor")]
    NoContext,
    /// The list is between `begin()` and `end()`.
    #[error("command list is still recording; call end() before executing")]
    StillRecording,
}
