//! Replay of recorded lists against a backend context.

use strand_core::CommandContext;

use crate::error::ExecuteError;
use crate::list::{CommandList, ListState};
use crate::stats::CommandListStats;

/// Replays [`CommandList`]s against the one context it owns.
///
/// The executor is owned by whoever drives the backend (the renderer, or
/// the submission thread in `strand-engine`); there is no process-wide
/// instance. Lists execute in the order
/// [`execute_command_list`](Self::execute_command_list) is called, and
/// within a list strictly in recording order.
pub struct CommandListExecutor<C> {
    context: Option<C>,
    frame_stats: CommandListStats,
}

impl<C: CommandContext> CommandListExecutor<C> {
    /// Executor with no context bound.
    pub fn new() -> Self {
        Self {
            context: None,
            frame_stats: CommandListStats::default(),
        }
    }

    /// Executor bound to `context`.
    pub fn with_context(context: C) -> Self {
        Self {
            context: Some(context),
            frame_stats: CommandListStats::default(),
        }
    }

    /// Bind `context`, returning the previously bound one.
    pub fn set_context(&mut self, context: C) -> Option<C> {
        let previous = self.context.replace(context);
        tracing::debug!(replaced = previous.is_some(), "executor context bound");
        previous
    }

    /// Unbind and return the current context.
    pub fn take_context(&mut self) -> Option<C> {
        self.context.take()
    }

    /// The bound context.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// The bound context, mutably.
    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    /// Replay every command in `list`, head to tail, against the bound
    /// context, then mark the list [`ListState::Executed`].
    ///
    /// No command is reordered, batched or skipped. The list keeps its
    /// commands (and their captured resources) until it is reset.
    ///
    /// # Errors
    ///
    /// - [`ExecuteError::StillRecording`] if the list is between `begin()`
    ///   and `end()`.
    /// - [`ExecuteError::NoContext`] if no context is bound.
    ///
    /// Nothing is replayed in either case.
    pub fn execute_command_list(&mut self, list: &mut CommandList) -> Result<(), ExecuteError> {
        if list.state == ListState::Recording {
            return Err(ExecuteError::StillRecording);
        }
        let ctx = self.context.as_mut().ok_or(ExecuteError::NoContext)?;

        let _span = tracing::trace_span!("execute_command_list", commands = list.len()).entered();
        for command in &list.commands {
            command.execute(ctx, &list.allocator);
        }

        self.frame_stats += list.stats();
        list.state = ListState::Executed;
        Ok(())
    }

    /// Block until the GPU has finished all submitted work, via the
    /// context's `flush`.
    pub fn wait_for_gpu(&mut self) -> Result<(), ExecuteError> {
        let ctx = self.context.as_mut().ok_or(ExecuteError::NoContext)?;
        ctx.flush();
        Ok(())
    }

    /// Totals over every list executed since the last [`tick`](Self::tick).
    pub fn frame_stats(&self) -> CommandListStats {
        self.frame_stats
    }

    /// Start a new frame: zero the frame totals.
    pub fn tick(&mut self) {
        self.frame_stats = CommandListStats::default();
    }
}

impl<C: CommandContext> Default for CommandListExecutor<C> {
    fn default() -> Self {
        Self::new()
    }
}
