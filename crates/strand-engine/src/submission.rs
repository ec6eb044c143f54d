//! Dedicated submission thread.
//!
//! Render threads record [`CommandList`]s and hand them to
//! [`SubmissionThread::submit`]. The thread owns the
//! [`CommandListExecutor`] (and through it the backend context), replays
//! lists in submission order, resets them, and returns them through a
//! recycle channel so the next frame reuses their arenas.
//!
//! Execution errors cannot be reported from `submit` without blocking, so
//! the first failure is held and returned by the next
//! [`wait_for_commands`](SubmissionThread::wait_for_commands) or
//! [`wait_for_gpu`](SubmissionThread::wait_for_gpu).

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use strand_arena::ArenaConfig;
use strand_command::{CommandList, CommandListExecutor, ExecuteError};
use strand_core::CommandContext;

use crate::config::{ConfigError, EngineConfig};
use crate::error::SubmitError;

type Reply = Sender<Result<(), ExecuteError>>;

enum Task {
    Execute(CommandList),
    /// Reply once every earlier list has executed.
    Fence(Reply),
    /// As `Fence`, then flush the context.
    WaitForGpu(Reply),
}

/// Owns a background thread that replays submitted command lists.
pub struct SubmissionThread<C: CommandContext + Send + 'static> {
    task_tx: Option<Sender<Task>>,
    recycle_rx: Receiver<CommandList>,
    thread: Option<JoinHandle<CommandListExecutor<C>>>,
    arena: ArenaConfig,
}

impl<C: CommandContext + Send + 'static> SubmissionThread<C> {
    /// Validate `config` and start the thread, moving `executor` onto it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the
    /// thread cannot be spawned.
    pub fn spawn(executor: CommandListExecutor<C>, config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (task_tx, task_rx) = crossbeam_channel::bounded(config.queue_depth);
        let (recycle_tx, recycle_rx) = crossbeam_channel::bounded(config.recycle_capacity);

        let thread = thread::Builder::new()
            .name("strand-submit".into())
            .spawn(move || run(executor, task_rx, recycle_tx))
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;

        tracing::info!(
            queue_depth = config.queue_depth,
            recycle_capacity = config.recycle_capacity,
            "submission thread started"
        );

        Ok(Self {
            task_tx: Some(task_tx),
            recycle_rx,
            thread: Some(thread),
            arena: config.arena.clone(),
        })
    }

    /// Queue `list` for execution. Blocks while the queue is full.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::StillRecording`] if `end()` has not been called.
    ///   The list is dropped, releasing its references.
    /// - [`SubmitError::Disconnected`] if the thread has stopped.
    pub fn submit(&self, list: CommandList) -> Result<(), SubmitError> {
        if list.is_recording() {
            return Err(SubmitError::StillRecording);
        }
        self.send(Task::Execute(list))
    }

    /// A reset list ready for recording: a recycled one if available,
    /// otherwise a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Arena`] if a fresh list cannot be created.
    pub fn recycle(&self) -> Result<CommandList, SubmitError> {
        match self.recycle_rx.try_recv() {
            Ok(list) => Ok(list),
            Err(_) => Ok(CommandList::new(&self.arena)?),
        }
    }

    /// Block until every list submitted so far has executed.
    ///
    /// # Errors
    ///
    /// Returns the first execution failure since the previous wait, or
    /// [`SubmitError::Disconnected`] if the thread has stopped.
    pub fn wait_for_commands(&self) -> Result<(), SubmitError> {
        self.round_trip(Task::Fence)
    }

    /// Block until every list submitted so far has executed and the
    /// context has flushed.
    ///
    /// # Errors
    ///
    /// As [`wait_for_commands`](Self::wait_for_commands), plus
    /// [`ExecuteError::NoContext`] from the flush.
    pub fn wait_for_gpu(&self) -> Result<(), SubmitError> {
        self.round_trip(Task::WaitForGpu)
    }

    /// Drain the queue, stop the thread and return its executor.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::ThreadPanicked`] if the thread panicked.
    pub fn shutdown(mut self) -> Result<CommandListExecutor<C>, SubmitError> {
        self.task_tx.take();
        let handle = self.thread.take().ok_or(SubmitError::Disconnected)?;
        let executor = handle.join().map_err(|_| SubmitError::ThreadPanicked)?;
        tracing::info!("submission thread stopped");
        Ok(executor)
    }

    fn send(&self, task: Task) -> Result<(), SubmitError> {
        let tx = self.task_tx.as_ref().ok_or(SubmitError::Disconnected)?;
        tx.send(task).map_err(|_| SubmitError::Disconnected)
    }

    fn round_trip(&self, task: impl FnOnce(Reply) -> Task) -> Result<(), SubmitError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.send(task(reply_tx))?;
        let result = reply_rx.recv().map_err(|_| SubmitError::Disconnected)?;
        result.map_err(SubmitError::from)
    }
}

impl<C: CommandContext + Send + 'static> Drop for SubmissionThread<C> {
    fn drop(&mut self) {
        self.task_tx.take();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl<C: CommandContext + Send + 'static> std::fmt::Debug for SubmissionThread<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionThread")
            .field("running", &self.thread.is_some())
            .field("recycled", &self.recycle_rx.len())
            .finish()
    }
}

// ── Thread loop ──────────────────────────────────────────────────

fn run<C: CommandContext>(
    mut executor: CommandListExecutor<C>,
    tasks: Receiver<Task>,
    recycle: Sender<CommandList>,
) -> CommandListExecutor<C> {
    let mut failure: Option<ExecuteError> = None;

    for task in tasks {
        match task {
            Task::Execute(mut list) => {
                if let Err(e) = executor.execute_command_list(&mut list) {
                    tracing::error!(error = %e, commands = list.len(), "command list failed");
                    failure.get_or_insert(e);
                }
                list.reset();
                match recycle.try_send(list) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::trace!("recycle pool full, list dropped");
                    }
                    Err(TrySendError::Disconnected(_)) => {}
                }
            }
            Task::Fence(reply) => {
                let _ = reply.send(failure.take().map_or(Ok(()), Err));
            }
            Task::WaitForGpu(reply) => {
                let result = match failure.take() {
                    Some(e) => Err(e),
                    None => executor.wait_for_gpu(),
                };
                let _ = reply.send(result);
            }
        }
    }

    executor
}

// Compile-time assertion: the handle can move between threads.
const _: () = {
    fn _assert_send<T: Send>() {}
    fn _check<C: CommandContext + Send + 'static>() {
        _assert_send::<SubmissionThread<C>>();
    }
};
