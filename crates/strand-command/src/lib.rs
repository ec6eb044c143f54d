//! Deferred GPU command recording and replay.
//!
//! Render code records work into a [`CommandList`] without touching a
//! backend. A [`CommandListExecutor`] later replays the list, head to
//! tail, against a [`CommandContext`](strand_core::CommandContext).
//!
//! ```text
//! render code ──record──> CommandList ──execute──> CommandListExecutor ──> CommandContext
//!                          ├── Vec<RenderCommand>   (ordered records, owned handles)
//!                          └── CommandAllocator     (variable-length payloads)
//! ```
//!
//! # Resource lifetime
//!
//! Every resource handle passed to a recording method is cloned into the
//! recorded [`RenderCommand`]. The command owns those clones, including
//! every element of captured arrays, so the resource outlives the command
//! even if the caller drops its own handle immediately. [`CommandList::reset`]
//! drops the records in recording order, releasing each captured reference
//! exactly once.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod executor;
pub mod list;
pub mod stats;

pub use command::RenderCommand;
pub use error::ExecuteError;
pub use executor::CommandListExecutor;
pub use list::{CommandList, ListState};
pub use stats::CommandListStats;
