//! Submission thread and deferred resource deletion for Strand.
//!
//! [`SubmissionThread`] runs a [`CommandListExecutor`](strand_command::CommandListExecutor)
//! on a dedicated thread: render threads record lists, submit them, and
//! get reset lists back for the next frame. [`DeletionQueue`] defers
//! resource destruction onto the command timeline.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod deletion;
pub mod error;
pub mod submission;

pub use config::{ConfigError, EngineConfig};
pub use deletion::DeletionQueue;
pub use error::SubmitError;
pub use submission::SubmissionThread;
