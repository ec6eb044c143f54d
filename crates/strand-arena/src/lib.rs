//! Growable bump-allocated arenas for Strand command payloads.
//!
//! Recorded commands store their fixed-size arguments inline and their
//! variable-length payloads (upload blobs, root constants, marker text)
//! here. Payloads are addressed through an [`Allocation`] handle rather
//! than a pointer, so a command list can be moved between threads and
//! replayed without any borrow of the allocator outliving the call.
//!
//! # Architecture
//!
//! ```text
//! CommandAllocator
//! ├── Arena[0]   (block_size bytes, u64-backed, bump offset)
//! ├── Arena[1]   (appended when Arena[0] cannot fit a request)
//! └── ...        (kept across reset; steady-state high-water mark)
//! ```
//!
//! An allocation never spans two arenas. [`CommandAllocator::reset`]
//! rewinds every arena and moves the cursor back to arena 0 without
//! freeing anything.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod allocator;
pub mod arena;
pub mod config;
pub mod error;

pub use allocator::{Allocation, CommandAllocator};
pub use arena::Arena;
pub use config::ArenaConfig;
pub use error::ArenaError;
