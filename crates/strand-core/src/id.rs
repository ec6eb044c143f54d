//! Strongly-typed resource identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ResourceId`] allocation.
static RESOURCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-object identifier for a GPU resource handle.
///
/// Allocated from a monotonic atomic counter via [`ResourceId::next`].
/// Two distinct resource objects always have different IDs, even if their
/// descriptions are identical. Cloning a handle preserves its ID, since
/// clones refer to the same underlying object.
///
/// Backends use the ID to map a handle to their native object; test
/// contexts record IDs instead of handles so that inspecting a replay does
/// not perturb reference counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Allocate a fresh, unique resource ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(RESOURCE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
