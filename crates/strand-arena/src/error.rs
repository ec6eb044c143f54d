//! Arena-specific error types.

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// Arena pool is full: no more arenas can be appended.
    #[error("arena capacity exceeded: requested {requested} bytes, capacity {capacity} bytes")]
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Total capacity across all arenas.
        capacity: usize,
    },
    /// A single request larger than one arena.
    #[error("allocation of {requested} bytes exceeds the arena block size of {block_size} bytes")]
    OversizedAllocation {
        /// Number of bytes requested.
        requested: usize,
        /// Capacity of one arena.
        block_size: usize,
    },
    /// Alignment that is not a power of two, or exceeds the arena base
    /// alignment.
    #[error("unsupported alignment {align}: must be a power of two no greater than {max}")]
    InvalidAlignment {
        /// Requested alignment.
        align: usize,
        /// Largest supported alignment.
        max: usize,
    },
    /// Rejected configuration.
    #[error("invalid arena config: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
}
