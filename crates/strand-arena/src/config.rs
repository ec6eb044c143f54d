//! Arena configuration parameters.

use crate::arena::Arena;
use crate::error::ArenaError;

/// Configuration for a [`CommandAllocator`](crate::CommandAllocator).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each arena in bytes.
    ///
    /// Default: 65_536 (64 KiB). Must be a multiple of 8 and at least
    /// [`MIN_BLOCK_SIZE`](Self::MIN_BLOCK_SIZE). This is also the largest
    /// single payload a command can carry.
    pub block_size: u32,

    /// Maximum number of arenas one allocator may hold.
    ///
    /// Default: 256, so 16 MiB of payload per list at the default block
    /// size. Must be at least 1.
    pub max_arenas: u16,
}

impl ArenaConfig {
    /// Default arena size in bytes.
    pub const DEFAULT_BLOCK_SIZE: u32 = 64 * 1024;

    /// Default maximum arena count.
    pub const DEFAULT_MAX_ARENAS: u16 = 256;

    /// Smallest accepted arena size in bytes.
    pub const MIN_BLOCK_SIZE: u32 = 64;

    /// Config with the given block size and the default arena limit.
    pub fn with_block_size(block_size: u32) -> Self {
        Self {
            block_size,
            ..Self::default()
        }
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.block_size < Self::MIN_BLOCK_SIZE {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "block_size must be at least {}, got {}",
                    Self::MIN_BLOCK_SIZE,
                    self.block_size
                ),
            });
        }
        if self.block_size as usize % Arena::MAX_ALIGN != 0 {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "block_size must be a multiple of {}, got {}",
                    Arena::MAX_ALIGN,
                    self.block_size
                ),
            });
        }
        if self.max_arenas == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_arenas must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Upper bound on payload bytes one allocator can hold.
    pub fn total_capacity_bytes(&self) -> usize {
        self.block_size as usize * self.max_arenas as usize
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            block_size: Self::DEFAULT_BLOCK_SIZE,
            max_arenas: Self::DEFAULT_MAX_ARENAS,
        }
    }
}
