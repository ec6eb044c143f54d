//! Engine configuration and construction errors.

use strand_arena::{ArenaConfig, ArenaError};

/// Errors detected while validating an [`EngineConfig`] or starting the
/// submission thread.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Arena configuration is invalid.
    #[error("arena: {0}")]
    Arena(#[from] ArenaError),
    /// `queue_depth` is zero.
    #[error("queue_depth must be at least 1")]
    QueueDepthZero,
    /// `recycle_capacity` is zero.
    #[error("recycle_capacity must be at least 1")]
    RecycleCapacityZero,
    /// The submission thread could not be spawned.
    #[error("thread spawn failed: {reason}")]
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
}

/// Configuration for a [`SubmissionThread`](crate::SubmissionThread).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Arena settings for lists created by
    /// [`recycle`](crate::SubmissionThread::recycle).
    pub arena: ArenaConfig,
    /// Lists that may wait in the submission channel before
    /// [`submit`](crate::SubmissionThread::submit) blocks. Default: 4.
    pub queue_depth: usize,
    /// Reset lists kept for reuse; extras are dropped. Default: 8.
    pub recycle_capacity: usize,
}

impl EngineConfig {
    /// Default submission queue depth.
    pub const DEFAULT_QUEUE_DEPTH: usize = 4;

    /// Default recycle pool size.
    pub const DEFAULT_RECYCLE_CAPACITY: usize = 8;

    /// Validate all fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        if self.queue_depth == 0 {
            return Err(ConfigError::QueueDepthZero);
        }
        if self.recycle_capacity == 0 {
            return Err(ConfigError::RecycleCapacityZero);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            queue_depth: Self::DEFAULT_QUEUE_DEPTH,
            recycle_capacity: Self::DEFAULT_RECYCLE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_queue_depth_fails() {
        let cfg = EngineConfig {
            queue_depth: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::QueueDepthZero));
    }

    #[test]
    fn zero_recycle_capacity_fails() {
        let cfg = EngineConfig {
            recycle_capacity: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::RecycleCapacityZero));
    }

    #[test]
    fn invalid_arena_is_wrapped() {
        let cfg = EngineConfig {
            arena: ArenaConfig::with_block_size(7),
            ..EngineConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::Arena(ArenaError::InvalidConfig { .. })) => {}
            other => panic!("expected Arena(InvalidConfig), got {other:?}"),
        }
    }
}
