//! Growable list of arenas with overflow-based bump allocation.

use bytemuck::Pod;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Location of one payload inside a [`CommandAllocator`].
///
/// A plain value: copying it does not copy the payload. It stays valid
/// until the allocator that produced it is reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    arena: u16,
    offset: u32,
    len: u32,
}

impl Allocation {
    /// Index of the arena holding the payload.
    pub fn arena(&self) -> u16 {
        self.arena
    }

    /// Byte offset of the payload within its arena.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the payload is zero bytes long.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// An ordered, growable sequence of [`Arena`]s plus a current cursor.
///
/// When the current arena cannot fit a request, the allocator advances to
/// the next arena, reusing one kept from an earlier frame if it exists and
/// appending a new one otherwise (up to `max_arenas`). Requests are placed
/// entirely within one arena; there is no cross-arena splitting.
///
/// Arenas are never freed while the allocator lives. After a few frames
/// the arena count settles at the workload's high-water mark and recording
/// stops allocating from the system.
pub struct CommandAllocator {
    arenas: Vec<Arena>,
    block_size: u32,
    max_arenas: u16,
    /// Index of the arena currently being filled.
    current: usize,
}

impl CommandAllocator {
    /// Create an allocator with one pre-allocated arena.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: &ArenaConfig) -> Self {
        let mut arenas = Vec::with_capacity(config.max_arenas.min(8) as usize);
        arenas.push(Arena::new(config.block_size));
        Self {
            arenas,
            block_size: config.block_size,
            max_arenas: config.max_arenas,
            current: 0,
        }
    }

    /// Reserve `size` bytes aligned to `align`, growing into another arena
    /// if needed.
    ///
    /// The reserved bytes hold whatever an earlier frame left there; use
    /// [`alloc_bytes`](Self::alloc_bytes) or
    /// [`alloc_slice`](Self::alloc_slice) to reserve and fill in one step.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidAlignment`] if `align` is not a power of two
    ///   or exceeds [`Arena::MAX_ALIGN`].
    /// - [`ArenaError::OversizedAllocation`] if `size` exceeds one arena.
    /// - [`ArenaError::CapacityExceeded`] if a new arena would exceed
    ///   `max_arenas`.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<Allocation, ArenaError> {
        if !align.is_power_of_two() || align > Arena::MAX_ALIGN {
            return Err(ArenaError::InvalidAlignment {
                align,
                max: Arena::MAX_ALIGN,
            });
        }
        // Reject requests that can never fit in a single arena.
        if size > self.block_size as usize {
            return Err(ArenaError::OversizedAllocation {
                requested: size,
                block_size: self.block_size as usize,
            });
        }
        let len = size as u32;
        let align = align as u32;

        if let Some(offset) = self.arenas[self.current].try_alloc(len, align) {
            return Ok(self.allocation(self.current, offset, len));
        }

        // Current arena full: advance to the next kept arena or append one.
        let next = self.current + 1;
        if next < self.arenas.len() {
            if let Some(offset) = self.arenas[next].try_alloc(len, align) {
                self.current = next;
                return Ok(self.allocation(next, offset, len));
            }
        }

        if self.arenas.len() >= self.max_arenas as usize {
            return Err(ArenaError::CapacityExceeded {
                requested: size,
                capacity: self.reserved_bytes(),
            });
        }

        let mut arena = Arena::new(self.block_size);
        let offset = arena.try_alloc(len, align).ok_or(ArenaError::OversizedAllocation {
            requested: size,
            block_size: self.block_size as usize,
        })?;
        self.arenas.push(arena);
        self.current = self.arenas.len() - 1;
        tracing::debug!(
            arena_count = self.arenas.len(),
            block_size = self.block_size,
            requested = size,
            "command allocator grew"
        );
        Ok(self.allocation(self.current, offset, len))
    }

    fn allocation(&self, arena: usize, offset: u32, len: u32) -> Allocation {
        Allocation {
            arena: arena as u16,
            offset,
            len,
        }
    }

    /// Reserve space for `data` and copy it in.
    pub fn alloc_bytes(&mut self, data: &[u8]) -> Result<Allocation, ArenaError> {
        let alloc = self.allocate(data.len(), 1)?;
        self.bytes_mut(alloc).copy_from_slice(data);
        Ok(alloc)
    }

    /// Reserve space for `data`, aligned for `T`, and copy it in.
    pub fn alloc_slice<T: Pod>(&mut self, data: &[T]) -> Result<Allocation, ArenaError> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let alloc = self.allocate(bytes.len(), std::mem::align_of::<T>())?;
        self.bytes_mut(alloc).copy_from_slice(bytes);
        Ok(alloc)
    }

    /// Bytes of a payload.
    ///
    /// # Panics
    ///
    /// Panics if `alloc` did not come from this allocator.
    pub fn bytes(&self, alloc: Allocation) -> &[u8] {
        self.arenas[alloc.arena as usize].bytes(alloc.offset, alloc.len)
    }

    /// Mutable bytes of a payload.
    ///
    /// # Panics
    ///
    /// Panics if `alloc` did not come from this allocator.
    pub fn bytes_mut(&mut self, alloc: Allocation) -> &mut [u8] {
        self.arenas[alloc.arena as usize].bytes_mut(alloc.offset, alloc.len)
    }

    /// A payload written by [`alloc_slice`](Self::alloc_slice), viewed as
    /// `&[T]`.
    ///
    /// # Panics
    ///
    /// Panics if `alloc` did not come from this allocator, or its offset
    /// or length does not fit `T`.
    pub fn slice<T: Pod>(&self, alloc: Allocation) -> &[T] {
        bytemuck::cast_slice(self.bytes(alloc))
    }

    /// Rewind every arena and move the cursor back to arena 0.
    ///
    /// Arenas are kept. Every outstanding [`Allocation`] becomes invalid.
    pub fn reset(&mut self) {
        tracing::trace!(
            used_bytes = self.used_bytes(),
            arena_count = self.arenas.len(),
            "command allocator reset"
        );
        for arena in &mut self.arenas {
            arena.reset();
        }
        self.current = 0;
    }

    /// Number of arenas currently held.
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    /// Index of the arena being filled.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Bump offset of the arena being filled.
    pub fn current_offset(&self) -> u32 {
        self.arenas[self.current].used()
    }

    /// Capacity of one arena in bytes.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Bytes allocated across all arenas, including padding.
    pub fn used_bytes(&self) -> usize {
        self.arenas.iter().map(|a| a.used() as usize).sum()
    }

    /// Bytes held across all arenas.
    pub fn reserved_bytes(&self) -> usize {
        self.arenas.len() * self.block_size as usize
    }
}

impl Default for CommandAllocator {
    fn default() -> Self {
        Self::with_valid_config(&ArenaConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(max_arenas: u16) -> CommandAllocator {
        CommandAllocator::new(&ArenaConfig {
            block_size: 64,
            max_arenas,
        })
        .unwrap()
    }

    #[test]
    fn first_allocation_lands_in_arena_zero() {
        let mut alloc = small(4);
        let a = alloc.allocate(10, 1).unwrap();
        assert_eq!((a.arena(), a.offset(), a.len()), (0, 0, 10));
        assert_eq!(alloc.arena_count(), 1);
    }

    #[test]
    fn exact_remaining_fits_in_place() {
        let mut alloc = small(4);
        alloc.allocate(40, 8).unwrap();
        let a = alloc.allocate(24, 1).unwrap();
        assert_eq!(a.arena(), 0);
        assert_eq!(a.offset(), 40);
        assert_eq!(alloc.arena_count(), 1);
        assert_eq!(alloc.current_offset(), 64);
    }

    #[test]
    fn one_byte_over_grows() {
        let mut alloc = small(4);
        alloc.allocate(40, 8).unwrap();
        let a = alloc.allocate(25, 1).unwrap();
        assert_eq!(a.arena(), 1);
        assert_eq!(a.offset(), 0);
        assert_eq!(alloc.arena_count(), 2);
        assert_eq!(alloc.current_index(), 1);
    }

    #[test]
    fn oversized_request_is_an_error() {
        let mut alloc = small(4);
        let err = alloc.allocate(65, 1).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OversizedAllocation {
                requested: 65,
                block_size: 64
            }
        );
        assert!(alloc.allocate(64, 8).is_ok());
    }

    #[test]
    fn capacity_exceeded_at_max_arenas() {
        let mut alloc = small(2);
        alloc.allocate(64, 1).unwrap();
        alloc.allocate(64, 1).unwrap();
        let err = alloc.allocate(1, 1).unwrap_err();
        assert_eq!(
            err,
            ArenaError::CapacityExceeded {
                requested: 1,
                capacity: 128
            }
        );
    }

    #[test]
    fn bad_alignment_is_an_error() {
        let mut alloc = small(2);
        assert!(matches!(
            alloc.allocate(4, 3),
            Err(ArenaError::InvalidAlignment { align: 3, .. })
        ));
        assert!(matches!(
            alloc.allocate(4, 16),
            Err(ArenaError::InvalidAlignment { align: 16, .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = CommandAllocator::new(&ArenaConfig::with_block_size(12));
        assert!(matches!(result, Err(ArenaError::InvalidConfig { .. })));
    }

    #[test]
    fn reset_reuses_kept_arenas() {
        let mut alloc = small(4);
        alloc.allocate(60, 1).unwrap();
        alloc.allocate(60, 1).unwrap();
        alloc.allocate(60, 1).unwrap();
        assert_eq!(alloc.arena_count(), 3);

        alloc.reset();
        assert_eq!(alloc.current_index(), 0);
        assert_eq!(alloc.current_offset(), 0);
        assert_eq!(alloc.used_bytes(), 0);
        assert_eq!(alloc.arena_count(), 3);

        alloc.allocate(60, 1).unwrap();
        let second = alloc.allocate(60, 1).unwrap();
        assert_eq!(second.arena(), 1);
        let third = alloc.allocate(60, 1).unwrap();
        assert_eq!(third.arena(), 2);
        assert_eq!(alloc.arena_count(), 3);
    }

    #[test]
    fn slice_roundtrip_keeps_alignment() {
        let mut alloc = small(4);
        alloc.alloc_bytes(b"abc").unwrap();
        let words = alloc.alloc_slice(&[1u32, 2, 3, 0xDEAD_BEEF]).unwrap();
        assert_eq!(words.offset() % 4, 0);
        assert_eq!(alloc.slice::<u32>(words), &[1, 2, 3, 0xDEAD_BEEF]);
        assert_eq!(alloc.bytes(words).len(), 16);
    }

    #[test]
    fn empty_payload_is_valid() {
        let mut alloc = small(1);
        let a = alloc.alloc_bytes(&[]).unwrap();
        assert!(a.is_empty());
        assert!(alloc.bytes(a).is_empty());
    }

    #[test]
    fn default_allocator_uses_default_block_size() {
        let alloc = CommandAllocator::default();
        assert_eq!(alloc.block_size(), ArenaConfig::DEFAULT_BLOCK_SIZE);
        assert_eq!(alloc.reserved_bytes(), 64 * 1024);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn payloads_never_split_or_corrupted(
                sizes in prop::collection::vec(0usize..=64, 1..64),
                cycles in 1usize..3,
            ) {
                let mut alloc = small(u16::MAX);
                for _ in 0..cycles {
                    let mut written = Vec::with_capacity(sizes.len());
                    for (i, &size) in sizes.iter().enumerate() {
                        let fill = vec![i as u8; size];
                        let a = alloc.alloc_bytes(&fill).unwrap();
                        prop_assert!(a.offset() as usize + size <= 64);
                        written.push((a, fill));
                    }
                    for (a, fill) in &written {
                        prop_assert_eq!(alloc.bytes(*a), fill.as_slice());
                    }
                    let high_water = alloc.arena_count();
                    alloc.reset();
                    prop_assert_eq!(alloc.arena_count(), high_water);
                    prop_assert_eq!(alloc.used_bytes(), 0);
                }
            }
        }
    }
}
