//! A single fixed-capacity bump arena.

/// Contiguous byte buffer with bump allocation.
///
/// Backed by a `Vec<u64>` so the base address is 8-byte aligned; byte
/// views go through [`bytemuck`]. The arena is allocated to full capacity
/// at creation and never grows. [`reset`](Arena::reset) rewinds the
/// offset without touching or freeing the memory.
pub struct Arena {
    /// Backing storage, `capacity / 8` words.
    words: Vec<u64>,
    /// Bump offset: next free byte.
    offset: u32,
}

impl Arena {
    /// Alignment of the arena base and the largest supported request
    /// alignment.
    pub const MAX_ALIGN: usize = std::mem::align_of::<u64>();

    /// Create a zeroed arena of `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a multiple of [`MAX_ALIGN`](Self::MAX_ALIGN).
    pub fn new(capacity: u32) -> Self {
        assert!(
            capacity as usize % Self::MAX_ALIGN == 0,
            "arena capacity {capacity} is not a multiple of {}",
            Self::MAX_ALIGN
        );
        Self {
            words: vec![0; capacity as usize / Self::MAX_ALIGN],
            offset: 0,
        }
    }

    /// Bump-allocate `size` bytes aligned to `align`.
    ///
    /// Returns the starting byte offset, or `None` if the aligned request
    /// does not fit in the remaining capacity. A request exactly equal to
    /// the remaining (aligned) capacity fits. `align` must be a power of
    /// two; the caller checks it against [`MAX_ALIGN`](Self::MAX_ALIGN).
    pub fn try_alloc(&mut self, size: u32, align: u32) -> Option<u32> {
        debug_assert!(align.is_power_of_two());
        let start = self.offset.checked_next_multiple_of(align)?;
        let end = start.checked_add(size)?;
        if end > self.capacity() {
            return None;
        }
        self.offset = end;
        Some(start)
    }

    /// Shared view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range lies outside the arena.
    pub fn bytes(&self, offset: u32, len: u32) -> &[u8] {
        let start = offset as usize;
        &bytemuck::cast_slice::<u64, u8>(&self.words)[start..start + len as usize]
    }

    /// Mutable view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range lies outside the arena.
    pub fn bytes_mut(&mut self, offset: u32, len: u32) -> &mut [u8] {
        let start = offset as usize;
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[start..start + len as usize]
    }

    /// Rewind the bump offset to zero without deallocating.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Bytes allocated so far, including alignment padding.
    pub fn used(&self) -> u32 {
        self.offset
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> u32 {
        (self.words.len() * Self::MAX_ALIGN) as u32
    }

    /// Bytes left before the arena is full.
    pub fn remaining(&self) -> u32 {
        self.capacity() - self.offset
    }
}
