// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

use crate::{AllocError, Buffer};

/// Allocates, recycles, and accounts for byte buffers.
///
/// A factory may cache freed buffers to save on allocation cost, bounded by a configurable
/// cache capacity in bytes. Buffers handed out by a factory can contain pre-existing data.
///
/// # Ownership
///
/// Buffers move by value across the factory boundary: [`allocate()`][Self::allocate] transfers
/// ownership to the caller and [`free()`][Self::free] transfers it back. A buffer is owned by
/// exactly one side at any time, never aliased across the boundary.
///
/// # Thread safety
///
/// Every method is safe to call concurrently from multiple threads sharing one factory. The
/// cache accounting uses atomic counters rather than locks.
pub trait BufferFactory: Debug + Send + Sync {
    /// Allocates a buffer with a capacity of at least `size` bytes.
    ///
    /// The returned buffer has `limit == size` and `position == 0`. Its contents are **not**
    /// guaranteed to be zeroed.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the system cannot supply the memory. The failure is logged
    /// with the requested size and leaves the cache accounting untouched.
    fn allocate(&self, size: usize) -> Result<Buffer, AllocError>;

    /// Allocates a buffer of the factory's configured default size.
    ///
    /// # Errors
    ///
    /// See [`allocate()`][Self::allocate].
    fn allocate_default(&self) -> Result<Buffer, AllocError> {
        self.allocate(self.default_size())
    }

    /// Resizes `buffer` so that it can hold `size` bytes.
    ///
    /// If `size` fits within the buffer's existing capacity, the buffer is reused in place and
    /// only its limit is adjusted - no bytes are copied. Otherwise a new buffer is allocated
    /// (possibly from cache), the bytes in `[0, limit)` are copied over, and the old storage is
    /// freed back into this factory.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if a replacement buffer is needed and cannot be allocated. In that
    /// case `buffer` is left exactly as it was.
    fn resize(&self, buffer: &mut Buffer, size: usize) -> Result<(), AllocError>;

    /// Disposes of a buffer, caching it for reuse when possible.
    ///
    /// The buffer is destroyed immediately when caching it would push the cache past its
    /// capacity, or when the factory's strategy does not accept it (wrong kind or size).
    ///
    /// Returns `true` if the buffer was cached, `false` if it was destroyed.
    fn free(&self, buffer: Buffer) -> bool;

    /// Evicts and destroys every cached buffer, returning the number of bytes released.
    fn clear(&self) -> u64;

    /// Proactively fills the cache toward its capacity, returning the number of bytes added.
    ///
    /// How the budget is split across size classes is strategy-specific; factories without a
    /// cache return 0.
    fn fill(&self) -> u64;

    /// Atomically removes and returns every cached buffer **without** destroying any of them.
    ///
    /// This is the first half of the bulk handoff protocol: feed the returned buffers to another
    /// factory's [`transfer()`][Self::transfer].
    fn release(&self) -> Vec<Buffer>;

    /// Attempts to absorb the given buffers into this factory's cache.
    ///
    /// Each buffer is accepted if the cache has room for it and the strategy is willing to pool
    /// it. The rejected remainder is returned to the caller, which typically destroys it by
    /// dropping. No buffer is copied or reallocated during the handoff.
    fn transfer(&self, buffers: Vec<Buffer>) -> Vec<Buffer>;

    /// The number of bytes the cache currently holds.
    fn used(&self) -> u64;

    /// The maximum number of bytes the cache may hold.
    fn capacity(&self) -> u64;

    /// Sets the maximum number of bytes the cache may hold.
    ///
    /// Lowering the capacity does not evict existing buffers; it only stops further caching
    /// until usage drops below the new bound.
    fn set_capacity(&self, capacity: u64);

    /// The number of bytes still available for caching (`capacity - used`).
    fn available(&self) -> u64;

    /// The size in bytes used by [`allocate_default()`][Self::allocate_default].
    fn default_size(&self) -> usize;

    /// Sets the size in bytes used by [`allocate_default()`][Self::allocate_default].
    fn set_default_size(&self, size: usize);
}
