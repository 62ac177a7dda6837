// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::{Level, event};

use crate::{AllocError, Buffer, BufferFactory};

/// The default maximum cache capacity of a single factory: 1 MiB.
const DEFAULT_MAX_MEMORY: u64 = 1 << 20;

/// The default allocation size when none is requested: 512 bytes.
const DEFAULT_ALLOCATION_SIZE: usize = 1 << 9;

/// The caching behavior that differentiates one factory flavor from another.
///
/// The accounting contract - capacity bounds, used-memory bookkeeping, release/transfer - is
/// implemented once by [`Pool`]; a strategy only decides where buffers come from and which ones
/// it is willing to keep. Implementations must be internally synchronized: the owning pool calls
/// these hooks concurrently from many threads without any locking of its own.
pub trait PoolStrategy: Send + Sync {
    /// Produces a buffer with a capacity of at least `size` bytes, either by taking one from the
    /// strategy's cache or by allocating fresh storage.
    ///
    /// Sets `*from_cache` to `true` only when the buffer was taken from the cache, so the pool
    /// can release the corresponding accounting charge. The cursors of the returned buffer are
    /// in no particular state; the pool normalizes them.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when fresh storage is needed and the system cannot supply it.
    fn acquire(&self, size: usize, from_cache: &mut bool) -> Result<Buffer, AllocError>;

    /// Offers a freed buffer to the cache.
    ///
    /// Returns the buffer back in `Err` when the strategy will not pool it (wrong kind, wrong
    /// size); the pool then destroys it. The capacity bound has already been checked by the
    /// pool when this hook runs.
    fn accept(&self, buffer: Buffer) -> Result<(), Buffer>;

    /// Pre-allocates cached buffers worth at most `available` bytes, returning the bytes added.
    fn prefill(&self, available: u64) -> u64;

    /// Removes and returns every cached buffer.
    fn drain_all(&self) -> Vec<Buffer>;
}

/// The accounting core shared by every factory flavor.
///
/// Tracks how many bytes the cache holds (`used`) against a configurable bound (`capacity`)
/// with lock-free atomic counters, and implements the whole [`BufferFactory`] contract on top
/// of the four [`PoolStrategy`] hooks.
#[derive(Debug)]
pub struct Pool<S> {
    // How many bytes of buffer capacity the cache currently holds. Always equals the sum of
    // capacities of the buffers sitting in this factory's stacks.
    used_memory: AtomicU64,

    // The bound on `used_memory`. Freeing a buffer that would push past this destroys it instead.
    max_memory: AtomicU64,

    // The allocation size used by `allocate_default()`.
    default_size: AtomicUsize,

    strategy: S,
}

impl<S: PoolStrategy> Pool<S> {
    pub(crate) fn with_strategy(strategy: S) -> Self {
        Self::with_strategy_and_default(strategy, DEFAULT_ALLOCATION_SIZE)
    }

    pub(crate) fn with_strategy_and_default(strategy: S, default_size: usize) -> Self {
        Self {
            used_memory: AtomicU64::new(0),
            max_memory: AtomicU64::new(DEFAULT_MAX_MEMORY),
            default_size: AtomicUsize::new(default_size),
            strategy,
        }
    }

    pub(crate) fn strategy(&self) -> &S {
        &self.strategy
    }
}

// The counters order nothing besides themselves, so all accesses are Relaxed: every update is a
// single fetch_add/fetch_sub and the invariant is over the counter value alone, not over any
// memory it guards.
impl<S: PoolStrategy + Debug> BufferFactory for Pool<S> {
    fn allocate(&self, size: usize) -> Result<Buffer, AllocError> {
        let mut from_cache = false;

        let mut buffer = match self.strategy.acquire(size, &mut from_cache) {
            Ok(buffer) => buffer,
            Err(e) => {
                event!(Level::ERROR, message = "buffer allocation failed", size = e.size);
                return Err(e);
            }
        };

        // A cached buffer leaving the pool no longer counts against the cache.
        if from_cache {
            self.used_memory
                .fetch_sub(buffer.capacity() as u64, Ordering::Relaxed);
        }

        buffer.clear();
        buffer.set_limit(size);

        Ok(buffer)
    }

    fn resize(&self, buffer: &mut Buffer, size: usize) -> Result<(), AllocError> {
        if size <= buffer.capacity() {
            buffer.set_limit(size);
            return Ok(());
        }

        let mut fresh = self.allocate(size)?;

        let preserved = buffer.limit();
        fresh.as_bytes_mut()[..preserved].copy_from_slice(&buffer.as_bytes()[..preserved]);

        let old = std::mem::replace(buffer, fresh);
        self.free(old);

        Ok(())
    }

    fn free(&self, buffer: Buffer) -> bool {
        let capacity = buffer.capacity() as u64;

        // Caching this buffer would exceed the allowed cache memory, so destroy it instead.
        if self.used_memory.load(Ordering::Relaxed) + capacity > self.max_memory.load(Ordering::Relaxed) {
            return false;
        }

        match self.strategy.accept(buffer) {
            Ok(()) => {
                self.used_memory.fetch_add(capacity, Ordering::Relaxed);
                true
            }
            // The strategy would not pool it; dropping the buffer destroys it.
            Err(_rejected) => false,
        }
    }

    fn clear(&self) -> u64 {
        let released = self.strategy.drain_all();

        let memory: u64 = released.iter().map(|b| b.capacity() as u64).sum();
        self.used_memory.fetch_sub(memory, Ordering::Relaxed);

        // Dropping the buffers destroys them.
        drop(released);

        event!(Level::DEBUG, message = "cache cleared", bytes_freed = memory);

        memory
    }

    fn fill(&self) -> u64 {
        let added = self.strategy.prefill(self.available());
        self.used_memory.fetch_add(added, Ordering::Relaxed);

        event!(Level::DEBUG, message = "cache filled", bytes_added = added);

        added
    }

    fn release(&self) -> Vec<Buffer> {
        let released = self.strategy.drain_all();

        let memory: u64 = released.iter().map(|b| b.capacity() as u64).sum();
        self.used_memory.fetch_sub(memory, Ordering::Relaxed);

        released
    }

    fn transfer(&self, buffers: Vec<Buffer>) -> Vec<Buffer> {
        let mut denied = Vec::new();

        for buffer in buffers {
            let capacity = buffer.capacity() as u64;

            if self.used_memory.load(Ordering::Relaxed) + capacity
                > self.max_memory.load(Ordering::Relaxed)
            {
                denied.push(buffer);
                continue;
            }

            match self.strategy.accept(buffer) {
                Ok(()) => {
                    self.used_memory.fetch_add(capacity, Ordering::Relaxed);
                }
                Err(rejected) => denied.push(rejected),
            }
        }

        denied
    }

    fn used(&self) -> u64 {
        self.used_memory.load(Ordering::Relaxed)
    }

    fn capacity(&self) -> u64 {
        self.max_memory.load(Ordering::Relaxed)
    }

    fn set_capacity(&self, capacity: u64) {
        self.max_memory.store(capacity, Ordering::Relaxed);
    }

    fn available(&self) -> u64 {
        self.capacity().saturating_sub(self.used())
    }

    fn default_size(&self) -> usize {
        self.default_size.load(Ordering::Relaxed)
    }

    fn set_default_size(&self, size: usize) {
        self.default_size.store(size, Ordering::Relaxed);
    }
}
