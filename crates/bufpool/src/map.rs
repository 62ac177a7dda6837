// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::pool::{Pool, PoolStrategy};
use crate::{AllocError, Buffer, BufferStack};

/// A factory with one size class per exact requested size, created on demand.
///
/// There is no rounding and therefore no memory slack: a freed 300-byte buffer is cached in the
/// 300-byte class and only a 300-byte request can reuse it. The flip side is that the number of
/// classes is unbounded - an adversarial or merely irregular size distribution creates a class
/// per distinct size, each pinning cached memory that nothing will ever request again. This
/// factory works best when the application requests a small, known set of buffer sizes.
///
/// Class creation takes a short exclusive lock; all traffic on existing classes only touches
/// the per-class stack.
pub type MapPool = Pool<MapStrategy>;

/// Strategy behind [`MapPool`].
#[derive(Debug)]
pub struct MapStrategy {
    min_size: usize,
    max_size: usize,

    // Size classes keyed by exact buffer capacity. The lock is held exclusively only while a
    // first-time class is inserted (and during release); lookups take the shared side and then
    // operate on the per-class stack.
    classes: RwLock<HashMap<usize, Arc<BufferStack>>>,
}

impl Pool<MapStrategy> {
    /// Creates a factory pooling direct buffers of any exact size in `[min_size, max_size]`.
    ///
    /// Requests outside the range are served as plain heap buffers and never cached.
    ///
    /// # Panics
    ///
    /// Panics if `min_size > max_size`.
    #[must_use]
    pub fn new(min_size: usize, max_size: usize) -> Self {
        assert!(min_size <= max_size);

        Self::with_strategy(MapStrategy {
            min_size,
            max_size,
            classes: RwLock::new(HashMap::new()),
        })
    }
}

impl Default for Pool<MapStrategy> {
    /// Creates a factory with the stock bounds: minimum size 128, maximum size 8192.
    fn default() -> Self {
        Self::new(128, 8192)
    }
}

impl MapStrategy {
    fn class(&self, size: usize) -> Option<Arc<BufferStack>> {
        self.classes.read().get(&size).map(Arc::clone)
    }

    fn class_or_insert(&self, size: usize) -> Arc<BufferStack> {
        if let Some(stack) = self.class(size) {
            return stack;
        }

        // First free of this size; another thread may have raced us here, which the entry API
        // resolves under the exclusive lock.
        let mut classes = self.classes.write();
        Arc::clone(classes.entry(size).or_insert_with(|| Arc::new(BufferStack::new())))
    }
}

impl PoolStrategy for MapStrategy {
    fn acquire(&self, size: usize, from_cache: &mut bool) -> Result<Buffer, AllocError> {
        if size < self.min_size || size > self.max_size {
            return Buffer::heap(size);
        }

        if let Some(buffer) = self.class(size).and_then(|stack| stack.pop()) {
            *from_cache = true;
            return Ok(buffer);
        }

        Buffer::direct(size)
    }

    fn accept(&self, buffer: Buffer) -> Result<(), Buffer> {
        let size = buffer.capacity();

        if !buffer.is_direct() || size < self.min_size || size > self.max_size {
            return Err(buffer);
        }

        self.class_or_insert(size).push(buffer);
        Ok(())
    }

    /// Pre-warms the classes that exist, smallest first: rounds of one buffer per class until
    /// no class fits in the remaining budget. No new classes are invented - before the first
    /// free there is nothing to say about which sizes the application will use.
    fn prefill(&self, available: u64) -> u64 {
        let mut classes: Vec<(usize, Arc<BufferStack>)> = self
            .classes
            .read()
            .iter()
            .map(|(size, stack)| (*size, Arc::clone(stack)))
            .collect();

        if classes.is_empty() {
            return 0;
        }

        classes.sort_by_key(|(size, _)| *size);

        let mut added = 0;
        loop {
            let mut progressed = false;

            for (size, stack) in &classes {
                if added + *size as u64 > available {
                    continue;
                }

                match Buffer::direct(*size) {
                    Ok(buffer) => {
                        stack.push(buffer);
                        added += *size as u64;
                        progressed = true;
                    }
                    Err(_) => return added,
                }
            }

            if !progressed {
                return added;
            }
        }
    }

    fn drain_all(&self) -> Vec<Buffer> {
        // Take the class stacks out under the exclusive lock, then empty them after releasing
        // it so concurrent frees are not stalled behind the drain.
        let stacks: Vec<Arc<BufferStack>> =
            self.classes.write().drain().map(|(_, stack)| stack).collect();

        let mut dump = Vec::new();
        for stack in stacks {
            dump.append(&mut stack.drain());
        }

        dump
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferFactory;

    #[test]
    fn allocates_exact_sizes_in_range() {
        let pool = MapPool::new(16, 1024);

        let buffer = pool.allocate(300).unwrap();

        assert!(buffer.is_direct());
        assert_eq!(buffer.capacity(), 300);
        assert_eq!(buffer.limit(), 300);
    }

    #[test]
    fn out_of_range_requests_fall_back_to_heap() {
        let pool = MapPool::new(16, 1024);

        assert!(!pool.allocate(8).unwrap().is_direct());
        assert!(!pool.allocate(2048).unwrap().is_direct());
    }

    #[test]
    fn freed_buffer_is_reused_only_for_its_exact_size() {
        let pool = MapPool::new(16, 1024);

        let buffer = pool.allocate(300).unwrap();
        let data_ptr = buffer.as_bytes().as_ptr();
        assert!(pool.free(buffer));
        assert_eq!(pool.used(), 300);

        // A different size misses the 300-byte class.
        let other = pool.allocate(301).unwrap();
        assert_ne!(other.as_bytes().as_ptr(), data_ptr);
        assert_eq!(pool.used(), 300);

        // The exact size hits it.
        let recycled = pool.allocate(300).unwrap();
        assert_eq!(recycled.as_bytes().as_ptr(), data_ptr);
        assert_eq!(pool.used(), 0);
    }

    #[test]
    fn accepts_only_in_range_direct_buffers() {
        let pool = MapPool::new(16, 1024);

        assert!(!pool.free(Buffer::heap(300).unwrap()));
        assert!(!pool.free(Buffer::direct(8).unwrap()));
        assert!(!pool.free(Buffer::direct(2048).unwrap()));
        assert!(pool.free(Buffer::direct(16).unwrap()));
        assert!(pool.free(Buffer::direct(1024).unwrap()));

        assert_eq!(pool.used(), 1040);
    }

    #[test]
    fn default_bounds() {
        let pool = MapPool::default();

        assert!(pool.free(Buffer::direct(128).unwrap()));
        assert!(pool.free(Buffer::direct(8192).unwrap()));
        assert!(!pool.free(Buffer::direct(127).unwrap()));
        assert!(!pool.free(Buffer::direct(8193).unwrap()));
    }

    #[test]
    fn fill_pre_warms_existing_classes_within_budget() {
        let pool = MapPool::new(16, 1024);
        pool.set_capacity(250);

        // Teach the pool two sizes.
        assert!(pool.free(Buffer::direct(100).unwrap()));
        assert!(pool.free(Buffer::direct(50).unwrap()));
        assert_eq!(pool.used(), 150);

        // 100 bytes of budget remain: one round adds 50 + no room for 100, second round
        // adds another 50.
        assert_eq!(pool.fill(), 100);
        assert_eq!(pool.used(), 250);
    }

    #[test]
    fn fill_with_no_classes_is_a_no_op() {
        let pool = MapPool::new(16, 1024);

        assert_eq!(pool.fill(), 0);
    }

    #[test]
    fn concurrent_frees_race_on_bucket_creation() {
        use std::thread;

        let pool = Arc::new(MapPool::new(16, 1024));
        pool.set_capacity(1 << 20);

        // All threads free the same size, racing to create the one bucket.
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..50 {
                        assert!(pool.free(Buffer::direct(64).unwrap()));
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(pool.used(), 8 * 50 * 64);
        assert_eq!(pool.release().len(), 8 * 50);
    }

    #[test]
    fn release_hands_over_every_cached_buffer() {
        let pool = MapPool::new(16, 1024);

        assert!(pool.free(Buffer::direct(100).unwrap()));
        assert!(pool.free(Buffer::direct(100).unwrap()));
        assert!(pool.free(Buffer::direct(200).unwrap()));

        let released = pool.release();

        assert_eq!(released.len(), 3);
        assert_eq!(pool.used(), 0);

        // The class table was emptied too - nothing is resurrected by later frees.
        assert!(pool.free(Buffer::direct(100).unwrap()));
        assert_eq!(pool.used(), 100);
    }
}
