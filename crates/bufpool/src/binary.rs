// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::pool::{Pool, PoolStrategy};
use crate::{AllocError, Buffer, BufferStack};

/// A factory pooling direct buffers whose capacities are powers of two within a range.
///
/// A factory created with powers 8 and 14 pools buffers of sizes
/// {256, 512, 1024, 2048, 4096, 8192, 16384}. An in-range request is rounded up to the next
/// power of two, bounding worst-case memory slack to 2x. Requests outside the range are served
/// as plain heap buffers and never cached.
pub type BinaryPool = Pool<BinaryStrategy>;

/// Strategy behind [`BinaryPool`].
#[derive(Debug)]
pub struct BinaryStrategy {
    min_power: u32,
    max_power: u32,
    // One stack per power, index 0 holding buffers of `1 << min_power` bytes.
    classes: Vec<BufferStack>,
}

impl Pool<BinaryStrategy> {
    /// Creates a factory pooling direct buffers of sizes `2^min_power` through `2^max_power`.
    ///
    /// The default allocation size is the class size halfway between the two powers.
    ///
    /// # Panics
    ///
    /// Panics if `min_power` is zero, `min_power > max_power`, or `max_power` does not fit a
    /// `usize`.
    #[must_use]
    pub fn new(min_power: u32, max_power: u32) -> Self {
        assert!(min_power >= 1);
        assert!(min_power <= max_power);
        assert!(max_power < usize::BITS);

        let classes = (min_power..=max_power).map(|_| BufferStack::new()).collect();

        let default_size = 1usize << ((min_power + max_power) / 2);

        Self::with_strategy_and_default(
            BinaryStrategy {
                min_power,
                max_power,
                classes,
            },
            default_size,
        )
    }
}

/// The binary logarithm of `n`, rounded up. Values of two or less map to 1.
fn log2_ceil(n: usize) -> u32 {
    if n <= 2 {
        return 1;
    }

    usize::BITS - (n - 1).leading_zeros()
}

impl BinaryStrategy {
    fn min_size(&self) -> usize {
        1 << self.min_power
    }

    fn max_size(&self) -> usize {
        1 << self.max_power
    }

    fn class(&self, power: u32) -> &BufferStack {
        &self.classes[(power - self.min_power) as usize]
    }
}

impl PoolStrategy for BinaryStrategy {
    fn acquire(&self, size: usize, from_cache: &mut bool) -> Result<Buffer, AllocError> {
        if size < self.min_size() || size > self.max_size() {
            return Buffer::heap(size);
        }

        // An exact class boundary resolves to that class; anything else rounds up.
        let power = log2_ceil(size);

        match self.class(power).pop() {
            Some(buffer) => {
                *from_cache = true;
                Ok(buffer)
            }
            None => Buffer::direct(1 << power),
        }
    }

    fn accept(&self, buffer: Buffer) -> Result<(), Buffer> {
        let capacity = buffer.capacity();

        if !buffer.is_direct() || !capacity.is_power_of_two() {
            return Err(buffer);
        }

        // Exact power: capacity is a power of two here, so trailing zeros is its log2.
        let power = capacity.trailing_zeros();
        if power < self.min_power || power > self.max_power {
            return Err(buffer);
        }

        self.class(power).push(buffer);
        Ok(())
    }

    /// Distributes the budget so that each class holds the same number of bytes: a class of
    /// 128-byte buffers gets two buffers for every one in the 256-byte class. One "generation"
    /// costs `2^max_power` bytes per class; only whole generations are added.
    fn prefill(&self, available: u64) -> u64 {
        let class_count = u64::from(self.max_power - self.min_power + 1);
        let generation_size = (self.max_size() as u64) * class_count;

        let generations = available / generation_size;
        if generations == 0 {
            return 0;
        }

        let mut added = 0;
        for power in self.min_power..=self.max_power {
            let buffer_count = generations << (self.max_power - power);

            for _ in 0..buffer_count {
                match Buffer::direct(1 << power) {
                    Ok(buffer) => {
                        added += buffer.capacity() as u64;
                        self.class(power).push(buffer);
                    }
                    Err(_) => return added,
                }
            }
        }

        added
    }

    fn drain_all(&self) -> Vec<Buffer> {
        let mut dump = Vec::new();

        for class in &self.classes {
            dump.append(&mut class.drain());
        }

        dump
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::BufferFactory;

    #[test]
    fn log2_ceil_rounds_up() {
        assert_eq!(log2_ceil(1), 1);
        assert_eq!(log2_ceil(2), 1);
        assert_eq!(log2_ceil(3), 2);
        assert_eq!(log2_ceil(4), 2);
        assert_eq!(log2_ceil(5), 3);
        assert_eq!(log2_ceil(8), 3);
        assert_eq!(log2_ceil(9), 4);
        assert_eq!(log2_ceil(1023), 10);
        assert_eq!(log2_ceil(1024), 10);
        assert_eq!(log2_ceil(1025), 11);
    }

    #[test]
    fn allocate_resolves_sizes_to_classes() {
        // Pools direct buffers at sizes 8, 16 and 32.
        let pool = BinaryPool::new(3, 5);

        // Below the smallest class.
        let b = pool.allocate(6).unwrap();
        assert_eq!(b.capacity(), 6);
        assert_eq!(b.remaining(), 6);
        assert!(!b.is_direct());

        // Exactly the smallest class.
        let b = pool.allocate(8).unwrap();
        assert_eq!(b.capacity(), 8);
        assert_eq!(b.remaining(), 8);
        assert!(b.is_direct());

        // Between classes: rounds up.
        let b = pool.allocate(24).unwrap();
        assert_eq!(b.capacity(), 32);
        assert_eq!(b.remaining(), 24);
        assert!(b.is_direct());

        // Exactly the largest class.
        let b = pool.allocate(32).unwrap();
        assert_eq!(b.capacity(), 32);
        assert_eq!(b.remaining(), 32);
        assert!(b.is_direct());

        // Above the largest class.
        let b = pool.allocate(33).unwrap();
        assert_eq!(b.capacity(), 33);
        assert_eq!(b.remaining(), 33);
        assert!(!b.is_direct());
    }

    #[test]
    fn accepts_only_in_range_power_of_two_direct_buffers() {
        let pool = BinaryPool::new(3, 5);

        // Not direct.
        assert!(!pool.free(Buffer::heap(16).unwrap()));

        // Direct but not a power of two.
        assert!(!pool.free(Buffer::direct(11).unwrap()));

        // Power of two below the range.
        assert!(!pool.free(Buffer::direct(4).unwrap()));

        // Powers of two in range.
        assert!(pool.free(Buffer::direct(8).unwrap()));
        assert!(pool.free(Buffer::direct(16).unwrap()));
        assert!(pool.free(Buffer::direct(32).unwrap()));

        // Power of two above the range.
        assert!(!pool.free(Buffer::direct(64).unwrap()));
    }

    #[test]
    fn free_fails_when_cache_is_full_until_space_opens_up() {
        let pool = BinaryPool::new(3, 5);
        pool.set_capacity(92); // 88 <= x < 104

        assert!(pool.free(Buffer::direct(8).unwrap()));
        assert!(pool.free(Buffer::direct(16).unwrap()));
        assert!(pool.free(Buffer::direct(32).unwrap()));
        assert!(pool.free(Buffer::direct(16).unwrap()));
        assert!(pool.free(Buffer::direct(16).unwrap()));

        // 88 bytes cached; a sixth 16-byte buffer would make 104 > 92.
        assert!(!pool.free(Buffer::direct(16).unwrap()));
        assert_eq!(pool.used(), 88);

        // Popping a cached 16-byte buffer back out makes room.
        let buffer = pool.allocate(14).unwrap();
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(buffer.remaining(), 14);
        assert!(buffer.is_direct());
        assert_eq!(pool.used(), 72);

        assert!(pool.free(Buffer::direct(16).unwrap()));
        assert_eq!(pool.used(), 88);
    }

    #[test]
    fn default_size_is_the_middle_class() {
        let pool = BinaryPool::new(3, 5);
        assert_eq!(pool.default_size(), 16);

        let pool = BinaryPool::new(8, 14);
        assert_eq!(pool.default_size(), 1 << 11);
    }

    #[test]
    fn fill_adds_whole_generations_inverse_to_class_size() {
        let pool = BinaryPool::new(3, 5);
        // One generation costs 32 * 3 = 96 bytes; allow exactly two.
        pool.set_capacity(192);

        assert_eq!(pool.fill(), 192);
        assert_eq!(pool.used(), 192);

        // Two generations: 8 buffers of 8, 4 of 16, 2 of 32.
        let strategy = pool.strategy();
        assert_eq!(strategy.class(3).len(), 8);
        assert_eq!(strategy.class(4).len(), 4);
        assert_eq!(strategy.class(5).len(), 2);
    }

    #[test]
    fn fill_with_no_room_for_a_generation_is_a_no_op() {
        let pool = BinaryPool::new(3, 5);
        pool.set_capacity(95); // One generation costs 96.

        assert_eq!(pool.fill(), 0);
        assert_eq!(pool.used(), 0);
    }

    #[test]
    fn clear_destroys_everything_and_reports_bytes() {
        let pool = BinaryPool::new(3, 5);

        assert!(pool.free(Buffer::direct(8).unwrap()));
        assert!(pool.free(Buffer::direct(32).unwrap()));

        assert_eq!(pool.clear(), 40);
        assert_eq!(pool.used(), 0);
    }
}
