// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::pool::{Pool, PoolStrategy};
use crate::{AllocError, Buffer, BufferStack};

/// A factory whose pooled buffers all share a single capacity.
///
/// Every in-range request is answered with a full `max_size`-capacity direct buffer whose limit
/// is set to the requested size, deliberately trading memory slack for zero size-matching cost:
/// any cached buffer satisfies any in-range request, so allocation is a single stack pop.
///
/// Requests below `min_size` or above `max_size` fall back to uncached heap buffers.
pub type FixedPool = Pool<FixedStrategy>;

/// Strategy behind [`FixedPool`].
#[derive(Debug)]
pub struct FixedStrategy {
    min_size: usize,
    max_size: usize,
    stack: BufferStack,
}

impl Pool<FixedStrategy> {
    /// Creates a factory pooling direct buffers of exactly `max_size` bytes.
    ///
    /// Requests smaller than `min_size` or larger than `max_size` are served as plain heap
    /// buffers and never cached.
    ///
    /// # Panics
    ///
    /// Panics if `min_size > max_size`.
    #[must_use]
    pub fn new(min_size: usize, max_size: usize) -> Self {
        assert!(min_size <= max_size);

        Self::with_strategy(FixedStrategy {
            min_size,
            max_size,
            stack: BufferStack::new(),
        })
    }
}

impl PoolStrategy for FixedStrategy {
    fn acquire(&self, size: usize, from_cache: &mut bool) -> Result<Buffer, AllocError> {
        if size < self.min_size || size > self.max_size {
            return Buffer::heap(size);
        }

        match self.stack.pop() {
            Some(buffer) => {
                *from_cache = true;
                Ok(buffer)
            }
            None => Buffer::direct(self.max_size),
        }
    }

    fn accept(&self, buffer: Buffer) -> Result<(), Buffer> {
        // Only direct buffers of exactly the pooled capacity are interchangeable.
        if !buffer.is_direct() || buffer.capacity() != self.max_size {
            return Err(buffer);
        }

        self.stack.push(buffer);
        Ok(())
    }

    fn prefill(&self, available: u64) -> u64 {
        let class_size = self.max_size as u64;
        if class_size == 0 {
            return 0;
        }

        let mut added = 0;
        while added + class_size <= available {
            match Buffer::direct(self.max_size) {
                Ok(buffer) => {
                    self.stack.push(buffer);
                    added += class_size;
                }
                Err(_) => break,
            }
        }

        added
    }

    fn drain_all(&self) -> Vec<Buffer> {
        self.stack.drain()
    }
}
