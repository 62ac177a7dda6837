// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::pool::{Pool, PoolStrategy};
use crate::{AllocError, Buffer};

/// A factory that allocates plain heap buffers and never caches.
///
/// Every allocation and free goes straight to the allocator. Useful as a baseline, and for
/// callers that want factory-shaped plumbing without paying for a cache.
pub type HeapPool = Pool<HeapStrategy>;

/// Strategy behind [`HeapPool`].
#[derive(Debug, Default)]
pub struct HeapStrategy;

impl Pool<HeapStrategy> {
    /// Creates a factory that always allocates on the heap and never caches.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategy(HeapStrategy)
    }
}

impl Default for Pool<HeapStrategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolStrategy for HeapStrategy {
    fn acquire(&self, size: usize, _from_cache: &mut bool) -> Result<Buffer, AllocError> {
        Buffer::heap(size)
    }

    fn accept(&self, buffer: Buffer) -> Result<(), Buffer> {
        Err(buffer)
    }

    fn prefill(&self, _available: u64) -> u64 {
        0
    }

    fn drain_all(&self) -> Vec<Buffer> {
        Vec::new()
    }
}
