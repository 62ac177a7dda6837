// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::pool::{Pool, PoolStrategy};
use crate::{AllocError, Buffer};

/// A factory that allocates manually managed buffers and never caches.
///
/// Like [`HeapPool`][crate::HeapPool] but every buffer is of the direct flavor, so its storage
/// can later be absorbed by a pooling factory via the release/transfer handoff.
pub type DirectPool = Pool<DirectStrategy>;

/// Strategy behind [`DirectPool`].
#[derive(Debug, Default)]
pub struct DirectStrategy;

impl Pool<DirectStrategy> {
    /// Creates a factory that always allocates direct buffers and never caches.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategy(DirectStrategy)
    }
}

impl Default for Pool<DirectStrategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolStrategy for DirectStrategy {
    fn acquire(&self, size: usize, _from_cache: &mut bool) -> Result<Buffer, AllocError> {
        Buffer::direct(size)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferFactory;

    #[test]
    fn allocates_direct_buffers() {
        let pool = DirectPool::new();

        let buffer = pool.allocate(100).unwrap();

        assert!(buffer.is_direct());
        assert_eq!(buffer.capacity(), 100);
        assert_eq!(buffer.limit(), 100);
    }

    #[test]
    fn never_caches() {
        let pool = DirectPool::new();

        let buffer = pool.allocate(100).unwrap();
        assert!(!pool.free(buffer));

        assert_eq!(pool.used(), 0);
        assert!(pool.release().is_empty());
    }
}
