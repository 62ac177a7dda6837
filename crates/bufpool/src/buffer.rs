// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::slice;

use crate::AllocError;

/// Byte order used when encoding or decoding multi-byte values in a buffer.
///
/// The order is carried by the buffer and inherited by streams and codecs layered on top of it.
/// Producer and consumer must agree on the order out-of-band; it is not part of the wire format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endian {
    /// Most significant byte first. This is the default, matching common network byte order.
    Big,

    /// Least significant byte first.
    Little,
}

/// The memory backing a buffer.
enum Storage {
    /// Ordinary storage owned by a `Box`, released by the Rust allocator machinery.
    Heap(Box<[u8]>),

    /// Storage obtained directly from the system allocator and released by an explicit `Drop`.
    ///
    /// This is the pooled flavor: its lifetime is managed manually by the owning factory, which
    /// is what makes recycling it through a cache worthwhile.
    Direct {
        /// Dangling when `capacity` is zero; otherwise a live allocation of `capacity` bytes.
        ptr: NonNull<u8>,
        capacity: usize,
    },
}

// SAFETY: A `Storage` exclusively owns its allocation and has no interior mutability, so moving
// it between threads or sharing references to it is no different from doing so with a `Box<[u8]>`.
unsafe impl Send for Storage {}
// SAFETY: See above.
unsafe impl Sync for Storage {}

/// An exclusively owned, contiguous region of bytes.
///
/// A buffer tracks three cursors over its storage, in the classic I/O buffer arrangement:
///
/// * `capacity` - the total number of allocated bytes; fixed at creation.
/// * `limit` - the first byte that must not be touched; `limit <= capacity`.
/// * `position` - the next byte to read or write; `position <= limit`.
///
/// Buffers move by value between exactly one of two owners: the caller using it, or the pool
/// caching it. [`allocate()`][crate::BufferFactory::allocate] transfers ownership out of the
/// factory and [`free()`][crate::BufferFactory::free] transfers it back, consuming the handle,
/// so a freed buffer cannot be used again by construction.
///
/// The contents of a newly allocated buffer are **not** guaranteed to be zeroed: a buffer served
/// from a pool's cache still holds whatever its previous owner wrote into it.
pub struct Buffer {
    storage: Storage,
    limit: usize,
    position: usize,
    order: Endian,
}

impl Buffer {
    /// Allocates a plain heap buffer of exactly `capacity` bytes.
    ///
    /// Heap buffers are never cached by any pool; use them for one-off or out-of-range sizes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the allocator cannot supply the memory.
    pub fn heap(capacity: usize) -> Result<Self, AllocError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError { size: capacity })?;
        bytes.resize(capacity, 0);

        Ok(Self::with_storage(Storage::Heap(bytes.into_boxed_slice())))
    }

    /// Allocates a manually managed buffer of exactly `capacity` bytes.
    ///
    /// Direct buffers are the pooled flavor: their storage comes straight from the system
    /// allocator and is released only when the buffer is dropped, which makes them the natural
    /// candidate for recycling through a factory cache.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the allocator cannot supply the memory.
    pub fn direct(capacity: usize) -> Result<Self, AllocError> {
        if capacity == 0 {
            return Ok(Self::with_storage(Storage::Direct {
                ptr: NonNull::dangling(),
                capacity: 0,
            }));
        }

        let layout = Layout::array::<u8>(capacity).map_err(|_| AllocError { size: capacity })?;

        // SAFETY: The layout has non-zero size; we checked capacity above.
        let raw = unsafe { alloc::alloc_zeroed(layout) };

        let ptr = NonNull::new(raw).ok_or(AllocError { size: capacity })?;

        Ok(Self::with_storage(Storage::Direct { ptr, capacity }))
    }

    fn with_storage(storage: Storage) -> Self {
        let capacity = match &storage {
            Storage::Heap(bytes) => bytes.len(),
            Storage::Direct { capacity, .. } => *capacity,
        };

        Self {
            storage,
            limit: capacity,
            position: 0,
            order: Endian::Big,
        }
    }

    /// The total number of allocated bytes. Fixed for the lifetime of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Heap(bytes) => bytes.len(),
            Storage::Direct { capacity, .. } => *capacity,
        }
    }

    /// Whether the storage is manually managed (eligible for pooling) rather than plain heap.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        matches!(self.storage, Storage::Direct { .. })
    }

    /// The index of the first byte that must not be read or written.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Sets the limit, clamping the position down to it if necessary.
    ///
    /// # Panics
    ///
    /// Panics if `limit` exceeds the capacity.
    pub fn set_limit(&mut self, limit: usize) {
        assert!(limit <= self.capacity());

        self.limit = limit;
        self.position = self.position.min(limit);
    }

    /// The index of the next byte to read or write.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Sets the position.
    ///
    /// # Panics
    ///
    /// Panics if `position` exceeds the limit.
    pub fn set_position(&mut self, position: usize) {
        assert!(position <= self.limit);

        self.position = position;
    }

    /// Moves the position forward by `count` bytes.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` bytes remain before the limit.
    pub fn advance(&mut self, count: usize) {
        assert!(count <= self.remaining());

        self.position += count;
    }

    /// The number of bytes between the position and the limit.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Whether any bytes remain between the position and the limit.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Resets the position to zero and the limit to the capacity. The contents are untouched.
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity();
    }

    /// The byte order applied to multi-byte values in this buffer.
    #[must_use]
    pub fn order(&self) -> Endian {
        self.order
    }

    /// Sets the byte order applied to multi-byte values in this buffer.
    pub fn set_order(&mut self, order: Endian) {
        self.order = order;
    }

    /// The entire allocated region, ignoring position and limit.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Heap(bytes) => bytes,
            Storage::Direct { ptr, capacity } => {
                // SAFETY: The pointer covers exactly `capacity` live, initialized bytes for as
                // long as the storage exists, and we hand out a lifetime tied to `&self`.
                unsafe { slice::from_raw_parts(ptr.as_ptr(), *capacity) }
            }
        }
    }

    /// The entire allocated region, mutable, ignoring position and limit.
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Heap(bytes) => bytes,
            Storage::Direct { ptr, capacity } => {
                // SAFETY: As in `as_bytes`, plus `&mut self` guarantees exclusive access.
                unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), *capacity) }
            }
        }
    }

    /// The bytes between the position and the limit.
    #[must_use]
    pub fn remaining_slice(&self) -> &[u8] {
        &self.as_bytes()[self.position..self.limit]
    }

    /// Copies `src` into the buffer at the current position and advances past it.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `src.len()` bytes remain before the limit.
    pub fn put_slice(&mut self, src: &[u8]) {
        assert!(src.len() <= self.remaining());

        let start = self.position;
        self.as_bytes_mut()[start..start + src.len()].copy_from_slice(src);
        self.position += src.len();
    }

    /// Copies bytes from the current position into `dst` and advances past them.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `dst.len()` bytes remain before the limit.
    pub fn copy_to_slice(&mut self, dst: &mut [u8]) {
        assert!(dst.len() <= self.remaining());

        let start = self.position;
        dst.copy_from_slice(&self.as_bytes()[start..start + dst.len()]);
        self.position += dst.len();
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        if let Self::Direct { ptr, capacity } = self {
            if *capacity > 0 {
                let layout = Layout::array::<u8>(*capacity)
                    .expect("layout was valid when the buffer was allocated");

                // SAFETY: The pointer was produced by `alloc_zeroed` with this same layout and
                // has not been released yet - this drop is the single release point.
                unsafe {
                    alloc::dealloc(ptr.as_ptr(), layout);
                }
            }
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.capacity())
            .field("limit", &self.limit)
            .field("position", &self.position)
            .field("direct", &self.is_direct())
            .field("order", &self.order)
            .finish()
    }
}
