// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bounded pools of reusable byte buffers.
//!
//! Allocating and releasing large byte regions on every I/O operation is expensive. This crate
//! keeps released buffers in a bounded cache so that subsequent allocations of a similar size can
//! be served without touching the system allocator.
//!
//! The entry point is the [`BufferFactory`] trait, which defines the allocate/free/resize
//! contract, cache accounting, and the bulk [`release()`][BufferFactory::release] /
//! [`transfer()`][BufferFactory::transfer] handoff between two factories. Five factory flavors
//! are provided, differing only in *which* buffers they are willing to cache:
//!
//! * [`HeapPool`] - plain heap buffers, never caches.
//! * [`DirectPool`] - manually managed buffers, never caches.
//! * [`FixedPool`] - one size class; every pooled buffer has the same capacity.
//! * [`BinaryPool`] - power-of-two size classes within a configured range of powers.
//! * [`MapPool`] - one size class per exact requested size, created on demand.
//!
//! All factories share one accounting core ([`Pool`]): a pair of atomic counters tracking how
//! much memory the cache currently holds (`used`) and how much it may hold at most (`capacity`).
//! A factory is safe to share across threads; the expected deployment is a single process-wide
//! pool feeding many per-connection buffer streams.
//!
//! # Choosing a factory
//!
//! [`FixedPool`] answers every in-range request with a full-size buffer, trading memory slack for
//! zero size-matching cost. [`BinaryPool`] rounds requests up to the next power of two, bounding
//! worst-case slack to 2x. [`MapPool`] eliminates slack entirely but creates one size class per
//! distinct request size, which can proliferate without bound when callers request arbitrary
//! sizes - prefer it when the application works with a small, known set of buffer sizes.
//!
//! ```
//! use bufpool::{BinaryPool, BufferFactory};
//!
//! // Pools buffers of 256, 512 and 1024 bytes.
//! let pool = BinaryPool::new(8, 10);
//!
//! let buffer = pool.allocate(300)?;
//! assert!(buffer.capacity() >= 300);
//! assert_eq!(buffer.limit(), 300);
//!
//! // Freeing caches the buffer; the next allocation of a similar size reuses it.
//! assert!(pool.free(buffer));
//! assert_eq!(pool.used(), 512);
//! # Ok::<(), bufpool::AllocError>(())
//! ```

mod binary;
mod buffer;
mod direct;
mod error;
mod factory;
mod fixed;
mod heap;
mod map;
mod pool;
mod stack;

pub use binary::{BinaryPool, BinaryStrategy};
pub use buffer::{Buffer, Endian};
pub use direct::{DirectPool, DirectStrategy};
pub use error::AllocError;
pub use factory::BufferFactory;
pub use fixed::{FixedPool, FixedStrategy};
pub use heap::{HeapPool, HeapStrategy};
pub use map::{MapPool, MapStrategy};
pub use pool::{Pool, PoolStrategy};
pub use stack::BufferStack;
