// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A growable, in-place-compacting byte stream over pooled buffers.
//!
//! [`BufferStream`] owns one buffer rented from a [`bufpool::BufferFactory`] and turns it into
//! an elastic byte queue for I/O plumbing: variable-length writes land at the back, growing the
//! buffer by doubling when they do not fit, and consumed bytes are discarded from the front by
//! compacting the remainder in place - the sliding-window pattern of a protocol read loop,
//! without allocating per message.
//!
//! Data moves in and out against four shapes of collaborator on each side:
//!
//! * a non-blocking pull source / push sink ([`PullSource`] / [`PushSink`]), e.g. a socket in
//!   non-blocking mode;
//! * a blocking byte source / sink ([`ByteSource`] / [`ByteSink`]), with a best-effort
//!   non-blocking ready probe on the source side;
//! * a foreign [`Buffer`][bufpool::Buffer];
//! * a raw byte range with bounds checking.
//!
//! ```
//! use std::sync::Arc;
//!
//! use bufpool::BinaryPool;
//! use bufstream::BufferStream;
//!
//! let factory = Arc::new(BinaryPool::new(8, 14));
//! let mut stream = BufferStream::new(factory)?;
//!
//! stream.write(b"a message")?;
//! assert_eq!(stream.pending(), b"a message");
//!
//! // Consume the first word; the rest slides to the front in place.
//! stream.skip(2);
//! assert_eq!(stream.pending(), b"message");
//! # Ok::<(), bufstream::StreamError>(())
//! ```
//!
//! A stream carries no internal synchronization: callers serialize access to each instance,
//! while the factory behind it is freely shared. When the stream is dropped (or freed
//! explicitly), its buffer goes back to the factory cache.
//!
//! The `test-util` feature exposes fake sources and sinks in the [`testing`] module.

mod error;
mod sink;
mod source;
mod stream;

pub use error::{Result, StreamError};
pub use sink::{ByteSink, Push, PushSink};
pub use source::{ByteSource, Pull, PullSource};
pub use stream::{BufferStream, Drained};

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
