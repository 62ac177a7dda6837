// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;

/// Outcome of a single push into a [`PushSink`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Push {
    /// The sink consumed this many bytes (always at least one).
    Bytes(usize),

    /// The sink cannot take any bytes right now; try again later.
    Busy,
}

/// A non-blocking sink of bytes, such as a socket in non-blocking mode.
///
/// [`BufferStream::fill_push()`][crate::BufferStream::fill_push] keeps pushing pending bytes
/// until none remain or the sink reports [`Push::Busy`], then discards exactly what the sink
/// consumed.
pub trait PushSink {
    /// Pushes as many bytes of `src` as the sink will currently take, without blocking.
    ///
    /// # Errors
    ///
    /// Returns the sink's underlying I/O error, if any.
    fn push(&mut self, src: &[u8]) -> io::Result<Push>;
}

/// A blocking sink of bytes.
///
/// [`BufferStream::fill_bytes()`][crate::BufferStream::fill_bytes] writes every pending byte
/// through this interface, blocking as the sink requires, then discards all of them.
pub trait ByteSink {
    /// Writes one byte, blocking until the sink accepts it.
    ///
    /// # Errors
    ///
    /// Returns the sink's underlying I/O error, if any.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
}
