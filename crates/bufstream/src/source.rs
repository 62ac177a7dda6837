// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;

/// Outcome of a single pull from a [`PullSource`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pull {
    /// The source produced this many bytes (always at least one).
    Bytes(usize),

    /// The source has no data right now but may produce more later.
    Pending,

    /// The source has reached end-of-input and will never produce more data.
    End,
}

/// A non-blocking source of bytes, such as a socket in non-blocking mode.
///
/// [`BufferStream::drain_pull()`][crate::BufferStream::drain_pull] keeps pulling until the
/// source reports [`Pull::Pending`] or [`Pull::End`], expanding the stream as needed, so a
/// single drain call moves everything the source currently has.
pub trait PullSource {
    /// Pulls as many bytes as are currently available into `dst`, without blocking.
    ///
    /// # Errors
    ///
    /// Returns the source's underlying I/O error, if any.
    fn pull(&mut self, dst: &mut [u8]) -> io::Result<Pull>;
}

/// A blocking source of bytes, such as a pipe or a socket in blocking mode.
///
/// [`BufferStream::drain_bytes()`][crate::BufferStream::drain_bytes] first consults
/// [`bytes_ready()`][Self::bytes_ready] and moves that many bytes without blocking. Only when
/// the probe reports nothing does it fall back to a single blocking [`read_byte()`][Self::read_byte],
/// so one drain call blocks at most once, and only for one byte.
pub trait ByteSource {
    /// A best-effort, non-blocking estimate of how many bytes can be read without blocking.
    ///
    /// The default implementation reports zero, which routes every drain through the blocking
    /// single-byte path. The estimate does not have to be exact.
    ///
    /// # Errors
    ///
    /// Returns the source's underlying I/O error, if any.
    fn bytes_ready(&mut self) -> io::Result<usize> {
        Ok(0)
    }

    /// Reads one byte, blocking until it is available. Returns `None` at end-of-input.
    ///
    /// # Errors
    ///
    /// Returns the source's underlying I/O error, if any.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}
