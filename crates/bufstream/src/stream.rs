// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use bufpool::{AllocError, Buffer, BufferFactory, Endian};
use tracing::{Level, event};

use crate::{ByteSink, ByteSource, Pull, PullSource, Push, PushSink, StreamError};

const ERR_FREED: &str = "buffer stream used after free()";

/// Outcome of draining an external source into a stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Drained {
    /// This many bytes were moved into the stream (possibly zero, when the source had nothing
    /// available right now).
    Bytes(usize),

    /// The source reached end-of-input. Bytes moved before the end was observed are already in
    /// the stream.
    End,
}

/// A dynamically expanding stream of bytes over one pooled buffer.
///
/// Bytes enter at the back via the `drain_*` methods (or [`write()`][Self::write]) and leave at
/// the front via the `fill_*` methods (or [`skip()`][Self::skip]). The bytes in
/// `[0, position())` are pending: produced but not yet consumed. When a write does not fit, the
/// stream grows by doubling, requesting the larger buffer from its factory; consuming from the
/// front compacts the remainder in place, giving sliding-window semantics without reallocating.
///
/// A stream is **not** thread-safe; callers serialize all access to one instance. The expected
/// deployment is many single-threaded streams sharing one thread-safe factory.
///
/// [`free()`][Self::free] returns the owned buffer to the factory. It runs automatically on
/// drop, is idempotent, and any other use of a freed stream is a programming error that panics.
#[derive(Debug)]
pub struct BufferStream {
    factory: Arc<dyn BufferFactory>,

    // `None` once freed. While present, the buffer's position is the pending byte count and its
    // limit always equals its capacity.
    buffer: Option<Buffer>,
}

impl BufferStream {
    /// Creates a stream with an initial buffer of the factory's default size.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the initial buffer cannot be allocated.
    pub fn new(factory: Arc<dyn BufferFactory>) -> Result<Self, AllocError> {
        let size = factory.default_size();
        Self::with_capacity(factory, size)
    }

    /// Creates a stream with an initial buffer of at least `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the initial buffer cannot be allocated.
    pub fn with_capacity(factory: Arc<dyn BufferFactory>, size: usize) -> Result<Self, AllocError> {
        let mut buffer = factory.allocate(size)?;
        buffer.clear();

        Ok(Self {
            factory,
            buffer: Some(buffer),
        })
    }

    fn buffer(&self) -> &Buffer {
        self.buffer.as_ref().expect(ERR_FREED)
    }

    fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer.as_mut().expect(ERR_FREED)
    }

    /// The number of pending bytes: written to the stream but not yet skipped.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buffer().position()
    }

    /// The write position. Identical to [`size()`][Self::size]; reads consume from the front.
    #[must_use]
    pub fn position(&self) -> usize {
        self.size()
    }

    /// The current capacity of the underlying buffer. Grows as data is written.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer().capacity()
    }

    /// The number of bytes that can be written before the stream must expand.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.size()
    }

    /// Whether the stream holds no pending bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether the stream holds at least one pending byte.
    #[must_use]
    pub fn has_bytes(&self) -> bool {
        self.size() > 0
    }

    /// The byte order used by codecs layered over this stream.
    #[must_use]
    pub fn order(&self) -> Endian {
        self.buffer().order()
    }

    /// Sets the byte order used by codecs layered over this stream.
    pub fn set_order(&mut self, order: Endian) {
        self.buffer_mut().set_order(order);
    }

    /// The pending bytes, oldest first.
    ///
    /// This is a frozen, read-only view: it reflects the stream state at the moment of the
    /// call and (by way of the borrow it holds) cannot observe, nor survive into, any later
    /// write, expansion, or free.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer().as_bytes()[..self.size()]
    }

    /// Ensures at least `bytes` writable bytes, expanding the stream as necessary.
    ///
    /// # Errors
    ///
    /// Returns an allocation failure from the factory. The stream is left either fully
    /// expanded or exactly as it was.
    pub fn pad(&mut self, bytes: usize) -> Result<(), StreamError> {
        while self.remaining() < bytes {
            self.expand(self.size() + bytes)?;
        }

        Ok(())
    }

    /// Grows the buffer to at least `required` bytes, at minimum doubling its capacity.
    ///
    /// All pending bytes are preserved.
    fn expand(&mut self, required: usize) -> Result<(), StreamError> {
        let position = self.size();
        let target = (self.capacity().saturating_mul(2)).max(required);

        let buffer = self.buffer.as_mut().expect(ERR_FREED);
        self.factory.resize(buffer, target)?;

        // Resizing leaves limit == requested size and resets the position; restore the stream
        // invariant (limit pinned to capacity, position = pending bytes).
        let capacity = buffer.capacity();
        buffer.set_limit(capacity);
        buffer.set_position(position);

        event!(Level::TRACE, message = "stream expanded", capacity, pending = position);

        Ok(())
    }

    /// Appends bytes to the stream, expanding as necessary.
    ///
    /// # Errors
    ///
    /// Returns an allocation failure from the factory; the stream is unchanged in that case.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.pad(bytes.len())?;
        self.buffer_mut().put_slice(bytes);

        Ok(())
    }

    /// The writable region after the pending bytes, for callers that produce data in place.
    ///
    /// Call [`pad()`][Self::pad] first to make the region at least as large as needed, write
    /// into the slice, then commit with [`advance()`][Self::advance].
    #[must_use]
    pub fn unfilled(&mut self) -> &mut [u8] {
        let buffer = self.buffer_mut();
        let start = buffer.position();
        &mut buffer.as_bytes_mut()[start..]
    }

    /// Declares that `count` bytes at the start of [`unfilled()`][Self::unfilled] now hold data.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the writable region.
    pub fn advance(&mut self, count: usize) {
        self.buffer_mut().advance(count);
    }

    /// Discards the oldest `bytes` pending bytes.
    ///
    /// Skipping everything (or more) resets the stream in O(1). A partial skip compacts the
    /// remaining bytes down to the front of the buffer in place - no reallocation, cost
    /// proportional to the bytes kept.
    pub fn skip(&mut self, bytes: usize) {
        let buffer = self.buffer_mut();
        let position = buffer.position();

        if bytes >= position {
            buffer.set_position(0);
        } else {
            buffer.as_bytes_mut().copy_within(bytes..position, 0);
            buffer.set_position(position - bytes);
        }
    }

    /// Commits a reader's consumption back to the stream.
    ///
    /// Equivalent to `skip(consumed)`; pass the number of bytes a reader over
    /// [`pending()`][Self::pending] actually read.
    pub fn sync(&mut self, consumed: usize) {
        self.skip(consumed);
    }

    /// Discards all pending bytes.
    pub fn clear(&mut self) {
        self.buffer_mut().set_position(0);
    }

    /// Pulls from a non-blocking source until it reports pending or end-of-input, expanding the
    /// stream as needed.
    ///
    /// # Errors
    ///
    /// Returns the source's I/O error or an allocation failure from expanding. Bytes pulled
    /// before the error remain in the stream.
    pub fn drain_pull<S>(&mut self, source: &mut S) -> Result<Drained, StreamError>
    where
        S: PullSource + ?Sized,
    {
        let mut drained = 0;

        loop {
            if self.remaining() == 0 {
                self.expand(self.size() + 1)?;
            }

            let buffer = self.buffer.as_mut().expect(ERR_FREED);
            let start = buffer.position();

            match source.pull(&mut buffer.as_bytes_mut()[start..])? {
                Pull::Bytes(count) => {
                    buffer.advance(count);
                    drained += count;
                }
                Pull::Pending => return Ok(Drained::Bytes(drained)),
                Pull::End => return Ok(Drained::End),
            }
        }
    }

    /// Drains a blocking source, preferring its non-blocking ready hint.
    ///
    /// When the source reports `n > 0` ready bytes, up to `n` bytes are read without expecting
    /// to block. Otherwise a single blocking one-byte read is made - the only suspension point
    /// in the stream. The hint can never signal end-of-input, which is why the blocking read
    /// must eventually be taken.
    ///
    /// # Errors
    ///
    /// Returns the source's I/O error or an allocation failure from expanding.
    pub fn drain_bytes<S>(&mut self, source: &mut S) -> Result<Drained, StreamError>
    where
        S: ByteSource + ?Sized,
    {
        let ready = source.bytes_ready()?;

        if ready > 0 {
            self.pad(ready)?;

            let mut moved = 0;
            for _ in 0..ready {
                match source.read_byte()? {
                    Some(byte) => {
                        self.buffer_mut().put_slice(&[byte]);
                        moved += 1;
                    }
                    None if moved == 0 => return Ok(Drained::End),
                    // The end will be reported again by the next drain call.
                    None => break,
                }
            }

            return Ok(Drained::Bytes(moved));
        }

        match source.read_byte()? {
            Some(byte) => {
                self.pad(1)?;
                self.buffer_mut().put_slice(&[byte]);
                Ok(Drained::Bytes(1))
            }
            None => Ok(Drained::End),
        }
    }

    /// Moves the remaining bytes of a foreign buffer into the stream.
    ///
    /// Always moves exactly `source.remaining()` bytes, advancing the source past them.
    ///
    /// # Errors
    ///
    /// Returns an allocation failure from expanding; the source is unchanged in that case.
    pub fn drain_buffer(&mut self, source: &mut Buffer) -> Result<usize, StreamError> {
        let count = source.remaining();

        if count > 0 {
            self.pad(count)?;

            let buffer = self.buffer.as_mut().expect(ERR_FREED);
            let start = buffer.position();
            source.copy_to_slice(&mut buffer.as_bytes_mut()[start..start + count]);
            buffer.advance(count);
        }

        Ok(count)
    }

    /// Copies `length` bytes starting at `offset` from `data` into the stream.
    ///
    /// When fewer than `length` bytes exist past `offset`, the copy is truncated to what is
    /// there. Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::OutOfRange`] when `offset` lies outside `data`, or an allocation
    /// failure from expanding.
    pub fn drain_slice(&mut self, data: &[u8], offset: usize, length: usize) -> Result<usize, StreamError> {
        if offset > data.len() {
            return Err(StreamError::OutOfRange {
                offset,
                len: data.len(),
            });
        }

        let count = (data.len() - offset).min(length);
        if count > 0 {
            self.write(&data[offset..offset + count])?;
        }

        Ok(count)
    }

    /// Pushes pending bytes into a non-blocking sink until none remain or the sink is busy,
    /// then discards exactly what the sink consumed.
    ///
    /// # Errors
    ///
    /// Returns the sink's I/O error. Bytes the sink consumed before the error are **not**
    /// discarded and will be offered again by the next fill.
    pub fn fill_push<S>(&mut self, sink: &mut S) -> Result<usize, StreamError>
    where
        S: PushSink + ?Sized,
    {
        let mut filled = 0;

        while filled < self.size() {
            match sink.push(&self.pending()[filled..])? {
                Push::Bytes(count) => {
                    if count == 0 {
                        break;
                    }
                    filled += count;
                }
                Push::Busy => break,
            }
        }

        self.skip(filled);
        Ok(filled)
    }

    /// Writes every pending byte into a blocking sink, then discards them all.
    ///
    /// # Errors
    ///
    /// Returns the sink's I/O error; no bytes are discarded in that case.
    pub fn fill_bytes<S>(&mut self, sink: &mut S) -> Result<usize, StreamError>
    where
        S: ByteSink + ?Sized,
    {
        let count = self.size();

        for index in 0..count {
            sink.write_byte(self.pending()[index])?;
        }

        self.skip(count);
        Ok(count)
    }

    /// Copies pending bytes into a foreign buffer's remaining window and discards them.
    ///
    /// Moves `min(sink.remaining(), size())` bytes; returns the count.
    pub fn fill_buffer(&mut self, sink: &mut Buffer) -> usize {
        let count = sink.remaining().min(self.size());

        if count > 0 {
            sink.put_slice(&self.pending()[..count]);
            self.skip(count);
        }

        count
    }

    /// Copies pending bytes into `dst` starting at `offset`, at most `length` of them, and
    /// discards what was copied. Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::OutOfRange`] when `offset` lies outside `dst`.
    pub fn fill_slice(&mut self, dst: &mut [u8], offset: usize, length: usize) -> Result<usize, StreamError> {
        if offset > dst.len() {
            return Err(StreamError::OutOfRange {
                offset,
                len: dst.len(),
            });
        }

        let count = (dst.len() - offset).min(length).min(self.size());
        if count > 0 {
            dst[offset..offset + count].copy_from_slice(&self.pending()[..count]);
            self.skip(count);
        }

        Ok(count)
    }

    /// Returns the owned buffer to the factory.
    ///
    /// Only the first call has any effect; a freed stream may be freed again (and is freed on
    /// drop), but any other method panics.
    pub fn free(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.factory.free(buffer);
        }
    }

    /// Whether [`free()`][Self::free] has run.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.buffer.is_none()
    }
}

impl Drop for BufferStream {
    fn drop(&mut self) {
        self.free();
    }
}
