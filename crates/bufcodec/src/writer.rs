// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use bufpool::{Buffer, Endian};
use bufstream::{BufferStream, StreamError};
use num_traits::ToBytes;

use crate::{Enumerated, Serializer};

/// The largest element count a sequence can carry on the wire: the count field is 16 bits.
pub const MAX_SEQUENCE_LEN: usize = u16::MAX as usize;

/// Encodes typed values onto a [`BufferStream`] in the fixed-width wire format.
///
/// A writer is bound to exactly one stream for its lifetime. It never runs out of space - every
/// write pads the stream first, expanding it as needed - so the only failure a write can report
/// is an allocation failure from that expansion.
///
/// # Wire format
///
/// Every nullable value starts with a one-byte presence flag; `0` means absent and nothing else
/// follows. Sequences follow the presence flag with an unsigned 16-bit element count. Multi-byte
/// values use the stream's byte order, which producer and consumer must agree on out-of-band.
///
/// ```
/// # use std::sync::Arc;
/// # use bufpool::HeapPool;
/// # use bufstream::BufferStream;
/// use bufcodec::{ByteReader, ByteWriter};
///
/// # let mut stream = BufferStream::new(Arc::new(HeapPool::new()))?;
/// let mut writer = ByteWriter::new(&mut stream);
/// writer.put_u32(0xDEAD_BEEF)?;
/// writer.put_str(Some("hello"))?;
///
/// let mut reader = ByteReader::new(&stream);
/// assert_eq!(reader.get_u32(), 0xDEAD_BEEF);
/// assert_eq!(reader.get_str(), Some("hello".to_string()));
/// # Ok::<(), bufstream::StreamError>(())
/// ```
#[derive(Debug)]
pub struct ByteWriter<'a> {
    stream: &'a mut BufferStream,
}

impl<'a> ByteWriter<'a> {
    /// Creates a writer appending to the given stream.
    pub fn new(stream: &'a mut BufferStream) -> Self {
        Self { stream }
    }

    /// The total number of pending bytes in the underlying stream.
    #[must_use]
    pub fn size(&self) -> usize {
        self.stream.size()
    }

    /// The byte order applied to multi-byte values.
    #[must_use]
    pub fn order(&self) -> Endian {
        self.stream.order()
    }

    /// Sets the byte order applied to multi-byte values.
    pub fn set_order(&mut self, order: Endian) {
        self.stream.set_order(order);
    }

    /// Writes the presence flag that leads every nullable value.
    fn put_presence(&mut self, present: bool) -> Result<(), StreamError> {
        self.put_bool(present)
    }

    fn put_count(&mut self, len: usize) -> Result<(), StreamError> {
        let Ok(count) = u16::try_from(len) else {
            panic!("sequence of {len} elements exceeds the 65535-element wire limit");
        };

        self.put_u16(count)
    }

    /// Writes a boolean as a single byte: `1` for true, `0` for false.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_bool(&mut self, value: bool) -> Result<(), StreamError> {
        self.stream.write(&[u8::from(value)])
    }

    /// Writes a number in the stream's byte order.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_num<T: ToBytes>(&mut self, value: &T) -> Result<(), StreamError> {
        let bytes = match self.stream.order() {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };

        self.stream.write(bytes.as_ref())
    }

    /// Writes an `i8` as one byte.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_i8(&mut self, value: i8) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes a `u8` as one byte.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_u8(&mut self, value: u8) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes an `i16` as two bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_i16(&mut self, value: i16) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes a `u16` as two bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_u16(&mut self, value: u16) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes an `i32` as four bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_i32(&mut self, value: i32) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes a `u32` as four bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_u32(&mut self, value: u32) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes an `i64` as eight bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_i64(&mut self, value: i64) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes an `f32` as its four IEEE-754 bytes, preserving NaN payloads, infinities and
    /// signed zeros bit-exactly.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_f32(&mut self, value: f32) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes an `f64` as its eight IEEE-754 bytes, preserving NaN payloads, infinities and
    /// signed zeros bit-exactly.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_f64(&mut self, value: f64) -> Result<(), StreamError> {
        self.put_num(&value)
    }

    /// Writes raw bytes with no framing of any kind.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.stream.write(bytes)
    }

    /// Writes a nullable byte sequence: presence flag, 16-bit count, then the bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    ///
    /// # Panics
    ///
    /// Panics if the sequence holds more than 65535 elements; that is a caller precondition,
    /// not a recoverable condition.
    pub fn put_byte_array(&mut self, values: Option<&[u8]>) -> Result<(), StreamError> {
        if let Some(values) = values {
            self.put_presence(true)?;
            self.put_count(values.len())?;
            self.put_bytes(values)?;
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Writes a nullable boolean sequence: presence flag, 16-bit count, then one byte each.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    ///
    /// # Panics
    ///
    /// Panics if the sequence holds more than 65535 elements.
    pub fn put_bool_array(&mut self, values: Option<&[bool]>) -> Result<(), StreamError> {
        if let Some(values) = values {
            self.put_presence(true)?;
            self.put_count(values.len())?;
            for value in values {
                self.put_bool(*value)?;
            }
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Writes a nullable numeric sequence: presence flag, 16-bit count, then the elements in
    /// the stream's byte order.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    ///
    /// # Panics
    ///
    /// Panics if the sequence holds more than 65535 elements.
    pub fn put_num_array<T: ToBytes>(&mut self, values: Option<&[T]>) -> Result<(), StreamError> {
        if let Some(values) = values {
            self.put_presence(true)?;
            self.put_count(values.len())?;
            for value in values {
                self.put_num(value)?;
            }
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Writes a nullable narrow string: presence flag, 16-bit byte count, then the UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    ///
    /// # Panics
    ///
    /// Panics if the string is longer than 65535 bytes.
    pub fn put_str(&mut self, value: Option<&str>) -> Result<(), StreamError> {
        if let Some(value) = value {
            self.put_presence(true)?;
            self.put_count(value.len())?;
            self.put_bytes(value.as_bytes())?;
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Writes a nullable wide string: presence flag, 16-bit code-unit count, then each UTF-16
    /// code unit as two bytes in the stream's byte order.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    ///
    /// # Panics
    ///
    /// Panics if the string is longer than 65535 UTF-16 code units.
    pub fn put_unicode(&mut self, value: Option<&str>) -> Result<(), StreamError> {
        if let Some(value) = value {
            let units: Vec<u16> = value.encode_utf16().collect();

            self.put_presence(true)?;
            self.put_count(units.len())?;
            for unit in units {
                self.put_u16(unit)?;
            }
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Writes a nullable enum: presence flag, then its 16-bit ordinal.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    ///
    /// # Panics
    ///
    /// Panics if the ordinal exceeds 65535.
    pub fn put_enum<E: Enumerated>(&mut self, value: Option<&E>) -> Result<(), StreamError> {
        if let Some(value) = value {
            let Ok(ordinal) = u16::try_from(value.ordinal()) else {
                panic!("enum ordinal {} exceeds the 16-bit wire limit", value.ordinal());
            };

            self.put_presence(true)?;
            self.put_u16(ordinal)?;
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Writes a nullable value through a caller-supplied serializer: presence flag, then
    /// whatever the serializer produces.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand (directly or inside the
    /// serializer).
    pub fn put_item<T, S>(&mut self, value: Option<&T>, serializer: &S) -> Result<(), StreamError>
    where
        S: Serializer<T>,
    {
        if let Some(value) = value {
            self.put_presence(true)?;
            serializer.write(self, value)?;
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Writes a nullable sequence of nullable values through a caller-supplied serializer:
    /// presence flag, 16-bit count, then a presence flag plus payload per element.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand (directly or inside the
    /// serializer).
    ///
    /// # Panics
    ///
    /// Panics if the sequence holds more than 65535 elements.
    pub fn put_array<T, S>(&mut self, values: Option<&[Option<T>]>, serializer: &S) -> Result<(), StreamError>
    where
        S: Serializer<T>,
    {
        if let Some(values) = values {
            self.put_presence(true)?;
            self.put_count(values.len())?;
            for value in values {
                self.put_item(value.as_ref(), serializer)?;
            }
        } else {
            self.put_presence(false)?;
        }

        Ok(())
    }

    /// Drains the remaining bytes of a foreign buffer into the stream, unframed.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream fails to expand.
    pub fn put_buffer(&mut self, buffer: &mut Buffer) -> Result<(), StreamError> {
        self.stream.drain_buffer(buffer)?;
        Ok(())
    }
}
