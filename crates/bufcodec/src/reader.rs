// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::mem::MaybeUninit;
use std::ptr;

use bufpool::Endian;
use bufstream::BufferStream;
use num_traits::FromBytes;

use crate::{Enumerated, Serializer};

/// Whether a reader can still produce values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReaderState {
    /// Every read so far was satisfied.
    Valid,

    /// A read requested more bytes than the snapshot holds (or decoded malformed data). The
    /// state is sticky: it never returns to [`Valid`][Self::Valid].
    Invalid,
}

/// Decodes typed values from a frozen snapshot of a stream's pending bytes.
///
/// A reader captures the stream's pending bytes at construction; data written to the stream
/// afterwards is not visible to it. Several readers may be built over one stream and progress
/// independently - none of them consumes from the stream itself. To commit what a reader
/// consumed, pass [`consumed()`][Self::consumed] to
/// [`BufferStream::sync()`][BufferStream::sync] after the reader is released:
///
/// ```
/// # use std::sync::Arc;
/// # use bufpool::HeapPool;
/// # use bufstream::BufferStream;
/// use bufcodec::{ByteReader, ByteWriter};
///
/// # let mut stream = BufferStream::new(Arc::new(HeapPool::new()))?;
/// ByteWriter::new(&mut stream).put_i32(7)?;
///
/// let mut reader = ByteReader::new(&stream);
/// assert_eq!(reader.get_i32(), 7);
///
/// let consumed = reader.consumed();
/// stream.sync(consumed);
/// assert!(stream.is_empty());
/// # Ok::<(), bufstream::StreamError>(())
/// ```
///
/// # Truncated input
///
/// Decoding short or untrusted input is an expected, hot-path outcome, so it is not an error
/// value and never a panic: the first read that requests more bytes than remain flips the reader
/// into the sticky [`Invalid`][ReaderState::Invalid] state, and that read and every later one
/// return the type-appropriate sentinel (`0`, `false`, `None`). Check
/// [`is_valid()`][Self::is_valid] once after decoding a message instead of checking every field.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    cursor: usize,
    state: ReaderState,
    order: Endian,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader over a snapshot of the stream's pending bytes, inheriting its byte
    /// order.
    #[must_use]
    pub fn new(stream: &'a BufferStream) -> Self {
        Self::over(stream.pending(), stream.order())
    }

    /// Creates a reader over raw bytes with an explicit byte order.
    #[must_use]
    pub fn over(data: &'a [u8], order: Endian) -> Self {
        Self {
            data,
            cursor: 0,
            state: ReaderState::Valid,
            order,
        }
    }

    /// Whether every read so far was satisfied. Once false, it stays false.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state == ReaderState::Valid
    }

    /// The number of bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// The number of bytes read so far. Feed this to [`BufferStream::sync()`].
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Whether at least one unread byte remains.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Whether at least `bytes` unread bytes remain. Does not affect validity.
    #[must_use]
    pub fn has(&self, bytes: usize) -> bool {
        self.remaining() >= bytes
    }

    /// The byte order applied to multi-byte values.
    #[must_use]
    pub fn order(&self) -> Endian {
        self.order
    }

    /// Sets the byte order applied to multi-byte values.
    pub fn set_order(&mut self, order: Endian) {
        self.order = order;
    }

    /// Advances past `min(bytes, remaining)` bytes without interpreting them.
    ///
    /// Used to ignore unknown trailing fields for forward compatibility. Skipping past the end
    /// clamps and does **not** invalidate the reader.
    pub fn skip(&mut self, bytes: usize) {
        self.cursor += bytes.min(self.remaining());
    }

    /// The validity guard behind every read: takes the next `bytes` bytes, or flips the reader
    /// to `Invalid` (sticky) when they are not there.
    fn take(&mut self, bytes: usize) -> Option<&'a [u8]> {
        if self.state == ReaderState::Invalid {
            return None;
        }

        if self.remaining() < bytes {
            self.state = ReaderState::Invalid;
            return None;
        }

        let taken = &self.data[self.cursor..self.cursor + bytes];
        self.cursor += bytes;
        Some(taken)
    }

    fn invalidate(&mut self) {
        self.state = ReaderState::Invalid;
    }

    /// Reads a boolean: one byte, `0` is false, anything else is true. Sentinel: `false`.
    #[must_use]
    pub fn get_bool(&mut self) -> bool {
        self.take(1).is_some_and(|bytes| bytes[0] != 0)
    }

    /// Reads a number in the reader's byte order. Sentinel: zero.
    #[must_use]
    pub fn get_num<T>(&mut self) -> T
    where
        T: FromBytes + Default,
        T::Bytes: Sized,
    {
        let size = size_of::<T>();

        let Some(bytes) = self.take(size) else {
            return T::default();
        };

        let mut raw: MaybeUninit<T::Bytes> = MaybeUninit::uninit();

        // SAFETY: `T::Bytes` is a plain byte array of exactly `size_of::<T>()` bytes with no
        // alignment requirements, and `bytes` holds exactly that many bytes.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), raw.as_mut_ptr().cast::<u8>(), size);
        }

        // SAFETY: Fully initialized by the copy above.
        let raw = unsafe { raw.assume_init() };

        match self.order {
            Endian::Big => T::from_be_bytes(&raw),
            Endian::Little => T::from_le_bytes(&raw),
        }
    }

    /// Reads an `i8`. Sentinel: `0`.
    #[must_use]
    pub fn get_i8(&mut self) -> i8 {
        self.get_num()
    }

    /// Reads a `u8`. Sentinel: `0`.
    #[must_use]
    pub fn get_u8(&mut self) -> u8 {
        self.get_num()
    }

    /// Reads an `i16`. Sentinel: `0`.
    #[must_use]
    pub fn get_i16(&mut self) -> i16 {
        self.get_num()
    }

    /// Reads a `u16`. Sentinel: `0`.
    #[must_use]
    pub fn get_u16(&mut self) -> u16 {
        self.get_num()
    }

    /// Reads an `i32`. Sentinel: `0`.
    #[must_use]
    pub fn get_i32(&mut self) -> i32 {
        self.get_num()
    }

    /// Reads a `u32`. Sentinel: `0`.
    #[must_use]
    pub fn get_u32(&mut self) -> u32 {
        self.get_num()
    }

    /// Reads an `i64`. Sentinel: `0`.
    #[must_use]
    pub fn get_i64(&mut self) -> i64 {
        self.get_num()
    }

    /// Reads an `f32`, bit-exactly. Sentinel: `0.0`.
    #[must_use]
    pub fn get_f32(&mut self) -> f32 {
        self.get_num()
    }

    /// Reads an `f64`, bit-exactly. Sentinel: `0.0`.
    #[must_use]
    pub fn get_f64(&mut self) -> f64 {
        self.get_num()
    }

    /// Reads exactly `count` raw bytes. Sentinel: `None`.
    #[must_use]
    pub fn get_bytes(&mut self, count: usize) -> Option<Vec<u8>> {
        self.take(count).map(<[u8]>::to_vec)
    }

    /// Reads a nullable byte sequence written by
    /// [`put_byte_array()`][crate::ByteWriter::put_byte_array].
    ///
    /// Returns `None` for an absent sequence as well as for a truncated read; the cases are
    /// told apart by [`is_valid()`][Self::is_valid].
    #[must_use]
    pub fn get_byte_array(&mut self) -> Option<Vec<u8>> {
        if !self.get_bool() {
            return None;
        }

        let count = usize::from(self.get_u16());
        self.get_bytes(count)
    }

    /// Reads a nullable boolean sequence written by
    /// [`put_bool_array()`][crate::ByteWriter::put_bool_array].
    #[must_use]
    pub fn get_bool_array(&mut self) -> Option<Vec<bool>> {
        if !self.get_bool() {
            return None;
        }

        let count = usize::from(self.get_u16());
        let bytes = self.take(count)?;

        Some(bytes.iter().map(|byte| *byte != 0).collect())
    }

    /// Reads a nullable numeric sequence written by
    /// [`put_num_array()`][crate::ByteWriter::put_num_array].
    #[must_use]
    pub fn get_num_array<T>(&mut self) -> Option<Vec<T>>
    where
        T: FromBytes + Default,
        T::Bytes: Sized,
    {
        if !self.get_bool() {
            return None;
        }

        let count = usize::from(self.get_u16());
        if !self.is_valid() {
            return None;
        }

        // Check the whole payload up front so a truncated sequence does not half-fill a vector.
        if !self.has(count * size_of::<T>()) {
            self.invalidate();
            return None;
        }

        Some((0..count).map(|_| self.get_num()).collect())
    }

    /// Reads a nullable narrow string written by [`put_str()`][crate::ByteWriter::put_str].
    ///
    /// Bytes that are not valid UTF-8 invalidate the reader, the same as a truncated read.
    #[must_use]
    pub fn get_str(&mut self) -> Option<String> {
        if !self.get_bool() {
            return None;
        }

        let count = usize::from(self.get_u16());
        let bytes = self.take(count)?;

        match String::from_utf8(bytes.to_vec()) {
            Ok(value) => Some(value),
            Err(_) => {
                self.invalidate();
                None
            }
        }
    }

    /// Reads a nullable wide string written by
    /// [`put_unicode()`][crate::ByteWriter::put_unicode].
    ///
    /// Unpaired surrogates invalidate the reader, the same as a truncated read.
    #[must_use]
    pub fn get_unicode(&mut self) -> Option<String> {
        if !self.get_bool() {
            return None;
        }

        let count = usize::from(self.get_u16());
        if !self.is_valid() {
            return None;
        }

        if !self.has(count * 2) {
            self.invalidate();
            return None;
        }

        let units: Vec<u16> = (0..count).map(|_| self.get_num()).collect();

        match String::from_utf16(&units) {
            Ok(value) => Some(value),
            Err(_) => {
                self.invalidate();
                None
            }
        }
    }

    /// Reads a nullable enum written by [`put_enum()`][crate::ByteWriter::put_enum].
    ///
    /// An ordinal outside the type's declared value list invalidates the reader.
    #[must_use]
    pub fn get_enum<E: Enumerated>(&mut self) -> Option<E> {
        if !self.get_bool() {
            return None;
        }

        let ordinal = usize::from(self.get_u16());
        if !self.is_valid() {
            return None;
        }

        match E::from_ordinal(ordinal) {
            Some(value) => Some(value),
            None => {
                self.invalidate();
                None
            }
        }
    }

    /// Reads a nullable value written by [`put_item()`][crate::ByteWriter::put_item] through
    /// the matching serializer.
    ///
    /// The serializer's result only counts when the reader is still valid afterwards, so a
    /// payload that ran past the snapshot is reported as `None` rather than as a
    /// partially-decoded value.
    #[must_use]
    pub fn get_item<T, S>(&mut self, serializer: &S) -> Option<T>
    where
        S: Serializer<T>,
    {
        if !self.get_bool() {
            return None;
        }

        let item = serializer.read(self);
        if self.is_valid() { item } else { None }
    }

    /// Reads a nullable sequence of nullable values written by
    /// [`put_array()`][crate::ByteWriter::put_array] through the matching serializer.
    #[must_use]
    pub fn get_array<T, S>(&mut self, serializer: &S) -> Option<Vec<Option<T>>>
    where
        S: Serializer<T>,
    {
        if !self.get_bool() {
            return None;
        }

        let count = usize::from(self.get_u16());
        if !self.is_valid() {
            return None;
        }

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.get_item(serializer));

            if !self.is_valid() {
                return None;
            }
        }

        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bufpool::HeapPool;
    use bufstream::StreamError;
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::ByteWriter;

    assert_impl_all!(ByteReader<'static>: Send, Sync);

    fn stream() -> BufferStream {
        BufferStream::with_capacity(Arc::new(HeapPool::new()), 16).unwrap()
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    impl Enumerated for Color {
        fn ordinal(&self) -> usize {
            match self {
                Self::Red => 0,
                Self::Green => 1,
                Self::Blue => 2,
            }
        }

        fn from_ordinal(ordinal: usize) -> Option<Self> {
            match ordinal {
                0 => Some(Self::Red),
                1 => Some(Self::Green),
                2 => Some(Self::Blue),
                _ => None,
            }
        }
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
        label: Option<String>,
    }

    struct PointSerializer;

    impl Serializer<Point> for PointSerializer {
        fn write(&self, writer: &mut ByteWriter<'_>, item: &Point) -> Result<(), StreamError> {
            writer.put_i32(item.x)?;
            writer.put_i32(item.y)?;
            writer.put_str(item.label.as_deref())
        }

        fn read(&self, reader: &mut ByteReader<'_>) -> Option<Point> {
            let x = reader.get_i32();
            let y = reader.get_i32();
            let label = reader.get_str();

            Some(Point { x, y, label })
        }
    }

    #[test]
    fn primitives_round_trip() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_bool(true).unwrap();
        writer.put_i8(-5).unwrap();
        writer.put_u8(200).unwrap();
        writer.put_i16(-12345).unwrap();
        writer.put_u16(54321).unwrap();
        writer.put_i32(-7).unwrap();
        writer.put_u32(0xFFFF_FFFF).unwrap();
        writer.put_i64(i64::MIN).unwrap();
        writer.put_f32(1.5).unwrap();
        writer.put_f64(-2.25).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert!(reader.get_bool());
        assert_eq!(reader.get_i8(), -5);
        assert_eq!(reader.get_u8(), 200);
        assert_eq!(reader.get_i16(), -12345);
        assert_eq!(reader.get_u16(), 54321);
        assert_eq!(reader.get_i32(), -7);
        assert_eq!(reader.get_u32(), 0xFFFF_FFFF);
        assert_eq!(reader.get_i64(), i64::MIN);
        assert_eq!(reader.get_f32(), 1.5);
        assert_eq!(reader.get_f64(), -2.25);

        assert!(reader.is_valid());
        assert!(!reader.has_remaining());
    }

    #[test]
    fn floats_are_bit_exact() {
        let f32_values = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0, -0.0, f32::MIN_POSITIVE];
        let f64_values = [
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
            0.0,
            -0.0,
            f64::MIN_POSITIVE,
            f64::from_bits(0x7FF8_0000_DEAD_BEEF), // NaN with a payload
        ];

        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        for value in f32_values {
            writer.put_f32(value).unwrap();
        }
        for value in f64_values {
            writer.put_f64(value).unwrap();
        }

        let mut reader = ByteReader::new(&stream);
        for value in f32_values {
            assert_eq!(reader.get_f32().to_bits(), value.to_bits());
        }
        for value in f64_values {
            assert_eq!(reader.get_f64().to_bits(), value.to_bits());
        }
    }

    #[test]
    fn little_endian_round_trips() {
        let mut stream = stream();
        stream.set_order(bufpool::Endian::Little);

        ByteWriter::new(&mut stream).put_u32(0x0102_0304).unwrap();

        assert_eq!(stream.pending(), &[4, 3, 2, 1]);

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.order(), bufpool::Endian::Little);
        assert_eq!(reader.get_u32(), 0x0102_0304);
    }

    #[test]
    fn arrays_round_trip_including_null_and_empty() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_num_array::<i32>(Some(&[1, -2, 3])).unwrap();
        writer.put_num_array::<i32>(Some(&[])).unwrap();
        writer.put_num_array::<i32>(None).unwrap();
        writer.put_bool_array(Some(&[true, false, true])).unwrap();
        writer.put_byte_array(Some(&[9, 8, 7])).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_num_array::<i32>(), Some(vec![1, -2, 3]));
        assert_eq!(reader.get_num_array::<i32>(), Some(vec![]));
        assert_eq!(reader.get_num_array::<i32>(), None);
        assert!(reader.is_valid());
        assert_eq!(reader.get_bool_array(), Some(vec![true, false, true]));
        assert_eq!(reader.get_byte_array(), Some(vec![9, 8, 7]));
        assert!(reader.is_valid());
    }

    #[test]
    fn strings_round_trip() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_str(Some("plain ascii")).unwrap();
        writer.put_str(Some("")).unwrap();
        writer.put_str(None).unwrap();
        writer.put_unicode(Some("héllo wörld")).unwrap();
        writer.put_unicode(None).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_str(), Some("plain ascii".to_string()));
        assert_eq!(reader.get_str(), Some(String::new()));
        assert_eq!(reader.get_str(), None);
        assert!(reader.is_valid());
        assert_eq!(reader.get_unicode(), Some("héllo wörld".to_string()));
        assert_eq!(reader.get_unicode(), None);
        assert!(reader.is_valid());
    }

    #[test]
    fn enums_round_trip() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_enum(Some(&Color::Blue)).unwrap();
        writer.put_enum::<Color>(None).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_enum::<Color>(), Some(Color::Blue));
        assert_eq!(reader.get_enum::<Color>(), None);
        assert!(reader.is_valid());
    }

    #[test]
    fn out_of_range_ordinal_invalidates() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_bool(true).unwrap();
        writer.put_u16(40).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_enum::<Color>(), None);
        assert!(!reader.is_valid());
    }

    #[test]
    fn items_round_trip_recursively() {
        let point = Point {
            x: 3,
            y: -4,
            label: Some("origin-ish".to_string()),
        };

        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_item(Some(&point), &PointSerializer).unwrap();
        writer.put_item::<Point, _>(None, &PointSerializer).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_item(&PointSerializer), Some(point));
        assert_eq!(reader.get_item::<Point, _>(&PointSerializer), None);
        assert!(reader.is_valid());
    }

    #[test]
    fn object_arrays_round_trip_with_null_elements() {
        let values = vec![
            Some(Point { x: 1, y: 2, label: None }),
            None,
            Some(Point { x: 3, y: 4, label: Some("p".to_string()) }),
        ];

        let mut stream = stream();

        ByteWriter::new(&mut stream)
            .put_array(Some(&values), &PointSerializer)
            .unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_array(&PointSerializer), Some(values));
        assert!(reader.is_valid());
    }

    #[test]
    fn truncation_is_sticky_and_returns_sentinels() {
        let mut stream = stream();
        ByteWriter::new(&mut stream).put_u16(0x0102).unwrap();

        let mut reader = ByteReader::new(&stream);

        // Asking for four bytes when two remain trips the failure state.
        assert_eq!(reader.get_u32(), 0);
        assert!(!reader.is_valid());

        // The two bytes that do exist are no longer readable either.
        assert_eq!(reader.get_u16(), 0);
        assert!(!reader.get_bool());
        assert_eq!(reader.get_str(), None);
        assert_eq!(reader.get_bytes(1), None);
    }

    #[test]
    fn invalidity_survives_later_stream_growth() {
        let mut stream = stream();
        ByteWriter::new(&mut stream).put_u8(1).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_u32(), 0);
        assert!(!reader.is_valid());

        // A reader is a snapshot, not live: even a fresh snapshot taken after more data arrives
        // is a different reader. This one stays invalid forever.
        assert_eq!(reader.get_u8(), 0);
        assert!(!reader.is_valid());
    }

    #[test]
    fn skip_clamps_without_invalidating() {
        let mut stream = stream();
        ByteWriter::new(&mut stream).put_u32(7).unwrap();

        let mut reader = ByteReader::new(&stream);
        reader.skip(100);

        assert_eq!(reader.remaining(), 0);
        assert!(reader.is_valid());
    }

    #[test]
    fn skip_ignores_unknown_trailing_fields() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_i32(42).unwrap();
        writer.put_u16(0xBEEF).unwrap(); // A field this consumer does not understand.
        writer.put_i32(43).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_i32(), 42);
        reader.skip(2);
        assert_eq!(reader.get_i32(), 43);
        assert!(reader.is_valid());
    }

    #[test]
    fn multiple_readers_progress_independently() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_i32(1).unwrap();
        writer.put_i32(2).unwrap();

        let mut first = ByteReader::new(&stream);
        let mut second = ByteReader::new(&stream);

        assert_eq!(first.get_i32(), 1);
        assert_eq!(first.get_i32(), 2);

        // The second reader's cursor is untouched by the first one's progress.
        assert_eq!(second.get_i32(), 1);
    }

    #[test]
    fn sync_commits_only_the_consumed_prefix() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_i32(1).unwrap();
        writer.put_i32(2).unwrap();

        let consumed = {
            let mut reader = ByteReader::new(&stream);
            assert_eq!(reader.get_i32(), 1);
            reader.consumed()
        };
        stream.sync(consumed);

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_i32(), 2);
        assert!(!reader.has_remaining());
    }

    #[test]
    fn fresh_reader_after_skip_sees_the_tail() {
        let mut stream = stream();
        stream.write(&[0, 1, 2, 3, 4, 5]).unwrap();

        stream.skip(2);

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.remaining(), 4);
        assert_eq!(reader.get_u8(), 2);
    }

    #[test]
    fn invalid_utf8_invalidates() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_bool(true).unwrap();
        writer.put_u16(2).unwrap();
        writer.put_bytes(&[0xFF, 0xFE]).unwrap();

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_str(), None);
        assert!(!reader.is_valid());
    }

    #[test]
    fn unpaired_surrogate_invalidates() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_bool(true).unwrap();
        writer.put_u16(1).unwrap();
        writer.put_u16(0xD800).unwrap(); // A lone high surrogate.

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_unicode(), None);
        assert!(!reader.is_valid());
    }

    #[test]
    fn truncated_item_payload_reports_none() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_bool(true).unwrap();
        writer.put_i32(5).unwrap(); // Only half a Point follows the presence flag.

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_item::<Point, _>(&PointSerializer), None);
        assert!(!reader.is_valid());
    }

    #[test]
    fn truncated_num_array_does_not_half_fill() {
        let mut stream = stream();

        let mut writer = ByteWriter::new(&mut stream);
        writer.put_bool(true).unwrap();
        writer.put_u16(10).unwrap(); // Claims ten elements...
        writer.put_i32(1).unwrap(); // ...delivers one.

        let mut reader = ByteReader::new(&stream);
        assert_eq!(reader.get_num_array::<i32>(), None);
        assert!(!reader.is_valid());
    }
}
