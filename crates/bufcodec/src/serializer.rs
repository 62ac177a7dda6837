// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use bufstream::StreamError;

use crate::{ByteReader, ByteWriter};

/// A pluggable capability for moving values of `T` through the codec.
///
/// The codec treats the payload as opaque: [`ByteWriter::put_item()`] frames the value with a
/// presence flag and hands the writer to [`write()`][Self::write]; decoding mirrors this. The
/// serializer is free to call any writer/reader method, including `put_item`/`get_item` with
/// another serializer (or itself), so object graphs compose recursively.
///
/// The internal format produced by a serializer is its own contract; only the framing around it
/// belongs to this crate.
pub trait Serializer<T> {
    /// Writes `item` to the writer.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying stream fails to expand.
    fn write(&self, writer: &mut ByteWriter<'_>, item: &T) -> Result<(), StreamError>;

    /// Reads a value back from the reader.
    ///
    /// Returning `None` without consuming the expected bytes leaves the reader mid-payload;
    /// serializers should instead read eagerly and let truncation surface through the reader's
    /// validity state, which [`get_item()`][crate::ByteReader::get_item] checks after this
    /// returns.
    fn read(&self, reader: &mut ByteReader<'_>) -> Option<T>;
}
