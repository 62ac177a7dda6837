// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A fixed-width, null-safe binary codec over buffer streams.
//!
//! [`ByteWriter`] and [`ByteReader`] turn a [`bufstream::BufferStream`] into a typed wire
//! format for structured data exchange:
//!
//! * **Fixed-width primitives** - booleans are one byte; integers and IEEE-754 floats are
//!   written in the stream's byte order, with float payloads (NaN bits, signed zeros,
//!   infinities) preserved exactly.
//! * **Null safety** - every nullable value is framed by a one-byte presence flag, so absent
//!   values cost one byte and decode back to `None`.
//! * **Sequences** - a presence flag plus an unsigned 16-bit element count (0-65535) frames
//!   arrays and strings; longer sequences are a caller error, rejected loudly.
//! * **Open composition** - enums travel as ordinals via [`Enumerated`], and arbitrary values
//!   travel through a caller-supplied [`Serializer`], which may recurse into the codec for
//!   nested object graphs.
//!
//! Writers never fail for lack of space - they expand the stream first. Readers decode a frozen
//! snapshot of the stream and absorb truncation into a sticky invalid state with sentinel
//! returns (`0`, `false`, `None`) instead of erroring per field: decoding short input off the
//! network is an expected outcome, checked once per message via
//! [`is_valid()`][ByteReader::is_valid].
//!
//! ```
//! use std::sync::Arc;
//!
//! use bufcodec::{ByteReader, ByteWriter};
//! use bufpool::BinaryPool;
//! use bufstream::BufferStream;
//!
//! let mut stream = BufferStream::new(Arc::new(BinaryPool::new(8, 14)))?;
//!
//! let mut writer = ByteWriter::new(&mut stream);
//! writer.put_u16(7)?;
//! writer.put_str(Some("payload"))?;
//! writer.put_num_array::<i32>(Some(&[10, 20, 30]))?;
//!
//! let mut reader = ByteReader::new(&stream);
//! assert_eq!(reader.get_u16(), 7);
//! assert_eq!(reader.get_str().as_deref(), Some("payload"));
//! assert_eq!(reader.get_num_array::<i32>(), Some(vec![10, 20, 30]));
//! assert!(reader.is_valid());
//! # Ok::<(), bufstream::StreamError>(())
//! ```

mod enumerated;
mod reader;
mod serializer;
mod writer;

pub use enumerated::Enumerated;
pub use reader::{ByteReader, ReaderState};
pub use serializer::Serializer;
pub use writer::{ByteWriter, MAX_SEQUENCE_LEN};
