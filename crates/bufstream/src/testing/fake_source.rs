// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;

use crate::ByteSource;

/// A [`ByteSource`] that serves a predefined byte sequence.
///
/// The ready hint reports everything not yet read; disable it with
/// [`without_hint()`][Self::without_hint] to force callers down the blocking single-byte path.
#[derive(Debug)]
pub struct FakeByteSource {
    data: Vec<u8>,
    cursor: usize,
    with_hint: bool,
}

impl FakeByteSource {
    /// Creates a source that serves `data`, with the ready hint enabled.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            cursor: 0,
            with_hint: true,
        }
    }

    /// Disables the ready hint, so every read is taken through the blocking path.
    #[must_use]
    pub fn without_hint(mut self) -> Self {
        self.with_hint = false;
        self
    }

    /// The number of bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }
}

impl ByteSource for FakeByteSource {
    fn bytes_ready(&mut self) -> io::Result<usize> {
        if self.with_hint { Ok(self.remaining()) } else { Ok(0) }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.data.get(self.cursor) {
            Some(byte) => {
                self.cursor += 1;
                Ok(Some(*byte))
            }
            None => Ok(None),
        }
    }
}
