// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;

use crate::{ByteSink, Push, PushSink};

/// A sink that records every byte written to it, usable through both sink traits.
#[derive(Debug, Default)]
pub struct FakeSink {
    accepted: Vec<u8>,

    // Caps the bytes consumed per push, to force the caller through multiple push operations.
    max_push_size: Option<usize>,
}

impl FakeSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of bytes consumed by a single push.
    #[must_use]
    pub fn max_push_size(mut self, max: usize) -> Self {
        self.max_push_size = Some(max);
        self
    }

    /// Every byte accepted so far, in write order.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.accepted
    }
}

impl PushSink for FakeSink {
    fn push(&mut self, src: &[u8]) -> io::Result<Push> {
        let count = src.len().min(self.max_push_size.unwrap_or(usize::MAX));

        if count == 0 {
            return Ok(Push::Busy);
        }

        self.accepted.extend_from_slice(&src[..count]);
        Ok(Push::Bytes(count))
    }
}

impl ByteSink for FakeSink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.accepted.push(byte);
        Ok(())
    }
}

/// A [`PushSink`] that never accepts a byte.
#[derive(Debug, Default)]
pub struct Busy;

impl PushSink for Busy {
    fn push(&mut self, _src: &[u8]) -> io::Result<Push> {
        Ok(Push::Busy)
    }
}

/// A sink that discards everything written to it, counting the bytes.
#[derive(Debug, Default)]
pub struct Null {
    discarded: usize,
}

impl Null {
    /// Creates a sink that discards everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bytes discarded so far.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

impl PushSink for Null {
    fn push(&mut self, src: &[u8]) -> io::Result<Push> {
        if src.is_empty() {
            return Ok(Push::Busy);
        }

        self.discarded += src.len();
        Ok(Push::Bytes(src.len()))
    }
}

impl ByteSink for Null {
    fn write_byte(&mut self, _byte: u8) -> io::Result<()> {
        self.discarded += 1;
        Ok(())
    }
}
