// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;

use crate::{Pull, PullSource};

/// A [`PullSource`] that serves a predefined byte sequence.
///
/// By default the source reports end-of-input once the sequence is exhausted; construct it with
/// [`pending_at_end()`][Self::pending_at_end] to instead behave like an idle-but-open channel.
#[derive(Debug)]
pub struct FakePull {
    data: Vec<u8>,
    cursor: usize,

    // Caps the bytes served per pull, to force the caller through multiple pull operations.
    max_pull_size: Option<usize>,

    exhausted: Pull,
}

impl FakePull {
    /// Creates a source that serves `data` and then reports end-of-input.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            cursor: 0,
            max_pull_size: None,
            exhausted: Pull::End,
        }
    }

    /// Creates a source that serves `data` and then reports no-data-right-now forever.
    #[must_use]
    pub fn pending_at_end(data: &[u8]) -> Self {
        Self {
            exhausted: Pull::Pending,
            ..Self::new(data)
        }
    }

    /// Caps the number of bytes served by a single pull.
    #[must_use]
    pub fn max_pull_size(mut self, max: usize) -> Self {
        self.max_pull_size = Some(max);
        self
    }
}

impl PullSource for FakePull {
    fn pull(&mut self, dst: &mut [u8]) -> io::Result<Pull> {
        let remaining = self.data.len() - self.cursor;

        let count = remaining
            .min(dst.len())
            .min(self.max_pull_size.unwrap_or(usize::MAX));

        if count == 0 {
            return Ok(self.exhausted);
        }

        dst[..count].copy_from_slice(&self.data[self.cursor..self.cursor + count]);
        self.cursor += count;

        Ok(Pull::Bytes(count))
    }
}

/// A [`PullSource`] that never has data and never ends.
#[derive(Debug, Default)]
pub struct Pending;

impl PullSource for Pending {
    fn pull(&mut self, _dst: &mut [u8]) -> io::Result<Pull> {
        Ok(Pull::Pending)
    }
}
