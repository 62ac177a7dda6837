// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use parking_lot::Mutex;

use crate::Buffer;

/// A LIFO store of cached buffers that all share one capacity (or capacity formula).
///
/// Each size class of a pooling factory is one stack. Returning the most recently freed buffer
/// first keeps the hot buffer's memory warm in cache.
///
/// The stack is internally synchronized; each pool bucket carries its own lock so that traffic
/// on one size class does not contend with another.
#[derive(Default)]
pub struct BufferStack {
    buffers: Mutex<Vec<Buffer>>,
}

impl BufferStack {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Pushes a buffer onto the stack.
    pub fn push(&self, buffer: Buffer) {
        self.buffers.lock().push(buffer);
    }

    /// Pops the most recently pushed buffer, if any.
    #[must_use]
    pub fn pop(&self) -> Option<Buffer> {
        self.buffers.lock().pop()
    }

    /// Removes and returns every buffer on the stack, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Buffer> {
        std::mem::take(&mut *self.buffers.lock())
    }

    /// The number of buffers currently on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Whether the stack holds no buffers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.lock().is_empty()
    }
}

impl fmt::Debug for BufferStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferStack").field("len", &self.len()).finish()
    }
}
