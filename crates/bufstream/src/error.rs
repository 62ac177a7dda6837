// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;

use bufpool::AllocError;
use thiserror::Error;

/// An error raised while draining into or filling from a buffer stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// The stream needed to grow and the system could not supply the memory.
    ///
    /// The stream itself is left in a well-defined state: either fully expanded or exactly as
    /// it was before the operation.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// The external source or sink reported an I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A raw byte-range drain or fill named an offset outside the given region.
    #[error("offset {offset} is out of bounds for a {len}-byte region")]
    OutOfRange {
        /// The requested start offset.
        offset: usize,
        /// The length of the region the offset was applied to.
        len: usize,
    },
}

/// A `Result` that may contain a [`StreamError`].
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(StreamError: Send, Sync);

    #[test]
    fn alloc_errors_convert() {
        let e = StreamError::from(AllocError { size: 64 });

        assert!(matches!(e, StreamError::Alloc(AllocError { size: 64 })));
    }
}
