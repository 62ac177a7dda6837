// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// The system could not supply the requested memory.
///
/// Allocation failure is reported as a value to the immediate caller; it never panics and never
/// disturbs the factory's cache accounting. Callers that cannot make progress without the buffer
/// decide for themselves whether to retry, shed load, or propagate.
#[derive(Debug, Error)]
#[error("cannot allocate a buffer of {size} bytes: out of memory")]
pub struct AllocError {
    /// The requested buffer size in bytes.
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(AllocError: Send, Sync);

    #[test]
    fn message_names_the_requested_size() {
        let e = AllocError { size: 4096 };

        assert!(e.to_string().contains("4096"));
    }
}
