// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Fake sources and sinks for testing code that drains or fills buffer streams.
//!
//! These are for test and example purposes only and are not optimized for performance.

mod fake_pull;
mod fake_sink;
mod fake_source;

pub use fake_pull::{FakePull, Pending};
pub use fake_sink::{Busy, FakeSink, Null};
pub use fake_source::FakeByteSource;
