//! Process-wide tracing setup shared by binaries and tests.

pub mod subscriber;

pub use subscriber::{LogFormat, init, init_with};
