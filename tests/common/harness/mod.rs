//! Test harness for integration tests.
//!
//! Provides isolated journal folders, programmatic day creation,
//! and CLI assertion helpers using `assert_cmd`.

mod command;
mod day;
mod env;

// Re-export main types for external use
#[allow(unused_imports)]
pub use command::ChronicleCommand;
#[allow(unused_imports)]
pub use day::TestDay;
#[allow(unused_imports)]
pub use env::TestEnv;
