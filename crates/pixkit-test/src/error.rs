//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building test fixtures
#[derive(Debug, Error)]
pub enum TestError {
    /// Fixture could not be allocated
    #[error("failed to build fixture '{name}': {source}")]
    Fixture {
        name: &'static str,
        #[source]
        source: pixkit_core::Error,
    },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
