//! pixkit-test - Regression test framework for pixkit
//!
//! Provides [`RegParams`], a small checker that numbers each comparison,
//! keeps going after a failure and reports all failures at the end, plus
//! synthetic fixture images shared by the regression tests.
//!
//! # Usage
//!
//! ```ignore
//! use pixkit_test::RegParams;
//!
//! let mut rp = RegParams::new("compositor");
//! rp.compare_values(3.0, planes.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"
//! - `RUST_LOG`: log filter used by [`init_tracing`]

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Install a test log subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
