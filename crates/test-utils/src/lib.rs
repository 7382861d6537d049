//! Shared test utilities for the gridded atmosphere workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic 4D grid generators and binary file writers
//! - PNG writers for procedural map tests
//! - Temporary config directory fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures::ConfigFixture};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of 3-vectors given as `(x, y, z)`.
#[macro_export]
macro_rules! assert_vec3_approx_eq {
    ($v:expr, ($x:expr, $y:expr, $z:expr), $epsilon:expr) => {{
        let v = $v;
        $crate::assert_approx_eq!(v[0], $x, $epsilon);
        $crate::assert_approx_eq!(v[1], $y, $epsilon);
        $crate::assert_approx_eq!(v[2], $z, $epsilon);
    }};
}
