//! Shared test utilities for the star catalog workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Approximate float assertions
//! - Synthetic UCAC4 zone files and zone indexes
//! - Sample catalog lines for the text formats
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
//! use test_utils::{assert_approx_eq, fixtures, SyntheticZone};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
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
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of (RA, Dec) pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_sky_approx_eq;
///
/// assert_sky_approx_eq!((10.0001, -20.0001), (10.0, -20.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_sky_approx_eq {
    (($ra1:expr, $dec1:expr), ($ra2:expr, $dec2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($ra1, $ra2, $epsilon);
        $crate::assert_approx_eq!($dec1, $dec2, $epsilon);
    }};
}
