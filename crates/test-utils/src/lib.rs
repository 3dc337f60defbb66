//! Shared test utilities for the AREA conversion workspace.
//!
//! Synthetic AREA files and navigation blocks, projection and coefficient
//! fixtures, float assertions, and a skip macro for tests that want a real
//! AREA file.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a real AREA file through [`find_test_file`], or end the calling
/// test early with a note on stderr.
///
/// ```ignore
/// let path = test_utils::require_test_file!("goes_sample.area");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("skipping: {} not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon`, comparing as `f64`. Two NaNs are
/// equal; a single NaN never is.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let both_nan = left.is_nan() && right.is_nan();
        if !both_nan && !((left - right).abs() <= epsilon) {
            panic!(
                "assertion failed: {} vs {} differ by {} (epsilon {})",
                left,
                right,
                (left - right).abs(),
                epsilon
            );
        }
    }};
}

/// [`assert_approx_eq!`] on both members of a `(line, elem)` or
/// `(lat, lon)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($a1:expr, $b1:expr), ($a2:expr, $b2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($a1, $a2, $epsilon);
        $crate::assert_approx_eq!($b1, $b2, $epsilon);
    }};
}
