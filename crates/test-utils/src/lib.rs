//! Test support for the AREA decoder crates: a synthetic file builder,
//! fixture values, sample-file lookup and float assertions.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Install a fmt subscriber once per test binary.
///
/// Honours `RUST_LOG`; defaults to `debug` for the AREA crates so decoder
/// logs show up with `cargo test -- --nocapture`.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("area_parser=debug,area_common=debug"));

    // A second call in the same binary fails harmlessly.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Resolve a real AREA file by name, or return early from the test.
///
/// Sample composites are not checked in; see [`find_test_file`] for where
/// they are looked up.
///
/// ```ignore
/// let path = test_utils::require_test_file!("AREA0001");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("skipping: AREA sample '{}' not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert two values are within `epsilon` of each other, as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        assert!(
            diff <= epsilon,
            "assertion failed: {} ≈ {} (diff {} > {})",
            left,
            right,
            diff,
            epsilon
        );
    }};
}

/// [`assert_approx_eq!`] on both members of an `(x, y)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_coords_approx_eq_passes() {
        assert_coords_approx_eq!((1.0001, 2.0001), (1.0, 2.0), 0.001);
    }

    #[test]
    fn test_init_tracing_twice() {
        super::init_test_tracing();
        super::init_test_tracing();
    }
}
