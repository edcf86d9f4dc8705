//! Small numeric helpers shared across the crate and its tests.

use num_traits::Float;

/// Convert a decibel value to a linear amplitude: `10^(db / 20)`.
///
/// `from_db(0) == 1`, `from_db(20) == 10`, `from_db(-20) == 0.1`.
#[inline]
pub fn from_db<S: Float>(db: S) -> S {
    let ten = S::from(10.0).expect("10 representable in every float type");
    let twenty = S::from(20.0).expect("20 representable in every float type");
    ten.powf(db / twenty)
}

/// Element-wise absolute comparison of two sequences.
///
/// Returns false when the lengths differ or any pair is further apart than
/// `tolerance`.
pub fn all_close<S: Float>(actual: &[S], expected: &[S], tolerance: S) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected.iter())
            .all(|(&a, &e)| (a - e).abs() <= tolerance)
}
