//! Scalar abstraction for the filter primitives.
//!
//! Delay lines and combs are plain linear arithmetic, so they work equally
//! well on real and complex samples (the complex path is useful for
//! analytic-signal processing). The frequency-domain engine, the filter
//! designers, and the non-linear stages need a real floating-point scalar.
//! [`Sample`] captures the former, [`Audio`] the latter.

use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use num_complex::Complex;
use num_traits::{Float, FloatConst, NumAssign, Zero};
use rustfft::FftNum;

/// A scalar that can flow through a delay line: real or complex.
pub trait Sample:
    Copy
    + Default
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
{
    /// The real field underlying the scalar (`Self` for real types).
    type Real: Float + FloatConst + NumAssign + Debug + Send + Sync + 'static;

    /// Embed a real value (real part for complex types).
    fn from_real(value: Self::Real) -> Self;

    /// Widen an `f64` constant into the real field. Coefficient tables and
    /// designer formulas are stated in `f64` and narrowed here.
    fn real_from_f64(value: f64) -> Self::Real;

    /// Magnitude, used by the stability preconditions (`|a| < 1`).
    fn modulus(self) -> Self::Real;

    /// Scale by a real factor (fractional-delay interpolation weights).
    fn scale(self, factor: Self::Real) -> Self;
}

macro_rules! impl_real_sample {
    ($t:ty) => {
        impl Sample for $t {
            type Real = $t;

            #[inline]
            fn from_real(value: Self::Real) -> Self {
                value
            }

            #[inline]
            fn real_from_f64(value: f64) -> Self::Real {
                value as $t
            }

            #[inline]
            fn modulus(self) -> Self::Real {
                self.abs()
            }

            #[inline]
            fn scale(self, factor: Self::Real) -> Self {
                self * factor
            }
        }
    };
}

impl_real_sample!(f32);
impl_real_sample!(f64);

macro_rules! impl_complex_sample {
    ($t:ty) => {
        impl Sample for Complex<$t> {
            type Real = $t;

            #[inline]
            fn from_real(value: Self::Real) -> Self {
                Complex::new(value, 0.0)
            }

            #[inline]
            fn real_from_f64(value: f64) -> Self::Real {
                value as $t
            }

            #[inline]
            fn modulus(self) -> Self::Real {
                self.norm()
            }

            #[inline]
            fn scale(self, factor: Self::Real) -> Self {
                self * factor
            }
        }
    };
}

impl_complex_sample!(f32);
impl_complex_sample!(f64);

/// A real floating-point sample: the scalar type of the frequency-domain
/// engine, the graph composers, and the effects. Monomorphises to `f32` or
/// `f64`.
pub trait Audio:
    Sample<Real = Self> + Float + FloatConst + NumAssign + FftNum + Sum<Self>
{
    /// Narrow an `f64` constant into this type.
    #[inline]
    fn lit(value: f64) -> Self {
        Self::real_from_f64(value)
    }
}

impl<T> Audio for T where
    T: Sample<Real = T> + Float + FloatConst + NumAssign + FftNum + Sum<T>
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_matches_abs_and_norm() {
        assert_eq!((-2.0f64).modulus(), 2.0);
        let z = Complex::new(3.0f64, 4.0);
        assert!((z.modulus() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn scale_weights_complex_samples() {
        let z = Complex::new(1.0f32, -2.0).scale(0.5);
        assert_eq!(z, Complex::new(0.5, -1.0));
    }
}
