//! Non-linear waveshapers for saturation modeling.
//!
//! A waveshaper maps each sample through a static transfer function; the
//! shape of the function sets the distortion character. These curves come
//! from the tube-modeling literature: `x` is the signal input and `k` a
//! saturation parameter that controls how hard the curve bends. All of them
//! pass through the origin, so silence stays silence.
//!
//! `asymmetrize` builds even-harmonic ("tube-like") variants by bending the
//! negative half of any curve differently from the positive half.

use crate::dsp::Audio;

/// Signum with `sgn(0) = 1`.
#[inline]
pub fn sgn<S: Audio>(x: S) -> S {
    if x >= S::zero() {
        S::one()
    } else {
        -S::one()
    }
}

/// Arraya cubic soft clip: `1.5 * x * (1 - x^2 / 3)`. Saturates at +/-1 for
/// inputs at +/-1; no saturation parameter.
#[inline]
pub fn arraya<S: Audio>(x: S) -> S {
    S::lit(1.5) * x * (S::one() - x * x / S::lit(3.0))
}

/// Logistic sigmoid recentred on the origin: `2 / (1 + e^(-k x)) - 1`.
#[inline]
pub fn sigmoid<S: Audio>(x: S, k: S) -> S {
    S::lit(2.0) / (S::one() + (-k * x).exp()) - S::one()
}

/// Parameter-free sigmoid normalised to unity gain at `x = 1`:
/// `((e + 1) / (e - 1)) * (e^x - 1) / (e^x + 1)`.
#[inline]
pub fn sigmoid2<S: Audio>(x: S) -> S {
    let e = S::E();
    let ex = x.exp();
    ((e + S::one()) / (e - S::one())) * (ex - S::one()) / (ex + S::one())
}

/// Hyperbolic-tangent saturation normalised so `x = 1` maps to 1:
/// `tanh(k x) / tanh(k)`. Asserts `k != 0`.
#[inline]
pub fn tanh_sat<S: Audio>(x: S, k: S) -> S {
    assert!(k != S::zero(), "tanh saturation needs k != 0");
    (k * x).tanh() / k.tanh()
}

/// Arctangent saturation normalised so `x = 1` maps to 1:
/// `atan(k x) / atan(k)`. Asserts `k != 0`.
#[inline]
pub fn atan_sat<S: Audio>(x: S, k: S) -> S {
    assert!(k != S::zero(), "arctangent saturation needs k != 0");
    (k * x).atan() / k.atan()
}

/// Exponential fuzz: `sgn(x) * (1 - e^|k x|) / (1 - e^(-k))`. Asserts
/// `k != 0`.
///
/// Note the magnitude in the numerator exponent; the textbook variant uses
/// `k * x` directly and stays bounded, this one grows for large drive.
#[inline]
pub fn fuzz_exp<S: Audio>(x: S, k: S) -> S {
    assert!(k != S::zero(), "exponential fuzz needs k != 0");
    sgn(x) * (S::one() - (k * x).abs().exp()) / (S::one() - (-k).exp())
}

/// Make a saturator asymmetric: the positive half keeps `f(x, k)`, the
/// negative half becomes `g * f(x, k / g)`. Asserts `g` in `(0, 1]`; at
/// `g = 1` the curve is unchanged.
pub fn asymmetrize<S, F>(func: F, g: S) -> impl Fn(S, S) -> S
where
    S: Audio,
    F: Fn(S, S) -> S,
{
    assert!(
        g > S::zero() && g <= S::one(),
        "asymmetry factor must lie in (0, 1]"
    );
    move |x: S, k: S| {
        if x >= S::zero() {
            func(x, k)
        } else {
            g * func(x, k / g)
        }
    }
}
