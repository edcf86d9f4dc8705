//! First-order IIR sections designed from analog prototypes.
//!
//! The section implements the difference equation
//!
//! ```text
//! y[n] = dry * x[n] + wet * (a0 * x[n] + a1 * x[n-1] - b1 * y[n-1])
//! ```
//!
//! with a dry/wet mix so the same structure serves plain lowpass/highpass
//! filters (dry = 0, wet = 1) and shelving equalisers (dry = 1, wet scaled
//! by the shelf gain). Coefficients come from the bilinear transform of
//! first-order analog prototypes, with frequency warping folded in:
//!
//! ```text
//! theta_c = 2 * pi * fc / fs
//! gamma   = cos(theta_c) / (1 + sin(theta_c))        (lowpass/highpass)
//! ```
//!
//! Shelving designs replace gamma with a gain-dependent variant through
//! `mu = 10^(gain_dB / 20)`. At the Nyquist and DC extremes the formulas
//! degenerate to the exact coefficient sets the tests pin down.

use crate::dsp::{Audio, Filter};
use crate::util::from_db;

/// Response type of a designed section. Consumers that care about placement
/// (the tube pre-amp's EQ sandwich) validate this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstOrderKind {
    Lowpass,
    Highpass,
    LowShelf,
    HighShelf,
}

/// First-order section with a dry/wet mix and a response-type tag.
#[derive(Debug, Clone)]
pub struct FirstOrderFilter<S: Audio> {
    pub dry: S,
    pub wet: S,
    pub a0: S,
    pub a1: S,
    pub b1: S,
    kind: FirstOrderKind,
    x_prev: S,
    y_prev: S,
}

impl<S: Audio> FirstOrderFilter<S> {
    /// Construct from raw coefficients. Prefer the designer constructors
    /// below unless you have coefficients from elsewhere.
    pub fn from_coeffs(dry: S, wet: S, a0: S, a1: S, b1: S, kind: FirstOrderKind) -> Self {
        Self {
            dry,
            wet,
            a0,
            a1,
            b1,
            kind,
            x_prev: S::zero(),
            y_prev: S::zero(),
        }
    }

    /// First-order lowpass at `cutoff_freq` for rate `sample_freq`.
    pub fn lowpass(cutoff_freq: S, sample_freq: S) -> Self {
        let gamma = warp_gamma(cutoff_freq, sample_freq);
        let a0 = S::lit(0.5) * (S::one() - gamma);
        Self::from_coeffs(S::zero(), S::one(), a0, a0, -gamma, FirstOrderKind::Lowpass)
    }

    /// First-order highpass at `cutoff_freq` for rate `sample_freq`.
    pub fn highpass(cutoff_freq: S, sample_freq: S) -> Self {
        let gamma = warp_gamma(cutoff_freq, sample_freq);
        let a0 = S::lit(0.5) * (S::one() + gamma);
        Self::from_coeffs(
            S::zero(),
            S::one(),
            a0,
            -a0,
            -gamma,
            FirstOrderKind::Highpass,
        )
    }

    /// First-order low shelf with `gain_db` of boost or cut below
    /// `cutoff_freq`.
    pub fn low_shelf(cutoff_freq: S, sample_freq: S, gain_db: S) -> Self {
        let mu = from_db(gain_db);
        let beta = S::lit(4.0) / (S::one() + mu);
        let gamma = shelf_gamma(cutoff_freq, sample_freq, beta);
        let a0 = S::lit(0.5) * (S::one() - gamma);
        Self::from_coeffs(
            S::one(),
            mu - S::one(),
            a0,
            a0,
            -gamma,
            FirstOrderKind::LowShelf,
        )
    }

    /// First-order high shelf with `gain_db` of boost or cut above
    /// `cutoff_freq`.
    pub fn high_shelf(cutoff_freq: S, sample_freq: S, gain_db: S) -> Self {
        let mu = from_db(gain_db);
        let beta = S::lit(0.25) * (S::one() + mu);
        let gamma = shelf_gamma(cutoff_freq, sample_freq, beta);
        let a0 = S::lit(0.5) * (S::one() + gamma);
        Self::from_coeffs(
            S::one(),
            mu - S::one(),
            a0,
            -a0,
            -gamma,
            FirstOrderKind::HighShelf,
        )
    }

    pub fn kind(&self) -> FirstOrderKind {
        self.kind
    }
}

impl<S: Audio> Filter<S> for FirstOrderFilter<S> {
    #[inline]
    fn advance(&mut self, input: S) -> S {
        let wet_term = self.a0 * input + self.a1 * self.x_prev - self.b1 * self.y_prev;
        let output = self.dry * input + self.wet * wet_term;
        self.x_prev = input;
        self.y_prev = output;
        output
    }
}

/// Bilinear-transform warping for lowpass/highpass prototypes.
fn warp_gamma<S: Audio>(cutoff_freq: S, sample_freq: S) -> S {
    let theta_c = S::lit(2.0) * S::PI() * cutoff_freq / sample_freq;
    theta_c.cos() / (S::one() + theta_c.sin())
}

/// Gain-dependent warping for shelving prototypes.
fn shelf_gamma<S: Audio>(cutoff_freq: S, sample_freq: S, beta: S) -> S {
    let theta_c = S::lit(2.0) * S::PI() * cutoff_freq / sample_freq;
    let delta = beta * (S::lit(0.5) * theta_c).tan();
    (S::one() - delta) / (S::one() + delta)
}
