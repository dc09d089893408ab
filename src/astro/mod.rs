//! # Astronomical arguments (SP 98)
//!
//! Pure functions that map a [`Timestamp`] to the astronomical quantities needed to
//! build tidal constituents, following *Manual of Harmonic Analysis and Prediction
//! of Tides* (Schureman, Special Publication 98, "SP 98").
//!
//! ## Overview
//!
//! - [`v_terms`] evaluates the five base angles of Table 1 plus a constant term,
//!   either as values or as rates (used for constituent speeds):
//!   `T` (hour angle of mean sun), `s` (moon's mean longitude), `h` (sun's mean
//!   longitude), `p` (lunar perigee), `p₁` (solar perigee), `c` (constant, 1°).
//! - [`midyear_terms`] evaluates `N` (longitude of the moon's ascending node), `p`
//!   and `p₁`, which drive the nodal corrections.
//! - [`NodeTerms`] derives the spherical-trigonometry chain of SP 98 Figure 1 from
//!   `N` and `p`: `I`, `ξ`, `ν`, `ν′`, `2ν″`, `P`, `Q`, `Qᵤ`, `Qₐ`, `R`, `Rₐ`.
//! - [`node_factor::NodeFactorFormula`] dispatches to the closed-form node factor formulas.
//!
//! ## Units & precision
//!
//! All angles are **degrees** and are **never normalized** here. The hour angle `T`
//! reaches ~2.8·10⁸ degrees at the start of year 4001, which still leaves four
//! good decimals in a double once multiplied by a constituent coefficient; the
//! tables only need two.
//!
//! ## Example
//!
//! ```rust
//! use tidegen::astro::{NodeTerms, v_terms, Derivative, S_INDEX};
//! use tidegen::time::{mid_of_year, start_of_year};
//!
//! let s = v_terms(start_of_year(1970), Derivative::Value)[S_INDEX];
//! let node = NodeTerms::at(mid_of_year(1970));
//! assert!(node.i > 18.0 && node.i < 29.0);
//! # let _ = s;
//! ```
pub mod node_factor;

use crate::constants::{Degree, Timestamp, LUNAR_INCLINATION, OBLIQUITY};
use crate::time::julian_centuries;

/// Number of V terms (`T, s, h, p, p₁, c`)
pub const NUM_V_TERMS: usize = 6;
/// Number of u terms (`ξ, ν, ν′, 2ν″, Q, R, Qᵤ`)
pub const NUM_U_TERMS: usize = 7;

pub const T_INDEX: usize = 0;
pub const S_INDEX: usize = 1;
pub const H_INDEX: usize = 2;
pub const P_INDEX: usize = 3;
pub const P1_INDEX: usize = 4;
pub const C_INDEX: usize = 5;

pub const XI_INDEX: usize = 0;
pub const NU_INDEX: usize = 1;
pub const NU_PRIME_INDEX: usize = 2;
pub const TWO_NU_SECOND_INDEX: usize = 3;
pub const Q_INDEX: usize = 4;
pub const R_INDEX: usize = 5;
pub const QU_INDEX: usize = 6;

const ARCSEC: f64 = 1.0 / 3600.0;

const V_COEFF0: [f64; NUM_V_TERMS] = [
    0.,
    270. + 26. / 60. + 14.72 * ARCSEC,
    279. + 41. / 60. + 48.04 * ARCSEC,
    334. + 19. / 60. + 40.87 * ARCSEC,
    281. + 13. / 60. + 15. * ARCSEC,
    1.,
];
const V_COEFF1: [f64; NUM_V_TERMS] = [
    36525. * 360.,
    1336. * 360. + 1108411.2 * ARCSEC,
    129602768.13 * ARCSEC,
    11. * 360. + 392515.94 * ARCSEC,
    6189.03 * ARCSEC,
    0.,
];
const V_COEFF2: [f64; NUM_V_TERMS] = [
    0.,
    9.09 * ARCSEC,
    1.089 * ARCSEC,
    -37.24 * ARCSEC,
    1.63 * ARCSEC,
    0.,
];
const V_COEFF3: [f64; NUM_V_TERMS] = [0., 0.0068 * ARCSEC, 0., -0.045 * ARCSEC, 0.012 * ARCSEC, 0.];

const N_INDEX: usize = 0;
const MID_P_INDEX: usize = 1;
const MID_P1_INDEX: usize = 2;

const MID_COEFF0: [f64; 3] = [
    259. + 10. / 60. + 57.12 * ARCSEC,
    334. + 19. / 60. + 40.87 * ARCSEC,
    281. + 13. / 60. + 15. * ARCSEC,
];
const MID_COEFF1: [f64; 3] = [
    -(5. * 360. + 482912.63 * ARCSEC),
    11. * 360. + 392515.94 * ARCSEC,
    6189.03 * ARCSEC,
];
const MID_COEFF2: [f64; 3] = [7.58 * ARCSEC, -37.24 * ARCSEC, 1.63 * ARCSEC];
const MID_COEFF3: [f64; 3] = [0.008 * ARCSEC, -0.045 * ARCSEC, 0.012 * ARCSEC];

/// Value or first time derivative of the Table 1 polynomials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivative {
    /// Angle in degrees
    Value,
    /// Rate in degrees per Julian century
    Rate,
}

pub(crate) fn sin_deg(x: Degree) -> f64 {
    x.to_radians().sin()
}

pub(crate) fn cos_deg(x: Degree) -> f64 {
    x.to_radians().cos()
}

fn tan_deg(x: Degree) -> f64 {
    x.to_radians().tan()
}

pub(crate) fn atan2_deg(y: f64, x: f64) -> Degree {
    y.atan2(x).to_degrees()
}

fn cubic<const K: usize>(
    t: Timestamp,
    derivative: Derivative,
    c0: &[f64; K],
    c1: &[f64; K],
    c2: &[f64; K],
    c3: &[f64; K],
) -> [f64; K] {
    let t1 = julian_centuries(t);
    let t2 = t1 * t1;
    std::array::from_fn(|k| match derivative {
        Derivative::Value => c0[k] + t1 * c1[k] + t2 * c2[k] + t2 * t1 * c3[k],
        Derivative::Rate => c1[k] + 2. * t1 * c2[k] + 3. * t2 * c3[k],
    })
}

/// Evaluate `[T, s, h, p, p₁, c]` at `t`.
///
/// Arguments
/// ---------
/// * `t`: instant of evaluation (start of year for arguments, speed epoch for rates)
/// * `derivative`: [`Derivative::Value`] for angles in degrees,
///   [`Derivative::Rate`] for speeds in degrees per Julian century
///
/// Return
/// ------
/// * the six terms, indexed by [`T_INDEX`] .. [`C_INDEX`]
pub fn v_terms(t: Timestamp, derivative: Derivative) -> [f64; NUM_V_TERMS] {
    cubic(t, derivative, &V_COEFF0, &V_COEFF1, &V_COEFF2, &V_COEFF3)
}

/// Longitudes used by the nodal corrections, evaluated at the middle of a year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidyearTerms {
    /// Longitude of the moon's ascending node
    pub n: Degree,
    /// Longitude of lunar perigee
    pub p: Degree,
    /// Longitude of solar perigee
    pub p1: Degree,
}

/// Evaluate `N`, `p` and `p₁` at `t`.
pub fn midyear_terms(t: Timestamp) -> MidyearTerms {
    let terms = cubic(
        t,
        Derivative::Value,
        &MID_COEFF0,
        &MID_COEFF1,
        &MID_COEFF2,
        &MID_COEFF3,
    );
    MidyearTerms {
        n: terms[N_INDEX],
        p: terms[MID_P_INDEX],
        p1: terms[MID_P1_INDEX],
    }
}

/// Spherical-trigonometry quantities of SP 98 Figure 1, derived from `N` and `p`.
///
/// Ranges: `I ∈ [ω−i, ω+i] ≈ [18.3°, 28.6°]`, `ν ∈ [−13.02°, 13.02°]`. Both ranges
/// keep sine and cosine positive, which is what allows the Pythagorean shortcuts
/// for `sin I` and `cos ν`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTerms {
    /// Inclination of the moon's orbit to the equator
    pub i: Degree,
    /// Longitude in the moon's orbit of the lunar intersection
    pub xi: Degree,
    /// Right ascension of the lunar intersection
    pub nu: Degree,
    /// ν′ (formula 224)
    pub nu_prime: Degree,
    /// 2ν″ (formula 232)
    pub two_nu_second: Degree,
    /// `P = p − ξ` (formula 191)
    pub big_p: Degree,
    /// Term in argument of M₁ (formula 203)
    pub q: Degree,
    /// `Qᵤ = P − Q` (formula 204)
    pub q_u: Degree,
    /// Amplitude term of M₁ (formula 197)
    pub q_a: f64,
    /// Term in argument of L₂ (formula 214)
    pub r: Degree,
    /// Amplitude term of L₂ (formula 213)
    pub r_a: f64,
}

impl NodeTerms {
    /// Derive the node quantities at instant `t` (normally the middle of a year).
    pub fn at(t: Timestamp) -> Self {
        let mid = midyear_terms(t);
        Self::from_longitudes(mid.n, mid.p)
    }

    /// Derive the node quantities from the node longitude `n` and lunar perigee `p`.
    pub fn from_longitudes(n: Degree, p: Degree) -> Self {
        let (sin_n, cos_n) = (sin_deg(n), cos_deg(n));

        // I = ω + i when the node is at the vernal equinox
        let cos_i = cos_deg(OBLIQUITY) * cos_deg(LUNAR_INCLINATION)
            - sin_deg(OBLIQUITY) * sin_deg(LUNAR_INCLINATION) * cos_n;
        let sin_i = (1. - cos_i * cos_i).sqrt();

        let sin_nu = sin_deg(LUNAR_INCLINATION) * sin_n / sin_i;
        let cos_nu = (1. - sin_nu * sin_nu).sqrt();

        // Ω is the unlabelled side of Figure 1, opposite ω
        let sin_omega = sin_deg(OBLIQUITY) * sin_n / sin_i;
        let cos_omega = cos_n * cos_nu + sin_n * sin_nu * cos_deg(OBLIQUITY);

        let xi = n - atan2_deg(sin_omega, cos_omega);
        let nu = sin_nu.asin().to_degrees();
        let i = cos_i.acos().to_degrees();

        let sin_2i = sin_deg(i * 2.);
        let nu_prime = atan2_deg(sin_2i * sin_nu, sin_2i * cos_nu + 0.3347);

        let sin2_i = sin_i * sin_i;
        let two_nu = nu * 2.;
        let two_nu_second = atan2_deg(
            sin2_i * sin_deg(two_nu),
            sin2_i * cos_deg(two_nu) + 0.0727,
        );

        let big_p = p - xi;
        let q = atan2_deg(0.483 * sin_deg(big_p), cos_deg(big_p));
        let q_u = big_p - q;
        let q_a = 1. / (2.31 + 1.435 * cos_deg(2. * big_p)).sqrt();

        let cot_half_i = 1. / tan_deg(i / 2.);
        let r = atan2_deg(
            sin_deg(2. * big_p),
            cot_half_i * cot_half_i / 6. - cos_deg(2. * big_p),
        );
        let tan2_half_i = tan_deg(i / 2.).powi(2);
        let r_a = 1.
            / (1. - 12. * tan2_half_i * cos_deg(2. * big_p) + 36. * tan2_half_i * tan2_half_i)
                .sqrt();

        NodeTerms {
            i,
            xi,
            nu,
            nu_prime,
            two_nu_second,
            big_p,
            q,
            q_u,
            q_a,
            r,
            r_a,
        }
    }

    /// The u-term vector `(ξ, ν, ν′, 2ν″, Q, R, Qᵤ)`.
    pub fn u_terms(&self) -> [f64; NUM_U_TERMS] {
        [
            self.xi,
            self.nu,
            self.nu_prime,
            self.two_nu_second,
            self.q,
            self.r,
            self.q_u,
        ]
    }
}
