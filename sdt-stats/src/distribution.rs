//! The probit transform.
//!
//! [`probit`] is the standard-normal inverse CDF used by the sensitivity and
//! criterion indices.

use core::f64::consts::SQRT_2;

use statrs::function::erf::erfc_inv;

// ── Probit ─────────────────────────────────────────────────────────────────

/// Standard-normal inverse CDF, Φ⁻¹(p).
///
/// Returns `-inf` at `p == 0`, `+inf` at `p == 1`, and `NaN` outside
/// `[0, 1]`. Interior values go through `erfc_inv`, which keeps full
/// precision in the lower tail.
pub fn probit(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    -SQRT_2 * erfc_inv(2.0 * p)
}

// ── Tests ──────────────────────────────────────────────────────────────────
