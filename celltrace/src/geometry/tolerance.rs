// Centralized tolerances and helpers for robust geometry

pub const EPS_POS: f64 = 1e-9;            // point coincidence threshold
pub const EPS_LEN: f64 = 1e-12;           // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-12;         // denominator guard for ratios
pub const EPS_CROSS: f64 = 1e-12;         // collinearity slack for turn tests
pub const EPS_AREA: f64 = 1e-9;           // area comparison slack (tests/invariants)

#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }

#[inline]
pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= EPS_DENOM { fallback } else { num / den }
}
