use std::f64::consts::TAU;

use super::tolerance::EPS_CROSS;
use crate::model::{Vec2, Vec3};

/// Squared distance from `p` to segment `ab`, and the clamped parameter along it.
pub fn seg_distance_sq(p: Vec3, a: Vec3, b: Vec3) -> (f64, f64) {
    let v = b - a;
    let w = p - a;
    let vv = v.dot(v);
    let mut t = if vv > 0.0 { w.dot(v) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let proj = a + v * t;
    (p.dist_sq(proj), t)
}

/// Angle in `[0, 2π)` turning `a` onto `b` counter-clockwise.
///
/// Candidates are ranked by this positive angle alone; there is no signed
/// comparison, so the walk keeps turning the same way whatever the winding.
#[inline]
pub fn radians_between(a: Vec2, b: Vec2) -> f64 {
    let r = a.cross(b).atan2(a.dot(b));
    if r < 0.0 { r + TAU } else { r }
}

/// Running convexity check over consecutive turns `a -> b -> c`.
///
/// `sign` remembers the first non-degenerate turn direction; a later turn
/// with the opposite direction, or a backtrack (`a == c`), flips
/// `is_convex` to false for good.
pub fn check_convex(a: Vec2, b: Vec2, c: Vec2, is_convex: &mut bool, sign: &mut i32) {
    if !*is_convex {
        return;
    }
    if a == c {
        *is_convex = false;
        return;
    }
    let turn = (b - a).cross(c - b);
    let current = if turn > EPS_CROSS { 1 } else if turn < -EPS_CROSS { -1 } else { 0 };
    if current == 0 {
        return;
    }
    if *sign == 0 {
        *sign = current;
    } else if *sign != current {
        *is_convex = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn positive_angle_range() {
        let east = Vec2::new(1.0, 0.0);
        let north = Vec2::new(0.0, 1.0);
        assert!((radians_between(east, north) - FRAC_PI_2).abs() < 1e-12);
        assert!((radians_between(north, east) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((radians_between(east, Vec2::new(-1.0, 0.0)) - PI).abs() < 1e-12);
        assert_eq!(radians_between(east, east), 0.0);
    }

    #[test]
    fn convexity_tracks_sign_flip() {
        let mut convex = true;
        let mut sign = 0;
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
        ];
        check_convex(pts[0], pts[1], pts[2], &mut convex, &mut sign);
        check_convex(pts[1], pts[2], pts[3], &mut convex, &mut sign);
        assert!(convex);
        assert_eq!(sign, 1);
        check_convex(pts[2], pts[3], pts[4], &mut convex, &mut sign);
        assert!(!convex, "right turn after left turns is concave");
    }

    #[test]
    fn backtrack_is_not_convex() {
        let mut convex = true;
        let mut sign = 0;
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        check_convex(a, b, a, &mut convex, &mut sign);
        assert!(!convex);
    }

    #[test]
    fn segment_distance_clamps() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 0.0, 0.0);
        let (d2, t) = seg_distance_sq(Vec3::new(5.0, 3.0, 0.0), a, b);
        assert!((d2 - 9.0).abs() < 1e-12);
        assert!((t - 0.5).abs() < 1e-12);
        let (d2, t) = seg_distance_sq(Vec3::new(-4.0, 3.0, 0.0), a, b);
        assert!((d2 - 25.0).abs() < 1e-12);
        assert_eq!(t, 0.0);
    }
}
