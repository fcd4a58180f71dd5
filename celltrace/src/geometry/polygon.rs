//! Planar polygon measures and containment tests.
//!
//! Winding numbers use horizontal ray casting with signed crossings.

use std::f64::consts::PI;

use super::tolerance::safe_div;
use crate::model::{Vec2, Winding};

/// Area, orientation and shape quality of a closed polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PolygonInfo {
    /// Unsigned area.
    pub area: f64,
    pub perimeter: f64,
    pub is_clockwise: bool,
    /// `4π·area / perimeter²`; 1 for a circle, 0 for a degenerate polygon.
    pub compactness: f64,
}

impl PolygonInfo {
    pub fn new(poly: &[Vec2]) -> PolygonInfo {
        let signed = signed_area(poly);
        let perimeter = polygon_perimeter(poly);
        let area = signed.abs();
        PolygonInfo {
            area,
            perimeter,
            is_clockwise: signed < 0.0,
            compactness: safe_div(4.0 * PI * area, perimeter * perimeter, 0.0),
        }
    }

    #[inline]
    pub fn is_winded(&self, winding: Winding) -> bool {
        winding.matches(self.is_clockwise)
    }
}

/// Shoelace area; positive when counter-clockwise.
pub fn signed_area(poly: &[Vec2]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut a = 0.0;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        a += poly[i].cross(poly[j]);
    }
    0.5 * a
}

pub fn polygon_perimeter(poly: &[Vec2]) -> f64 {
    if poly.len() < 2 {
        return 0.0;
    }
    let mut len = 0.0;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        len += (poly[j] - poly[i]).length();
    }
    len
}

/// (minx, miny, maxx, maxy)
pub fn polygon_bbox(points: &[Vec2]) -> (f64, f64, f64, f64) {
    let mut minx = f64::INFINITY;
    let mut miny = f64::INFINITY;
    let mut maxx = f64::NEG_INFINITY;
    let mut maxy = f64::NEG_INFINITY;
    for p in points {
        if p.x < minx {
            minx = p.x;
        }
        if p.x > maxx {
            maxx = p.x;
        }
        if p.y < miny {
            miny = p.y;
        }
        if p.y > maxy {
            maxy = p.y;
        }
    }
    (minx, miny, maxx, maxy)
}

#[inline]
pub fn bbox_contains(b: (f64, f64, f64, f64), p: Vec2) -> bool {
    p.x >= b.0 && p.x <= b.2 && p.y >= b.1 && p.y <= b.3
}

/// Number of times `polygon` winds around `p`; positive when counter-clockwise.
pub fn winding_number(p: Vec2, polygon: &[Vec2]) -> i32 {
    if polygon.len() < 3 {
        return 0;
    }

    let mut winding = 0i32;
    let n = polygon.len();

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];

        if p1.y <= p.y {
            if p2.y > p.y && (p1 - p).cross(p2 - p) > 0.0 {
                // Upward crossing
                winding += 1;
            }
        } else if p2.y <= p.y && (p1 - p).cross(p2 - p) < 0.0 {
            // Downward crossing
            winding -= 1;
        }
    }

    winding
}

/// Non-zero rule containment.
#[inline]
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    winding_number(p, polygon) != 0
}

/// Inclusive test: points on an edge of `abc` count as inside.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).cross(p - a);
    let d2 = (c - b).cross(p - b);
    let d3 = (a - c).cross(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[inline]
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    0.5 * (b - a).cross(c - a).abs()
}
