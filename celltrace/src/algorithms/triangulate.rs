//! Cell triangulation: a fan for convex cells, ear clipping otherwise.

use serde::{Deserialize, Serialize};

use crate::algorithms::cell::Cell;
use crate::cluster::Cluster;
use crate::geometry::polygon::{point_in_triangle, signed_area, triangle_area};
use crate::geometry::tolerance::{EPS_AREA, EPS_CROSS, EPS_POS};
use crate::model::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangulationResult {
    #[default]
    Unknown,
    Success,
    InvalidCell,
    TooFewPoints,
    UnsupportedAspect,
    InvalidCluster,
}

/// Three vertex (point) indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub vtx: [usize; 3],
}

impl Triangle {
    #[inline]
    pub fn new(a: usize, b: usize, c: usize) -> Triangle {
        Triangle { vtx: [a, b, c] }
    }

    /// Reorders the vertices counter-clockwise in projected space.
    pub fn fix_winding(&mut self, projected: &[Vec2]) {
        let [a, b, c] = self.vtx;
        if (projected[b] - projected[a]).cross(projected[c] - projected[a]) < 0.0 {
            self.vtx = [a, c, b];
        }
    }

    pub fn area(&self, projected: &[Vec2]) -> f64 {
        let [a, b, c] = self.vtx;
        triangle_area(projected[a], projected[b], projected[c])
    }
}

impl Cell {
    /// Triangulates a successfully built cell, appending to `out`.
    pub fn triangulate(&self, projected: &[Vec2], out: &mut Vec<Triangle>) -> TriangulationResult {
        self.triangulate_with(projected, out, None)
    }

    /// Same as [`Cell::triangulate`], and marks every emitted vertex used in
    /// `cluster`.
    pub fn triangulate_marked(
        &self,
        projected: &[Vec2],
        out: &mut Vec<Triangle>,
        cluster: Option<&Cluster>,
    ) -> TriangulationResult {
        let Some(cluster) = cluster else {
            return TriangulationResult::InvalidCluster;
        };
        self.triangulate_with(projected, out, Some(cluster))
    }

    fn triangulate_with(
        &self,
        projected: &[Vec2],
        out: &mut Vec<Triangle>,
        mark: Option<&Cluster>,
    ) -> TriangulationResult {
        if !self.built_successfully() {
            return TriangulationResult::InvalidCell;
        }
        if self.nodes.len() < 3 {
            return TriangulationResult::TooFewPoints;
        }
        if self.is_convex || self.nodes.len() == 3 {
            self.fan(projected, out, mark)
        } else {
            self.ear_clipping(projected, out, mark)
        }
    }

    pub fn triangulate_fan(&self, projected: &[Vec2], out: &mut Vec<Triangle>) -> TriangulationResult {
        self.fan(projected, out, None)
    }

    pub fn triangulate_ear_clipping(&self, projected: &[Vec2], out: &mut Vec<Triangle>) -> TriangulationResult {
        self.ear_clipping(projected, out, None)
    }

    fn fan(&self, projected: &[Vec2], out: &mut Vec<Triangle>, mark: Option<&Cluster>) -> TriangulationResult {
        if !self.built_successfully() {
            return TriangulationResult::InvalidCell;
        }
        if !self.is_convex && self.nodes.len() != 3 {
            return TriangulationResult::UnsupportedAspect;
        }
        if self.nodes.len() < 3 {
            return TriangulationResult::TooFewPoints;
        }
        if !self.nodes.iter().all(|&n| n < projected.len()) {
            return TriangulationResult::InvalidCell;
        }
        let n0 = self.nodes[0];
        for w in self.nodes[1..].windows(2) {
            emit(Triangle::new(n0, w[0], w[1]), projected, out, mark);
        }
        TriangulationResult::Success
    }

    fn ear_clipping(&self, projected: &[Vec2], out: &mut Vec<Triangle>, mark: Option<&Cluster>) -> TriangulationResult {
        if !self.built_successfully() {
            return TriangulationResult::InvalidCell;
        }
        if self.nodes.len() < 3 {
            return TriangulationResult::TooFewPoints;
        }
        if !self.nodes.iter().all(|&n| n < projected.len()) {
            return TriangulationResult::InvalidCell;
        }

        let pts: Vec<Vec2> = self.nodes.iter().map(|&n| projected[n]).collect();
        let area = signed_area(&pts);
        let orient = if area > EPS_AREA {
            1.0
        } else if area < -EPS_AREA {
            -1.0
        } else {
            0.0
        };

        let mut queue: Vec<usize> = (0..pts.len()).collect();
        let mut start = 0;
        let mut emitted = Vec::with_capacity(pts.len() - 2);
        while queue.len() > 2 {
            let found = find_ear(&queue, &pts, orient, start, false)
                .or_else(|| find_ear(&queue, &pts, orient, start, true));
            let Some(k) = found else {
                return TriangulationResult::InvalidCell;
            };
            let m = queue.len();
            let (a, b, c) = (queue[(k + m - 1) % m], queue[k], queue[(k + 1) % m]);
            emitted.push(Triangle::new(self.nodes[a], self.nodes[b], self.nodes[c]));
            queue.remove(k);
            start = k % queue.len();
        }

        // Only commit once the whole cell went through.
        for t in emitted {
            emit(t, projected, out, mark);
        }
        TriangulationResult::Success
    }
}

fn emit(mut t: Triangle, projected: &[Vec2], out: &mut Vec<Triangle>, mark: Option<&Cluster>) {
    t.fix_winding(projected);
    if let Some(cluster) = mark {
        for v in t.vtx {
            cluster.mark_used(v);
        }
    }
    out.push(t);
}

/// Queue position of the next ear from `start` on.
///
/// A regular ear has a corner turning with the polygon and no other queue
/// vertex inside it. The `degenerate` pass takes any flat corner instead;
/// clipping it removes no area.
fn find_ear(queue: &[usize], pts: &[Vec2], orient: f64, start: usize, degenerate: bool) -> Option<usize> {
    let m = queue.len();
    for i in 0..m {
        let k = (start + i) % m;
        let (ia, ib, ic) = (queue[(k + m - 1) % m], queue[k], queue[(k + 1) % m]);
        let (a, b, c) = (pts[ia], pts[ib], pts[ic]);
        let turn = (b - a).cross(c - b);

        if degenerate {
            if turn.abs() <= EPS_CROSS {
                return Some(k);
            }
            continue;
        }
        if turn * orient <= EPS_CROSS {
            continue;
        }

        let minx = a.x.min(b.x).min(c.x);
        let maxx = a.x.max(b.x).max(c.x);
        let miny = a.y.min(b.y).min(c.y);
        let maxy = a.y.max(b.y).max(c.y);
        let blocked = queue.iter().any(|&j| {
            if j == ia || j == ib || j == ic {
                return false;
            }
            let p = pts[j];
            let eps2 = EPS_POS * EPS_POS;
            if p.dist_sq(a) <= eps2 || p.dist_sq(b) <= eps2 || p.dist_sq(c) <= eps2 {
                return false;
            }
            if p.x < minx || p.x > maxx || p.y < miny || p.y > maxy {
                return false;
            }
            point_in_triangle(p, a, b, c)
        });
        if !blocked {
            return Some(k);
        }
    }
    None
}
