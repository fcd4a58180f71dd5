//! Face tracing over the half-edges of a [`Cluster`].
//!
//! A trace starts from one directed edge and, at every vertex, leaves along
//! the link making the smallest positive angle with the incoming direction.
//! That keeps turning left, so the walk follows the boundary of the face on
//! the left of the seed half-edge until it comes back to the seed.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::algorithms::constraints::CellConstraints;
use crate::cluster::{Cluster, NodePicking};
use crate::geometry::math::{check_convex, radians_between};
use crate::geometry::polygon::PolygonInfo;
use crate::geometry::tolerance::approx_eq;
use crate::model::{h64, Aabb, Link, Vec2, Vec3};

/// Outcome of one trace. Everything but `Success` is an expected rejection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellResult {
    #[default]
    Unknown,
    Success,
    Duplicate,
    OpenCell,
    MalformedCluster,
    Leaf,
    WrongAspect,
    OutsidePerimeterLimit,
    OutsideSegmentsLimit,
    OutsidePointsLimit,
    OutsideBoundsLimit,
    OutsideCompactnessLimit,
    OutsideAreaLimit,
    Hole,
    WrapperCell,
}

impl CellResult {
    pub const ALL: [CellResult; 15] = [
        CellResult::Unknown,
        CellResult::Success,
        CellResult::Duplicate,
        CellResult::OpenCell,
        CellResult::MalformedCluster,
        CellResult::Leaf,
        CellResult::WrongAspect,
        CellResult::OutsidePerimeterLimit,
        CellResult::OutsideSegmentsLimit,
        CellResult::OutsidePointsLimit,
        CellResult::OutsideBoundsLimit,
        CellResult::OutsideCompactnessLimit,
        CellResult::OutsideAreaLimit,
        CellResult::Hole,
        CellResult::WrapperCell,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CellResult::Unknown => "unknown",
            CellResult::Success => "success",
            CellResult::Duplicate => "duplicate",
            CellResult::OpenCell => "open_cell",
            CellResult::MalformedCluster => "malformed_cluster",
            CellResult::Leaf => "leaf",
            CellResult::WrongAspect => "wrong_aspect",
            CellResult::OutsidePerimeterLimit => "outside_perimeter_limit",
            CellResult::OutsideSegmentsLimit => "outside_segments_limit",
            CellResult::OutsidePointsLimit => "outside_points_limit",
            CellResult::OutsideBoundsLimit => "outside_bounds_limit",
            CellResult::OutsideCompactnessLimit => "outside_compactness_limit",
            CellResult::OutsideAreaLimit => "outside_area_limit",
            CellResult::Hole => "hole",
            CellResult::WrapperCell => "wrapper_cell",
        }
    }
}

/// One traced face.
///
/// After a successful build `nodes` is closed implicitly (the last entry
/// connects back to the first), starts at its smallest index and follows the
/// configured winding. `polygon` holds the projected positions of `nodes`,
/// entry for entry.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Cell {
    pub nodes: Vec<usize>,
    pub seed: Link,
    pub centroid: Vec3,
    pub bounds: Aabb,
    pub perimeter: f64,
    /// Unscaled projected area.
    pub area: f64,
    pub compactness: f64,
    pub is_convex: bool,
    /// Winding of the walk as traced, before any reorientation.
    pub is_clockwise: bool,
    pub is_closed_loop: bool,
    pub polygon: Vec<Vec2>,
    #[serde(skip)]
    built_successfully: bool,
    #[serde(skip)]
    hash: OnceLock<u32>,
}

/// Start of the canonical rotation: the smallest entry, and among several
/// occurrences of it the one giving the lexicographically smallest sequence.
pub fn canonical_shift(nodes: &[usize]) -> usize {
    let n = nodes.len();
    let Some(&min) = nodes.iter().min() else {
        return 0;
    };
    let rotation = |s: usize| (0..n).map(move |k| nodes[(s + k) % n]);
    let mut best = 0;
    let mut found = false;
    for s in (0..n).filter(|&i| nodes[i] == min) {
        if !found || rotation(s).lt(rotation(best)) {
            best = s;
            found = true;
        }
    }
    best
}

/// Rotates `nodes` in place so it starts at its smallest entry.
pub fn canonicalize(nodes: &mut [usize]) {
    let shift = canonical_shift(nodes);
    nodes.rotate_left(shift);
}

/// FNV-1a over the little-endian `u32` node indices.
pub fn hash_nodes(nodes: &[usize]) -> u32 {
    let mut hash: u32 = 0x811C9DC5;
    for n in nodes {
        for b in (*n as u32).to_le_bytes() {
            hash ^= b as u32;
            hash = hash.wrapping_mul(0x0100_0193);
        }
    }
    hash
}

fn valid_seed(seed: Link, cluster: &Cluster) -> bool {
    if seed.node < 0 || seed.edge < 0 {
        return false;
    }
    let (node, edge) = (seed.node as usize, seed.edge as usize);
    if node >= cluster.num_nodes() || edge >= cluster.num_edges() {
        return false;
    }
    let e = cluster.edge(edge);
    e.valid && (e.start == node || e.end == node)
}

impl Cell {
    pub fn new() -> Cell {
        Cell::default()
    }

    /// Hash of the canonical node order as traced. Two traces of the same
    /// face in the same direction share it whatever their seed.
    pub fn cell_hash(&self) -> u32 {
        *self.hash.get_or_init(|| hash_nodes(&self.nodes))
    }

    #[inline]
    pub fn built_successfully(&self) -> bool {
        self.built_successfully
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Traces the face left of `seed` (directed from `seed.node` along
    /// `seed.edge`) and checks it against `constraints`.
    ///
    /// The cell is reset first; on anything but `Success` its fields hold
    /// whatever the trace got to and should not be used.
    pub fn build_from_cluster(
        &mut self,
        seed: Link,
        cluster: &Cluster,
        projected: &[Vec2],
        constraints: &CellConstraints,
    ) -> CellResult {
        *self = Cell::default();
        if !valid_seed(seed, cluster) || projected.len() < cluster.num_nodes() {
            return CellResult::Unknown;
        }
        self.seed = seed;

        let seed_node = seed.node as usize;
        let mut from = seed;
        let mut to = Link::new(cluster.edge_other_node(seed) as i32, seed.edge);

        if !constraints.is_unique_start_half_edge(h64(from.node as u32, to.node as u32)) {
            return CellResult::Duplicate;
        }

        let fail_safe = cluster.num_edges() * 2;
        let mut visited: HashSet<u64> = HashSet::new();

        let mut last_pos = cluster.pos(seed_node);
        let mut centroid = last_pos;
        let mut perimeter = 0.0;
        let mut num_unique = 1usize;
        self.bounds.extend(last_pos);
        self.nodes.push(seed_node);
        if constraints.duplicate_leaf_points && cluster.node(seed_node).is_leaf() {
            self.nodes.push(seed_node);
        }

        let mut is_convex = true;
        let mut sign = 0;
        let mut prev: Option<usize> = None;
        let mut first_step: Option<usize> = None;
        let mut closed = false;

        while !to.is_none() {
            if visited.len() > fail_safe {
                return CellResult::MalformedCluster;
            }
            if !visited.insert(h64(from.node as u32, to.node as u32)) {
                if to.edge == seed.edge || to.node == seed.node {
                    closed = true;
                    break;
                }
                return CellResult::OpenCell;
            }

            let current = to.node as usize;
            let pos = cluster.pos(current);
            self.nodes.push(current);
            num_unique += 1;
            centroid += pos;

            let segment = pos.dist(last_pos);
            last_pos = pos;
            perimeter += segment;
            if perimeter > constraints.max_perimeter {
                return CellResult::OutsidePerimeterLimit;
            }
            if segment < constraints.min_segment_length || segment > constraints.max_segment_length {
                return CellResult::OutsideSegmentsLimit;
            }

            // The return to the seed closes the walk and is not a new point.
            let counted = if current == seed_node { num_unique - 1 } else { num_unique };
            if counted > constraints.max_point_count {
                return CellResult::OutsidePointsLimit;
            }

            self.bounds.extend(pos);
            if self.bounds.diagonal() > constraints.max_bounds_size {
                return CellResult::OutsideBoundsLimit;
            }

            let node = cluster.node(current);
            // A leaf may only leave the way it came.
            let locked_edge = if node.is_leaf() {
                if constraints.duplicate_leaf_points {
                    self.nodes.push(current);
                }
                -1
            } else {
                to.edge
            };

            let here = projected[current];
            let guide = (here - projected[from.node as usize]).safe_normal();
            let mut next = Link::NONE;
            let mut best = f64::MAX;
            for lk in &node.links {
                if lk.edge == locked_edge {
                    continue;
                }
                let other = (here - projected[lk.node as usize]).safe_normal();
                let angle = radians_between(other, guide);
                if angle < best {
                    best = angle;
                    next = *lk;
                }
            }
            if next.is_none() {
                return CellResult::OpenCell;
            }

            if !constraints.keep_cells_with_leaves && cluster.node(next.node as usize).is_leaf() {
                return CellResult::Leaf;
            }

            if let Some(p) = prev {
                check_convex(projected[p], projected[from.node as usize], here, &mut is_convex, &mut sign);
                if constraints.convex_only && !is_convex {
                    return CellResult::WrongAspect;
                }
            }

            if first_step.is_none() {
                first_step = Some(current);
            }
            prev = Some(from.node as usize);
            from = to;
            to = next;
        }

        if closed {
            // Drop the trailing return to the seed, and its leaf twin.
            if let Some(last) = self.nodes.pop() {
                if self.nodes.last() == Some(&last) {
                    self.nodes.pop();
                }
                num_unique -= 1;
                centroid -= cluster.pos(last);
            }
            if let (Some(p), Some(first)) = (prev, first_step) {
                check_convex(
                    projected[p],
                    projected[from.node as usize],
                    projected[first],
                    &mut is_convex,
                    &mut sign,
                );
                if constraints.convex_only && !is_convex {
                    return CellResult::WrongAspect;
                }
            }
        }

        if num_unique <= 2 {
            return CellResult::Leaf;
        }
        if !closed {
            return CellResult::OpenCell;
        }
        self.is_closed_loop = true;
        self.is_convex = is_convex;
        self.perimeter = perimeter;
        self.centroid = centroid / num_unique as f64;

        canonicalize(&mut self.nodes);
        self.hash = OnceLock::from(hash_nodes(&self.nodes));
        if !constraints.is_unique_cell_hash(self) {
            return CellResult::Duplicate;
        }

        let (first, last) = (self.nodes[0], self.nodes[self.nodes.len() - 1]);
        if first != last {
            let closing = cluster.pos(first).dist(cluster.pos(last));
            if closing < constraints.min_segment_length || closing > constraints.max_segment_length {
                return CellResult::OutsideSegmentsLimit;
            }
        }

        if perimeter < constraints.min_perimeter || perimeter > constraints.max_perimeter {
            return CellResult::OutsidePerimeterLimit;
        }
        if constraints.concave_only && is_convex {
            return CellResult::WrongAspect;
        }
        if num_unique < constraints.min_point_count || num_unique > constraints.max_point_count {
            return CellResult::OutsidePointsLimit;
        }
        if self.bounds.diagonal() < constraints.min_bounds_size {
            return CellResult::OutsideBoundsLimit;
        }

        self.polygon = self.nodes.iter().map(|&n| projected[n]).collect();
        let info = PolygonInfo::new(&self.polygon);
        self.area = info.area;
        self.compactness = info.compactness;
        self.is_clockwise = info.is_clockwise;
        if !info.is_winded(constraints.winding) {
            self.nodes.reverse();
            self.polygon.reverse();
            let shift = canonical_shift(&self.nodes);
            self.nodes.rotate_left(shift);
            self.polygon.rotate_left(shift);
        }

        if let Some(holes) = &constraints.holes {
            if holes.overlaps(&self.polygon) {
                return CellResult::Hole;
            }
        }

        if self.compactness < constraints.min_compactness || self.compactness > constraints.max_compactness {
            return CellResult::OutsideCompactnessLimit;
        }

        let scaled = self.area * constraints.area_scale;
        if scaled < constraints.min_area || scaled > constraints.max_area {
            return CellResult::OutsideAreaLimit;
        }

        if constraints.wrapper_classification_tolerance > 0.0 {
            if let Some(wrapper) = constraints.wrapper_cell() {
                if approx_eq(self.area, wrapper.area, constraints.wrapper_classification_tolerance) {
                    return CellResult::WrapperCell;
                }
            }
        }

        self.built_successfully = true;
        CellResult::Success
    }

    /// Traces the face around a seed position.
    ///
    /// The start vertex is the one closest to `seed_world` (per `picking`,
    /// edge search by default), the start edge its link closest to the seed,
    /// oriented so the projected seed lies left of it.
    pub fn build_from_seed_position(
        &mut self,
        seed_world: Vec3,
        seed_projected: Vec2,
        cluster: &Cluster,
        projected: &[Vec2],
        constraints: &CellConstraints,
        picking: Option<&NodePicking>,
    ) -> CellResult {
        *self = Cell::default();
        if projected.len() < cluster.num_nodes() {
            return CellResult::Unknown;
        }
        let mode = picking.map(|p| p.mode).unwrap_or_default();
        let Some(node) = cluster.find_closest_node(seed_world, mode, 2) else {
            return CellResult::Unknown;
        };
        if let Some(p) = picking {
            if !p.within_distance(cluster.pos(node), seed_world) {
                return CellResult::Unknown;
            }
        }
        let Some(edge) = cluster.find_closest_edge(node, seed_world) else {
            return CellResult::Unknown;
        };

        let e = cluster.edge(edge);
        let a = projected[e.start];
        let b = projected[e.end];
        let start = if (b - a).cross(seed_projected - a) >= 0.0 { e.start } else { e.end };
        self.build_from_cluster(Link::new(start as i32, edge as i32), cluster, projected, constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AspectFilter;
    use crate::algorithms::constraints::CellConstraintsDetails;

    fn graph(points: &[(f64, f64)], edges: &[(usize, usize)]) -> (Cluster, Vec<Vec2>) {
        let mut c = Cluster::new();
        for &(x, y) in points {
            c.add_node_xy(x, y).unwrap();
        }
        for &(a, b) in edges {
            c.add_edge(a, b).unwrap();
        }
        let projected = c.positions().iter().map(|p| Vec2::new(p.x, p.y)).collect();
        (c, projected)
    }

    fn with(f: impl FnOnce(&mut CellConstraints)) -> CellConstraints {
        let mut k = CellConstraints::new();
        f(&mut k);
        k
    }

    fn unit_square() -> (Cluster, Vec<Vec2>) {
        graph(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
        )
    }

    fn seed(c: &Cluster, a: usize, b: usize) -> Link {
        let lk = c.node(a).links.iter().find(|l| l.node as usize == b).unwrap();
        Link::new(a as i32, lk.edge)
    }

    #[test]
    fn canonical_rotation_and_hash() {
        let mut a = vec![5, 2, 9, 3];
        let mut b = vec![9, 3, 5, 2];
        canonicalize(&mut a);
        canonicalize(&mut b);
        assert_eq!(a, vec![2, 9, 3, 5]);
        assert_eq!(a, b);
        assert_eq!(hash_nodes(&a), hash_nodes(&b));
        assert_ne!(hash_nodes(&[0, 1, 2, 3]), hash_nodes(&[0, 3, 2, 1]));
    }

    #[test]
    fn repeated_minimum_rotates_once() {
        let mut a = vec![0, 3, 3, 0, 2, 2, 0, 1, 1];
        let mut b = vec![2, 2, 0, 1, 1, 0, 3, 3, 0];
        canonicalize(&mut a);
        canonicalize(&mut b);
        assert_eq!(a, vec![0, 1, 1, 0, 3, 3, 0, 2, 2]);
        assert_eq!(a, b);
    }

    #[test]
    fn unit_square_interior() {
        let (c, p) = unit_square();
        let k = CellConstraints::new();
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &k), CellResult::Success);
        assert_eq!(cell.nodes, vec![0, 1, 2, 3]);
        assert!((cell.area - 1.0).abs() < 1e-12);
        assert!((cell.perimeter - 4.0).abs() < 1e-12);
        assert!(cell.is_convex && cell.is_closed_loop && !cell.is_clockwise);
        assert!(cell.built_successfully());
        assert!((cell.centroid.x - 0.5).abs() < 1e-12 && (cell.centroid.y - 0.5).abs() < 1e-12);
        assert_eq!(cell.polygon[1], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn outer_face_is_reoriented() {
        let (c, p) = unit_square();
        let k = CellConstraints::new();
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(seed(&c, 1, 0), &c, &p, &k), CellResult::Success);
        assert!(cell.is_clockwise, "traced clockwise");
        assert_eq!(cell.nodes, vec![0, 1, 2, 3], "stored counter-clockwise");
        assert_eq!(cell.cell_hash(), hash_nodes(&[0, 3, 2, 1]));
    }

    #[test]
    fn all_square_seeds_dedupe() {
        let (c, p) = unit_square();
        let k = CellConstraints::new();
        let mut results = Vec::new();
        for e in c.edges() {
            for (a, b) in [(e.start, e.end), (e.end, e.start)] {
                let mut cell = Cell::new();
                results.push(cell.build_from_cluster(seed(&c, a, b), &c, &p, &k));
            }
        }
        let ok = results.iter().filter(|r| **r == CellResult::Success).count();
        let dup = results.iter().filter(|r| **r == CellResult::Duplicate).count();
        assert_eq!((ok, dup), (2, 6));
    }

    #[test]
    fn repeated_seed_is_duplicate() {
        let (c, p) = unit_square();
        let k = CellConstraints::new();
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &k), CellResult::Success);
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &k), CellResult::Duplicate);
    }

    #[test]
    fn point_limit_counts_unique_points() {
        let (c, p) = unit_square();
        let three = with(|k| k.max_point_count = 3);
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &three), CellResult::OutsidePointsLimit);
        let four = with(|k| k.max_point_count = 4);
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &four), CellResult::Success);
    }

    #[test]
    fn open_path_is_a_leaf() {
        let (c, p) = graph(&[(0.0, 0.0), (1.0, 0.0)], &[(0, 1)]);
        let mut cell = Cell::new();
        let r = cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &CellConstraints::new());
        assert_eq!(r, CellResult::Leaf);
    }

    #[test]
    fn invalid_seed_is_unknown() {
        let (c, p) = unit_square();
        let k = CellConstraints::new();
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(Link::NONE, &c, &p, &k), CellResult::Unknown);
        // node 2 is not on edge 0
        assert_eq!(cell.build_from_cluster(Link::new(2, 0), &c, &p, &k), CellResult::Unknown);
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p[..2], &k), CellResult::Unknown);
    }

    #[test]
    fn aspect_filters() {
        // L shape, concave at (1, 1)
        let (c, p) = graph(
            &[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)],
        );
        let convex_only = CellConstraints::from_details(&CellConstraintsDetails {
            aspect_filter: AspectFilter::ConvexOnly,
            ..Default::default()
        });
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &convex_only), CellResult::WrongAspect);

        let concave_only = with(|k| k.concave_only = true);
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &concave_only), CellResult::Success);
        assert!(!cell.is_convex);
        assert!((cell.area - 3.0).abs() < 1e-12);

        let (sq, sp) = unit_square();
        let concave_only = with(|k| k.concave_only = true);
        assert_eq!(cell.build_from_cluster(seed(&sq, 0, 1), &sq, &sp, &concave_only), CellResult::WrongAspect);
    }

    #[test]
    fn concave_corner_at_seed_is_seen() {
        // same L shape, but seeded so the reflex vertex is the seed itself
        let (c, p) = graph(
            &[(1.0, 1.0), (1.0, 2.0), (0.0, 2.0), (0.0, 0.0), (2.0, 0.0), (2.0, 1.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)],
        );
        let k = with(|k| k.convex_only = true);
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &k), CellResult::WrongAspect);
    }

    #[test]
    fn metric_limits() {
        let (c, p) = unit_square();
        let mut cell = Cell::new();
        let cases = [
            (with(|k| k.max_perimeter = 3.0), CellResult::OutsidePerimeterLimit),
            (with(|k| k.min_perimeter = 5.0), CellResult::OutsidePerimeterLimit),
            (with(|k| k.max_segment_length = 0.5), CellResult::OutsideSegmentsLimit),
            (with(|k| k.max_bounds_size = 1.0), CellResult::OutsideBoundsLimit),
            (with(|k| k.min_bounds_size = 2.0), CellResult::OutsideBoundsLimit),
            (with(|k| k.min_point_count = 5), CellResult::OutsidePointsLimit),
            (with(|k| k.min_compactness = 0.9), CellResult::OutsideCompactnessLimit),
            (with(|k| k.min_area = 2.0), CellResult::OutsideAreaLimit),
            (
                with(|k| { k.area_scale = 0.01; k.max_area = 0.5; }),
                CellResult::Success,
            ),
        ];
        for (k, expected) in cases {
            assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &k), expected);
        }
    }

    #[test]
    fn clockwise_winding() {
        let (c, p) = unit_square();
        let k = with(|k| k.winding = crate::model::Winding::Clockwise);
        let mut cell = Cell::new();
        assert_eq!(cell.build_from_cluster(seed(&c, 0, 1), &c, &p, &k), CellResult::Success);
        assert_eq!(cell.nodes, vec![0, 3, 2, 1]);
        assert_eq!(cell.polygon[1], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn seed_position_picks_the_enclosing_face() {
        // two squares side by side sharing edge 1-2
        let (c, p) = graph(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (2.0, 0.0), (2.0, 1.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 0), (1, 4), (4, 5), (5, 2)],
        );
        let k = CellConstraints::new();
        let mut cell = Cell::new();
        let at = Vec3::new(1.2, 0.5, 0.0);
        let r = cell.build_from_seed_position(at, Vec2::new(at.x, at.y), &c, &p, &k, None);
        assert_eq!(r, CellResult::Success);
        assert_eq!(cell.nodes, vec![1, 4, 5, 2]);

        let at = Vec3::new(0.8, 0.5, 0.0);
        let r = cell.build_from_seed_position(at, Vec2::new(at.x, at.y), &c, &p, &k, None);
        assert_eq!(r, CellResult::Success);
        assert_eq!(cell.nodes, vec![0, 1, 2, 3]);

        let far = NodePicking { max_distance: Some(0.1), ..NodePicking::default() };
        let r = cell.build_from_seed_position(at, Vec2::new(at.x, at.y), &c, &p, &k, Some(&far));
        assert_eq!(r, CellResult::Unknown);
    }
}
