use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::algorithms::cell::{Cell, CellResult};
use crate::algorithms::holes::Holes;
use crate::error::CellTraceError;
use crate::model::{AspectFilter, Link, Vec2, Winding};
use crate::Cluster;

/// Hash set shared by concurrent traces.
///
/// Lookups take the read lock only; an insert re-checks under the write
/// lock so exactly one caller wins a given key.
#[derive(Debug, Default)]
pub struct DedupSet<T> {
    inner: RwLock<HashSet<T>>,
}

impl<T: Eq + Hash> DedupSet<T> {
    pub fn new() -> Self {
        DedupSet { inner: RwLock::new(HashSet::new()) }
    }

    pub fn contains(&self, key: &T) -> bool {
        self.inner.read().contains(key)
    }

    /// True (and records `key`) iff no caller recorded it before.
    pub fn insert_unique(&self, key: T) -> bool {
        if self.inner.read().contains(&key) {
            return false;
        }
        self.inner.write().insert(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

/// User-facing cell settings.
///
/// Limits only apply when their `omit_*` toggle is on; everything else is
/// open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConstraintsDetails {
    pub aspect_filter: AspectFilter,
    /// Drop cells already produced from another seed.
    pub dedupe_cells: bool,
    /// Keep cells whose walk wraps around dead ends.
    pub keep_cells_with_leaves: bool,
    /// Emit dead-end points twice, once for each side of the walk.
    pub duplicate_leaf_points: bool,
    pub winding: Winding,

    /// Omit cells matching the outer boundary of the whole cluster.
    pub omit_wrapping_bounds: bool,
    pub wrapping_classification_tolerance: f64,

    pub omit_below_point_count: bool,
    pub min_point_count: usize,
    pub omit_above_point_count: bool,
    pub max_point_count: usize,

    pub omit_below_bounds_size: bool,
    pub min_bounds_size: f64,
    pub omit_above_bounds_size: bool,
    pub max_bounds_size: f64,

    pub omit_below_perimeter: bool,
    pub min_perimeter: f64,
    pub omit_above_perimeter: bool,
    pub max_perimeter: f64,

    pub omit_below_segment_length: bool,
    pub min_segment_length: f64,
    pub omit_above_segment_length: bool,
    pub max_segment_length: f64,

    pub omit_below_area: bool,
    pub min_area: f64,
    pub omit_above_area: bool,
    pub max_area: f64,

    pub omit_below_compactness: bool,
    pub min_compactness: f64,
    pub omit_above_compactness: bool,
    pub max_compactness: f64,

    /// Factor applied to cell areas before the area limits are compared.
    pub area_scale: f64,
}

impl Default for CellConstraintsDetails {
    fn default() -> Self {
        CellConstraintsDetails {
            aspect_filter: AspectFilter::Both,
            dedupe_cells: true,
            keep_cells_with_leaves: true,
            duplicate_leaf_points: false,
            winding: Winding::CounterClockwise,
            omit_wrapping_bounds: true,
            wrapping_classification_tolerance: 0.01,
            omit_below_point_count: false,
            min_point_count: 3,
            omit_above_point_count: false,
            max_point_count: 500,
            omit_below_bounds_size: false,
            min_bounds_size: 3.0,
            omit_above_bounds_size: false,
            max_bounds_size: 500.0,
            omit_below_perimeter: false,
            min_perimeter: 10.0,
            omit_above_perimeter: false,
            max_perimeter: 500.0,
            omit_below_segment_length: false,
            min_segment_length: 1.0,
            omit_above_segment_length: false,
            max_segment_length: 100.0,
            omit_below_area: false,
            min_area: 1.0,
            omit_above_area: false,
            max_area: 1000.0,
            omit_below_compactness: false,
            min_compactness: 0.0,
            omit_above_compactness: false,
            max_compactness: 1.0,
            area_scale: 1.0,
        }
    }
}

impl CellConstraintsDetails {
    pub fn from_json(s: &str) -> Result<CellConstraintsDetails, CellTraceError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<CellConstraintsDetails, CellTraceError> {
        Ok(serde_json::from_value(v)?)
    }
}

/// Limits, policy flags and dedup state shared by every trace of one
/// invocation.
pub struct CellConstraints {
    pub convex_only: bool,
    pub concave_only: bool,
    pub keep_cells_with_leaves: bool,
    pub duplicate_leaf_points: bool,
    pub dedupe_cells: bool,
    pub winding: Winding,

    pub min_point_count: usize,
    pub max_point_count: usize,
    pub min_bounds_size: f64,
    pub max_bounds_size: f64,
    pub min_perimeter: f64,
    pub max_perimeter: f64,
    pub min_segment_length: f64,
    pub max_segment_length: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub min_compactness: f64,
    pub max_compactness: f64,
    pub area_scale: f64,

    /// Build and use a wrapper cell in the extraction driver.
    pub omit_wrapping_cell: bool,
    /// Cells whose area is within this of the wrapper's are rejected; 0 disables.
    pub wrapper_classification_tolerance: f64,
    pub holes: Option<Arc<Holes>>,

    unique_start_half_edges: DedupSet<u64>,
    unique_cells: DedupSet<u32>,
    wrapper_cell: RwLock<Option<Arc<Cell>>>,
}

impl Default for CellConstraints {
    fn default() -> Self {
        CellConstraints {
            convex_only: false,
            concave_only: false,
            keep_cells_with_leaves: true,
            duplicate_leaf_points: false,
            dedupe_cells: true,
            winding: Winding::CounterClockwise,
            min_point_count: 0,
            max_point_count: usize::MAX,
            min_bounds_size: 0.0,
            max_bounds_size: f64::MAX,
            min_perimeter: 0.0,
            max_perimeter: f64::MAX,
            min_segment_length: 0.0,
            max_segment_length: f64::MAX,
            min_area: 0.0,
            max_area: f64::MAX,
            min_compactness: 0.0,
            max_compactness: f64::MAX,
            area_scale: 1.0,
            omit_wrapping_cell: false,
            wrapper_classification_tolerance: 0.0,
            holes: None,
            unique_start_half_edges: DedupSet::new(),
            unique_cells: DedupSet::new(),
            wrapper_cell: RwLock::new(None),
        }
    }
}

impl CellConstraints {
    pub fn new() -> CellConstraints {
        CellConstraints::default()
    }

    pub fn from_details(d: &CellConstraintsDetails) -> CellConstraints {
        let mut c = CellConstraints {
            convex_only: d.aspect_filter == AspectFilter::ConvexOnly,
            concave_only: d.aspect_filter == AspectFilter::ConcaveOnly,
            keep_cells_with_leaves: d.keep_cells_with_leaves,
            duplicate_leaf_points: d.keep_cells_with_leaves && d.duplicate_leaf_points,
            dedupe_cells: d.dedupe_cells,
            winding: d.winding,
            area_scale: d.area_scale,
            omit_wrapping_cell: d.omit_wrapping_bounds,
            ..CellConstraints::default()
        };

        if d.omit_wrapping_bounds { c.wrapper_classification_tolerance = d.wrapping_classification_tolerance.max(0.0); }

        if d.omit_below_point_count { c.min_point_count = d.min_point_count; }
        if d.omit_above_point_count { c.max_point_count = d.max_point_count; }

        if d.omit_below_bounds_size { c.min_bounds_size = d.min_bounds_size; }
        if d.omit_above_bounds_size { c.max_bounds_size = d.max_bounds_size; }

        if d.omit_below_perimeter { c.min_perimeter = d.min_perimeter; }
        if d.omit_above_perimeter { c.max_perimeter = d.max_perimeter; }

        if d.omit_below_segment_length { c.min_segment_length = d.min_segment_length; }
        if d.omit_above_segment_length { c.max_segment_length = d.max_segment_length; }

        if d.omit_below_area { c.min_area = d.min_area; }
        if d.omit_above_area { c.max_area = d.max_area; }

        if d.omit_below_compactness { c.min_compactness = d.min_compactness; }
        if d.omit_above_compactness { c.max_compactness = d.max_compactness; }

        c
    }

    pub fn with_holes(mut self, holes: Arc<Holes>) -> CellConstraints {
        self.holes = Some(holes);
        self
    }

    /// Open limits, carrying over only the leaf and winding policy.
    fn permissive_copy(&self) -> CellConstraints {
        CellConstraints {
            keep_cells_with_leaves: self.keep_cells_with_leaves,
            duplicate_leaf_points: self.duplicate_leaf_points,
            winding: self.winding,
            ..CellConstraints::default()
        }
    }

    pub fn contains_signed_edge_hash(&self, hash: u64) -> bool {
        self.unique_start_half_edges.contains(&hash)
    }

    pub fn is_unique_start_half_edge(&self, hash: u64) -> bool {
        self.unique_start_half_edges.insert_unique(hash)
    }

    pub fn is_unique_cell_hash(&self, cell: &Cell) -> bool {
        if !self.dedupe_cells {
            return true;
        }
        self.unique_cells.insert_unique(cell.cell_hash())
    }

    pub fn num_unique_cells(&self) -> usize {
        self.unique_cells.len()
    }

    pub fn wrapper_cell(&self) -> Option<Arc<Cell>> {
        self.wrapper_cell.read().clone()
    }

    /// Traces the outer boundary of `cluster` and keeps it as the wrapper
    /// cell. Its hash is registered so the same boundary traced from another
    /// seed reports `Duplicate`.
    ///
    /// Returns false, leaving no wrapper, when the cluster has no usable
    /// vertex or edge or the boundary cannot be traced.
    pub fn build_wrapper_cell(
        &self,
        cluster: &Cluster,
        projected: &[Vec2],
        override_constraints: Option<&CellConstraints>,
    ) -> bool {
        *self.wrapper_cell.write() = None;

        let Some(link) = wrapper_seed(cluster, projected) else {
            return false;
        };

        let permissive;
        let temp = match override_constraints {
            Some(c) => c,
            None => {
                permissive = self.permissive_copy();
                &permissive
            }
        };
        let mut cell = Cell::default();
        if cell.build_from_cluster(link, cluster, projected, temp) != CellResult::Success {
            return false;
        }

        self.unique_cells.insert_unique(cell.cell_hash());
        *self.wrapper_cell.write() = Some(Arc::new(cell));
        true
    }

    pub fn cleanup(&self) {
        *self.wrapper_cell.write() = None;
    }
}

/// Half-edge on the outer boundary, oriented so a left-turning walk stays
/// outside the cluster.
pub(crate) fn wrapper_seed(cluster: &Cluster, projected: &[Vec2]) -> Option<Link> {
    if projected.len() < cluster.num_nodes() {
        return None;
    }
    let centroid = cluster.projected_centroid(projected);

    let mut max_dist = 0.0;
    let mut far_node: Option<usize> = None;
    for node in cluster.nodes() {
        let dist = centroid.dist_sq(projected[node.index]);
        if dist > max_dist {
            max_dist = dist;
            far_node = Some(node.index);
        }
    }
    let far_node = far_node?;

    // Edge pointing away from the centre the most
    let from = projected[far_node];
    let toward_center = (centroid - from).safe_normal();
    let mut best_dot = f64::MAX;
    let mut edge: Option<usize> = None;
    for lk in &cluster.node(far_node).links {
        let dot = toward_center.dot((projected[lk.node as usize] - from).safe_normal());
        if dot < best_dot {
            best_dot = dot;
            edge = Some(lk.edge as usize);
        }
    }
    let edge = edge?;

    let start = cluster.edge_start(edge);
    let end = cluster.edge_end(edge);
    let start_node = if start.is_leaf() && !end.is_leaf() {
        start.index
    } else if end.is_leaf() && !start.is_leaf() {
        end.index
    } else {
        let dir = (projected[end.index] - projected[start.index]).safe_normal();
        let normal = Vec2::new(-dir.y, dir.x);
        if (projected[far_node] - centroid).safe_normal().dot(normal) > 0.0 {
            start.index
        } else {
            end.index
        }
    };

    Some(Link::new(start_node as i32, edge as i32))
}
