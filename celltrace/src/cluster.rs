use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::CellTraceError;
use crate::geometry::limits;
use crate::geometry::math::seg_distance_sq;
use crate::model::{h64, Edge, Link, Node, Vec2, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosestSearchMode {
    /// Closest vertex.
    Node,
    /// Closest edge, then its closer endpoint.
    #[default]
    Edge,
}

/// How a seed position picks its starting vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePicking {
    pub mode: ClosestSearchMode,
    /// Seeds farther than this from the picked vertex are skipped.
    pub max_distance: Option<f64>,
}

impl NodePicking {
    pub fn within_distance(&self, node_pos: Vec3, seed: Vec3) -> bool {
        match self.max_distance {
            Some(d) => node_pos.dist_sq(seed) <= d * d,
            None => true,
        }
    }
}

/// Undirected graph embedded in space: vertices, their links, and edges.
///
/// Node indices double as point indices: position `i`, projected position
/// `i` and node `i` all describe the same vertex.
pub struct Cluster {
    pub id: u32,
    pub tags: BTreeSet<String>,
    nodes: Vec<Node>,
    positions: Vec<Vec3>,
    edges: Vec<Edge>,
    used: Vec<AtomicBool>,
    adjacency: HashSet<u64>,
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::new()
    }
}

impl Cluster {
    pub fn new() -> Cluster {
        Cluster {
            id: 0,
            tags: BTreeSet::new(),
            nodes: Vec::new(),
            positions: Vec::new(),
            edges: Vec::new(),
            used: Vec::new(),
            adjacency: HashSet::new(),
        }
    }

    pub fn with_id(id: u32) -> Cluster {
        Cluster { id, ..Cluster::new() }
    }

    // Nodes
    pub fn add_node(&mut self, pos: Vec3) -> Result<usize, CellTraceError> {
        if !limits::in_coord_bounds(pos.x) {
            return Err(CellTraceError::NonFinite("x"));
        }
        if !limits::in_coord_bounds(pos.y) {
            return Err(CellTraceError::NonFinite("y"));
        }
        if !limits::in_coord_bounds(pos.z) {
            return Err(CellTraceError::NonFinite("z"));
        }
        if self.nodes.len() >= limits::MAX_NODES {
            return Err(CellTraceError::LimitExceeded { what: "nodes", max: limits::MAX_NODES });
        }
        let index = self.nodes.len();
        self.nodes.push(Node { index, links: Vec::new() });
        self.positions.push(pos);
        self.used.push(AtomicBool::new(false));
        Ok(index)
    }

    pub fn add_node_xy(&mut self, x: f64, y: f64) -> Result<usize, CellTraceError> {
        self.add_node(Vec3::new(x, y, 0.0))
    }

    // Edges
    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<usize, CellTraceError> {
        if a >= self.nodes.len() {
            return Err(CellTraceError::InvalidNode(a));
        }
        if b >= self.nodes.len() {
            return Err(CellTraceError::InvalidNode(b));
        }
        if a == b {
            return Err(CellTraceError::SelfLoop(a));
        }
        if self.edges.len() >= limits::MAX_EDGES {
            return Err(CellTraceError::LimitExceeded { what: "edges", max: limits::MAX_EDGES });
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        if !self.adjacency.insert(h64(lo as u32, hi as u32)) {
            return Err(CellTraceError::DuplicateEdge(a, b));
        }
        let index = self.edges.len();
        self.edges.push(Edge { index, start: a, end: b, valid: true });
        self.nodes[a].links.push(Link::new(b as i32, index as i32));
        self.nodes[b].links.push(Link::new(a as i32, index as i32));
        Ok(index)
    }

    pub fn set_edge_valid(&mut self, edge: usize, valid: bool) -> bool {
        match self.edges.get_mut(edge) {
            Some(e) => {
                e.valid = valid;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }
    #[inline]
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }
    #[inline]
    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }
    #[inline]
    pub fn pos(&self, node: usize) -> Vec3 {
        self.positions[node]
    }

    /// Node on the far side of `link.edge` as seen from `link.node`.
    #[inline]
    pub fn edge_other_node(&self, link: Link) -> usize {
        self.edges[link.edge as usize].other(link.node as usize)
    }

    pub fn edge_start(&self, edge: usize) -> &Node {
        &self.nodes[self.edges[edge].start]
    }

    pub fn edge_end(&self, edge: usize) -> &Node {
        &self.nodes[self.edges[edge].end]
    }

    pub fn check_projection(&self, projected: &[Vec2]) -> Result<(), CellTraceError> {
        if projected.len() != self.nodes.len() {
            return Err(CellTraceError::ProjectionMismatch {
                expected: self.nodes.len(),
                got: projected.len(),
            });
        }
        Ok(())
    }

    /// Average of the projected positions.
    pub fn projected_centroid(&self, projected: &[Vec2]) -> Vec2 {
        if projected.is_empty() {
            return Vec2::ZERO;
        }
        let mut c = Vec2::ZERO;
        for p in projected {
            c = c + *p;
        }
        c * (1.0 / projected.len() as f64)
    }

    // Used markers (written by triangulation, possibly from many threads)
    #[inline]
    pub fn mark_used(&self, node: usize) {
        self.used[node].store(true, Ordering::Relaxed);
    }
    #[inline]
    pub fn is_used(&self, node: usize) -> bool {
        self.used[node].load(Ordering::Relaxed)
    }
    pub fn reset_used(&self) {
        for u in &self.used {
            u.store(false, Ordering::Relaxed);
        }
    }
    pub fn num_used(&self) -> usize {
        self.used.iter().filter(|u| u.load(Ordering::Relaxed)).count()
    }

    /// Closest node to `pos` having at least `min_neighbors` links.
    pub fn find_closest_node(
        &self,
        pos: Vec3,
        mode: ClosestSearchMode,
        min_neighbors: usize,
    ) -> Option<usize> {
        match mode {
            ClosestSearchMode::Node => {
                let mut best: Option<(usize, f64)> = None;
                for n in &self.nodes {
                    if n.num() < min_neighbors {
                        continue;
                    }
                    let d2 = self.positions[n.index].dist_sq(pos);
                    if best.map_or(true, |(_, bd)| d2 < bd) {
                        best = Some((n.index, d2));
                    }
                }
                best.map(|(i, _)| i)
            }
            ClosestSearchMode::Edge => {
                let mut best: Option<(usize, f64)> = None;
                for e in &self.edges {
                    if !e.valid {
                        continue;
                    }
                    let (d2, _) = seg_distance_sq(pos, self.positions[e.start], self.positions[e.end]);
                    if best.map_or(true, |(_, bd)| d2 < bd) {
                        best = Some((e.index, d2));
                    }
                }
                let (edge, _) = best?;
                let e = &self.edges[edge];
                let (near, far) = if self.positions[e.start].dist_sq(pos) <= self.positions[e.end].dist_sq(pos) {
                    (e.start, e.end)
                } else {
                    (e.end, e.start)
                };
                if self.nodes[near].num() >= min_neighbors {
                    Some(near)
                } else if self.nodes[far].num() >= min_neighbors {
                    Some(far)
                } else {
                    None
                }
            }
        }
    }

    /// Edge incident to `node` closest to `pos`.
    pub fn find_closest_edge(&self, node: usize, pos: Vec3) -> Option<usize> {
        let n = self.nodes.get(node)?;
        let from = self.positions[node];
        let mut best: Option<(usize, f64)> = None;
        for lk in &n.links {
            if !self.edges[lk.edge as usize].valid {
                continue;
            }
            let to = self.positions[lk.node as usize];
            let (d2, _) = seg_distance_sq(pos, from, to);
            if best.map_or(true, |(_, bd)| d2 < bd) {
                best = Some((lk.edge as usize, d2));
            }
        }
        best.map(|(e, _)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_symmetric() {
        let mut c = Cluster::new();
        let a = c.add_node_xy(0.0, 0.0).unwrap();
        let b = c.add_node_xy(1.0, 0.0).unwrap();
        let e = c.add_edge(a, b).unwrap();
        assert_eq!(c.node(a).links, vec![Link::new(b as i32, e as i32)]);
        assert_eq!(c.node(b).links, vec![Link::new(a as i32, e as i32)]);
        assert!(c.node(a).is_leaf());
        assert_eq!(c.edge_other_node(Link::new(a as i32, e as i32)), b);
    }

    #[test]
    fn rejects_bad_edges() {
        let mut c = Cluster::new();
        let a = c.add_node_xy(0.0, 0.0).unwrap();
        let b = c.add_node_xy(1.0, 0.0).unwrap();
        assert_eq!(c.add_edge(a, a), Err(CellTraceError::SelfLoop(a)));
        assert_eq!(c.add_edge(a, 7), Err(CellTraceError::InvalidNode(7)));
        c.add_edge(a, b).unwrap();
        assert_eq!(c.add_edge(b, a), Err(CellTraceError::DuplicateEdge(b, a)));
        assert_eq!(c.num_edges(), 1);
    }

    #[test]
    fn rejects_non_finite() {
        let mut c = Cluster::new();
        assert_eq!(c.add_node_xy(f64::NAN, 0.0), Err(CellTraceError::NonFinite("x")));
        assert_eq!(c.num_nodes(), 0);
    }

    #[test]
    fn closest_queries() {
        let mut c = Cluster::new();
        let a = c.add_node_xy(0.0, 0.0).unwrap();
        let b = c.add_node_xy(10.0, 0.0).unwrap();
        let d = c.add_node_xy(10.0, 10.0).unwrap();
        let e0 = c.add_edge(a, b).unwrap();
        let e1 = c.add_edge(b, d).unwrap();
        let probe = Vec3::new(9.0, 4.0, 0.0);
        assert_eq!(c.find_closest_node(probe, ClosestSearchMode::Node, 0), Some(b));
        // a and d are leaves; only b qualifies with two neighbours
        assert_eq!(c.find_closest_node(Vec3::new(0.0, 1.0, 0.0), ClosestSearchMode::Node, 2), Some(b));
        assert_eq!(c.find_closest_node(probe, ClosestSearchMode::Edge, 2), Some(b));
        assert_eq!(c.find_closest_edge(b, probe), Some(e1));
        assert_eq!(c.find_closest_edge(b, Vec3::new(5.0, -1.0, 0.0)), Some(e0));
    }

    #[test]
    fn picking_distance() {
        let p = NodePicking { mode: ClosestSearchMode::Node, max_distance: Some(2.0) };
        assert!(p.within_distance(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)));
        assert!(!p.within_distance(Vec3::ZERO, Vec3::new(2.0, 0.1, 0.0)));
        assert!(NodePicking::default().within_distance(Vec3::ZERO, Vec3::new(1e9, 0.0, 0.0)));
    }

    #[test]
    fn used_markers() {
        let mut c = Cluster::new();
        let a = c.add_node_xy(0.0, 0.0).unwrap();
        c.add_node_xy(1.0, 0.0).unwrap();
        c.mark_used(a);
        assert!(c.is_used(a));
        assert_eq!(c.num_used(), 1);
        c.reset_used();
        assert_eq!(c.num_used(), 0);
    }
}
