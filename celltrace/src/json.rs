use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::algorithms::cell::Cell;
use crate::error::CellTraceError;
use crate::geometry::limits;
use crate::model::Vec3;
use crate::Cluster;

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct NodeDoc {
    id: u32,
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
}

#[derive(Serialize, Deserialize)]
struct EdgeDoc {
    a: u32,
    b: u32,
    #[serde(default = "default_valid")]
    valid: bool,
}

fn default_valid() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
struct ClusterDoc {
    version: Option<u32>,
    #[serde(default)]
    id: u32,
    #[serde(default)]
    tags: BTreeSet<String>,
    nodes: Vec<NodeDoc>,
    edges: Vec<EdgeDoc>,
}

pub(crate) fn cluster_to_json(c: &Cluster) -> Value {
    let doc = ClusterDoc {
        version: Some(FORMAT_VERSION),
        id: c.id,
        tags: c.tags.clone(),
        nodes: c
            .positions()
            .iter()
            .enumerate()
            .map(|(i, p)| NodeDoc { id: i as u32, x: p.x, y: p.y, z: p.z })
            .collect(),
        edges: c
            .edges()
            .iter()
            .map(|e| EdgeDoc { a: e.start as u32, b: e.end as u32, valid: e.valid })
            .collect(),
    };
    serde_json::to_value(doc).unwrap_or(Value::Null)
}

/// Node ids may be sparse; nodes are renumbered in ascending id order.
pub(crate) fn cluster_from_json(v: Value) -> Result<Cluster, CellTraceError> {
    let mut doc: ClusterDoc = serde_json::from_value(v)?;
    if let Some(version) = doc.version {
        if version > FORMAT_VERSION {
            return Err(CellTraceError::Json(format!("unsupported version {}", version)));
        }
    }
    if doc.nodes.len() > limits::MAX_NODES {
        return Err(CellTraceError::LimitExceeded { what: "nodes", max: limits::MAX_NODES });
    }
    if doc.edges.len() > limits::MAX_EDGES {
        return Err(CellTraceError::LimitExceeded { what: "edges", max: limits::MAX_EDGES });
    }

    doc.nodes.sort_by_key(|n| n.id);
    let mut index: HashMap<u32, usize> = HashMap::with_capacity(doc.nodes.len());
    let mut c = Cluster::with_id(doc.id);
    c.tags = doc.tags;
    for n in &doc.nodes {
        let i = c.add_node(Vec3::new(n.x, n.y, n.z))?;
        if index.insert(n.id, i).is_some() {
            return Err(CellTraceError::Json(format!("duplicate node id {}", n.id)));
        }
    }
    for e in &doc.edges {
        let a = *index.get(&e.a).ok_or(CellTraceError::InvalidNode(e.a as usize))?;
        let b = *index.get(&e.b).ok_or(CellTraceError::InvalidNode(e.b as usize))?;
        let edge = c.add_edge(a, b)?;
        if !e.valid {
            c.set_edge_valid(edge, false);
        }
    }
    Ok(c)
}

#[derive(Serialize)]
struct CellDoc<'a> {
    nodes: &'a [usize],
    hash: u32,
    area: f64,
    perimeter: f64,
    compactness: f64,
    is_convex: bool,
    is_clockwise: bool,
    centroid: Vec3,
}

pub(crate) fn cells_to_json(cells: &[Cell]) -> Value {
    let docs: Vec<CellDoc> = cells
        .iter()
        .map(|c| CellDoc {
            nodes: &c.nodes,
            hash: c.cell_hash(),
            area: c.area,
            perimeter: c.perimeter,
            compactness: c.compactness,
            is_convex: c.is_convex,
            is_clockwise: c.is_clockwise,
            centroid: c.centroid,
        })
        .collect();
    serde_json::to_value(docs).unwrap_or(Value::Null)
}

impl Cluster {
    pub fn from_json(s: &str) -> Result<Cluster, CellTraceError> {
        cluster_from_json(serde_json::from_str(s)?)
    }

    pub fn from_json_value(v: Value) -> Result<Cluster, CellTraceError> {
        cluster_from_json(v)
    }

    pub fn to_json(&self) -> Value {
        cluster_to_json(self)
    }
}

impl Cell {
    pub fn list_to_json(cells: &[Cell]) -> Value {
        cells_to_json(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_ids_are_renumbered() {
        let c = Cluster::from_json_value(json!({
            "id": 4,
            "tags": ["streets"],
            "nodes": [
                { "id": 10, "x": 1.0, "y": 0.0 },
                { "id": 2, "x": 0.0, "y": 0.0, "z": 5.0 },
                { "id": 7, "x": 1.0, "y": 1.0 }
            ],
            "edges": [ { "a": 2, "b": 10 }, { "a": 10, "b": 7, "valid": false } ]
        }))
        .unwrap();
        assert_eq!(c.id, 4);
        assert_eq!(c.num_nodes(), 3);
        assert_eq!(c.pos(0), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!((c.edge(0).start, c.edge(0).end), (0, 2));
        assert!(!c.edge(1).valid);
        assert!(c.tags.contains("streets"));
    }

    #[test]
    fn round_trip_keeps_structure() {
        let mut c = Cluster::with_id(9);
        c.add_node_xy(0.0, 0.0).unwrap();
        c.add_node_xy(3.0, 0.0).unwrap();
        c.add_edge(0, 1).unwrap();
        let back = Cluster::from_json_value(c.to_json()).unwrap();
        assert_eq!(back.id, 9);
        assert_eq!(back.positions(), c.positions());
        assert_eq!(back.num_edges(), 1);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(Cluster::from_json("{"), Err(CellTraceError::Json(_))));
        let dangling = json!({ "nodes": [ { "id": 0, "x": 0.0, "y": 0.0 } ], "edges": [ { "a": 0, "b": 3 } ] });
        assert_eq!(Cluster::from_json_value(dangling).err(), Some(CellTraceError::InvalidNode(3)));
        let dup = json!({
            "nodes": [ { "id": 1, "x": 0.0, "y": 0.0 }, { "id": 1, "x": 1.0, "y": 0.0 } ],
            "edges": []
        });
        assert!(matches!(Cluster::from_json_value(dup), Err(CellTraceError::Json(_))));
        let future = json!({ "version": 99, "nodes": [], "edges": [] });
        assert!(Cluster::from_json_value(future).is_err());
    }
}
