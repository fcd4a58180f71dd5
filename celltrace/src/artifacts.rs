//! Per-vertex output for accepted cells, and seed point updates.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::algorithms::cell::Cell;
use crate::cluster::Cluster;
use crate::error::CellTraceError;
use crate::model::{h64, Vec3};

/// Tags starting with this are internal and never forwarded.
pub const RESERVED_TAG_PREFIX: &str = "celltrace:";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellArtifactsDetails {
    pub write_vtx_id: bool,
    pub flag_terminal_point: bool,
    pub write_num_repeat: bool,
    pub tag_convex: bool,
    pub convex_tag: String,
    pub tag_concave: bool,
    pub concave_tag: String,
    pub forward_tags: bool,
    /// Cluster tags never forwarded, on top of the reserved ones.
    pub skip_tags: Vec<String>,
}

impl Default for CellArtifactsDetails {
    fn default() -> Self {
        CellArtifactsDetails {
            write_vtx_id: false,
            flag_terminal_point: false,
            write_num_repeat: false,
            tag_convex: false,
            convex_tag: "Convex".to_string(),
            tag_concave: false,
            concave_tag: "Concave".to_string(),
            forward_tags: true,
            skip_tags: Vec::new(),
        }
    }
}

impl CellArtifactsDetails {
    pub fn write_any(&self) -> bool {
        self.write_vtx_id || self.flag_terminal_point || self.write_num_repeat
    }

    /// Enabled tags must have a usable, non-reserved name.
    pub fn validate(&self) -> Result<(), CellTraceError> {
        for (on, name, tag) in [
            (self.tag_convex, "convex_tag", &self.convex_tag),
            (self.tag_concave, "concave_tag", &self.concave_tag),
        ] {
            if !on {
                continue;
            }
            if tag.trim().is_empty() {
                return Err(CellTraceError::InvalidConfig(format!("{} is empty", name)));
            }
            if tag.starts_with(RESERVED_TAG_PREFIX) {
                return Err(CellTraceError::InvalidConfig(format!("{} uses the reserved prefix", name)));
            }
        }
        Ok(())
    }
}

/// What gets written alongside one cell; per-vertex vectors follow
/// `cell.nodes` entry for entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CellArtifacts {
    pub tags: BTreeSet<String>,
    pub closed_loop: bool,
    pub terminal: Option<Vec<bool>>,
    /// Times the entry's vertex appears in the cell, minus one.
    pub num_repeat: Option<Vec<usize>>,
    /// `h64(cluster id, node)`.
    pub vtx_ids: Option<Vec<u64>>,
}

impl CellArtifacts {
    pub fn process(details: &CellArtifactsDetails, cluster: &Cluster, cell: &Cell) -> CellArtifacts {
        let mut out = CellArtifacts { closed_loop: cell.is_closed_loop, ..CellArtifacts::default() };

        if details.forward_tags {
            for tag in &cluster.tags {
                if tag.starts_with(RESERVED_TAG_PREFIX) || details.skip_tags.contains(tag) {
                    continue;
                }
                out.tags.insert(tag.clone());
            }
        }
        if cell.is_convex {
            if details.tag_convex {
                out.tags.insert(details.convex_tag.clone());
            }
        } else if details.tag_concave {
            out.tags.insert(details.concave_tag.clone());
        }

        if !details.write_any() {
            return out;
        }

        if details.flag_terminal_point {
            out.terminal = Some(cell.nodes.iter().map(|&n| cluster.node(n).is_leaf()).collect());
        }
        if details.write_num_repeat {
            let mut seen: HashMap<usize, usize> = HashMap::with_capacity(cell.nodes.len());
            for &n in &cell.nodes {
                *seen.entry(n).or_insert(0) += 1;
            }
            out.num_repeat = Some(cell.nodes.iter().map(|n| seen[n] - 1).collect());
        }
        if details.write_vtx_id {
            out.vtx_ids = Some(cell.nodes.iter().map(|&n| h64(cluster.id, n as u32)).collect());
        }
        out
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedLocation {
    Original,
    #[default]
    Centroid,
    PathBoundsCenter,
    FirstNode,
    LastNode,
}

/// Seed point as the caller keeps it. `rotation` is a quaternion `(x, y, z, w)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedPoint {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: [f64; 4],
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub area: Option<f64>,
    pub perimeter: Option<f64>,
    pub compactness: Option<f64>,
}

impl SeedPoint {
    pub const IDENTITY_ROTATION: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

    pub fn at(position: Vec3) -> SeedPoint {
        SeedPoint {
            position,
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: SeedPoint::IDENTITY_ROTATION,
            bounds_min: Vec3::new(-1.0, -1.0, -1.0),
            bounds_max: Vec3::new(1.0, 1.0, 1.0),
            area: None,
            perimeter: None,
            compactness: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedMutationDetails {
    pub location: SeedLocation,
    pub match_cell_bounds: bool,
    pub reset_scale: bool,
    pub reset_rotation: bool,
    pub write_area: bool,
    pub write_perimeter: bool,
    pub write_compactness: bool,
}

impl Default for SeedMutationDetails {
    fn default() -> Self {
        SeedMutationDetails {
            location: SeedLocation::Centroid,
            match_cell_bounds: true,
            reset_scale: true,
            reset_rotation: true,
            write_area: false,
            write_perimeter: false,
            write_compactness: false,
        }
    }
}

impl SeedMutationDetails {
    /// Moves and reshapes `seed` to describe `cell`. `cell_points` are the
    /// output positions of the cell, in order.
    pub fn apply(&self, cell: &Cell, seed: &mut SeedPoint, cell_points: &[Vec3]) {
        match self.location {
            SeedLocation::Original => {}
            SeedLocation::Centroid => seed.position = cell.centroid,
            SeedLocation::PathBoundsCenter => seed.position = cell.bounds.center(),
            SeedLocation::FirstNode => {
                if let Some(p) = cell_points.first() {
                    seed.position = *p;
                }
            }
            SeedLocation::LastNode => {
                if let Some(p) = cell_points.last() {
                    seed.position = *p;
                }
            }
        }

        if self.reset_scale {
            seed.scale = Vec3::new(1.0, 1.0, 1.0);
        }
        if self.reset_rotation {
            seed.rotation = SeedPoint::IDENTITY_ROTATION;
        }
        if self.match_cell_bounds && !cell.bounds.is_empty() {
            seed.bounds_min = cell.bounds.min - seed.position;
            seed.bounds_max = cell.bounds.max - seed.position;
        }

        if self.write_area {
            seed.area = Some(cell.area);
        }
        if self.write_perimeter {
            seed.perimeter = Some(cell.perimeter);
        }
        if self.write_compactness {
            seed.compactness = Some(cell.compactness);
        }
    }
}
