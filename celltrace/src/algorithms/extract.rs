//! Seed policies: which half-edges get traced, and in what bulk.
//!
//! Traces are independent; with the `threads` feature they run on the rayon
//! pool, otherwise in order. Output is sorted so both give the same result.

use std::collections::BTreeMap;

#[cfg(feature = "threads")]
use rayon::prelude::*;
use serde::Serialize;

use crate::algorithms::cell::{Cell, CellResult};
use crate::algorithms::constraints::CellConstraints;
use crate::algorithms::triangulate::{Triangle, TriangulationResult};
use crate::cluster::{Cluster, NodePicking};
use crate::error::CellTraceError;
use crate::geometry::limits;
use crate::geometry::projection::Projection;
use crate::model::{Link, Vec2, Vec3};

/// How many traces ended with each result.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractionStats {
    pub seeds: usize,
    pub counts: BTreeMap<CellResult, usize>,
}

impl ExtractionStats {
    pub fn record(&mut self, result: CellResult) {
        self.seeds += 1;
        *self.counts.entry(result).or_insert(0) += 1;
    }

    pub fn count(&self, result: CellResult) -> usize {
        self.counts.get(&result).copied().unwrap_or(0)
    }

    fn log_summary(&self, what: &str, cluster: &Cluster) {
        log::debug!(
            "{} cluster={} seeds={} success={} duplicate={}",
            what,
            cluster.id,
            self.seeds,
            self.count(CellResult::Success),
            self.count(CellResult::Duplicate)
        );
        let malformed = self.count(CellResult::MalformedCluster);
        if malformed > 0 {
            log::warn!(
                "{}: {} trace(s) on cluster {} hit the loop guard; the graph is likely malformed",
                what,
                malformed,
                cluster.id
            );
        }
    }
}

pub struct CellExtraction {
    pub cells: Vec<Cell>,
    pub stats: ExtractionStats,
}

#[derive(Clone, Debug)]
pub struct SeedOutcome {
    /// Index into the seed list.
    pub seed: usize,
    pub result: CellResult,
    pub cell: Option<Cell>,
}

pub struct ContourExtraction {
    pub outcomes: Vec<SeedOutcome>,
    pub stats: ExtractionStats,
}

impl ContourExtraction {
    /// Seeds that produced a cell.
    pub fn good_seeds(&self) -> Vec<usize> {
        self.outcomes.iter().filter(|o| o.cell.is_some()).map(|o| o.seed).collect()
    }

    pub fn bad_seeds(&self) -> Vec<usize> {
        self.outcomes.iter().filter(|o| o.cell.is_none()).map(|o| o.seed).collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.outcomes.iter().filter_map(|o| o.cell.as_ref())
    }
}

pub struct Surface {
    pub triangles: Vec<Triangle>,
    /// Vertices referenced by at least one triangle, ascending.
    pub used_nodes: Vec<usize>,
    pub stats: ExtractionStats,
    pub failed_triangulations: usize,
}

fn map_all<S, T, F>(items: &[S], f: F) -> Vec<T>
where
    S: Sync,
    T: Send,
    F: Fn(&S) -> T + Sync + Send,
{
    #[cfg(feature = "threads")]
    {
        items.par_iter().map(f).collect()
    }
    #[cfg(not(feature = "threads"))]
    {
        items.iter().map(f).collect()
    }
}

/// Both directions of every valid edge.
pub fn edge_seeds(cluster: &Cluster) -> Vec<Link> {
    let mut seeds = Vec::with_capacity(cluster.num_edges() * 2);
    for e in cluster.edges() {
        if !e.valid {
            continue;
        }
        seeds.push(Link::new(e.start as i32, e.index as i32));
        seeds.push(Link::new(e.end as i32, e.index as i32));
    }
    seeds
}

/// Traces every face of `cluster`.
///
/// When `constraints.omit_wrapping_cell` is set the wrapper is built first,
/// so the outer boundary dedupes against it and near-equal cells are
/// rejected. Accepted cells come back sorted by their node lists.
pub fn find_all_cells(
    cluster: &Cluster,
    projected: &[Vec2],
    constraints: &CellConstraints,
) -> Result<CellExtraction, CellTraceError> {
    cluster.check_projection(projected)?;
    #[cfg(feature = "cell_prof")]
    let t_all = std::time::Instant::now();

    if constraints.omit_wrapping_cell && !constraints.build_wrapper_cell(cluster, projected, None) {
        log::debug!("find_all_cells cluster={} has no wrapper cell", cluster.id);
    }

    let seeds = edge_seeds(cluster);
    #[cfg(feature = "cell_prof")]
    let t_trace = std::time::Instant::now();
    let traced = map_all(&seeds, |seed| {
        let mut cell = Cell::new();
        let result = cell.build_from_cluster(*seed, cluster, projected, constraints);
        (result, (result == CellResult::Success).then_some(cell))
    });
    #[cfg(feature = "cell_prof")]
    let trace_ms = t_trace.elapsed().as_secs_f64() * 1000.0;

    let mut stats = ExtractionStats::default();
    let mut cells = Vec::new();
    for (result, cell) in traced {
        stats.record(result);
        if let Some(cell) = cell {
            cells.push(cell);
        }
    }
    cells.sort_by(|a, b| a.nodes.cmp(&b.nodes));
    stats.log_summary("find_all_cells", cluster);

    #[cfg(feature = "cell_prof")]
    eprintln!(
        "find_all_cells seeds={} trace_ms={:.3} total_ms={:.3}",
        seeds.len(),
        trace_ms,
        t_all.elapsed().as_secs_f64() * 1000.0
    );
    Ok(CellExtraction { cells, stats })
}

/// One trace per seed point, each around the face closest to it.
pub fn find_contours(
    cluster: &Cluster,
    projection: &Projection,
    constraints: &CellConstraints,
    seeds: &[Vec3],
    picking: Option<&NodePicking>,
) -> Result<ContourExtraction, CellTraceError> {
    if seeds.len() > limits::MAX_SEEDS {
        return Err(CellTraceError::LimitExceeded { what: "seeds", max: limits::MAX_SEEDS });
    }
    if let Some(i) = seeds.iter().position(|s| !s.is_finite()) {
        log::debug!("find_contours seed {} is not finite", i);
        return Err(CellTraceError::NonFinite("seed"));
    }
    #[cfg(feature = "cell_prof")]
    let t_all = std::time::Instant::now();

    let projected = projection.project_flat(cluster.positions());
    if constraints.omit_wrapping_cell && !constraints.build_wrapper_cell(cluster, &projected, None) {
        log::debug!("find_contours cluster={} has no wrapper cell", cluster.id);
    }

    let indexed: Vec<(usize, Vec3)> = seeds.iter().copied().enumerate().collect();
    let outcomes = map_all(&indexed, |&(i, at)| {
        let mut cell = Cell::new();
        let result = cell.build_from_seed_position(
            at,
            projection.project(at),
            cluster,
            &projected,
            constraints,
            picking,
        );
        SeedOutcome { seed: i, result, cell: (result == CellResult::Success).then_some(cell) }
    });

    let mut stats = ExtractionStats::default();
    for o in &outcomes {
        stats.record(o.result);
    }
    stats.log_summary("find_contours", cluster);

    #[cfg(feature = "cell_prof")]
    eprintln!(
        "find_contours seeds={} total_ms={:.3}",
        seeds.len(),
        t_all.elapsed().as_secs_f64() * 1000.0
    );
    Ok(ContourExtraction { outcomes, stats })
}

/// Triangulates every accepted cell into one surface, marking the vertices
/// it uses on `cluster`.
pub fn build_surface(
    cluster: &Cluster,
    projected: &[Vec2],
    constraints: &CellConstraints,
) -> Result<Surface, CellTraceError> {
    let extraction = find_all_cells(cluster, projected, constraints)?;
    #[cfg(feature = "cell_prof")]
    let t_tri = std::time::Instant::now();

    cluster.reset_used();
    let parts = map_all(&extraction.cells, |cell| {
        let mut out = Vec::new();
        let r = cell.triangulate_marked(projected, &mut out, Some(cluster));
        (r, out)
    });

    let mut triangles = Vec::new();
    let mut failed_triangulations = 0;
    for (r, part) in parts {
        if r == TriangulationResult::Success {
            triangles.extend(part);
        } else {
            failed_triangulations += 1;
        }
    }
    if failed_triangulations > 0 {
        log::debug!(
            "build_surface cluster={} failed_triangulations={}",
            cluster.id,
            failed_triangulations
        );
    }
    let used_nodes = (0..cluster.num_nodes()).filter(|&n| cluster.is_used(n)).collect();

    #[cfg(feature = "cell_prof")]
    eprintln!(
        "build_surface cells={} triangles={} tri_ms={:.3}",
        extraction.cells.len(),
        triangles.len(),
        t_tri.elapsed().as_secs_f64() * 1000.0
    );
    Ok(Surface { triangles, used_nodes, stats: extraction.stats, failed_triangulations })
}
