pub mod model;
pub mod error;
pub mod cluster;
pub mod artifacts;
pub mod geometry {
    pub mod limits;
    pub mod math;
    pub mod polygon;
    pub mod projection;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod cell;
    pub mod constraints;
    pub mod extract;
    pub mod holes;
    pub mod triangulate;
}
mod json;

pub use algorithms::cell::{Cell, CellResult};
pub use algorithms::constraints::{CellConstraints, CellConstraintsDetails};
pub use algorithms::extract::{
    build_surface, find_all_cells, find_contours, CellExtraction, ContourExtraction, ExtractionStats,
    Surface,
};
pub use algorithms::holes::Holes;
pub use algorithms::triangulate::{Triangle, TriangulationResult};
pub use cluster::{ClosestSearchMode, Cluster, NodePicking};
pub use error::CellTraceError;
pub use geometry::projection::Projection;
pub use model::{AspectFilter, Link, Vec2, Vec3, Winding};

/// Projects `cluster` with `projection` and extracts its cells under
/// `details`.
pub fn extract_cells(
    cluster: &Cluster,
    projection: &Projection,
    details: &CellConstraintsDetails,
) -> Result<CellExtraction, CellTraceError> {
    let projected = projection.project_flat(cluster.positions());
    let constraints = CellConstraints::from_details(details);
    find_all_cells(cluster, &projected, &constraints)
}
