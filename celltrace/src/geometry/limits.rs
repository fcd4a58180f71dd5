// Centralized ingestion limits to harden against untrusted input (JSON)

// Cluster size caps
pub const MAX_NODES: usize = 2_000_000;
pub const MAX_EDGES: usize = 6_000_000;

// Seed caps for contour searches
pub const MAX_SEEDS: usize = 1_000_000;

// Numeric bounds
pub const COORD_MIN: f64 = -1.0e12;
pub const COORD_MAX: f64 = 1.0e12;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }
