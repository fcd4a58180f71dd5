use parking_lot::RwLock;

use crate::geometry::polygon::{point_in_polygon, polygon_bbox, bbox_contains};
use crate::geometry::projection::Projection;
use crate::model::{Vec2, Vec3};

/// Areas a cell must not overlap.
///
/// Hole points may be given in world space; they are projected on first use
/// and cached. Concurrent traces share the cache.
pub struct Holes {
    polygons: Vec<Vec<Vec2>>,
    world_points: Vec<Vec3>,
    projection: Projection,
    projected: RwLock<Option<Vec<Vec2>>>,
}

impl Holes {
    pub fn from_polygons(polygons: Vec<Vec<Vec2>>) -> Holes {
        Holes {
            polygons,
            world_points: Vec::new(),
            projection: Projection::default(),
            projected: RwLock::new(Some(Vec::new())),
        }
    }

    pub fn from_points(points: Vec<Vec3>, projection: Projection) -> Holes {
        Holes {
            polygons: Vec::new(),
            world_points: points,
            projection,
            projected: RwLock::new(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.world_points.is_empty()
    }

    fn any_point_in(points: &[Vec2], polygon: &[Vec2]) -> bool {
        if points.is_empty() {
            return false;
        }
        let bbox = polygon_bbox(polygon);
        points
            .iter()
            .any(|p| bbox_contains(bbox, *p) && point_in_polygon(*p, polygon))
    }

    fn points_overlap(&self, polygon: &[Vec2]) -> bool {
        {
            let read = self.projected.read();
            if let Some(points) = read.as_ref() {
                return Self::any_point_in(points, polygon);
            }
        }
        let mut write = self.projected.write();
        if write.is_none() {
            *write = Some(self.projection.project_flat(&self.world_points));
        }
        write
            .as_ref()
            .map_or(false, |points| Self::any_point_in(points, polygon))
    }

    /// True when a hole point lies inside `polygon`, a hole polygon has a
    /// vertex inside it, or `polygon` has a vertex inside a hole polygon.
    pub fn overlaps(&self, polygon: &[Vec2]) -> bool {
        if self.points_overlap(polygon) {
            return true;
        }
        self.polygons.iter().any(|hole| {
            Self::any_point_in(hole, polygon) || Self::any_point_in(polygon, hole)
        })
    }
}
