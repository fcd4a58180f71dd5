use serde::{Deserialize, Serialize};

use crate::error::CellTraceError;
use crate::model::{Vec2, Vec3};

/// Flat projection onto the plane orthogonal to `normal`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub normal: Vec3,
}

impl Default for Projection {
    fn default() -> Self {
        Projection { normal: Vec3::UP }
    }
}

impl Projection {
    pub fn new(normal: Vec3) -> Result<Projection, CellTraceError> {
        if !normal.is_finite() || normal.safe_normal() == Vec3::ZERO {
            return Err(CellTraceError::InvalidNormal);
        }
        Ok(Projection { normal })
    }

    /// Orthonormal in-plane axes `(u, v)` with `u × v == normal`.
    fn basis(&self) -> (Vec3, Vec3) {
        let n = self.normal.safe_normal();
        if n == Vec3::ZERO || (n.x.abs() < 1e-12 && n.y.abs() < 1e-12) {
            // +Z or -Z: keep x as u so the default projection is a plain drop of z.
            let flip = if n.z < 0.0 { -1.0 } else { 1.0 };
            return (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, flip, 0.0));
        }
        let helper = if n.z.abs() < 0.9 { Vec3::UP } else { Vec3::new(1.0, 0.0, 0.0) };
        let u = helper.cross(n).safe_normal();
        let v = n.cross(u);
        (u, v)
    }

    pub fn project(&self, p: Vec3) -> Vec2 {
        let (u, v) = self.basis();
        Vec2::new(p.dot(u), p.dot(v))
    }

    pub fn project_flat(&self, positions: &[Vec3]) -> Vec<Vec2> {
        let (u, v) = self.basis();
        positions.iter().map(|p| Vec2::new(p.dot(u), p.dot(v))).collect()
    }
}
