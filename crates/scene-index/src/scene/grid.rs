//! The horizontal placement grid.

use nalgebra::{Point3, Vector3};

use crate::config::GridConfig;
use crate::{Plane3D, Ray3D};

use super::GridRayHit;

/// An infinite horizontal grid at a fixed height, divided into square cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneGrid {
    height: f32,
    cell_size: f32,
}

impl SceneGrid {
    /// Creates a grid; a non-positive cell size is replaced by 1.
    pub fn new(height: f32, cell_size: f32) -> Self {
        Self {
            height,
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.height, config.cell_size)
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn plane(&self) -> Plane3D {
        Plane3D::new(Vector3::y(), self.height)
    }

    /// The (x, z) cell containing `point`.
    pub fn cell_at(&self, point: Point3<f32>) -> (i32, i32) {
        (
            (point.x / self.cell_size).floor() as i32,
            (point.z / self.cell_size).floor() as i32,
        )
    }

    /// World center of a cell, on the grid plane.
    pub fn cell_center(&self, cell: (i32, i32)) -> Point3<f32> {
        Point3::new(
            (cell.0 as f32 + 0.5) * self.cell_size,
            self.height,
            (cell.1 as f32 + 0.5) * self.cell_size,
        )
    }

    /// Hits the grid plane from either side. The normal faces the ray origin.
    pub fn raycast(&self, ray: &Ray3D) -> Option<GridRayHit> {
        let plane = self.plane();
        let t = plane.raycast(ray)?;
        let hit_point = ray.point_at(t);
        let hit_normal = if plane.signed_distance(ray.origin()) >= 0.0 {
            Vector3::y()
        } else {
            -Vector3::y()
        };
        Some(GridRayHit {
            hit_point,
            hit_normal,
            hit_enter: t,
            cell: self.cell_at(hit_point),
        })
    }
}

impl Default for SceneGrid {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}
