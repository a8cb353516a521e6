//! Raycast hit records.

use nalgebra::{Point3, Vector3};

use super::ObjectId;

/// A hit against a mesh's triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRayHit {
    pub hit_point: Point3<f32>,
    pub hit_normal: Vector3<f32>,
    pub hit_enter: f32,
    /// Index of the hit triangle in the host's triangle list.
    pub triangle_index: usize,
}

/// A hit against a terrain collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainRayHit {
    pub hit_point: Point3<f32>,
    pub hit_normal: Vector3<f32>,
    pub hit_enter: f32,
}

/// A hit against a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectRayHit {
    pub hit_object: ObjectId,
    pub hit_point: Point3<f32>,
    pub hit_normal: Vector3<f32>,
    /// Distance from the ray origin to `hit_point`.
    pub hit_enter: f32,
    /// Set when the hit came from a triangle-precise mesh test.
    pub mesh_hit: Option<MeshRayHit>,
}

/// A hit against the scene grid plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRayHit {
    pub hit_point: Point3<f32>,
    pub hit_normal: Vector3<f32>,
    pub hit_enter: f32,
    /// Grid cell containing the hit point, as (x, z) cell coordinates.
    pub cell: (i32, i32),
}

/// Which of the two hits in a [`SceneRayHit`] is nearer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NearestHit<'a> {
    Object(&'a ObjectRayHit),
    Grid(&'a GridRayHit),
}

impl NearestHit<'_> {
    pub fn hit_point(&self) -> Point3<f32> {
        match self {
            Self::Object(hit) => hit.hit_point,
            Self::Grid(hit) => hit.hit_point,
        }
    }

    pub fn hit_normal(&self) -> Vector3<f32> {
        match self {
            Self::Object(hit) => hit.hit_normal,
            Self::Grid(hit) => hit.hit_normal,
        }
    }

    pub fn hit_enter(&self) -> f32 {
        match self {
            Self::Object(hit) => hit.hit_enter,
            Self::Grid(hit) => hit.hit_enter,
        }
    }
}

/// Result of a closest-hit scene raycast: the nearest object hit and the grid
/// hit, each found independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneRayHit {
    pub object_hit: Option<ObjectRayHit>,
    pub grid_hit: Option<GridRayHit>,
}

impl SceneRayHit {
    #[inline]
    pub fn was_anything_hit(&self) -> bool {
        self.object_hit.is_some() || self.grid_hit.is_some()
    }

    #[inline]
    pub fn was_object_hit(&self) -> bool {
        self.object_hit.is_some()
    }

    #[inline]
    pub fn was_grid_hit(&self) -> bool {
        self.grid_hit.is_some()
    }

    /// The nearer of the two hits. An object hit wins a tie.
    pub fn nearest(&self) -> Option<NearestHit<'_>> {
        match (&self.object_hit, &self.grid_hit) {
            (Some(object), Some(grid)) if grid.hit_enter < object.hit_enter => {
                Some(NearestHit::Grid(grid))
            }
            (Some(object), _) => Some(NearestHit::Object(object)),
            (None, Some(grid)) => Some(NearestHit::Grid(grid)),
            (None, None) => None,
        }
    }
}
