//! World transforms of scene objects.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// Position, rotation and lossy scale of a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Point3<f32>,
    /// World rotation.
    pub rotation: UnitQuaternion<f32>,
    /// Lossy world scale; may contain negative components.
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Creates a transform from its parts.
    pub fn new(position: Point3<f32>, rotation: UnitQuaternion<f32>, scale: Vector3<f32>) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// An unrotated, unscaled transform at `position`.
    pub fn from_position(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Translation * rotation * scale.
    pub fn matrix(&self) -> Matrix4<f32> {
        trs_matrix(self.position, self.rotation, self.scale)
    }

    /// Maps a local point into world space.
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.position + self.rotation * point.coords.component_mul(&self.scale)
    }

    /// Maps a local direction into world space, applying rotation and scale.
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * vector.component_mul(&self.scale)
    }

    /// Inverse of [`Transform::matrix`], `None` if any scale component is zero.
    pub fn inverse_matrix(&self) -> Option<Matrix4<f32>> {
        self.matrix().try_inverse()
    }
}

/// Builds a translation * rotation * scale matrix.
pub fn trs_matrix(
    translation: Point3<f32>,
    rotation: UnitQuaternion<f32>,
    scale: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::new_translation(&translation.coords)
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(&scale)
}
