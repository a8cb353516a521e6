//! Rays used by picking and raycast queries.

use nalgebra::{Matrix4, Point3, Vector3};

/// A half-line with an origin and a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3D {
    origin: Point3<f32>,
    direction: Vector3<f32>,
}

impl Ray3D {
    /// Creates a ray, normalizing `direction`.
    ///
    /// # Panics
    /// Panics if the direction has zero length.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self::try_new(origin, direction).expect("Ray direction cannot be zero")
    }

    /// Creates a ray, returning `None` for a zero-length direction.
    pub fn try_new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    /// Builds a ray from an origin towards a target point.
    pub fn towards(origin: Point3<f32>, target: Point3<f32>) -> Option<Self> {
        Self::try_new(origin, target - origin)
    }

    /// Returns the ray origin.
    #[inline]
    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    /// Returns the unit direction.
    #[inline]
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    /// Returns the point at distance `t` along the ray.
    #[inline]
    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Transforms origin and direction by `matrix`.
    ///
    /// The direction is **not** renormalized, so distances measured along the
    /// returned ray are in the target space's units.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> TransformedRay {
        TransformedRay {
            origin: matrix.transform_point(&self.origin),
            direction: matrix.transform_vector(&self.direction),
        }
    }
}

/// A ray mapped into another space with an unnormalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedRay {
    /// Origin in the target space.
    pub origin: Point3<f32>,
    /// Direction in the target space, possibly scaled.
    pub direction: Vector3<f32>,
}

impl TransformedRay {
    /// Returns the point at parameter `t`.
    #[inline]
    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}
