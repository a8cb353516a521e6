//! Planes, point classification and ray/segment intersection.

use nalgebra::{Point3, Vector3};

use crate::Ray3D;

/// Distance below which a point counts as lying on a plane.
pub const PLANE_EPSILON: f32 = 1e-5;

/// Side of a plane, relative to its normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    /// Within the classification epsilon.
    OnPlane,
}

/// Where a polygon or triangle lies relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Front,
    Back,
    /// Every vertex is on the plane.
    Coplanar,
    /// Vertices on both sides.
    Spanning,
}

/// An oriented plane `normal · p = offset` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Builds a plane from any non-zero normal; normal and offset are
    /// rescaled together.
    ///
    /// # Panics
    /// If `normal` is zero.
    pub fn new(normal: Vector3<f32>, offset: f32) -> Self {
        let scale = normal.norm();
        assert!(scale > f32::EPSILON, "Plane normal cannot be zero");
        Self {
            normal: normal / scale,
            offset: offset / scale,
        }
    }

    /// The plane through `point` facing `normal`.
    ///
    /// # Panics
    /// If `normal` is zero.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self::try_from_point_and_normal(point, normal).expect("Plane normal cannot be zero")
    }

    /// Fallible [`Plane3D::from_point_and_normal`].
    pub fn try_from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Option<Self> {
        let normal = normal.try_normalize(f32::EPSILON)?;
        Some(Self {
            normal,
            offset: normal.dot(&point.coords),
        })
    }

    /// The plane through `a`, `b` and `c`, facing `(b - a) × (c - a)`.
    ///
    /// # Panics
    /// If the points are collinear.
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self::from_point_and_normal(a, (b - a).cross(&(c - a)))
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Distance of the plane from the origin along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Signed distance from a point to the plane, positive in front.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Side of `point`, with [`PLANE_EPSILON`] tolerance.
    #[inline]
    pub fn classify_point(&self, point: Point3<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    pub fn classify_point_with_epsilon(&self, point: Point3<f32>, epsilon: f32) -> PlaneSide {
        match self.signed_distance(point) {
            d if d > epsilon => PlaneSide::Front,
            d if d < -epsilon => PlaneSide::Back,
            _ => PlaneSide::OnPlane,
        }
    }

    /// The same plane facing the other way.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Closest point on the plane.
    #[inline]
    pub fn project_point(&self, point: Point3<f32>) -> Point3<f32> {
        point - self.normal * self.signed_distance(point)
    }

    /// Intersects the segment `start..end` with the plane.
    ///
    /// Returns the interpolation parameter (0 at `start`, 1 at `end`) and the
    /// intersection point, or `None` when the segment is parallel to the plane
    /// or does not reach it.
    pub fn intersect_segment(
        &self,
        start: Point3<f32>,
        end: Point3<f32>,
    ) -> Option<(f32, Point3<f32>)> {
        let direction = end - start;
        let denom = self.normal.dot(&direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }

        let t = (self.offset - self.normal.dot(&start.coords)) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some((t, start + direction * t))
    }

    /// Intersects a ray with the plane, from either side.
    ///
    /// Returns the distance along the ray, which is never negative.
    pub fn raycast(&self, ray: &Ray3D) -> Option<f32> {
        let denom = self.normal.dot(&ray.direction());
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let t = -self.signed_distance(ray.origin()) / denom;
        (t >= 0.0).then_some(t)
    }
}
