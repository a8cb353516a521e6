//! Circles in the plane and in space.

use nalgebra::{Point2, Point3, Vector3};

use crate::{Plane3D, Ray3D, PLANE_EPSILON};

/// A circle in 2D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle2D {
    /// Center point.
    pub center: Point2<f32>,
    /// Radius.
    pub radius: f32,
}

impl Circle2D {
    /// Creates a circle; a negative radius is made positive.
    pub fn new(center: Point2<f32>, radius: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, point: Point2<f32>) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// True if the circles touch or overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).norm_squared() <= reach * reach
    }
}

/// A flat disc in 3D: center, plane normal and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle3D {
    center: Point3<f32>,
    normal: Vector3<f32>,
    radius: f32,
}

impl Circle3D {
    /// Creates a disc, `None` if `normal` has zero length.
    pub fn new(center: Point3<f32>, normal: Vector3<f32>, radius: f32) -> Option<Self> {
        Some(Self {
            center,
            normal: normal.try_normalize(f32::EPSILON)?,
            radius: radius.abs(),
        })
    }

    /// Center point.
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Unit normal.
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The plane the disc lies on.
    pub fn plane(&self) -> Plane3D {
        Plane3D::from_point_and_normal(self.center, self.normal)
    }

    /// True if `point` lies on the disc's plane and within the radius.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.plane().signed_distance(point).abs() <= PLANE_EPSILON
            && (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Distance along `ray` to the disc.
    pub fn raycast(&self, ray: &Ray3D) -> Option<f32> {
        let t = self.plane().raycast(ray)?;
        let hit = ray.point_at(t);
        ((hit - self.center).norm_squared() <= self.radius * self.radius).then_some(t)
    }
}
