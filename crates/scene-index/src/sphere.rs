//! Bounding spheres.

use nalgebra::Point3;

use crate::{Aabb, Obb, Ray3D};

/// Relative slack allowed by [`Sphere::encloses`] to absorb merge round-off.
const ENCLOSE_TOLERANCE: f32 = 1e-4;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center point.
    pub center: Point3<f32>,
    /// Radius, never negative.
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere; a negative radius is made positive.
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// The sphere circumscribing `obb`.
    pub fn from_obb(obb: &Obb) -> Self {
        Self::new(obb.center(), obb.extents().norm())
    }

    /// The sphere circumscribing `aabb`.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), aabb.extents().norm())
    }

    /// The smallest sphere enclosing both spheres.
    pub fn merged(&self, other: &Self) -> Self {
        let offset = other.center - self.center;
        let distance = offset.norm();
        if distance + other.radius <= self.radius {
            return *self;
        }
        if distance + self.radius <= other.radius {
            return *other;
        }

        let radius = (distance + self.radius + other.radius) * 0.5;
        let center = self.center + offset * ((radius - self.radius) / distance);
        Self { center, radius }
    }

    /// True if `other` lies inside this sphere, up to a small relative tolerance.
    pub fn encloses(&self, other: &Self) -> bool {
        let distance = (other.center - self.center).norm();
        distance + other.radius <= self.radius + ENCLOSE_TOLERANCE * self.radius.max(1.0)
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// True if the sphere touches or overlaps `obb`.
    pub fn intersects_obb(&self, obb: &Obb) -> bool {
        self.contains_point(obb.calc_closest_point(self.center))
    }

    /// Entry distance of `ray`, `0` when the ray starts inside.
    pub fn raycast(&self, ray: &Ray3D) -> Option<f32> {
        let to_center = self.center - ray.origin();
        let c = to_center.norm_squared() - self.radius * self.radius;
        if c <= 0.0 {
            return Some(0.0);
        }

        let b = to_center.dot(&ray.direction());
        if b < 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        Some(b - discriminant.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    fn sphere(x: f32, y: f32, z: f32, r: f32) -> Sphere {
        Sphere::new(Point3::new(x, y, z), r)
    }

    #[test]
    fn merged_encloses_both() {
        let a = sphere(0.0, 0.0, 0.0, 1.0);
        let b = sphere(4.0, 0.0, 0.0, 1.0);
        let m = a.merged(&b);
        assert_relative_eq!(m.center, Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(m.radius, 3.0);
        assert!(m.encloses(&a));
        assert!(m.encloses(&b));
    }

    #[test]
    fn merged_with_contained_sphere_is_identity() {
        let big = sphere(0.0, 0.0, 0.0, 5.0);
        let small = sphere(1.0, 1.0, 0.0, 0.5);
        assert_eq!(big.merged(&small), big);
        assert_eq!(small.merged(&big), big);
    }

    #[test]
    fn from_obb_circumscribes_corners() {
        let obb = Obb::new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(2.0, 4.0, 1.0),
            UnitQuaternion::from_euler_angles(0.3, 0.2, 0.1),
        );
        let s = Sphere::from_obb(&obb);
        for corner in obb.corners() {
            assert!(Sphere::new(s.center, s.radius + 1e-4).contains_point(corner));
        }
    }

    #[test]
    fn raycast_hits_front_surface() {
        let s = sphere(5.0, 0.0, 0.0, 1.0);
        let ray = Ray3D::new(Point3::origin(), Vector3::x());
        assert_relative_eq!(s.raycast(&ray).unwrap(), 4.0);

        let away = Ray3D::new(Point3::origin(), -Vector3::x());
        assert!(s.raycast(&away).is_none());

        let inside = Ray3D::new(Point3::new(5.5, 0.0, 0.0), Vector3::y());
        assert_eq!(s.raycast(&inside), Some(0.0));
    }

    #[test]
    fn intersects_obb_uses_closest_point() {
        let obb = Obb::new(Point3::origin(), Vector3::repeat(2.0), UnitQuaternion::identity());
        assert!(sphere(1.5, 0.0, 0.0, 0.6).intersects_obb(&obb));
        assert!(!sphere(1.5, 1.5, 0.0, 0.6).intersects_obb(&obb));
    }
}
