//! Volumes that can bound a subtree.

use std::fmt::Debug;

use nalgebra::Point3;

use crate::{Aabb, Obb, Ray3D, Sphere};

/// A bounding volume stored in [`VolumeTree`](super::VolumeTree) nodes.
///
/// Internal nodes hold the merge of their children's volumes, so `merged`
/// must return a volume that [`encloses`](BoundingVolume::encloses) both
/// inputs.
pub trait BoundingVolume: Copy + Debug {
    /// Center used by the insertion heuristics.
    fn center(&self) -> Point3<f32>;

    /// Radius of the sphere around [`center`](BoundingVolume::center) that
    /// encloses the volume.
    fn radius(&self) -> f32;

    /// The smallest volume of this kind enclosing both volumes.
    fn merged(&self, other: &Self) -> Self;

    /// True if `other` lies completely inside this volume.
    fn encloses(&self, other: &Self) -> bool;

    /// Broad-phase test against an oriented query box.
    fn intersects_obb(&self, obb: &Obb) -> bool;

    /// Entry distance of `ray`, `0` when it starts inside.
    fn raycast(&self, ray: &Ray3D) -> Option<f32>;
}

impl BoundingVolume for Sphere {
    #[inline]
    fn center(&self) -> Point3<f32> {
        self.center
    }

    #[inline]
    fn radius(&self) -> f32 {
        self.radius
    }

    fn merged(&self, other: &Self) -> Self {
        Sphere::merged(self, other)
    }

    fn encloses(&self, other: &Self) -> bool {
        Sphere::encloses(self, other)
    }

    fn intersects_obb(&self, obb: &Obb) -> bool {
        Sphere::intersects_obb(self, obb)
    }

    fn raycast(&self, ray: &Ray3D) -> Option<f32> {
        Sphere::raycast(self, ray)
    }
}

impl BoundingVolume for Aabb {
    #[inline]
    fn center(&self) -> Point3<f32> {
        Aabb::center(self)
    }

    #[inline]
    fn radius(&self) -> f32 {
        self.extents().norm()
    }

    fn merged(&self, other: &Self) -> Self {
        Aabb::merged(self, other)
    }

    fn encloses(&self, other: &Self) -> bool {
        self.contains_aabb(other)
    }

    // Exact box against box, not a sphere approximation.
    fn intersects_obb(&self, obb: &Obb) -> bool {
        Obb::from_aabb(self).intersects_obb(obb)
    }

    fn raycast(&self, ray: &Ray3D) -> Option<f32> {
        Aabb::raycast(self, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};
    use std::f32::consts::FRAC_PI_4;

    fn make_aabb(min: [f32; 3], max: [f32; 3]) -> Aabb {
        Aabb::new(Point3::from(min), Point3::from(max))
    }

    #[test]
    fn sphere_merge_encloses_inputs() {
        let a = Sphere::new(Point3::new(-2.0, 0.0, 0.0), 1.0);
        let b = Sphere::new(Point3::new(3.0, 1.0, 0.0), 0.5);
        let merged = BoundingVolume::merged(&a, &b);
        assert!(BoundingVolume::encloses(&merged, &a));
        assert!(BoundingVolume::encloses(&merged, &b));
    }

    #[test]
    fn aabb_radius_is_half_diagonal() {
        let aabb = make_aabb([0.0; 3], [2.0, 2.0, 2.0]);
        assert_relative_eq!(BoundingVolume::radius(&aabb), 3.0f32.sqrt());
        assert_relative_eq!(BoundingVolume::center(&aabb), Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn aabb_obb_test_is_exact() {
        let aabb = make_aabb([-1.0; 3], [1.0; 3]);
        // Rotated query box whose corner region would overlap a bounding sphere
        // but not the box itself.
        let query = Obb::new(
            Point3::new(1.5, 1.5, 0.0),
            Vector3::repeat(1.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_4),
        );
        assert!(!BoundingVolume::intersects_obb(&aabb, &query));
        assert!(Sphere::from_aabb(&aabb).intersects_obb(&query));
    }
}
