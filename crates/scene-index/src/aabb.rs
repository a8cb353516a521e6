//! Axis-aligned bounding boxes.

use nalgebra::{Point3, Vector3};

use crate::{BoxFace, Plane3D, Ray3D};

/// An axis-aligned box given by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from two corners, sorting components so `min <= max`.
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Creates a box from its center and full size.
    pub fn from_center_size(center: Point3<f32>, size: Vector3<f32>) -> Self {
        let extents = size.abs() * 0.5;
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for point in points {
            aabb.encapsulate_point(point);
        }
        Some(aabb)
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Full size along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Half size along each axis.
    #[inline]
    pub fn extents(&self) -> Vector3<f32> {
        self.size() * 0.5
    }

    /// Volume of the box.
    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Grows the box to include `point`.
    pub fn encapsulate_point(&mut self, point: Point3<f32>) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grows the box to include `other`.
    pub fn encapsulate_aabb(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Returns the union of two boxes.
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = *self;
        merged.encapsulate_aabb(other);
        merged
    }

    /// Returns the box grown by `amount` on every side.
    pub fn inflated(&self, amount: f32) -> Self {
        let delta = Vector3::repeat(amount);
        Self::new(self.min - delta, self.max + delta)
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// True if the boxes overlap or touch.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Slab test. Returns the entry distance, or `0` when the ray starts inside.
    pub fn raycast(&self, ray: &Ray3D) -> Option<f32> {
        let (t_enter, t_exit) =
            slab_interval(&self.min, &self.max, &ray.origin(), &ray.direction())?;
        (t_exit >= 0.0).then_some(t_enter.max(0.0))
    }

    /// The eight corners; bit 0 of the index selects max X, bit 1 max Y, bit 2 max Z.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// The six face planes with normals pointing into the box, in [`BoxFace::ALL`] order.
    pub fn face_planes(&self) -> [Plane3D; 6] {
        BoxFace::ALL.map(|face| {
            let on_face = if face.sign() > 0.0 { self.max } else { self.min };
            Plane3D::from_point_and_normal(on_face, -face.local_normal())
        })
    }
}

/// Intersects the ray `origin + t * direction` with the slabs of `min..max`.
///
/// Returns `(t_enter, t_exit)` with `t_enter <= t_exit`; either may be negative.
/// `direction` does not need to be normalized.
pub(crate) fn slab_interval(
    min: &Point3<f32>,
    max: &Point3<f32>,
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
) -> Option<(f32, f32)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for i in 0..3 {
        if direction[i].abs() < 1e-8 {
            if origin[i] < min[i] || origin[i] > max[i] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction[i];
        let mut t0 = (min[i] - origin[i]) * inv;
        let mut t1 = (max[i] - origin[i]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some((t_enter, t_exit))
}
