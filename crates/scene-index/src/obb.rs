//! Oriented bounding boxes.
//!
//! An [`Obb`] is the workhorse of every precise scene query: object bounds are
//! computed as OBBs from live transforms, overlap queries test OBB against OBB
//! with the separating axis theorem, and box-precision raycasts go through
//! [`Obb::raycast`].
//!
//! A default constructed box is *invalid*. Consumers must check
//! [`Obb::is_valid`] before using a box obtained from a bounds computation;
//! the operations themselves never panic and simply produce degenerate
//! results for invalid input.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use crate::aabb::slab_interval;
use crate::transform::trs_matrix;
use crate::{Aabb, BoxFace, Ray3D, Transform};

/// Added to every `|R|` entry in the SAT test so near-parallel edge pairs do
/// not produce a degenerate cross-product axis.
pub const SAT_EPSILON: f32 = 1e-4;

/// Tolerance used by point containment.
pub const CONTAINS_EPSILON: f32 = 1e-4;

/// Sizes are floor-clamped to this value before inverting the box transform.
const MIN_RAYCAST_SIZE: f32 = 1e-5;

/// A box with arbitrary rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    center: Point3<f32>,
    size: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
    is_valid: bool,
}

impl Default for Obb {
    fn default() -> Self {
        Self::invalid()
    }
}

impl Obb {
    /// Creates a valid box. Negative size components are made positive.
    pub fn new(center: Point3<f32>, size: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            center,
            size: size.abs(),
            rotation,
            is_valid: true,
        }
    }

    /// A zero-size box flagged invalid.
    pub fn invalid() -> Self {
        Self {
            center: Point3::origin(),
            size: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            is_valid: false,
        }
    }

    /// A box centered at the origin.
    pub fn from_size_rotation(size: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self::new(Point3::origin(), size, rotation)
    }

    /// An unrotated box covering `aabb`.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), aabb.size(), UnitQuaternion::identity())
    }

    /// Maps a model-space `aabb` into world space through `transform`.
    ///
    /// The size is scaled by the absolute lossy scale, so mirrored objects still
    /// produce a box with non-negative size.
    pub fn from_aabb_transformed(aabb: &Aabb, transform: &Transform) -> Self {
        Self::new(
            transform.transform_point(&aabb.center()),
            aabb.size().component_mul(&transform.scale.abs()),
            transform.rotation,
        )
    }

    /// The minimal box around the segment `start..end` with the given thickness.
    ///
    /// The box's look axis runs along the segment.
    pub fn from_segment(start: Point3<f32>, end: Point3<f32>, thickness: f32) -> Self {
        let center = nalgebra::center(&start, &end);
        let segment = end - start;
        let length = segment.norm();
        if length < f32::EPSILON {
            return Self::new(center, Vector3::repeat(thickness), UnitQuaternion::identity());
        }

        let look = segment / length;
        let up = if look.y.abs() > 0.99 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        Self::new(
            center,
            Vector3::new(thickness, thickness, length),
            UnitQuaternion::face_towards(&look, &up),
        )
    }

    /// Whether this box came from a successful bounds computation.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Sets the center.
    #[inline]
    pub fn set_center(&mut self, center: Point3<f32>) {
        self.center = center;
    }

    /// Full size along the local axes.
    #[inline]
    pub fn size(&self) -> Vector3<f32> {
        self.size
    }

    /// Sets the size; negative components are made positive.
    #[inline]
    pub fn set_size(&mut self, size: Vector3<f32>) {
        self.size = size.abs();
    }

    /// Rotation of the local axes.
    #[inline]
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    /// Sets the rotation.
    #[inline]
    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.rotation = rotation;
    }

    /// Half size.
    #[inline]
    pub fn extents(&self) -> Vector3<f32> {
        self.size * 0.5
    }

    /// Local +X in world space.
    #[inline]
    pub fn right(&self) -> Vector3<f32> {
        self.rotation * Vector3::x()
    }

    /// Local +Y in world space.
    #[inline]
    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }

    /// Local +Z in world space.
    #[inline]
    pub fn look(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    /// `[right, up, look]`.
    #[inline]
    pub fn axes(&self) -> [Vector3<f32>; 3] {
        [self.right(), self.up(), self.look()]
    }

    /// `center - extents`. Only meaningful together with the rotation.
    #[inline]
    pub fn min(&self) -> Point3<f32> {
        self.center - self.extents()
    }

    /// `center + extents`. Only meaningful together with the rotation.
    #[inline]
    pub fn max(&self) -> Point3<f32> {
        self.center + self.extents()
    }

    /// Volume of the box.
    pub fn volume(&self) -> f32 {
        self.size.x * self.size.y * self.size.z
    }

    /// The box grown by `amount` along every local axis (`size + amount`).
    pub fn inflated(&self, amount: f32) -> Self {
        Self {
            size: (self.size + Vector3::repeat(amount)).map(|s| s.max(0.0)),
            ..*self
        }
    }

    /// Translation * rotation * size, mapping the unit cube onto this box.
    pub fn trs_matrix(&self) -> Matrix4<f32> {
        trs_matrix(self.center, self.rotation, self.size)
    }

    /// World-space corners; bit 0 of the index selects +X, bit 1 +Y, bit 2 +Z.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let [right, up, look] = self.axes();
        let e = self.extents();
        std::array::from_fn(|i| {
            let sx = if i & 1 == 0 { -e.x } else { e.x };
            let sy = if i & 2 == 0 { -e.y } else { e.y };
            let sz = if i & 4 == 0 { -e.z } else { e.z };
            self.center + right * sx + up * sy + look * sz
        })
    }

    /// Smallest axis-aligned box containing the corners.
    pub fn enclosing_aabb(&self) -> Aabb {
        let [right, up, look] = self.axes();
        let e = self.extents();
        let half = right.abs() * e.x + up.abs() * e.y + look.abs() * e.z;
        Aabb {
            min: self.center - half,
            max: self.center + half,
        }
    }

    /// Coordinates of `point` along the local axes, relative to the center.
    pub fn to_local_point(&self, point: Point3<f32>) -> Vector3<f32> {
        let offset = point - self.center;
        let [right, up, look] = self.axes();
        Vector3::new(offset.dot(&right), offset.dot(&up), offset.dot(&look))
    }

    /// Inverse of [`Obb::to_local_point`].
    pub fn to_world_point(&self, local: &Vector3<f32>) -> Point3<f32> {
        self.center + self.rotation * local
    }

    /// Separating axis test against another box.
    ///
    /// Tests the 3 face axes of each box and the 9 edge cross products,
    /// returning as soon as one of them separates the boxes.
    pub fn intersects_obb(&self, other: &Self) -> bool {
        let a = self.axes();
        let b = other.axes();
        let ea = self.extents();
        let eb = other.extents();

        let mut r = [[0.0_f32; 3]; 3];
        let mut abs_r = [[0.0_f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i][j] = a[i].dot(&b[j]);
                abs_r[i][j] = r[i][j].abs() + SAT_EPSILON;
            }
        }

        let offset = other.center - self.center;
        let t = [offset.dot(&a[0]), offset.dot(&a[1]), offset.dot(&a[2])];

        for i in 0..3 {
            let ra = ea[i];
            let rb = eb[0] * abs_r[i][0] + eb[1] * abs_r[i][1] + eb[2] * abs_r[i][2];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        for j in 0..3 {
            let ra = ea[0] * abs_r[0][j] + ea[1] * abs_r[1][j] + ea[2] * abs_r[2][j];
            let rb = eb[j];
            let d = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if d.abs() > ra + rb {
                return false;
            }
        }

        // A[i] x B[j]
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ea[i1] * abs_r[i2][j] + ea[i2] * abs_r[i1][j];
                let rb = eb[j1] * abs_r[i][j2] + eb[j2] * abs_r[i][j1];
                let d = t[i2] * r[i1][j] - t[i1] * r[i2][j];
                if d.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }

    /// Intersects a ray with the box.
    ///
    /// The ray is mapped into the box's unit-cube space through the inverse
    /// TRS matrix, tested there, and the hit point mapped back so the returned
    /// distance is measured in world units. A ray starting inside the box
    /// reports `0`.
    pub fn raycast(&self, ray: &Ray3D) -> Option<f32> {
        let size = self.size.map(|s| s.max(MIN_RAYCAST_SIZE));
        let unit_cube = Transform::new(self.center, self.rotation, size);
        let inverse = unit_cube.inverse_matrix()?;

        let local = ray.transformed(&inverse);
        let (t_enter, t_exit) = slab_interval(
            &Point3::new(-0.5, -0.5, -0.5),
            &Point3::new(0.5, 0.5, 0.5),
            &local.origin,
            &local.direction,
        )?;
        if t_exit < 0.0 {
            return None;
        }

        let local_hit = local.point_at(t_enter.max(0.0));
        let world_hit = unit_cube.transform_point(&local_hit);
        Some((world_hit - ray.origin()).norm())
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.contains_point_masked(point, Vector3::new(1, 1, 1))
    }

    /// Point containment that only checks axes whose `mask` component is non-zero.
    pub fn contains_point_masked(&self, point: Point3<f32>, mask: Vector3<i32>) -> bool {
        let local = self.to_local_point(point);
        let e = self.extents();
        (0..3).all(|i| mask[i] == 0 || local[i].abs() <= e[i] + CONTAINS_EPSILON)
    }

    /// Closest point on or inside the box.
    pub fn calc_closest_point(&self, point: Point3<f32>) -> Point3<f32> {
        let local = self.to_local_point(point);
        let e = self.extents();
        let clamped = Vector3::from_fn(|i, _| local[i].clamp(-e[i], e[i]));
        self.to_world_point(&clamped)
    }

    /// Grows the box along its local axes just enough to contain `point`.
    ///
    /// The face opposite to each growing face stays where it is. An invalid box
    /// becomes a valid zero-size box at `point`.
    pub fn enclose_point(&mut self, point: Point3<f32>) {
        if !self.is_valid {
            self.center = point;
            self.size = Vector3::zeros();
            self.is_valid = true;
            return;
        }

        let local = self.to_local_point(point);
        let mut e = self.extents();
        let mut shift = Vector3::zeros();
        for i in 0..3 {
            if local[i] > e[i] {
                let grow = (local[i] - e[i]) * 0.5;
                e[i] += grow;
                shift[i] += grow;
            } else if local[i] < -e[i] {
                let grow = (-e[i] - local[i]) * 0.5;
                e[i] += grow;
                shift[i] -= grow;
            }
        }

        self.center += self.rotation * shift;
        self.size = e * 2.0;
    }

    /// Grows the box to contain all corners of `other`. Invalid boxes are ignored.
    pub fn enclose_obb(&mut self, other: &Self) {
        if !other.is_valid {
            return;
        }
        for corner in other.corners() {
            self.enclose_point(corner);
        }
    }

    /// Clips this box against `clip`, assuming both share the same rotation.
    ///
    /// Along each clip axis the box is shrunk to the clip slab. A box lying
    /// entirely outside a slab collapses to zero size on that axis, with its
    /// center moved onto the violated boundary; it stays valid.
    pub fn clip_to_aligned_obb(&mut self, clip: &Self) {
        let clip_axes = clip.axes();
        let clip_extents = clip.extents();
        let mut e = self.extents();

        for (i, axis) in clip_axes.iter().enumerate() {
            let c = clip.center.coords.dot(axis);
            let s = self.center.coords.dot(axis);
            let (lo, hi) = (s - e[i], s + e[i]);
            let (clip_lo, clip_hi) = (c - clip_extents[i], c + clip_extents[i]);

            if lo > clip_hi {
                e[i] = 0.0;
                self.center += axis * (clip_hi - s);
            } else if hi < clip_lo {
                e[i] = 0.0;
                self.center += axis * (clip_lo - s);
            } else {
                let new_lo = lo.max(clip_lo);
                let new_hi = hi.min(clip_hi);
                e[i] = (new_hi - new_lo) * 0.5;
                self.center += axis * ((new_lo + new_hi) * 0.5 - s);
            }
        }

        self.size = e * 2.0;
    }

    /// World-space center of `face`.
    pub fn face_center(&self, face: BoxFace) -> Point3<f32> {
        let axis = face.axis_index();
        self.center + self.axes()[axis] * (face.sign() * self.extents()[axis])
    }

    /// World-space outward normal of `face`.
    pub fn face_normal(&self, face: BoxFace) -> Vector3<f32> {
        self.rotation * face.local_normal()
    }

    /// The face whose plane lies closest to `point`.
    pub fn closest_face(&self, point: Point3<f32>) -> BoxFace {
        let local = self.to_local_point(point);
        let e = self.extents();
        let mut best = BoxFace::Front;
        let mut best_distance = f32::INFINITY;
        for face in BoxFace::ALL {
            let axis = face.axis_index();
            let distance = (local[axis] - face.sign() * e[axis]).abs();
            if distance < best_distance {
                best_distance = distance;
                best = face;
            }
        }
        best
    }

    /// A slab of thickness `amount` lying inside the box against `face`.
    pub fn calc_inward_face_extrusion(&self, face: BoxFace, amount: f32) -> Self {
        self.face_extrusion(face, amount, -0.5)
    }

    /// A slab of thickness `amount` lying outside the box against `face`.
    pub fn calc_outward_face_extrusion(&self, face: BoxFace, amount: f32) -> Self {
        self.face_extrusion(face, amount, 0.5)
    }

    /// A slab of thickness `amount` centered on `face`.
    pub fn calc_face_extrusion_from_face_center(&self, face: BoxFace, amount: f32) -> Self {
        self.face_extrusion(face, amount, 0.0)
    }

    fn face_extrusion(&self, face: BoxFace, amount: f32, offset: f32) -> Self {
        let amount = amount.abs();
        let mut size = self.size;
        size[face.axis_index()] = amount;
        let center = self.face_center(face) + self.face_normal(face) * (amount * offset);
        Self {
            center,
            size,
            rotation: self.rotation,
            is_valid: self.is_valid,
        }
    }
}
