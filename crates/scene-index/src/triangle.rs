//! Triangles: the primitive behind mesh-precision raycasts and overlap tests.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::{Classification, Obb, Plane3D, PlaneSide, Ray3D};

/// A triangle in 3D space, defined by three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Point3<f32>; 3],
}

impl Triangle {
    /// Creates a new triangle from three points.
    ///
    /// The winding order determines the normal direction via the right-hand rule:
    /// normal = (b - a) × (c - a)
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Returns the three vertices of the triangle.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }

    /// The (unnormalized) normal, following the winding.
    pub fn normal(&self) -> Vector3<f32> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// The unit normal, `None` for a degenerate triangle.
    pub fn unit_normal(&self) -> Option<Vector3<f32>> {
        self.normal().try_normalize(f32::EPSILON)
    }

    /// Returns the plane that this triangle lies on.
    ///
    /// # Panics
    /// Panics if the triangle is degenerate (vertices are collinear).
    pub fn plane(&self) -> Plane3D {
        let [a, b, c] = self.vertices;
        Plane3D::from_three_points(a, b, c)
    }

    /// Computes the centroid of the triangle.
    pub fn centroid(&self) -> Point3<f32> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Area of the triangle.
    pub fn area(&self) -> f32 {
        self.normal().norm() * 0.5
    }

    /// Maps the vertices through `matrix`.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        Self {
            vertices: self.vertices.map(|v| matrix.transform_point(&v)),
        }
    }

    /// Classifies this triangle relative to a plane.
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        let mut front = 0;
        let mut back = 0;

        for vertex in &self.vertices {
            match plane.classify_point(*vertex) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (0, 0) => Classification::Coplanar,
            (_, 0) => Classification::Front,
            (0, _) => Classification::Back,
            _ => Classification::Spanning,
        }
    }

    /// Möller–Trumbore ray test.
    ///
    /// With `cull_back_faces`, triangles whose front side faces away from the
    /// ray are skipped.
    pub fn raycast(&self, ray: &Ray3D, cull_back_faces: bool) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let [a, b, c] = self.vertices;
        let edge1 = b - a;
        let edge2 = c - a;
        let p = ray.direction().cross(&edge2);
        let det = edge1.dot(&p);

        if cull_back_faces {
            if det < EPSILON {
                return None;
            }
        } else if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = ray.direction().dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    /// Separating axis test against an oriented box.
    ///
    /// The triangle is moved into the box's local frame, where the box is
    /// axis aligned and centered at the origin, and 13 axes are tested:
    /// the 3 box faces, the triangle normal and the 9 edge cross products.
    pub fn intersects_obb(&self, obb: &Obb) -> bool {
        let e = obb.extents();
        let v = self.vertices.map(|p| obb.to_local_point(p));

        let separated_on = |axis: Vector3<f32>| -> bool {
            if axis.norm_squared() < 1e-12 {
                return false;
            }
            let p0 = v[0].dot(&axis);
            let p1 = v[1].dot(&axis);
            let p2 = v[2].dot(&axis);
            let r = e.x * axis.x.abs() + e.y * axis.y.abs() + e.z * axis.z.abs();
            p0.min(p1).min(p2) > r || p0.max(p1).max(p2) < -r
        };

        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];
        let box_axes = [Vector3::x(), Vector3::y(), Vector3::z()];

        for box_axis in &box_axes {
            for edge in &edges {
                if separated_on(box_axis.cross(edge)) {
                    return false;
                }
            }
        }

        for box_axis in box_axes {
            if separated_on(box_axis) {
                return false;
            }
        }

        !separated_on(edges[0].cross(&edges[1]))
    }
}

impl From<Triangle> for Plane3D {
    fn from(triangle: Triangle) -> Self {
        triangle.plane()
    }
}
