//! Convex polygons used when trimming shapes to scene bounds.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Classification, Plane3D, PlaneSide, Triangle};

/// Planar convex outline, stored as its corner points in order.
///
/// Seen from the side the normal faces, the corners run counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3<f32>>,
}

impl Polygon {
    /// Wraps `vertices` without copying.
    ///
    /// # Panics
    ///
    /// In debug builds, when given under three corners or corners that
    /// do not share a plane.
    pub fn new(vertices: Vec<Point3<f32>>) -> Self {
        debug_assert!(vertices.len() >= 3, "a polygon needs three corners, got {}", vertices.len());
        debug_assert!(Self::are_coplanar(&vertices), "polygon corners leave their plane");
        Self { vertices }
    }

    /// The quad covering one face of `aabb`, wound so its normal points outward.
    pub fn from_aabb_face(aabb: &Aabb, face: crate::BoxFace) -> Self {
        let axis = face.axis_index();
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        let fixed = if face.sign() > 0.0 { aabb.max[axis] } else { aabb.min[axis] };

        let corner = |a: f32, b: f32| {
            let mut p = Point3::origin();
            p[axis] = fixed;
            p[u] = a;
            p[v] = b;
            p
        };
        let (u0, u1) = (aabb.min[u], aabb.max[u]);
        let (v0, v1) = (aabb.min[v], aabb.max[v]);

        // (u, v, axis) is right handed, so this order faces +axis.
        let mut vertices = vec![corner(u0, v0), corner(u1, v0), corner(u1, v1), corner(u0, v1)];
        if face.sign() < 0.0 {
            vertices.reverse();
        }
        Self { vertices }
    }

    fn are_coplanar(vertices: &[Point3<f32>]) -> bool {
        if vertices.len() <= 3 {
            return true;
        }
        match Plane3D::try_from_point_and_normal(vertices[0], newell_normal(vertices)) {
            Some(plane) => vertices
                .iter()
                .all(|v| plane.classify_point_with_epsilon(*v, 1e-4) == PlaneSide::OnPlane),
            // All points collinear or coincident: trivially coplanar.
            None => true,
        }
    }

    /// Corners in winding order.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Corner count.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Only true for a polygon built outside [`Polygon::new`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The (unnormalized) normal by Newell's method; its length is twice the area.
    pub fn normal(&self) -> Vector3<f32> {
        newell_normal(&self.vertices)
    }

    /// The unit normal, `None` for a degenerate polygon.
    pub fn unit_normal(&self) -> Option<Vector3<f32>> {
        self.normal().try_normalize(f32::EPSILON)
    }

    /// The plane the polygon lies on, `None` for a degenerate polygon.
    pub fn plane(&self) -> Option<Plane3D> {
        Plane3D::try_from_point_and_normal(self.vertices[0], self.normal())
    }

    /// Area of the polygon.
    pub fn area(&self) -> f32 {
        self.normal().norm() * 0.5
    }

    /// Average of the vertices.
    pub fn centroid(&self) -> Point3<f32> {
        let sum: Vector3<f32> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f32)
    }

    /// Which side of `plane` the corners fall on, taken together.
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        let sides = self.vertices.iter().map(|v| plane.classify_point(*v));
        let (front, back) = sides.fold((false, false), |(f, b), side| match side {
            PlaneSide::Front => (true, b),
            PlaneSide::Back => (f, true),
            PlaneSide::OnPlane => (f, b),
        });

        match (front, back) {
            (false, false) => Classification::Coplanar,
            (true, false) => Classification::Front,
            (false, true) => Classification::Back,
            (true, true) => Classification::Spanning,
        }
    }

    /// Splits the polygon into triangles by fanning from the first vertex.
    pub fn triangulate(&self) -> Vec<Triangle> {
        (1..self.vertices.len().saturating_sub(1))
            .map(|i| Triangle::new(self.vertices[0], self.vertices[i], self.vertices[i + 1]))
            .collect()
    }
}

fn newell_normal(vertices: &[Point3<f32>]) -> Vector3<f32> {
    let mut normal = Vector3::zeros();
    for (i, current) in vertices.iter().enumerate() {
        let next = vertices[(i + 1) % vertices.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

impl From<&Triangle> for Polygon {
    fn from(triangle: &Triangle) -> Self {
        Self { vertices: Vec::from(*triangle.vertices()) }
    }
}

impl From<Triangle> for Polygon {
    fn from(triangle: Triangle) -> Self {
        Self::from(&triangle)
    }
}
