//! Splitting, clipping and box culling of convex polygons.

use crate::{Aabb, Classification, Plane3D, PlaneSide, Polygon, Triangle};

/// Geometry that can be cut by a plane.
pub trait Cuttable {
    /// Cuts the geometry by a plane.
    ///
    /// Returns `(front, back)`:
    /// - **Front**: `(Some(self), None)`
    /// - **Back**: `(None, Some(self))`
    /// - **Coplanar**: `(Some(self), None)`, coplanar geometry counts as front
    /// - **Spanning**: `(Some(front_part), Some(back_part))`
    fn cut(&self, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>);

    /// Keeps only the part in front of `plane`.
    fn clip(&self, plane: &Plane3D) -> Option<Polygon> {
        self.cut(plane).0
    }

    /// Keeps only the part inside `aabb`, clipping against each face plane.
    ///
    /// Returns `None` when nothing of the polygon lies inside the box.
    fn cull_with_box_faces(&self, aabb: &Aabb) -> Option<Polygon> {
        let mut planes = aabb.face_planes().into_iter();
        let first = planes.next()?;
        let mut remaining = self.clip(&first)?;
        for plane in planes {
            remaining = remaining.clip(&plane)?;
        }
        Some(remaining)
    }
}

impl Cuttable for Polygon {
    fn cut(&self, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>) {
        match self.classify(plane) {
            Classification::Front | Classification::Coplanar => (Some(self.clone()), None),
            Classification::Back => (None, Some(self.clone())),
            Classification::Spanning => split_polygon(self, plane),
        }
    }
}

impl Cuttable for Triangle {
    fn cut(&self, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>) {
        Polygon::from(self).cut(plane)
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Sutherland-Hodgman style: walk the edges, emit each vertex to the side it
/// lies on (both sides when on the plane), and emit the crossing point of
/// every edge that goes from front to back or back to front.
fn split_polygon(polygon: &Polygon, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>) {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices.iter().map(|v| plane.classify_point(*v)).collect();

    for i in 0..n {
        let current = vertices[i];
        let next_idx = (i + 1) % n;

        match sides[i] {
            PlaneSide::Front => front_verts.push(current),
            PlaneSide::Back => back_verts.push(current),
            PlaneSide::OnPlane => {
                front_verts.push(current);
                back_verts.push(current);
            }
        }

        let crosses = matches!(
            (sides[i], sides[next_idx]),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );
        if crosses {
            if let Some((_, intersection)) = plane.intersect_segment(current, vertices[next_idx]) {
                front_verts.push(intersection);
                back_verts.push(intersection);
            }
        }
    }

    let front = (front_verts.len() >= 3).then(|| Polygon::new(front_verts));
    let back = (back_verts.len() >= 3).then(|| Polygon::new(back_verts));
    (front, back)
}
