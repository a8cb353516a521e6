//! The interface the index uses to query the editor's scene.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Obb, Ray3D, Transform, Triangle};

use super::{MeshRayHit, MeshRaycastConfig, ObjectId, ObjectKind, TerrainRayHit};

/// Scene services supplied by the host editor.
///
/// The index stores only [`ObjectId`]s and asks the host for everything else
/// at query time, so bounds always reflect the live transforms. An object the
/// host no longer knows about must answer `None` from
/// [`object_kind`](SceneHost::object_kind); such payloads are skipped by
/// queries and removed by `handle_null_refs`.
pub trait SceneHost {
    /// The category of `id`, `None` if the object no longer exists.
    fn object_kind(&self, id: ObjectId) -> Option<ObjectKind>;

    /// World transform of `id`.
    fn transform(&self, id: ObjectId) -> Option<Transform>;

    /// Model-space bounds of the object's renderable content.
    ///
    /// Not consulted for volumeless kinds (lights, cameras, ...).
    fn local_bounds(&self, id: ObjectId) -> Option<Aabb>;

    fn is_active(&self, _id: ObjectId) -> bool {
        true
    }

    fn is_layer_hidden(&self, _id: ObjectId) -> bool {
        false
    }

    fn is_scene_hidden(&self, _id: ObjectId) -> bool {
        false
    }

    /// Objects that may be recycled by an object pool are never indexed.
    fn could_be_pooled(&self, _id: ObjectId) -> bool {
        false
    }

    /// Root of the outermost prefab instance containing `id`, if any.
    fn outermost_prefab_root(&self, _id: ObjectId) -> Option<ObjectId> {
        None
    }

    /// Model-space triangles of a mesh object.
    fn mesh_triangles(&self, _id: ObjectId) -> Option<&[Triangle]> {
        None
    }

    /// True if triangle-precise tests are possible for `id`.
    fn has_mesh(&self, id: ObjectId) -> bool {
        self.mesh_triangles(id).is_some()
    }

    /// Raycast against the object's terrain collider.
    fn raycast_terrain(&self, _id: ObjectId, _ray: &Ray3D) -> Option<TerrainRayHit> {
        None
    }

    /// Smoothed terrain normal at a world point on the terrain.
    fn terrain_interpolated_normal(&self, _id: ObjectId, _point: Point3<f32>) -> Option<Vector3<f32>> {
        None
    }

    /// Nearest triangle hit of `ray` against the object's mesh in world space.
    fn raycast_mesh(
        &self,
        id: ObjectId,
        ray: &Ray3D,
        config: &MeshRaycastConfig,
    ) -> Option<MeshRayHit> {
        let triangles = self.mesh_triangles(id)?;
        let matrix = self.transform(id)?.matrix();

        let mut best: Option<MeshRayHit> = None;
        for (index, triangle) in triangles.iter().enumerate() {
            let world = triangle.transformed(&matrix);
            let Some(t) = world.raycast(ray, config.cull_back_faces) else {
                continue;
            };
            if best.is_some_and(|hit| hit.hit_enter <= t) {
                continue;
            }
            let Some(mut normal) = world.unit_normal() else {
                continue;
            };
            // Report the side the ray came from.
            if normal.dot(&ray.direction()) > 0.0 {
                normal = -normal;
            }
            best = Some(MeshRayHit {
                hit_point: ray.point_at(t),
                hit_normal: normal,
                hit_enter: t,
                triangle_index: index,
            });
        }
        best
    }

    /// True if any of the object's triangles touches `obb`.
    fn mesh_intersects_obb(&self, id: ObjectId, obb: &Obb) -> bool {
        let (Some(triangles), Some(transform)) = (self.mesh_triangles(id), self.transform(id)) else {
            return false;
        };
        let matrix = transform.matrix();
        triangles
            .iter()
            .any(|triangle| triangle.transformed(&matrix).intersects_obb(obb))
    }
}
