//! In-memory scene host for tests.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::{Aabb, BoxFace, Polygon, Ray3D, Transform, Triangle};

use super::{ObjectId, ObjectKind, SceneHost, TerrainRayHit};

#[derive(Debug, Clone)]
struct TestObject {
    kind: ObjectKind,
    transform: Transform,
    local_bounds: Option<Aabb>,
    active: bool,
    layer_hidden: bool,
    scene_hidden: bool,
    pooled: bool,
    prefab_root: Option<ObjectId>,
    triangles: Option<Vec<Triangle>>,
    terrain_normal: Vector3<f32>,
}

/// A scene whose objects live in a hash map.
///
/// Terrains are flat: their surface is the plane through the transform
/// position, limited to the world bounds.
#[derive(Debug, Clone, Default)]
pub struct TestHost {
    objects: HashMap<ObjectId, TestObject>,
    next_id: u64,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(
        &mut self,
        kind: ObjectKind,
        transform: Transform,
        local_bounds: Option<Aabb>,
    ) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(
            id,
            TestObject {
                kind,
                transform,
                local_bounds,
                active: true,
                layer_hidden: false,
                scene_hidden: false,
                pooled: false,
                prefab_root: None,
                triangles: None,
                terrain_normal: Vector3::y(),
            },
        );
        id
    }

    /// An object of `kind` whose bounds are a `size` box centered on `center`.
    pub fn add_box(&mut self, kind: ObjectKind, center: Point3<f32>, size: Vector3<f32>) -> ObjectId {
        self.add_object(
            kind,
            Transform::from_position(center),
            Some(Aabb::from_center_size(Point3::origin(), size)),
        )
    }

    /// A mesh object whose triangles form the surface of a `size` box.
    pub fn add_mesh_box(&mut self, center: Point3<f32>, size: Vector3<f32>) -> ObjectId {
        let id = self.add_box(ObjectKind::Mesh, center, size);
        let local = Aabb::from_center_size(Point3::origin(), size);
        let triangles = BoxFace::ALL
            .iter()
            .flat_map(|&face| Polygon::from_aabb_face(&local, face).triangulate())
            .collect();
        self.set_triangles(id, triangles);
        id
    }

    /// A flat terrain at `center` spanning `size`.
    pub fn add_terrain(&mut self, center: Point3<f32>, size: Vector3<f32>) -> ObjectId {
        self.add_box(ObjectKind::Terrain, center, size)
    }

    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.transform = transform;
        }
    }

    pub fn set_position(&mut self, id: ObjectId, position: Point3<f32>) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.transform.position = position;
        }
    }

    pub fn set_active(&mut self, id: ObjectId, active: bool) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.active = active;
        }
    }

    pub fn set_layer_hidden(&mut self, id: ObjectId, hidden: bool) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.layer_hidden = hidden;
        }
    }

    pub fn set_scene_hidden(&mut self, id: ObjectId, hidden: bool) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.scene_hidden = hidden;
        }
    }

    pub fn set_local_bounds(&mut self, id: ObjectId, local_bounds: Option<Aabb>) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.local_bounds = local_bounds;
        }
    }

    pub fn set_pooled(&mut self, id: ObjectId, pooled: bool) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.pooled = pooled;
        }
    }

    pub fn set_prefab_root(&mut self, id: ObjectId, root: Option<ObjectId>) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.prefab_root = root;
        }
    }

    pub fn set_triangles(&mut self, id: ObjectId, triangles: Vec<Triangle>) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.triangles = Some(triangles);
        }
    }

    pub fn set_terrain_normal(&mut self, id: ObjectId, normal: Vector3<f32>) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.terrain_normal = normal;
        }
    }

    /// Forgets the object without telling the index, leaving a dangling payload.
    pub fn destroy(&mut self, id: ObjectId) {
        self.objects.remove(&id);
    }
}

impl SceneHost for TestHost {
    fn object_kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.objects.get(&id).map(|o| o.kind)
    }

    fn transform(&self, id: ObjectId) -> Option<Transform> {
        self.objects.get(&id).map(|o| o.transform)
    }

    fn local_bounds(&self, id: ObjectId) -> Option<Aabb> {
        self.objects.get(&id)?.local_bounds
    }

    fn is_active(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|o| o.active)
    }

    fn is_layer_hidden(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|o| o.layer_hidden)
    }

    fn is_scene_hidden(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|o| o.scene_hidden)
    }

    fn could_be_pooled(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|o| o.pooled)
    }

    fn outermost_prefab_root(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.get(&id)?.prefab_root
    }

    fn mesh_triangles(&self, id: ObjectId) -> Option<&[Triangle]> {
        self.objects.get(&id)?.triangles.as_deref()
    }

    fn raycast_terrain(&self, id: ObjectId, ray: &Ray3D) -> Option<TerrainRayHit> {
        let object = self.objects.get(&id)?;
        if object.kind != ObjectKind::Terrain {
            return None;
        }
        let height = object.transform.position.y;
        let direction = ray.direction();
        if direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - ray.origin().y) / direction.y;
        if t < 0.0 {
            return None;
        }

        let point = ray.point_at(t);
        let bounds = object.local_bounds?;
        let min = object.transform.transform_point(&bounds.min);
        let max = object.transform.transform_point(&bounds.max);
        let inside = point.x >= min.x.min(max.x)
            && point.x <= min.x.max(max.x)
            && point.z >= min.z.min(max.z)
            && point.z <= min.z.max(max.z);
        inside.then(|| TerrainRayHit {
            hit_point: point,
            hit_normal: Vector3::y(),
            hit_enter: t,
        })
    }

    fn terrain_interpolated_normal(&self, id: ObjectId, _point: Point3<f32>) -> Option<Vector3<f32>> {
        let object = self.objects.get(&id)?;
        (object.kind == ObjectKind::Terrain).then_some(object.terrain_normal)
    }
}
