//! The scene query façade.

use std::collections::HashSet;

use log::{debug, trace, warn};
use nalgebra::Vector3;

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::tree::TerrainCollection;
use crate::{Obb, Ray3D};

use super::{
    calc_world_obb, AnyOverlap, BoundsQueryConfig, GridRayHit, ObbCollector, ObjectCollector,
    ObjectId, ObjectKind, ObjectOverlapConfig, ObjectOverlapFilter, ObjectOverlapPrefabMode,
    ObjectRayHit, ObjectRaycastConfig, OverlapSink, RaycastPrecision, RaycastStrategy, SceneGrid,
    SceneHost, SceneObjectTree, SceneRaycastFilter, SceneRayHit,
};

/// Spatial index over the objects of one editor scene.
///
/// The façade owns the host, the per-kind object trees and a handful of
/// scratch buffers reused between calls. Queries take `&mut self` because of
/// those buffers, so one instance serves one caller at a time; results are
/// written to caller-provided vectors which are cleared first.
///
/// The host must report scene changes through the `on_object_*` methods; the
/// index never polls.
///
/// ```
/// # use scene_index::scene::{PluginScene, SceneHost, ObjectId, ObjectKind,
/// #     ObjectOverlapFilter, ObjectOverlapConfig};
/// # use scene_index::{Aabb, IndexConfig, Obb, Transform};
/// # use nalgebra::{Point3, UnitQuaternion, Vector3};
/// struct OneBox;
///
/// impl SceneHost for OneBox {
///     fn object_kind(&self, id: ObjectId) -> Option<ObjectKind> {
///         (id == ObjectId(1)).then_some(ObjectKind::Mesh)
///     }
///     fn transform(&self, _id: ObjectId) -> Option<Transform> {
///         Some(Transform::identity())
///     }
///     fn local_bounds(&self, _id: ObjectId) -> Option<Aabb> {
///         Some(Aabb::from_center_size(Point3::origin(), Vector3::repeat(1.0)))
///     }
/// }
///
/// let mut scene = PluginScene::new(OneBox, IndexConfig::default());
/// scene.on_object_spawned(ObjectId(1));
///
/// let query = Obb::new(Point3::new(0.5, 0.0, 0.0), Vector3::repeat(0.5), UnitQuaternion::identity());
/// assert!(scene.overlap_box_any(&query, &ObjectOverlapFilter::new(), &ObjectOverlapConfig::default()));
/// ```
#[derive(Debug)]
pub struct PluginScene<H: SceneHost> {
    host: H,
    config: IndexConfig,
    bounds: BoundsQueryConfig,
    grid: SceneGrid,
    objects: SceneObjectTree,
    candidates: Vec<ObjectId>,
    ray_candidates: Vec<(ObjectId, f32)>,
    emitted_roots: HashSet<ObjectId>,
}

impl<H: SceneHost> PluginScene<H> {
    pub fn new(host: H, config: IndexConfig) -> Self {
        let bounds = BoundsQueryConfig {
            volumeless_size: Vector3::from(config.volumeless_object_size),
            ..BoundsQueryConfig::default()
        };
        Self {
            host,
            grid: SceneGrid::from_config(&config.grid),
            objects: SceneObjectTree::new(config.insert_heuristic),
            bounds,
            config,
            candidates: Vec::new(),
            ray_candidates: Vec::new(),
            emitted_roots: HashSet::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host. Changes to indexed objects must be
    /// reported afterwards.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn grid(&self) -> &SceneGrid {
        &self.grid
    }

    pub fn object_tree(&self) -> &SceneObjectTree {
        &self.objects
    }

    pub fn register_object(&mut self, id: ObjectId) -> Result<(), IndexError> {
        self.objects.register_object(&self.host, id, &self.bounds)
    }

    pub fn unregister_object(&mut self, id: ObjectId) -> Result<(), IndexError> {
        self.objects.unregister_object(id)
    }

    pub fn on_object_spawned(&mut self, id: ObjectId) {
        if let Err(err) = self.register_object(id) {
            log_rejected("spawn", err);
        }
    }

    pub fn on_object_will_be_destroyed(&mut self, id: ObjectId) {
        if let Err(err) = self.unregister_object(id) {
            log_rejected("destroy", err);
        }
    }

    pub fn on_objects_will_be_destroyed(&mut self, ids: &[ObjectId]) {
        for &id in ids {
            self.on_object_will_be_destroyed(id);
        }
    }

    pub fn on_object_transform_changed(&mut self, id: ObjectId) {
        if let Err(err) = self.objects.on_transform_changed(&self.host, id, &self.bounds) {
            log_rejected("transform change", err);
        }
    }

    /// Drops every indexed object the host no longer knows about.
    pub fn handle_null_refs(&mut self) -> usize {
        let removed = self.objects.handle_null_refs(&self.host);
        if removed > 0 {
            warn!("removed {removed} destroyed objects from the scene index");
        }
        removed
    }

    /// True if any object passes the overlap test.
    pub fn overlap_box_any(
        &mut self,
        obb: &Obb,
        filter: &ObjectOverlapFilter<'_>,
        config: &ObjectOverlapConfig,
    ) -> bool {
        let mut sink = AnyOverlap::new();
        self.overlap_box_with(obb, filter, config, &mut sink);
        sink.found()
    }

    /// World boxes of the overlapping objects.
    pub fn overlap_box_obbs(
        &mut self,
        obb: &Obb,
        filter: &ObjectOverlapFilter<'_>,
        config: &ObjectOverlapConfig,
        out: &mut Vec<Obb>,
    ) {
        out.clear();
        self.overlap_box_with(obb, filter, config, &mut ObbCollector::new(out));
    }

    /// The overlapping objects.
    pub fn overlap_box_objects(
        &mut self,
        obb: &Obb,
        filter: &ObjectOverlapFilter<'_>,
        config: &ObjectOverlapConfig,
        out: &mut Vec<ObjectId>,
    ) {
        out.clear();
        self.overlap_box_with(obb, filter, config, &mut ObjectCollector::new(out));
    }

    /// Like [`overlap_box_objects`](Self::overlap_box_objects), but meshes
    /// whose box overlaps must also have a triangle touching `obb`.
    ///
    /// Meshes without triangles are judged by their box alone.
    pub fn overlap_box_mesh_triangles(
        &mut self,
        obb: &Obb,
        filter: &ObjectOverlapFilter<'_>,
        config: &ObjectOverlapConfig,
        out: &mut Vec<ObjectId>,
    ) {
        out.clear();
        self.overlap(obb, filter, config, true, &mut ObjectCollector::new(out));
    }

    /// Runs an overlap query, handing each accepted object to `sink`.
    ///
    /// Candidates come from the sphere trees and are then rejected when they
    /// are inactive or hidden, refused by `filter`, have no valid world box,
    /// or fail the box test selected by `config`. With a prefab mode set, a
    /// prefab instance is reported once through its outermost root; the box
    /// passed along is the one of the part that matched first.
    pub fn overlap_box_with<S>(
        &mut self,
        obb: &Obb,
        filter: &ObjectOverlapFilter<'_>,
        config: &ObjectOverlapConfig,
        sink: &mut S,
    ) where
        S: OverlapSink + ?Sized,
    {
        self.overlap(obb, filter, config, false, sink);
    }

    fn overlap<S>(
        &mut self,
        query: &Obb,
        filter: &ObjectOverlapFilter<'_>,
        config: &ObjectOverlapConfig,
        mesh_precision: bool,
        sink: &mut S,
    ) where
        S: OverlapSink + ?Sized,
    {
        if !query.is_valid() {
            return;
        }
        let Self {
            host,
            bounds,
            objects,
            candidates,
            emitted_roots,
            ..
        } = self;

        candidates.clear();
        emitted_roots.clear();
        objects.overlap_box(query, filter.object_types, candidates);

        let mut accepted = 0;
        for &id in candidates.iter() {
            let Some(kind) = host.object_kind(id) else {
                continue;
            };
            if !is_visible(host, id) || !filter.allows(id, kind) {
                continue;
            }
            let world = calc_world_obb(host, id, kind, bounds);
            if !world.is_valid() {
                continue;
            }

            if config.require_full_overlap {
                if !world.corners().iter().all(|&c| query.contains_point(c)) {
                    continue;
                }
            } else if !query.intersects_obb(&world) {
                continue;
            }
            if mesh_precision
                && !config.require_full_overlap
                && matches!(kind, ObjectKind::Mesh | ObjectKind::TerrainMesh)
                && host.has_mesh(id)
                && !host.mesh_intersects_obb(id, query)
            {
                continue;
            }

            let reported = match config.prefab_mode {
                ObjectOverlapPrefabMode::None => id,
                mode => match host.outermost_prefab_root(id) {
                    Some(root) => {
                        if !emitted_roots.insert(root) {
                            continue;
                        }
                        root
                    }
                    None if mode == ObjectOverlapPrefabMode::OnlyPrefabInstanceRoot => continue,
                    None => id,
                },
            };

            accepted += 1;
            if sink.visit(reported, &world).is_break() {
                break;
            }
        }
        trace!("overlap: {} candidates, {accepted} accepted", candidates.len());
    }

    /// Every object hit by `ray`, optionally sorted by distance.
    ///
    /// Sorting is stable, so hits at the same distance keep traversal order.
    pub fn raycast_all(
        &mut self,
        ray: &Ray3D,
        filter: &SceneRaycastFilter<'_>,
        config: &ObjectRaycastConfig,
        sort: bool,
        out: &mut Vec<ObjectRayHit>,
    ) {
        out.clear();
        if !filter.raycast_objects {
            return;
        }
        self.collect_ray_candidates(ray, filter);

        let Self {
            host,
            bounds,
            objects,
            ray_candidates,
            ..
        } = self;
        for &(id, _) in ray_candidates.iter() {
            if let Some(hit) = narrow_raycast(host, objects, bounds, id, ray, filter, config) {
                out.push(hit);
            }
        }
        if sort {
            out.sort_by(|a, b| a.hit_enter.total_cmp(&b.hit_enter));
        }
    }

    /// The nearest object hit and, independently, the grid hit.
    ///
    /// Candidates are visited in order of their coarse entry distance and the
    /// search stops once that distance passes the best precise hit.
    pub fn raycast_closest(
        &mut self,
        ray: &Ray3D,
        filter: &SceneRaycastFilter<'_>,
        config: &ObjectRaycastConfig,
    ) -> SceneRayHit {
        let grid_hit = if filter.raycast_grid {
            self.raycast_grid(ray)
        } else {
            None
        };
        if !filter.raycast_objects {
            return SceneRayHit {
                object_hit: None,
                grid_hit,
            };
        }

        self.collect_ray_candidates(ray, filter);
        let Self {
            host,
            bounds,
            objects,
            ray_candidates,
            ..
        } = self;
        ray_candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut best: Option<ObjectRayHit> = None;
        for &(id, coarse) in ray_candidates.iter() {
            if best.is_some_and(|hit| coarse > hit.hit_enter) {
                break;
            }
            let Some(hit) = narrow_raycast(host, objects, bounds, id, ray, filter, config) else {
                continue;
            };
            if best.is_none_or(|b| hit.hit_enter < b.hit_enter) {
                best = Some(hit);
            }
        }
        SceneRayHit {
            object_hit: best,
            grid_hit,
        }
    }

    /// Hit against the scene grid, `None` when the grid is disabled.
    pub fn raycast_grid(&self, ray: &Ray3D) -> Option<GridRayHit> {
        if !self.config.grid.enabled {
            return None;
        }
        self.grid.raycast(ray)
    }

    /// The object a click along `ray` would select: the nearest precise hit,
    /// resolved to its outermost prefab root.
    pub fn pick_object(&mut self, ray: &Ray3D, filter: &SceneRaycastFilter<'_>) -> Option<ObjectId> {
        let hit = self
            .raycast_closest(
                ray,
                &SceneRaycastFilter {
                    raycast_grid: false,
                    ..filter.clone()
                },
                &ObjectRaycastConfig::default(),
            )
            .object_hit?;
        let id = hit.hit_object;
        Some(self.host.outermost_prefab_root(id).unwrap_or(id))
    }

    /// Every registered terrain and terrain mesh.
    pub fn find_all_terrains(&self, out: &mut TerrainCollection) {
        out.clear();
        self.objects.terrain().find_all(out);
    }

    /// Terrains and terrain meshes whose world AABB overlaps `obb`.
    pub fn overlap_box_terrains(&mut self, obb: &Obb, out: &mut TerrainCollection) {
        out.clear();
        self.objects.terrain_mut().overlap_box(obb, out);
    }

    fn collect_ray_candidates(&mut self, ray: &Ray3D, filter: &SceneRaycastFilter<'_>) {
        self.ray_candidates.clear();
        self.objects
            .raycast(ray, filter.object_types, &mut self.ray_candidates);
        trace!("raycast: {} candidates", self.ray_candidates.len());
    }
}

fn is_visible<H>(host: &H, id: ObjectId) -> bool
where
    H: SceneHost + ?Sized,
{
    host.is_active(id) && !host.is_layer_hidden(id) && !host.is_scene_hidden(id)
}

fn log_rejected(event: &str, err: IndexError) {
    match err {
        IndexError::UnknownObject(_) => warn!("{event}: {err}"),
        _ => debug!("{event}: {err}"),
    }
}

/// Precise raycast of one candidate, using the strategy cached for it.
fn narrow_raycast<H>(
    host: &H,
    objects: &SceneObjectTree,
    bounds: &BoundsQueryConfig,
    id: ObjectId,
    ray: &Ray3D,
    filter: &SceneRaycastFilter<'_>,
    config: &ObjectRaycastConfig,
) -> Option<ObjectRayHit>
where
    H: SceneHost + ?Sized,
{
    let kind = host.object_kind(id)?;
    let strategy = objects.strategy(id)?;
    if !is_visible(host, id) || !filter.allows(id, kind) {
        return None;
    }
    let best_fit = config.precision == RaycastPrecision::BestFit;

    match strategy {
        RaycastStrategy::Mesh if best_fit && host.has_mesh(id) => {
            let mesh_hit = host.raycast_mesh(id, ray, &config.mesh)?;
            Some(ObjectRayHit {
                hit_object: id,
                hit_point: mesh_hit.hit_point,
                hit_normal: mesh_hit.hit_normal,
                hit_enter: mesh_hit.hit_enter,
                mesh_hit: Some(mesh_hit),
            })
        }
        RaycastStrategy::Terrain if best_fit => {
            let hit = host.raycast_terrain(id, ray)?;
            let hit_normal = if config.terrain.use_interpolated_normal {
                host.terrain_interpolated_normal(id, hit.hit_point)
                    .unwrap_or(hit.hit_normal)
            } else {
                hit.hit_normal
            };
            Some(ObjectRayHit {
                hit_object: id,
                hit_point: hit.hit_point,
                hit_normal,
                hit_enter: hit.hit_enter,
                mesh_hit: None,
            })
        }
        RaycastStrategy::Box => {
            let obb = calc_world_obb(host, id, kind, bounds);
            let t = obb.is_valid().then(|| obb.raycast(ray)).flatten()?;
            Some(ObjectRayHit {
                hit_object: id,
                hit_point: ray.point_at(t),
                hit_normal: -ray.direction(),
                hit_enter: t,
                mesh_hit: None,
            })
        }
        // Outward normal of the face nearest the hit, even for rays starting inside.
        RaycastStrategy::Sprite => {
            let obb = calc_world_obb(host, id, kind, bounds);
            let t = obb.is_valid().then(|| obb.raycast(ray)).flatten()?;
            let hit_point = ray.point_at(t);
            Some(ObjectRayHit {
                hit_object: id,
                hit_point,
                hit_normal: obb.face_normal(obb.closest_face(hit_point)),
                hit_enter: t,
                mesh_hit: None,
            })
        }
        // Meshes or terrains tested by box; the normal faces the ray.
        _ => {
            let obb = calc_world_obb(host, id, kind, bounds);
            let t = obb.is_valid().then(|| obb.raycast(ray)).flatten()?;
            let hit_point = ray.point_at(t);
            let mut hit_normal = obb.face_normal(obb.closest_face(hit_point));
            if hit_normal.dot(&ray.direction()) > 0.0 {
                hit_normal = -hit_normal;
            }
            Some(ObjectRayHit {
                hit_object: id,
                hit_point,
                hit_normal,
                hit_enter: t,
                mesh_hit: None,
            })
        }
    }
}
