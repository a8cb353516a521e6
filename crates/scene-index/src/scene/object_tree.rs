//! Registry of indexed scene objects.

use std::collections::HashMap;

use log::{debug, trace};

use crate::error::IndexError;
use crate::tree::{InsertHeuristic, TerrainKind, TerrainTree, TreeWorkspace, VolumeTree};
use crate::{Obb, Ray3D, Sphere};

use super::{
    calc_world_obb, BoundsQueryConfig, ObjectId, ObjectKind, ObjectTypes, RaycastStrategy, SceneHost,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ObjectEntry {
    kind: ObjectKind,
    strategy: RaycastStrategy,
}

/// One sphere tree per [`ObjectKind`], plus a [`TerrainTree`] for terrains
/// and terrain meshes.
///
/// Only the broad phase lives here; the precise tests are done by
/// [`PluginScene`](super::PluginScene).
#[derive(Debug, Clone)]
pub struct SceneObjectTree {
    trees: [VolumeTree<ObjectId, Sphere>; ObjectKind::ALL.len()],
    entries: HashMap<ObjectId, ObjectEntry>,
    terrain: TerrainTree,
    workspace: TreeWorkspace,
}

impl Default for SceneObjectTree {
    fn default() -> Self {
        Self::new(InsertHeuristic::default())
    }
}

impl SceneObjectTree {
    pub fn new(heuristic: InsertHeuristic) -> Self {
        Self {
            trees: std::array::from_fn(|_| VolumeTree::with_heuristic(heuristic)),
            entries: HashMap::new(),
            terrain: TerrainTree::new(),
            workspace: TreeWorkspace::new(),
        }
    }

    /// Number of registered objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    /// The kind `id` was registered with.
    pub fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.entries.get(&id).map(|e| e.kind)
    }

    /// The raycast strategy cached for `id` at registration.
    pub fn strategy(&self, id: ObjectId) -> Option<RaycastStrategy> {
        self.entries.get(&id).map(|e| e.strategy)
    }

    /// Number of objects indexed under `kind`.
    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.trees[kind.index()].len()
    }

    pub fn terrain(&self) -> &TerrainTree {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainTree {
        &mut self.terrain
    }

    /// Adds `id` to the tree of its kind.
    ///
    /// Fails when the object is already registered, unknown to the host,
    /// poolable, or has no computable bounds.
    pub fn register_object<H>(
        &mut self,
        host: &H,
        id: ObjectId,
        bounds: &BoundsQueryConfig,
    ) -> Result<(), IndexError>
    where
        H: SceneHost + ?Sized,
    {
        if self.entries.contains_key(&id) {
            return Err(IndexError::AlreadyRegistered(id));
        }
        let kind = host.object_kind(id).ok_or(IndexError::UnknownObject(id))?;
        if host.could_be_pooled(id) {
            return Err(IndexError::NotIndexable(id));
        }
        let obb = calc_world_obb(host, id, kind, bounds);
        if !obb.is_valid() {
            return Err(IndexError::NotIndexable(id));
        }

        self.trees[kind.index()].insert(id, Sphere::from_obb(&obb));
        if let Some(terrain_kind) = terrain_kind(kind) {
            self.terrain.register(id, terrain_kind, obb.enclosing_aabb());
        }
        let strategy = kind.raycast_strategy();
        self.entries.insert(id, ObjectEntry { kind, strategy });
        debug!("registered {kind:?} {id} ({strategy:?})");
        Ok(())
    }

    /// Removes `id` from every tree.
    pub fn unregister_object(&mut self, id: ObjectId) -> Result<(), IndexError> {
        let entry = self.entries.remove(&id).ok_or(IndexError::NotRegistered(id))?;
        self.trees[entry.kind.index()].remove(&id);
        if entry.kind.is_terrain_like() {
            self.terrain.unregister(id);
        }
        debug!("unregistered {:?} {id}", entry.kind);
        Ok(())
    }

    /// Recomputes the volume of a moved object.
    ///
    /// If the new bounds cannot be computed the old volume is kept and
    /// [`IndexError::NotIndexable`] returned.
    pub fn on_transform_changed<H>(
        &mut self,
        host: &H,
        id: ObjectId,
        bounds: &BoundsQueryConfig,
    ) -> Result<(), IndexError>
    where
        H: SceneHost + ?Sized,
    {
        let kind = self.kind(id).ok_or(IndexError::NotRegistered(id))?;
        let obb = calc_world_obb(host, id, kind, bounds);
        if !obb.is_valid() {
            return Err(IndexError::NotIndexable(id));
        }

        self.trees[kind.index()].update(id, Sphere::from_obb(&obb));
        if kind.is_terrain_like() {
            self.terrain.on_transform_changed(id, obb.enclosing_aabb());
        }
        Ok(())
    }

    /// Appends to `out` every object of an allowed kind whose sphere touches `obb`.
    pub fn overlap_box(&mut self, obb: &Obb, types: ObjectTypes, out: &mut Vec<ObjectId>) {
        for kind in ObjectKind::ALL {
            if types.allows(kind) {
                self.trees[kind.index()].overlap_obb(obb, &mut self.workspace, out);
            }
        }
    }

    /// Appends to `out` every object of an allowed kind whose sphere the ray
    /// enters, with the sphere entry distance.
    pub fn raycast(&mut self, ray: &Ray3D, types: ObjectTypes, out: &mut Vec<(ObjectId, f32)>) {
        for kind in ObjectKind::ALL {
            if types.allows(kind) {
                self.trees[kind.index()].raycast(ray, &mut self.workspace, out);
            }
        }
    }

    /// Removes every object the host no longer knows about.
    pub fn handle_null_refs<H>(&mut self, host: &H) -> usize
    where
        H: SceneHost + ?Sized,
    {
        let is_alive = |id: ObjectId| host.object_kind(id).is_some();
        let removed: usize = self
            .trees
            .iter_mut()
            .map(|tree| tree.handle_null_refs(is_alive))
            .sum();
        self.terrain.handle_null_refs(is_alive);
        self.entries.retain(|&id, _| is_alive(id));
        if removed > 0 {
            trace!("{} objects left after sweep", self.entries.len());
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let indexed: usize = self.trees.iter().map(VolumeTree::len).sum();
        indexed == self.entries.len()
            && self.trees.iter().all(VolumeTree::is_consistent)
            && self.terrain.is_consistent()
            && self
                .entries
                .iter()
                .all(|(id, entry)| self.trees[entry.kind.index()].contains(id))
    }
}

fn terrain_kind(kind: ObjectKind) -> Option<TerrainKind> {
    match kind {
        ObjectKind::Terrain => Some(TerrainKind::Terrain),
        ObjectKind::TerrainMesh => Some(TerrainKind::TerrainMesh),
        _ => None,
    }
}
