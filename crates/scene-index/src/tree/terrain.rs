//! Index of terrain-like objects.
//!
//! Terrains are few, large and mostly static, and their consumers care about
//! exact box overlap (height sampling, snapping), so they get their own tree
//! keyed by world AABB instead of bounding sphere.

use std::collections::HashMap;

use log::debug;

use crate::scene::ObjectId;
use crate::{Aabb, Obb};

use super::{TreeWorkspace, VolumeTree};

/// How a terrain-like object is represented by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainKind {
    /// A native heightfield terrain.
    Terrain,
    /// A regular mesh used as terrain.
    TerrainMesh,
}

/// Terrain query output, split by representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainCollection {
    pub terrains: Vec<ObjectId>,
    pub terrain_meshes: Vec<ObjectId>,
}

impl TerrainCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.terrains.clear();
        self.terrain_meshes.clear();
    }

    pub fn len(&self) -> usize {
        self.terrains.len() + self.terrain_meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty() && self.terrain_meshes.is_empty()
    }

    pub fn push(&mut self, id: ObjectId, kind: TerrainKind) {
        match kind {
            TerrainKind::Terrain => self.terrains.push(id),
            TerrainKind::TerrainMesh => self.terrain_meshes.push(id),
        }
    }

    /// All collected objects, terrains first.
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.terrains.iter().chain(self.terrain_meshes.iter()).copied()
    }
}

/// Volume tree over terrain-like objects keyed by world AABB.
///
/// Overlap queries are exact: each node's AABB is tested as an
/// identity-rotation box against the query box with the separating axis test.
#[derive(Debug, Clone, Default)]
pub struct TerrainTree {
    tree: VolumeTree<ObjectId, Aabb>,
    kinds: HashMap<ObjectId, TerrainKind>,
    workspace: TreeWorkspace,
    candidates: Vec<ObjectId>,
}

impl TerrainTree {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.kinds.contains_key(&id)
    }

    pub fn kind(&self, id: ObjectId) -> Option<TerrainKind> {
        self.kinds.get(&id).copied()
    }

    /// Adds a terrain. Returns `false` if it is already registered.
    pub fn register(&mut self, id: ObjectId, kind: TerrainKind, aabb: Aabb) -> bool {
        if !self.tree.insert(id, aabb) {
            return false;
        }
        self.kinds.insert(id, kind);
        debug!("registered {kind:?} {id}");
        true
    }

    /// Removes a terrain. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: ObjectId) -> bool {
        self.kinds.remove(&id);
        self.tree.remove(&id).is_some()
    }

    /// Stores the new world AABB of a moved terrain.
    pub fn on_transform_changed(&mut self, id: ObjectId, aabb: Aabb) -> bool {
        self.tree.update(id, aabb)
    }

    /// Appends every terrain whose AABB overlaps `obb` to `out`.
    pub fn overlap_box(&mut self, obb: &Obb, out: &mut TerrainCollection) {
        if !obb.is_valid() {
            return;
        }
        self.candidates.clear();
        self.tree.overlap_obb(obb, &mut self.workspace, &mut self.candidates);
        for &id in &self.candidates {
            if let Some(&kind) = self.kinds.get(&id) {
                out.push(id, kind);
            }
        }
    }

    /// Appends every registered terrain to `out`.
    pub fn find_all(&self, out: &mut TerrainCollection) {
        for id in self.tree.payloads() {
            if let Some(&kind) = self.kinds.get(&id) {
                out.push(id, kind);
            }
        }
    }

    /// Drops terrains the host no longer knows about.
    pub fn handle_null_refs<F>(&mut self, mut is_alive: F) -> usize
    where
        F: FnMut(ObjectId) -> bool,
    {
        let removed = self.tree.handle_null_refs(&mut is_alive);
        if removed > 0 {
            let tree = &self.tree;
            self.kinds.retain(|id, _| tree.contains(id));
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.tree.is_consistent()
            && self.kinds.len() == self.tree.len()
            && self.kinds.keys().all(|id| self.tree.contains(id))
    }
}
