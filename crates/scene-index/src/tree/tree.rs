//! Volume tree container, maintenance and queries.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, trace, warn};
use slotmap::SlotMap;

use crate::{Obb, Ray3D};

use super::heuristic::InsertHeuristic;
use super::node::{Node, NodeKey, NodeKind};
use super::volume::BoundingVolume;

/// Scratch memory for tree traversals.
///
/// Holds the explicit traversal stack so repeated queries do not allocate.
/// The content is meaningless between calls; reusing one instance only saves
/// allocations.
#[derive(Debug, Clone, Default)]
pub struct TreeWorkspace {
    stack: Vec<NodeKey>,
}

impl TreeWorkspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A binary bounding-volume tree mapping payloads to volumes.
///
/// Every leaf holds exactly one payload and its volume, every internal node
/// exactly two children and a volume enclosing both. The root is synthetic:
/// it holds zero, one or two subtrees and never a payload. A side table maps
/// each payload to its leaf, so a payload is stored at most once and can be
/// removed without searching.
///
/// Insertion is incremental and greedy (see [`InsertHeuristic`]); the tree is
/// never rebuilt as a whole.
///
/// # Example
///
/// ```
/// use nalgebra::{Point3, UnitQuaternion, Vector3};
/// use scene_index::tree::{TreeWorkspace, VolumeTree};
/// use scene_index::{Obb, Sphere};
///
/// let mut tree = VolumeTree::new();
/// tree.insert(1u32, Sphere::new(Point3::new(0.0, 0.0, 0.0), 0.5));
/// tree.insert(2u32, Sphere::new(Point3::new(5.0, 0.0, 0.0), 0.5));
///
/// let query = Obb::new(Point3::new(5.0, 0.0, 0.0), Vector3::repeat(2.0), UnitQuaternion::identity());
/// let mut hits = Vec::new();
/// tree.overlap_obb(&query, &mut TreeWorkspace::new(), &mut hits);
/// assert_eq!(hits, vec![2]);
/// ```
#[derive(Debug, Clone)]
pub struct VolumeTree<P, V> {
    nodes: SlotMap<NodeKey, Node<P, V>>,
    root: [Option<NodeKey>; 2],
    leaves: HashMap<P, NodeKey>,
    heuristic: InsertHeuristic,
}

impl<P, V> Default for VolumeTree<P, V>
where
    P: Copy + Eq + Hash + Debug,
    V: BoundingVolume,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, V> VolumeTree<P, V>
where
    P: Copy + Eq + Hash + Debug,
    V: BoundingVolume,
{
    /// Creates an empty tree using [`InsertHeuristic::ClosestSurface`].
    pub fn new() -> Self {
        Self::with_heuristic(InsertHeuristic::default())
    }

    /// Creates an empty tree using the given insertion heuristic.
    pub fn with_heuristic(heuristic: InsertHeuristic) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: [None, None],
            leaves: HashMap::new(),
            heuristic,
        }
    }

    #[inline]
    pub fn heuristic(&self) -> InsertHeuristic {
        self.heuristic
    }

    /// Number of payloads in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns `true` if the tree holds no payloads.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    #[inline]
    pub fn contains(&self, payload: &P) -> bool {
        self.leaves.contains_key(payload)
    }

    /// The volume stored for `payload`.
    pub fn volume(&self, payload: &P) -> Option<&V> {
        self.leaves.get(payload).map(|&key| &self.nodes[key].volume)
    }

    /// Iterates all payloads in unspecified order.
    pub fn payloads(&self) -> impl Iterator<Item = P> + '_ {
        self.leaves.keys().copied()
    }

    /// Number of subtrees attached to the synthetic root (0, 1 or 2).
    pub fn root_child_count(&self) -> usize {
        self.root.iter().flatten().count()
    }

    /// Removes every payload.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.leaves.clear();
        self.root = [None, None];
    }

    /// Length of the longest root-to-leaf path, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        let mut stack: Vec<(NodeKey, usize)> =
            self.root.iter().flatten().map(|&key| (key, 1)).collect();
        let mut max_depth = 0;

        while let Some((key, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some([a, b]) = self.nodes[key].children() {
                stack.push((a, depth + 1));
                stack.push((b, depth + 1));
            }
        }
        max_depth
    }

    /// Inserts `payload` with its volume.
    ///
    /// Returns `false` and leaves the tree untouched if the payload is
    /// already present.
    pub fn insert(&mut self, payload: P, volume: V) -> bool {
        if self.leaves.contains_key(&payload) {
            return false;
        }

        let leaf = self.nodes.insert(Node::leaf(payload, volume));
        self.leaves.insert(payload, leaf);
        self.attach_leaf(leaf);
        true
    }

    /// Removes `payload`, returning its volume.
    ///
    /// The sibling of the removed leaf takes the place of their shared parent.
    pub fn remove(&mut self, payload: &P) -> Option<V> {
        let leaf = self.leaves.remove(payload)?;
        self.detach_leaf(leaf);
        self.nodes.remove(leaf).map(|node| node.volume)
    }

    /// Replaces the volume of `payload`.
    ///
    /// When the parent still encloses the new volume the structure is kept as
    /// is; otherwise the leaf is detached and inserted again. Returns `false`
    /// if the payload is not in the tree.
    pub fn update(&mut self, payload: P, volume: V) -> bool {
        let Some(&leaf) = self.leaves.get(&payload) else {
            return false;
        };
        self.nodes[leaf].volume = volume;

        if let Some(parent) = self.nodes[leaf].parent {
            if !self.nodes[parent].volume.encloses(&volume) {
                debug!("re-inserting {payload:?}, volume left its parent");
                self.detach_leaf(leaf);
                self.attach_leaf(leaf);
            }
        }
        true
    }

    /// Appends to `out` every payload whose volume intersects `obb`.
    ///
    /// This is a broad-phase query: the per-payload precise test is up to
    /// the caller.
    pub fn overlap_obb(&self, obb: &Obb, workspace: &mut TreeWorkspace, out: &mut Vec<P>) {
        let before = out.len();
        self.traverse(workspace, |volume| volume.intersects_obb(obb), |payload, _| out.push(payload));
        trace!("overlap_obb: {} candidates", out.len() - before);
    }

    /// Appends to `out` every payload whose volume the ray enters, with the
    /// entry distance along that volume.
    pub fn raycast(&self, ray: &Ray3D, workspace: &mut TreeWorkspace, out: &mut Vec<(P, f32)>) {
        let before = out.len();
        self.traverse(
            workspace,
            |volume| volume.raycast(ray).is_some(),
            |payload, volume| {
                if let Some(t) = volume.raycast(ray) {
                    out.push((payload, t));
                }
            },
        );
        trace!("raycast: {} candidates", out.len() - before);
    }

    /// Removes every payload for which `is_alive` returns `false`.
    ///
    /// Recovers from payloads that were destroyed without being removed.
    /// Returns the number of payloads removed.
    pub fn handle_null_refs<F>(&mut self, mut is_alive: F) -> usize
    where
        F: FnMut(P) -> bool,
    {
        let dead: Vec<P> = self.leaves.keys().copied().filter(|&p| !is_alive(p)).collect();
        for payload in &dead {
            self.remove(payload);
        }
        if !dead.is_empty() {
            warn!("removed {} stale payloads: {:?}", dead.len(), dead);
        }
        dead.len()
    }

    /// Checks the structural invariants of the tree.
    ///
    /// - every node is reachable from the root exactly once
    /// - parent links match child links
    /// - every internal node's volume encloses both children
    /// - the side table maps each payload to its leaf
    pub fn is_consistent(&self) -> bool {
        let mut stack: Vec<(NodeKey, Option<NodeKey>)> =
            self.root.iter().flatten().map(|&key| (key, None)).collect();
        let mut visited = 0;
        let mut leaves = 0;

        while let Some((key, expected_parent)) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                return false;
            };
            if node.parent != expected_parent {
                return false;
            }
            visited += 1;

            match node.kind {
                NodeKind::Leaf(payload) => {
                    if self.leaves.get(&payload) != Some(&key) {
                        return false;
                    }
                    leaves += 1;
                }
                NodeKind::Internal(children) => {
                    for child in children {
                        let Some(child_node) = self.nodes.get(child) else {
                            return false;
                        };
                        if !node.volume.encloses(&child_node.volume) {
                            return false;
                        }
                        stack.push((child, Some(key)));
                    }
                }
            }
        }

        visited == self.nodes.len() && leaves == self.leaves.len()
    }

    /// Explicit-stack descent shared by the queries.
    ///
    /// `test` decides whether a node's volume is hit; hit leaves are passed to
    /// `emit`.
    fn traverse<T, E>(&self, workspace: &mut TreeWorkspace, mut test: T, mut emit: E)
    where
        T: FnMut(&V) -> bool,
        E: FnMut(P, &V),
    {
        let stack = &mut workspace.stack;
        stack.clear();
        stack.extend(self.root.iter().rev().flatten().copied());

        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            if !test(&node.volume) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(payload) => emit(payload, &node.volume),
                NodeKind::Internal([a, b]) => {
                    stack.push(b);
                    stack.push(a);
                }
            }
        }
    }

    /// Hangs an unattached leaf into the tree.
    fn attach_leaf(&mut self, leaf: NodeKey) {
        if let Some(slot) = self.root.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(leaf);
            self.nodes[leaf].parent = None;
            return;
        }

        let [Some(a), Some(b)] = self.root else {
            return;
        };
        let volume = self.nodes[leaf].volume;
        let mut current = self.choose_child([a, b], &volume);
        while let Some(children) = self.nodes[current].children() {
            current = self.choose_child(children, &volume);
        }

        // `current` is a leaf: replace it by a new internal node holding both.
        let parent = self.nodes[current].parent;
        let merged = self.nodes[current].volume.merged(&volume);
        let internal = self
            .nodes
            .insert(Node::internal([current, leaf], merged, parent));
        self.replace_child(parent, current, internal);
        self.nodes[current].parent = Some(internal);
        self.nodes[leaf].parent = Some(internal);
        self.refit_from(parent);
    }

    /// Unhooks a leaf, promoting its sibling. The leaf stays in the arena.
    fn detach_leaf(&mut self, leaf: NodeKey) {
        let Some(parent) = self.nodes[leaf].parent else {
            for slot in &mut self.root {
                if *slot == Some(leaf) {
                    *slot = None;
                }
            }
            return;
        };

        if let Some([a, b]) = self.nodes[parent].children() {
            let sibling = if a == leaf { b } else { a };
            let grandparent = self.nodes[parent].parent;
            self.replace_child(grandparent, parent, sibling);
            self.nodes[sibling].parent = grandparent;
            self.nodes.remove(parent);
            self.refit_from(grandparent);
        }
        self.nodes[leaf].parent = None;
    }

    fn choose_child(&self, children: [NodeKey; 2], volume: &V) -> NodeKey {
        let [a, b] = children;
        let index = self
            .heuristic
            .choose([&self.nodes[a].volume, &self.nodes[b].volume], volume);
        children[index]
    }

    /// Points the link from `parent` (the root when `None`) that referred to
    /// `old` at `new`.
    fn replace_child(&mut self, parent: Option<NodeKey>, old: NodeKey, new: NodeKey) {
        match parent {
            None => {
                if let Some(slot) = self.root.iter_mut().find(|slot| **slot == Some(old)) {
                    *slot = Some(new);
                }
            }
            Some(parent) => {
                if let NodeKind::Internal(children) = &mut self.nodes[parent].kind {
                    for child in children.iter_mut().filter(|child| **child == old) {
                        *child = new;
                    }
                }
            }
        }
    }

    /// Recomputes internal volumes from `start` up to the root.
    fn refit_from(&mut self, start: Option<NodeKey>) {
        let mut cursor = start;
        while let Some(key) = cursor {
            if let Some([a, b]) = self.nodes[key].children() {
                let merged = self.nodes[a].volume.merged(&self.nodes[b].volume);
                self.nodes[key].volume = merged;
            }
            cursor = self.nodes[key].parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Aabb, Sphere};
    use nalgebra::{Point3, UnitQuaternion, Vector3};

    /// Small deterministic generator so the property tests are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next_f32(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
        }

        fn range(&mut self, min: f32, max: f32) -> f32 {
            min + (max - min) * self.next_f32()
        }

        fn sphere(&mut self) -> Sphere {
            Sphere::new(
                Point3::new(self.range(-50.0, 50.0), self.range(-50.0, 50.0), self.range(-50.0, 50.0)),
                self.range(0.1, 3.0),
            )
        }
    }

    fn make_sphere(x: f32, y: f32, z: f32, radius: f32) -> Sphere {
        Sphere::new(Point3::new(x, y, z), radius)
    }

    fn make_box(center: [f32; 3], size: f32) -> Obb {
        Obb::new(Point3::from(center), Vector3::repeat(size), UnitQuaternion::identity())
    }

    fn random_tree(rng: &mut Lcg, count: u32) -> VolumeTree<u32, Sphere> {
        let mut tree = VolumeTree::new();
        for id in 0..count {
            assert!(tree.insert(id, rng.sphere()));
        }
        tree
    }

    #[test]
    fn empty_tree() {
        let tree: VolumeTree<u32, Sphere> = VolumeTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root_child_count(), 0);
        assert!(tree.is_consistent());
    }

    #[test]
    fn first_two_inserts_attach_to_root() {
        let mut tree = VolumeTree::new();
        tree.insert(1u32, make_sphere(0.0, 0.0, 0.0, 1.0));
        assert_eq!(tree.root_child_count(), 1);
        tree.insert(2u32, make_sphere(5.0, 0.0, 0.0, 1.0));
        assert_eq!(tree.root_child_count(), 2);
        assert_eq!(tree.depth(), 1);

        tree.insert(3u32, make_sphere(6.0, 0.0, 0.0, 1.0));
        assert_eq!(tree.root_child_count(), 2);
        assert_eq!(tree.depth(), 2);
        assert!(tree.is_consistent());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = VolumeTree::new();
        assert!(tree.insert(1u32, make_sphere(0.0, 0.0, 0.0, 1.0)));
        assert!(!tree.insert(1u32, make_sphere(9.0, 0.0, 0.0, 1.0)));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.volume(&1).unwrap().center, Point3::origin());
    }

    #[test]
    fn insert_then_remove_all_empties_tree() {
        let mut rng = Lcg(7);
        let mut tree = random_tree(&mut rng, 200);
        assert!(tree.is_consistent());

        // Remove in a scrambled order.
        let mut order: Vec<u32> = (0..200).collect();
        for i in (1..order.len()).rev() {
            let j = (rng.next_f32() * (i + 1) as f32) as usize % (i + 1);
            order.swap(i, j);
        }
        for (removed, id) in order.iter().enumerate() {
            assert!(tree.remove(id).is_some(), "payload {id} should be present");
            if removed % 25 == 0 {
                assert!(tree.is_consistent());
            }
        }

        assert!(tree.is_empty());
        assert_eq!(tree.root_child_count(), 0);
        assert!(tree.is_consistent());
    }

    #[test]
    fn remove_missing_payload_is_none() {
        let mut tree: VolumeTree<u32, Sphere> = VolumeTree::new();
        assert!(tree.remove(&3).is_none());
        tree.insert(1, make_sphere(0.0, 0.0, 0.0, 1.0));
        assert!(tree.remove(&3).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn containment_holds_after_mixed_operations() {
        for heuristic in [InsertHeuristic::ClosestSurface, InsertHeuristic::LeastEnlargement] {
            let mut rng = Lcg(42);
            let mut tree = VolumeTree::with_heuristic(heuristic);
            for id in 0..100u32 {
                tree.insert(id, rng.sphere());
            }
            for step in 0..300u32 {
                let id = (rng.next_f32() * 100.0) as u32 % 100;
                match step % 3 {
                    0 => {
                        tree.update(id, rng.sphere());
                    }
                    1 => {
                        tree.remove(&id);
                    }
                    _ => {
                        tree.insert(id, rng.sphere());
                    }
                }
            }
            assert!(tree.is_consistent(), "{heuristic:?} broke the tree");
        }
    }

    #[test]
    fn small_update_keeps_structure() {
        let mut tree = VolumeTree::new();
        tree.insert(1u32, make_sphere(0.0, 0.0, 0.0, 1.0));
        tree.insert(2u32, make_sphere(4.0, 0.0, 0.0, 1.0));
        tree.insert(3u32, make_sphere(5.0, 0.0, 0.0, 1.0));
        let depth = tree.depth();

        // Still inside the parent enclosing 2 and 3.
        assert!(tree.update(3, make_sphere(4.8, 0.0, 0.0, 0.9)));
        assert_eq!(tree.depth(), depth);
        assert!(tree.is_consistent());
    }

    #[test]
    fn far_update_reinserts() {
        let mut tree = VolumeTree::new();
        for id in 0..10u32 {
            tree.insert(id, make_sphere(id as f32 * 3.0, 0.0, 0.0, 1.0));
        }
        assert!(tree.update(4, make_sphere(0.0, 500.0, 0.0, 1.0)));
        assert!(tree.is_consistent());

        let mut hits = Vec::new();
        let mut workspace = TreeWorkspace::new();
        tree.overlap_obb(&make_box([12.0, 0.0, 0.0], 1.0), &mut workspace, &mut hits);
        assert!(hits.is_empty());
        tree.overlap_obb(&make_box([0.0, 500.0, 0.0], 1.0), &mut workspace, &mut hits);
        assert_eq!(hits, vec![4]);
    }

    #[test]
    fn update_missing_payload_is_false() {
        let mut tree: VolumeTree<u32, Sphere> = VolumeTree::new();
        assert!(!tree.update(1, make_sphere(0.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn overlap_matches_brute_force() {
        let mut rng = Lcg(3);
        let tree = random_tree(&mut rng, 150);
        let mut workspace = TreeWorkspace::new();

        for _ in 0..40 {
            let query = Obb::new(
                Point3::new(rng.range(-50.0, 50.0), rng.range(-50.0, 50.0), rng.range(-50.0, 50.0)),
                Vector3::new(rng.range(1.0, 30.0), rng.range(1.0, 30.0), rng.range(1.0, 30.0)),
                UnitQuaternion::from_euler_angles(rng.range(0.0, 3.0), rng.range(0.0, 3.0), 0.0),
            );
            let mut hits = Vec::new();
            tree.overlap_obb(&query, &mut workspace, &mut hits);
            hits.sort_unstable();

            let mut expected: Vec<u32> = tree
                .payloads()
                .filter(|id| tree.volume(id).unwrap().intersects_obb(&query))
                .collect();
            expected.sort_unstable();
            assert_eq!(hits, expected);
        }
    }

    #[test]
    fn raycast_matches_brute_force() {
        let mut rng = Lcg(11);
        let tree = random_tree(&mut rng, 150);
        let mut workspace = TreeWorkspace::new();

        for _ in 0..40 {
            let origin = Point3::new(rng.range(-60.0, 60.0), rng.range(-60.0, 60.0), -60.0);
            let target = Point3::new(rng.range(-20.0, 20.0), rng.range(-20.0, 20.0), 0.0);
            let ray = Ray3D::towards(origin, target).unwrap();

            let mut hits = Vec::new();
            tree.raycast(&ray, &mut workspace, &mut hits);
            let mut ids: Vec<u32> = hits.iter().map(|(id, _)| *id).collect();
            ids.sort_unstable();

            let mut expected: Vec<u32> = tree
                .payloads()
                .filter(|id| tree.volume(id).unwrap().raycast(&ray).is_some())
                .collect();
            expected.sort_unstable();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn raycast_reports_entry_distance() {
        let mut tree = VolumeTree::new();
        tree.insert(1u32, make_sphere(10.0, 0.0, 0.0, 1.0));
        tree.insert(2u32, make_sphere(0.0, 10.0, 0.0, 1.0));

        let ray = Ray3D::new(Point3::origin(), Vector3::x());
        let mut hits = Vec::new();
        tree.raycast(&ray, &mut TreeWorkspace::new(), &mut hits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 1);
        approx::assert_relative_eq!(hits[0].1, 9.0, epsilon = 1e-5);
    }

    #[test]
    fn handle_null_refs_sweeps_dead_payloads() {
        let mut rng = Lcg(5);
        let mut tree = random_tree(&mut rng, 50);
        let removed = tree.handle_null_refs(|id| id % 2 == 0);
        assert_eq!(removed, 25);
        assert_eq!(tree.len(), 25);
        assert!(tree.payloads().all(|id| id % 2 == 0));
        assert!(tree.is_consistent());

        assert_eq!(tree.handle_null_refs(|_| true), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut rng = Lcg(9);
        let mut tree = random_tree(&mut rng, 20);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.insert(1, rng.sphere()));
        assert!(tree.is_consistent());
    }

    #[test]
    fn depth_stays_reasonable_for_spread_out_objects() {
        let mut tree = VolumeTree::new();
        for i in 0..64u32 {
            let (x, z) = ((i % 8) as f32 * 10.0, (i / 8) as f32 * 10.0);
            tree.insert(i, make_sphere(x, 0.0, z, 1.0));
        }
        assert!(tree.is_consistent());
        assert!(tree.depth() < 64, "depth {} degenerated into a list", tree.depth());
    }

    #[test]
    fn aabb_tree_is_consistent() {
        let mut rng = Lcg(13);
        let mut tree: VolumeTree<u32, Aabb> = VolumeTree::new();
        for id in 0..60u32 {
            let center = rng.sphere().center;
            tree.insert(id, Aabb::from_center_size(center, Vector3::new(2.0, 1.0, 4.0)));
        }
        for id in (0..60u32).step_by(3) {
            tree.remove(&id);
        }
        assert!(tree.is_consistent());
        assert_eq!(tree.len(), 40);
    }
}
