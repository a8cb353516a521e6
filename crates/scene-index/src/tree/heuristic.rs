//! Child selection strategies for tree insertion.
//!
//! Insertion descends from the root, picking one of the two children at every
//! internal node until a leaf is reached. The choice affects tree balance and
//! how tightly internal volumes fit, and therefore query cost.

use serde::{Deserialize, Serialize};

use super::BoundingVolume;

/// Strategy for choosing which child a new leaf descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InsertHeuristic {
    /// Pick the child minimizing `distance(child center, leaf center) + child radius`,
    /// i.e. the child whose enclosing sphere surface is closest. Ties go to the
    /// first child.
    #[default]
    ClosestSurface,
    /// Pick the child whose enclosing radius grows least when the leaf is
    /// merged in. Ties go to the first child.
    LeastEnlargement,
}

impl InsertHeuristic {
    /// Cost of descending into `child` with `leaf`; lower is better.
    pub fn cost<V: BoundingVolume>(self, child: &V, leaf: &V) -> f32 {
        match self {
            Self::ClosestSurface => (child.center() - leaf.center()).norm() + child.radius(),
            Self::LeastEnlargement => child.merged(leaf).radius() - child.radius(),
        }
    }

    /// Index (0 or 1) of the child to descend into.
    pub fn choose<V: BoundingVolume>(self, children: [&V; 2], leaf: &V) -> usize {
        if self.cost(children[1], leaf) < self.cost(children[0], leaf) {
            1
        } else {
            0
        }
    }
}
