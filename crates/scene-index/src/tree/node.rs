//! Volume tree node storage.

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a node in a [`VolumeTree`](super::VolumeTree) arena.
    pub struct NodeKey;
}

/// Leaf or internal node content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind<P> {
    /// Terminal node holding exactly one payload.
    Leaf(P),
    /// Node with exactly two children.
    Internal([NodeKey; 2]),
}

/// A node in the volume tree.
///
/// Leaves carry the payload's volume; an internal node carries a volume that
/// encloses both children. Nodes attached directly to the tree root have no
/// parent.
#[derive(Debug, Clone)]
pub(crate) struct Node<P, V> {
    pub(crate) volume: V,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) kind: NodeKind<P>,
}

impl<P: Copy, V> Node<P, V> {
    pub(crate) fn leaf(payload: P, volume: V) -> Self {
        Self {
            volume,
            parent: None,
            kind: NodeKind::Leaf(payload),
        }
    }

    pub(crate) fn internal(children: [NodeKey; 2], volume: V, parent: Option<NodeKey>) -> Self {
        Self {
            volume,
            parent,
            kind: NodeKind::Internal(children),
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> Option<[NodeKey; 2]> {
        match self.kind {
            NodeKind::Internal(children) => Some(children),
            NodeKind::Leaf(_) => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn payload(&self) -> Option<P> {
        match self.kind {
            NodeKind::Leaf(payload) => Some(payload),
            NodeKind::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn leaf_has_payload_and_no_children() {
        let node: Node<u32, f32> = Node::leaf(7, 1.0);
        assert_eq!(node.payload(), Some(7));
        assert!(node.children().is_none());
        assert!(node.parent.is_none());
    }

    #[test]
    fn internal_has_children_and_no_payload() {
        let mut arena: SlotMap<NodeKey, Node<u32, f32>> = SlotMap::with_key();
        let a = arena.insert(Node::leaf(1, 1.0));
        let b = arena.insert(Node::leaf(2, 1.0));
        let parent = Node::<u32, f32>::internal([a, b], 2.0, None);
        assert_eq!(parent.children(), Some([a, b]));
        assert!(parent.payload().is_none());
    }
}
