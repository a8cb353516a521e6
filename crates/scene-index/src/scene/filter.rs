//! Caller-side filters for scene queries.

use std::fmt;

use super::{ObjectId, ObjectKind, ObjectTypes};

/// Predicate deciding whether an object takes part in a query.
pub type ObjectPredicate<'a> = &'a dyn Fn(ObjectId) -> bool;

/// Which objects an overlap query may return.
#[derive(Clone, Default)]
pub struct ObjectOverlapFilter<'a> {
    pub object_types: ObjectTypes,
    pub ignored: Vec<ObjectId>,
    pub custom: Option<ObjectPredicate<'a>>,
}

impl<'a> ObjectOverlapFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(object_types: ObjectTypes) -> Self {
        Self {
            object_types,
            ..Self::default()
        }
    }

    /// True if the object passes the type mask, is not ignored and is
    /// accepted by the custom predicate.
    pub fn allows(&self, id: ObjectId, kind: ObjectKind) -> bool {
        allows(self.object_types, &self.ignored, self.custom, id, kind)
    }
}

impl fmt::Debug for ObjectOverlapFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectOverlapFilter")
            .field("object_types", &self.object_types)
            .field("ignored", &self.ignored)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Which objects a raycast may hit, and whether the grid takes part.
#[derive(Clone)]
pub struct SceneRaycastFilter<'a> {
    pub object_types: ObjectTypes,
    pub ignored: Vec<ObjectId>,
    pub custom: Option<ObjectPredicate<'a>>,
    pub raycast_grid: bool,
    pub raycast_objects: bool,
}

impl Default for SceneRaycastFilter<'_> {
    fn default() -> Self {
        Self {
            object_types: ObjectTypes::all(),
            ignored: Vec::new(),
            custom: None,
            raycast_grid: true,
            raycast_objects: true,
        }
    }
}

impl<'a> SceneRaycastFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects only, no grid.
    pub fn objects_only() -> Self {
        Self {
            raycast_grid: false,
            ..Self::default()
        }
    }

    pub fn allows(&self, id: ObjectId, kind: ObjectKind) -> bool {
        allows(self.object_types, &self.ignored, self.custom, id, kind)
    }
}

impl fmt::Debug for SceneRaycastFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRaycastFilter")
            .field("object_types", &self.object_types)
            .field("ignored", &self.ignored)
            .field("custom", &self.custom.is_some())
            .field("raycast_grid", &self.raycast_grid)
            .field("raycast_objects", &self.raycast_objects)
            .finish()
    }
}

fn allows(
    types: ObjectTypes,
    ignored: &[ObjectId],
    custom: Option<ObjectPredicate<'_>>,
    id: ObjectId,
    kind: ObjectKind,
) -> bool {
    types.allows(kind) && !ignored.contains(&id) && custom.is_none_or(|predicate| predicate(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_allows_everything() {
        let filter = ObjectOverlapFilter::new();
        assert!(ObjectKind::ALL.iter().all(|&k| filter.allows(ObjectId(1), k)));
        assert!(SceneRaycastFilter::new().raycast_grid);
    }

    #[test]
    fn ignored_and_typed() {
        let filter = ObjectOverlapFilter {
            object_types: ObjectTypes::MESH,
            ignored: vec![ObjectId(2)],
            custom: None,
        };
        assert!(filter.allows(ObjectId(1), ObjectKind::Mesh));
        assert!(!filter.allows(ObjectId(2), ObjectKind::Mesh));
        assert!(!filter.allows(ObjectId(1), ObjectKind::Sprite));
    }

    #[test]
    fn custom_predicate_is_consulted() {
        let even = |id: ObjectId| id.raw() % 2 == 0;
        let filter = SceneRaycastFilter {
            custom: Some(&even),
            ..SceneRaycastFilter::objects_only()
        };
        assert!(filter.allows(ObjectId(4), ObjectKind::Camera));
        assert!(!filter.allows(ObjectId(5), ObjectKind::Camera));
        assert!(!filter.raycast_grid);
    }
}
