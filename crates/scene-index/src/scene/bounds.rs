//! World bounds of scene objects.

use nalgebra::Vector3;

use crate::Obb;

use super::{ObjectId, ObjectKind, ObjectTypes, SceneHost};

/// Which objects may produce bounds, and the fallback size for volumeless ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsQueryConfig {
    pub object_types: ObjectTypes,
    /// World size of the box given to lights, particle systems, cameras and
    /// empty objects.
    pub volumeless_size: Vector3<f32>,
}

impl Default for BoundsQueryConfig {
    fn default() -> Self {
        Self {
            object_types: ObjectTypes::all(),
            volumeless_size: Vector3::repeat(1.0),
        }
    }
}

/// World OBB of `id`, recomputed from the live transform.
///
/// Returns an invalid box when `kind` is not allowed by `config`, the object
/// has no transform, or a non-volumeless object has no bounds.
pub fn calc_world_obb<H>(
    host: &H,
    id: ObjectId,
    kind: ObjectKind,
    config: &BoundsQueryConfig,
) -> Obb
where
    H: SceneHost + ?Sized,
{
    if !config.object_types.allows(kind) {
        return Obb::invalid();
    }
    let Some(transform) = host.transform(id) else {
        return Obb::invalid();
    };

    if kind.is_volumeless() {
        return Obb::new(transform.position, config.volumeless_size, transform.rotation);
    }
    match host.local_bounds(id) {
        Some(local) => Obb::from_aabb_transformed(&local, &transform),
        None => Obb::invalid(),
    }
}
