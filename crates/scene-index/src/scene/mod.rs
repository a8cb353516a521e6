//! Scene-level queries over the object index.
//!
//! [`PluginScene`] is the entry point: it keeps one [`SceneObjectTree`] in
//! sync with the host's [`SceneHost`] and answers filtered overlap and
//! raycast queries against the live scene.

mod bounds;
mod filter;
mod grid;
mod hit;
mod host;
mod object;
mod object_tree;
mod plugin_scene;
mod query_config;
mod sink;
#[cfg(test)]
pub(crate) mod testing;

pub use bounds::{calc_world_obb, BoundsQueryConfig};
pub use filter::{ObjectOverlapFilter, ObjectPredicate, SceneRaycastFilter};
pub use grid::SceneGrid;
pub use hit::{GridRayHit, MeshRayHit, NearestHit, ObjectRayHit, SceneRayHit, TerrainRayHit};
pub use host::SceneHost;
pub use object::{ObjectId, ObjectKind, ObjectTypes, RaycastStrategy};
pub use object_tree::SceneObjectTree;
pub use plugin_scene::PluginScene;
pub use query_config::{
    MeshRaycastConfig, ObjectOverlapConfig, ObjectOverlapPrefabMode, ObjectRaycastConfig,
    RaycastPrecision, TerrainRaycastConfig,
};
pub use sink::{AnyOverlap, FnSink, ObbCollector, ObjectCollector, OverlapSink};
