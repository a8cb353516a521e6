//! Per-call query policies.

/// How prefab instances are reported by overlap queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectOverlapPrefabMode {
    /// Report every overlapping object.
    #[default]
    None,
    /// Report the outermost prefab instance root instead of its parts, once
    /// per root. Objects outside any prefab instance are reported as is.
    PrefabInstanceRootIfPossible,
    /// Like `PrefabInstanceRootIfPossible`, but objects outside any prefab
    /// instance are skipped.
    OnlyPrefabInstanceRoot,
}

/// Overlap query policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectOverlapConfig {
    /// Require every corner of an object's box to be inside the query box.
    pub require_full_overlap: bool,
    pub prefab_mode: ObjectOverlapPrefabMode,
}

/// Narrow-phase precision of raycasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaycastPrecision {
    /// The most precise geometry available per object kind.
    #[default]
    BestFit,
    /// World boxes only.
    Box,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshRaycastConfig {
    /// Skip triangles facing away from the ray.
    pub cull_back_faces: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerrainRaycastConfig {
    /// Report the smoothed terrain normal instead of the collider normal.
    pub use_interpolated_normal: bool,
}

/// Raycast query policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectRaycastConfig {
    pub precision: RaycastPrecision,
    pub mesh: MeshRaycastConfig,
    pub terrain: TerrainRaycastConfig,
}

impl ObjectRaycastConfig {
    /// Box precision with default mesh and terrain settings.
    pub fn boxes() -> Self {
        Self {
            precision: RaycastPrecision::Box,
            ..Self::default()
        }
    }
}
