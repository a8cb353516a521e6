//! Object handles, categories and raycast strategies.

use std::fmt;

use bitflags::bitflags;

/// Opaque handle of a host scene object.
///
/// The index never dereferences it; every question about the object goes
/// through the [`SceneHost`](super::SceneHost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl ObjectId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The category an object is indexed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Mesh,
    /// A mesh that stands in for terrain.
    TerrainMesh,
    Sprite,
    Terrain,
    Light,
    ParticleSystem,
    Camera,
    /// An object with no renderable content.
    Empty,
}

impl ObjectKind {
    pub const ALL: [Self; 8] = [
        Self::Mesh,
        Self::TerrainMesh,
        Self::Sprite,
        Self::Terrain,
        Self::Light,
        Self::ParticleSystem,
        Self::Camera,
        Self::Empty,
    ];

    /// Position of this kind in [`ObjectKind::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The single-bit mask for this kind.
    pub fn types(self) -> ObjectTypes {
        match self {
            Self::Mesh => ObjectTypes::MESH,
            Self::TerrainMesh => ObjectTypes::TERRAIN_MESH,
            Self::Sprite => ObjectTypes::SPRITE,
            Self::Terrain => ObjectTypes::TERRAIN,
            Self::Light => ObjectTypes::LIGHT,
            Self::ParticleSystem => ObjectTypes::PARTICLE_SYSTEM,
            Self::Camera => ObjectTypes::CAMERA,
            Self::Empty => ObjectTypes::EMPTY,
        }
    }

    /// Kinds without geometric bounds of their own; they get a fallback box.
    pub fn is_volumeless(self) -> bool {
        matches!(
            self,
            Self::Light | Self::ParticleSystem | Self::Camera | Self::Empty
        )
    }

    /// Kinds that are also tracked by the terrain tree.
    pub fn is_terrain_like(self) -> bool {
        matches!(self, Self::Terrain | Self::TerrainMesh)
    }

    /// The strategy used to narrow raycasts against objects of this kind.
    pub fn raycast_strategy(self) -> RaycastStrategy {
        match self {
            Self::Mesh | Self::TerrainMesh => RaycastStrategy::Mesh,
            Self::Terrain => RaycastStrategy::Terrain,
            Self::Sprite => RaycastStrategy::Sprite,
            Self::Light | Self::ParticleSystem | Self::Camera | Self::Empty => RaycastStrategy::Box,
        }
    }
}

bitflags! {
    /// Set of object kinds, used by filters and bounds queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObjectTypes: u16 {
        const MESH            = 0b0000_0001;
        const TERRAIN_MESH    = 0b0000_0010;
        const SPRITE          = 0b0000_0100;
        const TERRAIN         = 0b0000_1000;
        const LIGHT           = 0b0001_0000;
        const PARTICLE_SYSTEM = 0b0010_0000;
        const CAMERA          = 0b0100_0000;
        const EMPTY           = 0b1000_0000;
    }
}

impl Default for ObjectTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl ObjectTypes {
    /// True if `kind` is in the set.
    #[inline]
    pub fn allows(self, kind: ObjectKind) -> bool {
        self.contains(kind.types())
    }
}

/// How a raycast candidate is narrowed after the broad phase.
///
/// Picked once per object when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaycastStrategy {
    /// Triangle-precise test through the host's mesh data.
    Mesh,
    /// The host's terrain collider.
    Terrain,
    /// World box test, reporting the normal of the face closest to the hit.
    Sprite,
    /// World box test.
    Box,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_index_matches_all() {
        for (i, kind) in ObjectKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn every_kind_has_a_distinct_bit() {
        let mut seen = ObjectTypes::empty();
        for kind in ObjectKind::ALL {
            assert!(!seen.intersects(kind.types()), "{kind:?} reuses a bit");
            seen |= kind.types();
        }
        assert_eq!(seen, ObjectTypes::all());
    }

    #[test]
    fn default_types_allow_everything() {
        assert!(ObjectKind::ALL.iter().all(|&k| ObjectTypes::default().allows(k)));
        let meshes = ObjectTypes::MESH | ObjectTypes::TERRAIN_MESH;
        assert!(meshes.allows(ObjectKind::TerrainMesh));
        assert!(!meshes.allows(ObjectKind::Sprite));
    }

    #[test]
    fn strategies_per_kind() {
        assert_eq!(ObjectKind::TerrainMesh.raycast_strategy(), RaycastStrategy::Mesh);
        assert_eq!(ObjectKind::Terrain.raycast_strategy(), RaycastStrategy::Terrain);
        assert_eq!(ObjectKind::Sprite.raycast_strategy(), RaycastStrategy::Sprite);
        assert_eq!(ObjectKind::Camera.raycast_strategy(), RaycastStrategy::Box);
        assert!(ObjectKind::Light.is_volumeless());
        assert!(!ObjectKind::Mesh.is_volumeless());
    }
}
