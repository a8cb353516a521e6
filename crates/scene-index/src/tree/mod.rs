//! Binary bounding-volume trees for scene objects.
//!
//! A [`VolumeTree`] maps payloads (object handles) to bounding volumes and
//! answers broad-phase overlap and ray queries. Two volume kinds are used:
//!
//! - [`Sphere`](crate::Sphere) for regular scene objects
//! - [`Aabb`](crate::Aabb) for terrain-like objects, queried exactly as
//!   oriented boxes through [`TerrainTree`]
//!
//! # Architecture
//!
//! - [`VolumeTree`]: arena of nodes plus the payload to leaf side table
//! - [`BoundingVolume`]: what a volume must provide to be stored in the tree
//! - [`InsertHeuristic`]: strategy for choosing where new leaves go
//! - [`TreeWorkspace`]: reusable traversal stack

mod heuristic;
mod node;
mod terrain;
#[allow(clippy::module_inception)]
mod tree;
mod volume;

pub use heuristic::InsertHeuristic;
pub use terrain::{TerrainCollection, TerrainKind, TerrainTree};
pub use tree::{TreeWorkspace, VolumeTree};
pub use volume::BoundingVolume;
