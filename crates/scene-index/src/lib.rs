//! Spatial object index and oriented bounding box queries for scene editing.
//!
//! Geometry primitives live at the crate root, the bounding-volume trees in
//! [`tree`], and the filtered scene queries in [`scene`].

mod aabb;
mod box_face;
mod circle;
mod config;
mod cuttable;
mod error;
mod obb;
mod plane;
mod polygon;
mod ray;
pub mod scene;
mod sphere;
mod transform;
pub mod tree;
mod triangle;

pub use aabb::Aabb;
pub use box_face::BoxFace;
pub use circle::{Circle2D, Circle3D};
pub use config::{Config, ConfigError, GridConfig, IndexConfig};
pub use cuttable::Cuttable;
pub use error::IndexError;
pub use obb::Obb;
pub use plane::{Classification, Plane3D, PlaneSide, PLANE_EPSILON};
pub use polygon::Polygon;
pub use ray::{Ray3D, TransformedRay};
pub use sphere::Sphere;
pub use transform::{trs_matrix, Transform};
pub use triangle::Triangle;
