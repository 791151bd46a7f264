/// xscene Core Library - scene trees from textual scene descriptions
///
/// Parses serialized 4x4 transformation matrices, decomposes them into
/// translation / rotation / scale, builds a typed scene tree from a document
/// tree, and aggregates the bounds of all geometry under the root.

pub mod bounds;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod projection;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use bounds::{aggregate, Aabb, BoundingBox, BoundsSource};
pub use config::{DegenerateRotation, SceneConfig, ScaleMode};
pub use document::DocumentNode;
pub use error::{MatrixFormatError, SceneError};
pub use geometry::{realize, GeometryFactory, Instance, Mesh, MeshFactory, Realized, Triangle, Vertex};
pub use matrix::{parse_matrix, parse_values};
pub use projection::{Camera, ProjectionMode, ScreenPoint};
pub use scene::{build_scene, NodeId, Primitive, SceneBuilder, SceneNode, SceneTree};
pub use transform::Transform;
