//! Scene integration
//!
//! The text node controller, its host contracts, placement rules and the
//! registry that owns nodes and routes their asynchronous completions.

pub mod scene_graph;
pub mod placement;
pub mod host;
pub mod text_node;
pub mod text_scene;

pub use scene_graph::{Aabb, BoundingSphere};
pub use placement::{Anchor, Baseline, DEFAULT_WIDTH, DEPTH_OFFSET};
pub use host::{DeclaredGeometry, Lifecycle, NodeContext, SceneEntity, SceneHost, SceneObject};
pub use text_node::{NodeState, TextMesh, TextNode, UpdateOutcome, OBJECT_NAME};
pub use text_scene::{TextNodeKey, TextScene};
