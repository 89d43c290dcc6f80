//! Rendering data for text meshes
//!
//! Everything here is renderer-agnostic: vertex/index buffers, uniform
//! blocks and shader sources ready to hand to a backend.

pub mod texture;
pub mod text;

pub use texture::{TextureHandle, TextureId};
