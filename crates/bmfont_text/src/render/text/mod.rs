//! Text rendering system
//!
//! Line breaking, glyph layout, mesh geometry and materials.

pub mod word_wrap;
pub mod text_layout;
pub mod text_geometry;
pub mod text_material;

pub use word_wrap::WrapMode;
pub use text_layout::*;
pub use text_geometry::*;
pub use text_material::*;
