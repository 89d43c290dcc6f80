//! # bmfont_text
//!
//! Signed-distance-field bitmap-font text meshes for 3D scenes.
//!
//! ## Features
//!
//! - **BMFont descriptors**: AngelCode text and JSON formats
//! - **Layout**: word wrapping, kerning, alignment, anchor/baseline placement
//! - **Materials**: SDF, MSDF and plain-alpha shader families
//! - **Async loading**: ticketed font/atlas requests; stale completions are ignored
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bmfont_text::prelude::*;
//!
//! fn main() -> Result<(), TextError> {
//!     let mut scene = TextScene::new(FsFontLoader::with_root("assets"));
//!     let key = scene.spawn(TextConfig::with_text("Hello, world"))?;
//!
//!     // Deliver the descriptor, then the atlas image
//!     scene.pump();
//!     scene.pump();
//!
//!     scene.set_attribute(key, "color", "#ff8800")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod error;
pub mod assets;
pub mod config;
pub mod render;
pub mod scene;

pub use error::{TextError, TextResult};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        assets::{FontDescriptor, FontLoader, FsFontLoader, LoadEvent, LoadEventSource, LoadTicket},
        config::{Config, ResolvedConfig, TextConfig},
        error::{ConfigurationError, FontLoadError, TextError, TextResult},
        foundation::math::{Transform, Vec3},
        render::text::{layout, GlyphLayout, LayoutConfig, RenderMode, TextMaterial, TextStyle},
        render::TextureHandle,
        scene::{
            Anchor, Baseline, Lifecycle, NodeState, SceneEntity, SceneHost, TextNode, TextNodeKey,
            TextScene, UpdateOutcome,
        },
    };
}

/// Fixtures shared by the unit tests
#[cfg(test)]
pub(crate) mod test_support {
    use std::fmt::Write as _;

    use tempfile::TempDir;

    use crate::assets::FontDescriptor;

    /// Monospace descriptor: size 32, every printable glyph 18x24 advancing 20
    pub fn mono_fnt() -> String {
        let mut fnt = String::from(
            "info face=\"Mono Test\" size=32 bold=0 italic=0\n\
             common lineHeight=40 base=32 scaleW=256 scaleH=256 pages=1 packed=0\n\
             page id=0 file=\"mono.png\"\n\
             chars count=95\n\
             char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=0 xadvance=20 page=0\n",
        );
        for (i, id) in (33u32..=126).enumerate() {
            let x = (i % 12) * 20;
            let y = (i / 12) * 26;
            let _ = writeln!(
                fnt,
                "char id={id} x={x} y={y} width=18 height=24 xoffset=1 yoffset=8 xadvance=20 page=0"
            );
        }
        fnt.push_str("kernings count=1\nkerning first=65 second=86 amount=-2\n");
        fnt
    }

    /// Parsed [`mono_fnt`]
    pub fn mono_font() -> FontDescriptor {
        FontDescriptor::from_text(&mono_fnt()).expect("fixture parses")
    }

    /// Scratch directory removed when dropped
    pub fn temp_dir(name: &str) -> TempDir {
        tempfile::Builder::new()
            .prefix(&format!("bmfont_text_{name}_"))
            .tempdir()
            .expect("create scratch dir")
    }
}
