//! Text materials
//!
//! Text is drawn with one of three shader families:
//! - **SDF**: single-channel signed distance field, sharp at any scale
//! - **MSDF**: multi-channel distance field, keeps corners crisp
//! - **Basic**: plain alpha-tested atlas sampling
//!
//! The families share one uniform schema but not one program, so switching
//! family rebuilds the material while style changes update its uniforms in
//! place.

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use bytemuck::{Pod, Zeroable};

use crate::error::ConfigurationError;
use crate::foundation::math::Vec3;
use crate::render::texture::TextureHandle;

static NEXT_MATERIAL_ID: AtomicU32 = AtomicU32::new(1);

/// Unique identifier for materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

impl MaterialId {
    fn next() -> Self {
        Self(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shader family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// Signed distance field
    #[default]
    Sdf,
    /// Multi-channel signed distance field
    Msdf,
    /// Plain alpha
    Basic,
}

impl FromStr for RenderMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SDF" => Ok(Self::Sdf),
            "MSDF" => Ok(Self::Msdf),
            "basic" => Ok(Self::Basic),
            other => Err(ConfigurationError::InvalidRenderMode(other.to_string())),
        }
    }
}

/// Which faces of the mesh are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Front faces only
    #[default]
    Front,
    /// Back faces only
    Back,
    /// Both faces
    Double,
}

/// Rasterizer face culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Cull nothing
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

impl Side {
    /// Culling that draws exactly this side
    pub fn cull_mode(self) -> CullMode {
        match self {
            Self::Front => CullMode::Back,
            Self::Back => CullMode::Front,
            Self::Double => CullMode::None,
        }
    }
}

impl FromStr for Side {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            "double" => Ok(Self::Double),
            other => Err(ConfigurationError::InvalidSide(other.to_string())),
        }
    }
}

/// Style parameters bound into the material
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Linear RGB color
    pub color: Vec3,
    /// Opacity multiplier
    pub opacity: f32,
    /// Drawn faces
    pub side: Side,
    /// Alpha blending
    pub transparent: bool,
    /// Fragments below this alpha are discarded
    pub alpha_test: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Vec3::zeros(),
            opacity: 1.0,
            side: Side::Front,
            transparent: true,
            alpha_test: 0.5,
        }
    }
}

/// GLSL sources of one shader family
#[derive(Debug, PartialEq, Eq)]
pub struct ShaderProgram {
    /// Program name, used as the pipeline cache key
    pub name: &'static str,
    /// Vertex stage
    pub vertex_source: &'static str,
    /// Fragment stage
    pub fragment_source: &'static str,
}

const TEXT_VERTEX_SHADER: &str = include_str!("../../../shaders/text.vert");

/// Signed distance field program
pub static SDF_PROGRAM: ShaderProgram = ShaderProgram {
    name: "text_sdf",
    vertex_source: TEXT_VERTEX_SHADER,
    fragment_source: include_str!("../../../shaders/sdf.frag"),
};

/// Multi-channel signed distance field program
pub static MSDF_PROGRAM: ShaderProgram = ShaderProgram {
    name: "text_msdf",
    vertex_source: TEXT_VERTEX_SHADER,
    fragment_source: include_str!("../../../shaders/msdf.frag"),
};

/// Plain alpha program
pub static BASIC_PROGRAM: ShaderProgram = ShaderProgram {
    name: "text_basic",
    vertex_source: TEXT_VERTEX_SHADER,
    fragment_source: include_str!("../../../shaders/basic.frag"),
};

impl RenderMode {
    /// Program implementing this mode
    pub fn program(self) -> &'static ShaderProgram {
        match self {
            Self::Sdf => &SDF_PROGRAM,
            Self::Msdf => &MSDF_PROGRAM,
            Self::Basic => &BASIC_PROGRAM,
        }
    }
}

/// Uniform values shared by every text program
#[derive(Debug, Clone)]
pub struct TextUniforms {
    /// Glyph atlas
    pub map: TextureHandle,
    /// Linear RGB color
    pub color: Vec3,
    /// Opacity multiplier
    pub opacity: f32,
    /// Alpha discard threshold
    pub alpha_test: f32,
}

/// Text uniform data for GPU
///
/// Uploaded to Set 1, Binding 0 of every text program.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TextUniformBlock {
    /// Color - RGB + opacity
    pub color: [f32; 4],
    /// Alpha test, transparent flag, unused, unused
    pub params: [f32; 4],
}

/// Material of one shader family
#[derive(Debug, Clone)]
pub struct ShaderMaterial {
    id: MaterialId,
    program: &'static ShaderProgram,
    /// Uniform values
    pub uniforms: TextUniforms,
    /// Drawn faces
    pub side: Side,
    /// Alpha blending
    pub transparent: bool,
}

impl ShaderMaterial {
    fn new(program: &'static ShaderProgram, style: &TextStyle, map: &TextureHandle) -> Self {
        Self {
            id: MaterialId::next(),
            program,
            uniforms: TextUniforms {
                map: map.clone(),
                color: style.color,
                opacity: style.opacity,
                alpha_test: style.alpha_test,
            },
            side: style.side,
            transparent: style.transparent,
        }
    }

    fn apply(&mut self, style: &TextStyle, map: &TextureHandle) {
        self.uniforms.color = style.color;
        self.uniforms.opacity = style.opacity;
        self.uniforms.alpha_test = style.alpha_test;
        self.uniforms.map = map.clone();
        self.side = style.side;
        self.transparent = style.transparent;
    }
}

/// Text material, tagged by shader family
#[derive(Debug, Clone)]
pub enum TextMaterial {
    /// Signed distance field
    Sdf(ShaderMaterial),
    /// Multi-channel signed distance field
    Msdf(ShaderMaterial),
    /// Plain alpha
    Basic(ShaderMaterial),
}

impl TextMaterial {
    /// Build a fresh material for `mode`
    pub fn synthesize(mode: RenderMode, style: &TextStyle, map: &TextureHandle) -> Self {
        let material = ShaderMaterial::new(mode.program(), style, map);
        log::debug!("Synthesized {:?} text material {:?}", mode, material.id);
        match mode {
            RenderMode::Sdf => Self::Sdf(material),
            RenderMode::Msdf => Self::Msdf(material),
            RenderMode::Basic => Self::Basic(material),
        }
    }

    /// Update uniforms and pipeline state in place; identity is kept
    pub fn restyle(&mut self, style: &TextStyle, map: &TextureHandle) {
        self.shader_mut().apply(style, map);
    }

    /// Shader family of this material
    pub fn mode(&self) -> RenderMode {
        match self {
            Self::Sdf(_) => RenderMode::Sdf,
            Self::Msdf(_) => RenderMode::Msdf,
            Self::Basic(_) => RenderMode::Basic,
        }
    }

    /// Material identity
    pub fn id(&self) -> MaterialId {
        self.shader().id
    }

    /// Program the material draws with
    pub fn program(&self) -> &'static ShaderProgram {
        self.shader().program
    }

    /// Family-independent view
    pub fn shader(&self) -> &ShaderMaterial {
        match self {
            Self::Sdf(m) | Self::Msdf(m) | Self::Basic(m) => m,
        }
    }

    fn shader_mut(&mut self) -> &mut ShaderMaterial {
        match self {
            Self::Sdf(m) | Self::Msdf(m) | Self::Basic(m) => m,
        }
    }

    /// Face culling for the pipeline
    pub fn cull_mode(&self) -> CullMode {
        self.shader().side.cull_mode()
    }

    /// Uniform block ready for upload
    pub fn uniform_block(&self) -> TextUniformBlock {
        let shader = self.shader();
        let u = &shader.uniforms;
        TextUniformBlock {
            color: [u.color.x, u.color.y, u.color.z, u.opacity],
            params: [u.alpha_test, if shader.transparent { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}

/// Bring `material` in line with `mode` and `style`
///
/// Rebuilds only when the shader family changed. Returns whether it did.
pub fn update_material(
    material: &mut TextMaterial,
    mode: RenderMode,
    style: &TextStyle,
    map: &TextureHandle,
) -> bool {
    if material.mode() == mode {
        material.restyle(style, map);
        false
    } else {
        log::debug!("Text material {:?} -> {:?}, rebuilding", material.mode(), mode);
        *material = TextMaterial::synthesize(mode, style, map);
        true
    }
}
