//! Text layout engine
//!
//! Converts a text string and a bitmap font into positioned glyphs. Handles
//! line wrapping, kerning, letter spacing, alignment and the aggregate
//! metrics used to anchor the mesh.
//!
//! # Layout Coordinate System
//!
//! - Units are font pixels
//! - +X axis points right
//! - +Y axis points down (BMFont convention); the pen starts at `-height`
//!   so the last line's baseline region ends near the origin

use std::str::FromStr;

use crate::assets::{FontDescriptor, Glyph};
use crate::error::ConfigurationError;
use crate::foundation::math::Vec2;

use super::word_wrap::{self, Line, WrapMode};

/// Average advance of one character as a fraction of the font size
pub const CHAR_WIDTH_RATIO: f32 = 0.6035;

/// Wrap width in characters when neither pixels nor a count is configured
pub const DEFAULT_WRAP_COUNT: f32 = 40.0;

/// Last-resort wrap width for fonts that report no size
pub const FALLBACK_WRAP_PIXELS: f32 = 1024.0;

const SPACE_ID: u32 = ' ' as u32;
const TAB_ID: u32 = '\t' as u32;
const M_ID: u32 = 'm' as u32;

const X_HEIGHT_CHARS: &[char] = &['x', 'e', 'a', 'o', 'n', 's', 'r', 'c', 'u', 'm', 'v', 'w', 'z'];
const CAP_HEIGHT_CHARS: &[char] = &['H', 'I', 'N', 'E', 'F', 'K', 'L', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z'];

/// Horizontal alignment of lines inside the layout box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Flush left
    #[default]
    Left,
    /// Flush right
    Right,
    /// Centered
    Center,
}

impl FromStr for Align {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            other => Err(ConfigurationError::InvalidAlign(other.to_string())),
        }
    }
}

/// Resolved layout options
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Text to lay out
    pub text: String,
    /// Line breaking mode
    pub wrap_mode: WrapMode,
    /// Wrap width in font pixels
    pub wrap_pixels: Option<f32>,
    /// Wrap width in approximate characters
    pub wrap_count: Option<f32>,
    /// Tab width in spaces
    pub tab_size: f32,
    /// Extra advance after every glyph
    pub letter_spacing: f32,
    /// Line height override
    pub line_height: Option<f32>,
    /// Line alignment
    pub align: Align,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            wrap_mode: WrapMode::Normal,
            wrap_pixels: None,
            wrap_count: None,
            tab_size: 4.0,
            letter_spacing: 0.0,
            line_height: None,
            align: Align::Left,
        }
    }
}

impl LayoutConfig {
    /// Wrap width in font pixels for `font`
    ///
    /// Explicit pixels win, then `count × 0.6035 × size`, then the default
    /// character count.
    pub fn effective_wrap_width(&self, font: &FontDescriptor) -> f32 {
        let from_count = |count: f32| count * CHAR_WIDTH_RATIO * font.info.size;

        let width = self
            .wrap_pixels
            .unwrap_or_else(|| from_count(self.wrap_count.unwrap_or(DEFAULT_WRAP_COUNT)));

        if width.is_finite() && width > 0.0 {
            width
        } else {
            FALLBACK_WRAP_PIXELS
        }
    }
}

/// Rectangle in layout or atlas space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphRect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

/// Normalised atlas coordinates of a glyph (v flipped, `v1` is the top row)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvRect {
    /// Left u
    pub u0: f32,
    /// Bottom v
    pub v0: f32,
    /// Right u
    pub u1: f32,
    /// Top v
    pub v1: f32,
}

/// One glyph placed by the layout engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    /// Character code
    pub id: u32,
    /// Index of the character in the text
    pub index: usize,
    /// Line the glyph belongs to
    pub line: usize,
    /// Pen position (alignment applied)
    pub position: Vec2,
    /// Quad in layout space (pen position plus glyph offsets)
    pub rect: GlyphRect,
    /// Atlas coordinates
    pub uv: UvRect,
}

/// Output of [`layout`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphLayout {
    /// Placed glyphs in text order
    pub glyphs: Vec<PlacedGlyph>,
    /// Layout width: widest line, never narrower than the wrap width
    pub width: f32,
    /// Layout height
    pub height: f32,
    /// Distance from the top of the layout to the x-height
    pub ascender: f32,
    /// Distance from the baseline to the bottom of a line
    pub descender: f32,
    /// Distance from the top of a line to its baseline
    pub baseline: f32,
    /// Line height used
    pub line_height: f32,
    /// Height of lowercase glyphs
    pub x_height: f32,
    /// Height of capitals
    pub cap_height: f32,
    /// Number of lines
    pub lines: usize,
    /// Wrap width the layout was computed with
    pub wrap_width: f32,
}

impl GlyphLayout {
    /// Layout with no glyphs and zero extent
    pub fn empty(wrap_width: f32) -> Self {
        Self {
            wrap_width,
            ..Self::default()
        }
    }

    /// Whether the layout has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Glyph lookup with the space and tab fallbacks BMFont layouts use
struct GlyphSource<'a> {
    font: &'a FontDescriptor,
    space: Option<Glyph>,
    tab: Option<Glyph>,
    letter_spacing: f32,
}

impl<'a> GlyphSource<'a> {
    fn new(font: &'a FontDescriptor, config: &LayoutConfig) -> Self {
        let space = font
            .glyph(SPACE_ID)
            .or_else(|| font.glyph(M_ID))
            .or_else(|| font.first_glyph())
            .copied();

        let tab = space.map(|space| Glyph {
            id: TAB_ID,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            xoffset: 0.0,
            yoffset: 0.0,
            xadvance: config.tab_size * space.xadvance,
            page: space.page,
        });

        Self {
            font,
            space,
            tab,
            letter_spacing: config.letter_spacing,
        }
    }

    fn glyph(&self, c: char) -> Option<Glyph> {
        let id = c as u32;
        match self.font.glyph(id) {
            Some(glyph) => Some(*glyph),
            None if id == TAB_ID => self.tab,
            None if id == SPACE_ID => self.space,
            None => None,
        }
    }

    /// How many characters from `start` fit inside `width`
    fn measure(&self, text: &[char], start: usize, end: usize, width: f32) -> Line {
        if self.font.glyphs.is_empty() {
            return Line { start, end: start, width: 0.0 };
        }

        let end = end.min(text.len());
        let mut pen = 0.0f32;
        let mut line_width = 0.0f32;
        let mut count = 0;
        let mut last: Option<Glyph> = None;

        for &c in &text[start..end] {
            if let Some(glyph) = self.glyph(c) {
                if let Some(prev) = last {
                    pen += self.font.kerning(prev.id, glyph.id);
                }
                let next_pen = pen + glyph.xadvance + self.letter_spacing;
                let next_width = pen + glyph.width;
                if next_width >= width || next_pen >= width {
                    break;
                }
                pen = next_pen;
                line_width = next_width;
                last = Some(glyph);
            }
            count += 1;
        }

        // Rightmost edge lines up with the rendered glyph
        if let Some(prev) = last {
            line_width += prev.xoffset;
        }

        Line {
            start,
            end: start + count,
            width: line_width,
        }
    }
}

fn first_glyph_height(font: &FontDescriptor, candidates: &[char]) -> f32 {
    candidates
        .iter()
        .find_map(|&c| font.glyph(c as u32))
        .map_or(0.0, |glyph| glyph.height)
}

fn atlas_uv(font: &FontDescriptor, glyph: &Glyph) -> UvRect {
    let tex_w = font.common.scale_w;
    let tex_h = font.common.scale_h;
    if tex_w <= 0.0 || tex_h <= 0.0 {
        return UvRect::default();
    }

    let right = glyph.x + glyph.width;
    let bottom = glyph.y + glyph.height;
    UvRect {
        u0: glyph.x / tex_w,
        v0: (tex_h - bottom) / tex_h,
        u1: right / tex_w,
        v1: (tex_h - glyph.y) / tex_h,
    }
}

/// Lay out `config.text` with `font`
///
/// Pure and deterministic: identical inputs give identical output.
pub fn layout(font: &FontDescriptor, config: &LayoutConfig) -> GlyphLayout {
    let wrap_width = config.effective_wrap_width(font);
    let text: Vec<char> = config.text.chars().collect();
    let source = GlyphSource::new(font, config);

    let lines = word_wrap::lines(&text, config.wrap_mode, wrap_width, |t, s, e, w| {
        source.measure(t, s, e, w)
    });

    if lines.is_empty() {
        return GlyphLayout::empty(wrap_width);
    }

    let max_line_width = lines
        .iter()
        .fold(0.0f32, |widest, line| widest.max(line.width).max(wrap_width));

    let line_height = config.line_height.unwrap_or(font.common.line_height);
    let baseline = font.common.base;
    let descender = line_height - baseline;
    let height = line_height * lines.len() as f32 - descender;
    let x_height = first_glyph_height(font, X_HEIGHT_CHARS);
    let cap_height = first_glyph_height(font, CAP_HEIGHT_CHARS);

    let mut glyphs = Vec::with_capacity(text.len());
    let mut y = -height;

    for (line_index, line) in lines.iter().enumerate() {
        let shift = match config.align {
            Align::Left => 0.0,
            Align::Center => (max_line_width - line.width) / 2.0,
            Align::Right => max_line_width - line.width,
        };

        let mut x = 0.0f32;
        let mut last: Option<Glyph> = None;

        for index in line.start..line.end {
            let Some(glyph) = source.glyph(text[index]) else {
                continue;
            };
            if let Some(prev) = last {
                x += font.kerning(prev.id, glyph.id);
            }

            let pen = Vec2::new(x + shift, y);
            glyphs.push(PlacedGlyph {
                id: glyph.id,
                index,
                line: line_index,
                position: pen,
                rect: GlyphRect {
                    x: pen.x + glyph.xoffset,
                    y: pen.y + glyph.yoffset,
                    width: glyph.width,
                    height: glyph.height,
                },
                uv: atlas_uv(font, &glyph),
            });

            x += glyph.xadvance + config.letter_spacing;
            last = Some(glyph);
        }

        y += line_height;
    }

    GlyphLayout {
        glyphs,
        width: max_line_width,
        height,
        ascender: line_height - descender - x_height,
        descender,
        baseline,
        line_height,
        x_height,
        cap_height,
        lines: lines.len(),
        wrap_width,
    }
}
