//! Anchor and baseline placement
//!
//! Positions and scales a laid-out text mesh inside its owning node. Layout
//! happens in font pixels with y pointing down; the scene is in world units
//! with y pointing up, so the mesh is scaled uniformly and flipped on y.

use std::str::FromStr;

use crate::error::ConfigurationError;
use crate::foundation::math::{Transform, Vec3};
use crate::render::text::{Align, GlyphLayout};

/// World width used when neither the config nor the node declares one
pub const DEFAULT_WIDTH: f32 = 1.0;

/// Forward nudge that keeps text off coplanar background geometry
pub const DEPTH_OFFSET: f32 = 0.001;

/// Horizontal origin of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Origin at the left edge
    Left,
    /// Origin at the right edge
    Right,
    /// Origin at the horizontal center
    #[default]
    Center,
    /// Follow the text alignment
    Align,
}

impl FromStr for Anchor {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            "align" => Ok(Self::Align),
            other => Err(ConfigurationError::InvalidAnchor(other.to_string())),
        }
    }
}

impl Anchor {
    /// Layout-space x of the origin
    pub fn offset(self, align: Align, width: f32) -> f32 {
        let effective = match self {
            Self::Align => match align {
                Align::Left => Self::Left,
                Align::Right => Self::Right,
                Align::Center => Self::Center,
            },
            other => other,
        };

        match effective {
            Self::Right => -width,
            Self::Center => -width / 2.0,
            Self::Left | Self::Align => 0.0,
        }
    }
}

/// Vertical origin of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// Origin at the top line
    Top,
    /// Origin at the vertical center
    #[default]
    Center,
    /// Origin at the bottom
    Bottom,
}

impl FromStr for Baseline {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            other => Err(ConfigurationError::InvalidBaseline(other.to_string())),
        }
    }
}

impl Baseline {
    /// Layout-space y of the origin
    pub fn offset(self, height: f32, ascender: f32) -> f32 {
        match self {
            Self::Bottom => 0.0,
            Self::Top => -height + ascender,
            Self::Center => -height / 2.0,
        }
    }
}

/// World units per font pixel
pub fn text_scale(render_width: f32, wrap_width: f32) -> f32 {
    if wrap_width > 0.0 {
        render_width / wrap_width
    } else {
        0.0
    }
}

/// Mesh transform for `layout` rendered `render_width` world units wide
pub fn place(
    layout: &GlyphLayout,
    anchor: Anchor,
    baseline: Baseline,
    align: Align,
    render_width: f32,
) -> Transform {
    let scale = text_scale(render_width, layout.wrap_width);
    let x = anchor.offset(align, layout.width);
    let y = baseline.offset(layout.height, layout.ascender);

    Transform::new(
        Vec3::new(x * scale, y * scale, DEPTH_OFFSET),
        Vec3::new(scale, -scale, scale),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metrics() -> GlyphLayout {
        GlyphLayout {
            width: 200.0,
            height: 72.0,
            ascender: 8.0,
            wrap_width: 200.0,
            ..GlyphLayout::default()
        }
    }

    #[test]
    fn test_left_bottom_is_origin() {
        let t = place(&metrics(), Anchor::Left, Baseline::Bottom, Align::Left, 2.0);
        assert_eq!(t.position, Vec3::new(0.0, 0.0, DEPTH_OFFSET));
        assert_eq!(t.scale, Vec3::new(0.01, -0.01, 0.01));
    }

    #[test]
    fn test_center_center() {
        let t = place(&metrics(), Anchor::Center, Baseline::Center, Align::Left, 2.0);
        assert_relative_eq!(t.position.x, -100.0 * 0.01);
        assert_relative_eq!(t.position.y, -36.0 * 0.01);
    }

    #[test]
    fn test_top_and_right() {
        let t = place(&metrics(), Anchor::Right, Baseline::Top, Align::Left, 1.0);
        assert_relative_eq!(t.position.x, -1.0);
        assert_relative_eq!(t.position.y, (-72.0 + 8.0) / 200.0);
    }

    #[test]
    fn test_align_anchor_follows_alignment() {
        assert_eq!(Anchor::Align.offset(Align::Right, 10.0), -10.0);
        assert_eq!(Anchor::Align.offset(Align::Center, 10.0), -5.0);
        assert_eq!(Anchor::Align.offset(Align::Left, 10.0), 0.0);
    }

    #[test]
    fn test_parsing() {
        assert_eq!("align".parse::<Anchor>(), Ok(Anchor::Align));
        assert_eq!(
            "diagonal".parse::<Anchor>(),
            Err(ConfigurationError::InvalidAnchor("diagonal".to_string()))
        );
        assert_eq!("top".parse::<Baseline>(), Ok(Baseline::Top));
        assert!("middle".parse::<Baseline>().is_err());
    }

    #[test]
    fn test_zero_wrap_width_does_not_divide() {
        assert_eq!(text_scale(1.0, 0.0), 0.0);
    }
}
