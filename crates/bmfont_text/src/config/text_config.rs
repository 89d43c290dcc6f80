//! Text option schema and its resolution into typed settings

use serde::{Deserialize, Serialize};

use super::Config;
use crate::error::{ConfigurationError, TextResult};
use crate::foundation::color::parse_color;
use crate::foundation::math::{finite, positive_finite, Vec3};
use crate::render::text::{Align, LayoutConfig, RenderMode, Side, TextStyle, WrapMode};
use crate::scene::{Anchor, Baseline};

/// Descriptor used when none is configured
pub const DEFAULT_FONT_URL: &str = "fonts/DejaVu-sdf.fnt";

const DEFAULT_TAB_SIZE: f32 = 4.0;
const DEFAULT_LETTER_SPACING: f32 = 0.0;
const DEFAULT_OPACITY: f32 = 1.0;
const DEFAULT_ALPHA_TEST: f32 = 0.5;
const DEFAULT_COLOR: &str = "#000";

/// Flat option set of one text node, as the host hands it over
///
/// Enumerated options are kept as strings and only validated by
/// [`ResolvedConfig::resolve`]. Numeric options are `None` when unset or
/// when the supplied value was not a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Text to lay out
    pub text: String,
    /// Descriptor URL
    pub fnt: String,
    /// Explicit atlas image URL
    #[serde(rename = "fntImage", skip_serializing_if = "Option::is_none")]
    pub fnt_image: Option<String>,
    /// `left`, `right`, `center` or `align`
    pub anchor: String,
    /// `top`, `center` or `bottom`
    pub baseline: String,
    /// `left`, `right` or `center`
    pub align: String,
    /// Wrap mode: `normal`, `pre` or `nowrap`
    pub mode: String,
    /// CSS-style color
    pub color: String,
    /// Material type: `SDF`, `MSDF` or `basic`
    #[serde(rename = "type")]
    pub render_type: String,
    /// `front`, `back` or `double`
    pub side: String,
    /// Alpha blending
    pub transparent: bool,
    /// Tab width in spaces
    #[serde(rename = "tabSize", skip_serializing_if = "Option::is_none")]
    pub tab_size: Option<f64>,
    /// Render width in world units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Render height in world units, used to fill an unsized geometry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Extra advance after each glyph, in font pixels
    #[serde(rename = "letterSpacing", skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// Line height override, in font pixels
    #[serde(rename = "lineHeight", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Opacity multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Fragments below this alpha are discarded
    #[serde(rename = "alphaTest", skip_serializing_if = "Option::is_none")]
    pub alpha_test: Option<f64>,
    /// Wrap width in font pixels
    #[serde(rename = "wrappixels", skip_serializing_if = "Option::is_none")]
    pub wrap_pixels: Option<f64>,
    /// Wrap width in approximate characters
    #[serde(rename = "wrapcount", skip_serializing_if = "Option::is_none")]
    pub wrap_count: Option<f64>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            fnt: DEFAULT_FONT_URL.to_string(),
            fnt_image: None,
            anchor: "center".to_string(),
            baseline: "center".to_string(),
            align: "left".to_string(),
            mode: "normal".to_string(),
            color: DEFAULT_COLOR.to_string(),
            render_type: "SDF".to_string(),
            side: "front".to_string(),
            transparent: true,
            tab_size: None,
            width: None,
            height: None,
            letter_spacing: None,
            line_height: None,
            opacity: None,
            alpha_test: None,
            wrap_pixels: None,
            wrap_count: None,
        }
    }
}

impl Config for TextConfig {}

impl TextConfig {
    /// Config with the given text and every other option at its default
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set one option from its string form
    ///
    /// Numbers are read like a lenient float parser: the longest numeric
    /// prefix wins and anything non-finite leaves the option unset.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> TextResult<()> {
        match name {
            "text" => self.text = value.to_string(),
            "fnt" => self.fnt = value.to_string(),
            "fntImage" => {
                self.fnt_image = Some(value.to_string()).filter(|s| !s.is_empty());
            }
            "anchor" => self.anchor = value.to_string(),
            "baseline" => self.baseline = value.to_string(),
            "align" => self.align = value.to_string(),
            "mode" => self.mode = value.to_string(),
            "color" => self.color = value.to_string(),
            "type" => self.render_type = value.to_string(),
            "side" => self.side = value.to_string(),
            "transparent" => {
                self.transparent = match value.trim() {
                    "false" => false,
                    "true" | "" => true,
                    other => {
                        log::warn!("transparent expects true/false, got '{}'", other);
                        true
                    }
                };
            }
            "tabSize" => self.tab_size = parse_number(value),
            "width" => self.width = parse_number(value),
            "height" => self.height = parse_number(value),
            "letterSpacing" => self.letter_spacing = parse_number(value),
            "lineHeight" => self.line_height = parse_number(value),
            "opacity" => self.opacity = parse_number(value),
            "alphaTest" => self.alpha_test = parse_number(value),
            "wrappixels" => self.wrap_pixels = parse_number(value),
            "wrapcount" => self.wrap_count = parse_number(value),
            other => return Err(ConfigurationError::UnknownOption(other.to_string()).into()),
        }
        Ok(())
    }
}

/// Read the longest numeric prefix of `value`; `None` unless finite
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    (1..=trimmed.len())
        .rev()
        .filter(|end| trimmed.is_char_boundary(*end))
        .find_map(|end| trimmed[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Typed, validated form of a [`TextConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Descriptor URL
    pub fnt: String,
    /// Explicit atlas image URL
    pub fnt_image: Option<String>,
    /// Layout engine input
    pub layout: LayoutConfig,
    /// Horizontal origin rule
    pub anchor: Anchor,
    /// Vertical origin rule
    pub baseline: Baseline,
    /// Shader family
    pub mode: RenderMode,
    /// Material style
    pub style: TextStyle,
    /// Render width in world units
    pub width: Option<f32>,
    /// Render height in world units
    pub height: Option<f32>,
}

impl ResolvedConfig {
    /// Validate every enumerated option and coerce numbers
    pub fn resolve(config: &TextConfig) -> Result<Self, ConfigurationError> {
        let anchor: Anchor = config.anchor.parse()?;
        let baseline: Baseline = config.baseline.parse()?;
        let align: Align = config.align.parse()?;
        let wrap_mode: WrapMode = config.mode.parse()?;
        let mode: RenderMode = config.render_type.parse()?;
        let side: Side = config.side.parse()?;

        let color = parse_color(&config.color).unwrap_or_else(|| {
            log::warn!("Unrecognised color '{}', using {}", config.color, DEFAULT_COLOR);
            Vec3::zeros()
        });

        let layout = LayoutConfig {
            text: config.text.clone(),
            wrap_mode,
            wrap_pixels: positive_finite(config.wrap_pixels),
            wrap_count: positive_finite(config.wrap_count),
            tab_size: finite(config.tab_size)
                .map_or(DEFAULT_TAB_SIZE, |v| v.max(0.0)),
            letter_spacing: finite(config.letter_spacing).unwrap_or(DEFAULT_LETTER_SPACING),
            line_height: positive_finite(config.line_height),
            align,
        };

        let style = TextStyle {
            color,
            opacity: finite(config.opacity).unwrap_or(DEFAULT_OPACITY),
            side,
            transparent: config.transparent,
            alpha_test: finite(config.alpha_test).unwrap_or(DEFAULT_ALPHA_TEST),
        };

        Ok(Self {
            fnt: config.fnt.clone(),
            fnt_image: config.fnt_image.clone().filter(|s| !s.is_empty()),
            layout,
            anchor,
            baseline,
            mode,
            style,
            width: positive_finite(config.width),
            height: positive_finite(config.height),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_defaults_resolve() {
        let resolved = ResolvedConfig::resolve(&TextConfig::default()).unwrap();

        assert_eq!(resolved.anchor, Anchor::Center);
        assert_eq!(resolved.baseline, Baseline::Center);
        assert_eq!(resolved.layout.align, Align::Left);
        assert_eq!(resolved.layout.wrap_mode, WrapMode::Normal);
        assert_eq!(resolved.layout.tab_size, 4.0);
        assert_eq!(resolved.mode, RenderMode::Sdf);
        assert_eq!(resolved.style.side, Side::Front);
        assert_eq!(resolved.style.opacity, 1.0);
        assert_eq!(resolved.style.alpha_test, 0.5);
        assert_eq!(resolved.style.color, Vec3::zeros());
        assert!(resolved.style.transparent);
        assert_eq!(resolved.width, None);
        assert_eq!(resolved.fnt, DEFAULT_FONT_URL);
    }

    #[test]
    fn test_numeric_coercion_falls_back_to_unset() {
        let mut config = TextConfig::default();
        config.set_attribute("lineHeight", "abc").unwrap();
        config.set_attribute("width", "2.5m").unwrap();
        config.set_attribute("opacity", "NaN").unwrap();
        config.set_attribute("wrapcount", "Infinity").unwrap();

        assert_eq!(config.line_height, None);
        assert_eq!(config.width, Some(2.5));
        assert_eq!(config.opacity, None);
        assert_eq!(config.wrap_count, None);

        config.opacity = Some(f64::NAN);
        let resolved = ResolvedConfig::resolve(&config).unwrap();
        assert_eq!(resolved.style.opacity, 1.0);
        assert_eq!(resolved.layout.line_height, None);
        assert_eq!(resolved.width, Some(2.5));

        config.set_attribute("width", "1e300").unwrap();
        assert_eq!(ResolvedConfig::resolve(&config).unwrap().width, None);
    }

    #[test]
    fn test_invalid_enumerations_are_configuration_errors() {
        let mut config = TextConfig::default();
        config.anchor = "diagonal".to_string();
        assert_eq!(
            ResolvedConfig::resolve(&config),
            Err(ConfigurationError::InvalidAnchor("diagonal".to_string()))
        );

        let mut config = TextConfig::default();
        config.side = "sideways".to_string();
        assert_eq!(
            ResolvedConfig::resolve(&config),
            Err(ConfigurationError::InvalidSide("sideways".to_string()))
        );

        let mut config = TextConfig::default();
        config.mode = "wrap".to_string();
        assert!(matches!(
            ResolvedConfig::resolve(&config),
            Err(ConfigurationError::InvalidWrapMode(_))
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        let mut config = TextConfig::default();
        let err = config.set_attribute("font-size", "12").unwrap_err();
        assert_eq!(err.to_string(), "configuration error: unknown option 'font-size'");
    }

    #[test]
    fn test_bad_color_is_not_fatal() {
        let mut config = TextConfig::default();
        config.set_attribute("color", "not-a-color").unwrap();
        let resolved = ResolvedConfig::resolve(&config).unwrap();
        assert_eq!(resolved.style.color, Vec3::zeros());
    }

    #[test]
    fn test_ron_and_toml_files() {
        let dir = crate::test_support::temp_dir("config_files");
        let ron_path = dir.path().join("label.ron");
        std::fs::write(
            &ron_path,
            r#"(text: "Hello", wrapcount: Some(20.0), anchor: "left", side: "double")"#,
        )
        .unwrap();

        let config = TextConfig::load_from_file(&ron_path).unwrap();
        assert_eq!(config.text, "Hello");
        assert_eq!(config.wrap_count, Some(20.0));
        assert_eq!(config.side, "double");
        assert_eq!(config.baseline, "center");

        let toml_path = dir.path().join("label.toml");
        config.save_to_file(&toml_path).unwrap();
        let reloaded = TextConfig::load_from_file(&toml_path).unwrap();
        assert_eq!(reloaded, config);

        let err = TextConfig::load_from_file("label.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
