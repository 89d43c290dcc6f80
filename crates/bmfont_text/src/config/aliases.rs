//! Short attribute names of the `a-text` primitive
//!
//! Pure naming sugar: each alias maps onto one [`TextConfig`] option and the
//! primitive only differs from the plain component in two defaults.

use super::TextConfig;
use crate::error::{ConfigurationError, TextResult};

/// Alias -> qualified option name
pub const TEXT_PRIMITIVE_MAPPINGS: &[(&str, &str)] = &[
    ("text", "text"),
    ("width", "width"),
    ("height", "height"),
    ("align", "align"),
    ("letterspacing", "letterSpacing"),
    ("lineheight", "lineHeight"),
    ("fnt", "fnt"),
    ("fntimage", "fntImage"),
    ("mode", "mode"),
    ("color", "color"),
    ("opacity", "opacity"),
    ("anchor", "anchor"),
    ("wrapcount", "wrapcount"),
    ("wrappixels", "wrappixels"),
];

/// Render width the primitive starts with
pub const TEXT_PRIMITIVE_WIDTH: f64 = 5.0;

/// Qualified option name for a primitive attribute
pub fn resolve_alias(alias: &str) -> Option<&'static str> {
    let lower = alias.to_ascii_lowercase();
    TEXT_PRIMITIVE_MAPPINGS
        .iter()
        .find(|(short, _)| *short == lower)
        .map(|(_, qualified)| *qualified)
}

/// Default config of the primitive: anchored by alignment, 5 units wide
pub fn text_primitive_defaults() -> TextConfig {
    TextConfig {
        anchor: "align".to_string(),
        width: Some(TEXT_PRIMITIVE_WIDTH),
        ..TextConfig::default()
    }
}

/// Set an option through its primitive alias
pub fn apply_primitive_attribute(config: &mut TextConfig, alias: &str, value: &str) -> TextResult<()> {
    let name = resolve_alias(alias)
        .ok_or_else(|| ConfigurationError::UnknownOption(alias.to_string()))?;
    config.set_attribute(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_route_to_options() {
        let mut config = text_primitive_defaults();
        apply_primitive_attribute(&mut config, "letterSpacing", "2").unwrap();
        apply_primitive_attribute(&mut config, "fntimage", "fonts/x.png").unwrap();
        apply_primitive_attribute(&mut config, "wrapcount", "12").unwrap();

        assert_eq!(config.letter_spacing, Some(2.0));
        assert_eq!(config.fnt_image.as_deref(), Some("fonts/x.png"));
        assert_eq!(config.wrap_count, Some(12.0));
        assert_eq!(config.anchor, "align");
        assert_eq!(config.width, Some(5.0));
    }

    #[test]
    fn test_every_alias_is_a_known_option() {
        let mut config = TextConfig::default();
        for (_, qualified) in TEXT_PRIMITIVE_MAPPINGS {
            assert!(config.set_attribute(qualified, "1").is_ok(), "{qualified}");
        }
    }

    #[test]
    fn test_unknown_alias() {
        let mut config = TextConfig::default();
        assert!(apply_primitive_attribute(&mut config, "side", "double").is_err());
        assert_eq!(resolve_alias("side"), None);
    }
}
