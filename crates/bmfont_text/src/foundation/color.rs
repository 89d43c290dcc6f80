//! CSS-style color strings
//!
//! Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)` and a short table of named
//! colors. Components are returned in the 0.0-1.0 range, unconverted.

use super::math::Vec3;

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("aqua", 0x00ffff),
    ("magenta", 0xff00ff),
    ("fuchsia", 0xff00ff),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xc0c0c0),
    ("maroon", 0x800000),
    ("olive", 0x808000),
    ("navy", 0x000080),
    ("purple", 0x800080),
    ("teal", 0x008080),
    ("orange", 0xffa500),
];

/// Parse a color string, returning `None` when it is not understood
pub fn parse_color(input: &str) -> Option<Vec3> {
    let s = input.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(body) = s
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return None;
        }
        let mut rgb = [0.0f32; 3];
        for (slot, part) in rgb.iter_mut().zip(&parts) {
            let value: f32 = part.parse().ok()?;
            if !value.is_finite() {
                return None;
            }
            *slot = value.clamp(0.0, 255.0) / 255.0;
        }
        return Some(Vec3::new(rgb[0], rgb[1], rgb[2]));
    }

    let lower = s.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, value)| from_u32(*value))
}

fn parse_hex(hex: &str) -> Option<Vec3> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let value = u32::from_str_radix(hex, 16).ok()?;
            // Expand each nibble: 0xabc -> 0xaabbcc
            let r = (value >> 8) & 0xf;
            let g = (value >> 4) & 0xf;
            let b = value & 0xf;
            Some(from_u32((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11))
        }
        6 => u32::from_str_radix(hex, 16).ok().map(from_u32),
        _ => None,
    }
}

fn from_u32(value: u32) -> Vec3 {
    Vec3::new(
        ((value >> 16) & 0xff) as f32 / 255.0,
        ((value >> 8) & 0xff) as f32 / 255.0,
        (value & 0xff) as f32 / 255.0,
    )
}
