//! BMFont descriptor model and parsers
//!
//! Supports the AngelCode text format (`.fnt`) and the JSON layout written
//! by msdf-bmfont style generators. Only the fields the layout engine uses
//! are kept.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{FontLoadError, UnsupportedFontError};

/// Highest page id a descriptor may declare
pub const MAX_PAGE_ID: u32 = 15;

/// `info` block: face name and the size glyphs were generated at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontInfo {
    /// Face name
    pub face: String,
    /// Base glyph size in pixels
    pub size: f32,
}

/// `common` block: metrics shared by every glyph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontCommon {
    /// Distance between two baselines
    pub line_height: f32,
    /// Distance from the top of a line to the baseline
    pub base: f32,
    /// Atlas width in pixels
    pub scale_w: f32,
    /// Atlas height in pixels
    pub scale_h: f32,
}

/// Metrics and atlas placement of one glyph
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Glyph {
    /// Character code
    pub id: u32,
    /// Left edge in the atlas
    pub x: f32,
    /// Top edge in the atlas
    pub y: f32,
    /// Width in the atlas
    pub width: f32,
    /// Height in the atlas
    pub height: f32,
    /// Horizontal offset from the pen position
    pub xoffset: f32,
    /// Vertical offset from the top of the line
    pub yoffset: f32,
    /// Pen advance after drawing the glyph
    pub xadvance: f32,
    /// Atlas page index
    pub page: u32,
}

/// Distance field parameters written by SDF/MSDF generators
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    /// `sdf`, `msdf`, `psdf`, ...
    pub field_type: String,
    /// Range of the encoded distance in pixels
    pub distance_range: f32,
}

/// Parsed bitmap font descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontDescriptor {
    /// `info` block
    pub info: FontInfo,
    /// `common` block
    pub common: FontCommon,
    /// Atlas page file names, indexed by page id
    pub pages: Vec<String>,
    /// Glyphs keyed by character code
    pub glyphs: HashMap<u32, Glyph>,
    /// Kerning amounts keyed by (first, second)
    pub kernings: HashMap<(u32, u32), f32>,
    /// Distance field parameters, when the generator wrote them
    pub distance_field: Option<DistanceField>,
}

impl FontDescriptor {
    /// Look up a glyph by character code
    pub fn glyph(&self, id: u32) -> Option<&Glyph> {
        self.glyphs.get(&id)
    }

    /// Kerning between two consecutive glyphs, zero when absent
    pub fn kerning(&self, first: u32, second: u32) -> f32 {
        self.kernings.get(&(first, second)).copied().unwrap_or(0.0)
    }

    /// Glyph with the lowest character code, used as a last-resort fallback
    pub fn first_glyph(&self) -> Option<&Glyph> {
        self.glyphs.values().min_by_key(|g| g.id)
    }

    /// Reject descriptors that need more than one atlas page
    pub fn validate_pages(&self) -> Result<(), UnsupportedFontError> {
        if self.pages.len() == 1 {
            Ok(())
        } else {
            Err(UnsupportedFontError::PageCount(self.pages.len()))
        }
    }

    /// Parse a descriptor, picking the format from the URL extension
    pub fn parse(url: &str, bytes: &[u8]) -> Result<Self, FontLoadError> {
        let lower = url.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Self::from_json(bytes)
        } else {
            let text = std::str::from_utf8(bytes).map_err(|e| FontLoadError::Parse {
                line: 0,
                message: format!("descriptor is not UTF-8: {e}"),
            })?;
            Self::from_text(text)
        }
    }

    /// Parse the AngelCode text format
    pub fn from_text(source: &str) -> Result<Self, FontLoadError> {
        let mut font = Self::default();

        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('<') {
                return Err(FontLoadError::Parse {
                    line: line_no,
                    message: "XML descriptors are not supported".to_string(),
                });
            }

            let (tag, attrs) = tokenize(line, line_no)?;
            match tag {
                "info" => {
                    font.info.face = attrs.get("face").cloned().unwrap_or_default();
                    font.info.size = number(&attrs, "size", line_no)?.abs();
                }
                "common" => {
                    font.common.line_height = number(&attrs, "lineHeight", line_no)?;
                    font.common.base = number(&attrs, "base", line_no)?;
                    font.common.scale_w = number(&attrs, "scaleW", line_no)?;
                    font.common.scale_h = number(&attrs, "scaleH", line_no)?;
                }
                "page" => {
                    let id = page_id(&attrs, line_no)?;
                    let file = attrs.get("file").cloned().ok_or_else(|| FontLoadError::Parse {
                        line: line_no,
                        message: "page without file".to_string(),
                    })?;
                    let len = id.checked_add(1).ok_or_else(|| FontLoadError::Parse {
                        line: line_no,
                        message: format!("page id {id} out of range"),
                    })?;
                    if font.pages.len() < len {
                        font.pages.resize(len, String::new());
                    }
                    font.pages[id] = file;
                }
                "char" => {
                    let glyph = Glyph {
                        id: integer(&attrs, "id", line_no)?,
                        x: number(&attrs, "x", line_no)?,
                        y: number(&attrs, "y", line_no)?,
                        width: number(&attrs, "width", line_no)?,
                        height: number(&attrs, "height", line_no)?,
                        xoffset: number(&attrs, "xoffset", line_no)?,
                        yoffset: number(&attrs, "yoffset", line_no)?,
                        xadvance: number(&attrs, "xadvance", line_no)?,
                        page: optional_integer(&attrs, "page", line_no)?.unwrap_or(0),
                    };
                    font.glyphs.insert(glyph.id, glyph);
                }
                "kerning" => {
                    let first = integer(&attrs, "first", line_no)?;
                    let second = integer(&attrs, "second", line_no)?;
                    let amount = number(&attrs, "amount", line_no)?;
                    font.kernings.insert((first, second), amount);
                }
                "distanceField" => {
                    font.distance_field = Some(DistanceField {
                        field_type: attrs.get("fieldType").cloned().unwrap_or_default(),
                        distance_range: number(&attrs, "distanceRange", line_no)?,
                    });
                }
                // chars/kernings counts and unknown tags carry nothing we use
                _ => {}
            }
        }

        if font.common.line_height <= 0.0 {
            return Err(FontLoadError::Parse {
                line: 0,
                message: "missing common block".to_string(),
            });
        }

        Ok(font)
    }

    /// Parse the JSON layout
    pub fn from_json(bytes: &[u8]) -> Result<Self, FontLoadError> {
        let json: JsonFont = serde_json::from_slice(bytes)?;

        let glyphs = json
            .chars
            .into_iter()
            .map(|c| {
                let glyph = Glyph {
                    id: c.id,
                    x: c.x,
                    y: c.y,
                    width: c.width,
                    height: c.height,
                    xoffset: c.xoffset,
                    yoffset: c.yoffset,
                    xadvance: c.xadvance,
                    page: c.page,
                };
                (glyph.id, glyph)
            })
            .collect();

        let kernings = json
            .kernings
            .into_iter()
            .map(|k| ((k.first, k.second), k.amount))
            .collect();

        Ok(Self {
            info: FontInfo {
                face: json.info.face,
                size: json.info.size.abs(),
            },
            common: FontCommon {
                line_height: json.common.line_height,
                base: json.common.base,
                scale_w: json.common.scale_w,
                scale_h: json.common.scale_h,
            },
            pages: json.pages,
            glyphs,
            kernings,
            distance_field: json.distance_field.map(|d| DistanceField {
                field_type: d.field_type,
                distance_range: d.distance_range,
            }),
        })
    }
}

/// Split `tag key=value key="quoted value"` into the tag and its attributes
fn tokenize(line: &str, line_no: usize) -> Result<(&str, HashMap<String, String>), FontLoadError> {
    let (tag, rest) = match line.find(char::is_whitespace) {
        Some(split) => (&line[..split], &line[split..]),
        None => (line, ""),
    };

    let mut attrs = HashMap::new();
    let mut chars = rest.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            // Bare word without a value
            attrs.insert(key, String::new());
            continue;
        }
        chars.next();

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                return Err(FontLoadError::Parse {
                    line: line_no,
                    message: format!("unterminated string for '{key}'"),
                });
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        attrs.insert(key, value);
    }

    Ok((tag, attrs))
}

fn optional_number(
    attrs: &HashMap<String, String>,
    key: &str,
    line_no: usize,
) -> Result<Option<f32>, FontLoadError> {
    match attrs.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| FontLoadError::Parse {
                line: line_no,
                message: format!("'{key}' is not a number: '{raw}'"),
            }),
    }
}

fn optional_integer(
    attrs: &HashMap<String, String>,
    key: &str,
    line_no: usize,
) -> Result<Option<u32>, FontLoadError> {
    match attrs.get(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<u32>().map(Some).map_err(|_| FontLoadError::Parse {
            line: line_no,
            message: format!("'{key}' is not an id: '{raw}'"),
        }),
    }
}

fn integer(attrs: &HashMap<String, String>, key: &str, line_no: usize) -> Result<u32, FontLoadError> {
    optional_integer(attrs, key, line_no)?.ok_or_else(|| FontLoadError::Parse {
        line: line_no,
        message: format!("missing '{key}'"),
    })
}

fn page_id(attrs: &HashMap<String, String>, line_no: usize) -> Result<usize, FontLoadError> {
    let id = integer(attrs, "id", line_no)?;
    if id > MAX_PAGE_ID {
        return Err(FontLoadError::Parse {
            line: line_no,
            message: format!("page id {id} exceeds {MAX_PAGE_ID}"),
        });
    }
    usize::try_from(id).map_err(|_| FontLoadError::Parse {
        line: line_no,
        message: format!("page id {id} out of range"),
    })
}

fn number(attrs: &HashMap<String, String>, key: &str, line_no: usize) -> Result<f32, FontLoadError> {
    optional_number(attrs, key, line_no)?.ok_or_else(|| FontLoadError::Parse {
        line: line_no,
        message: format!("missing '{key}'"),
    })
}

#[derive(Deserialize)]
struct JsonFont {
    #[serde(default)]
    pages: Vec<String>,
    #[serde(default)]
    chars: Vec<JsonChar>,
    info: JsonInfo,
    common: JsonCommon,
    #[serde(default)]
    kernings: Vec<JsonKerning>,
    #[serde(default, rename = "distanceField")]
    distance_field: Option<JsonDistanceField>,
}

#[derive(Deserialize)]
struct JsonInfo {
    #[serde(default)]
    face: String,
    size: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonCommon {
    line_height: f32,
    base: f32,
    scale_w: f32,
    scale_h: f32,
}

#[derive(Deserialize)]
struct JsonChar {
    id: u32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    xoffset: f32,
    yoffset: f32,
    xadvance: f32,
    #[serde(default)]
    page: u32,
}

#[derive(Deserialize)]
struct JsonKerning {
    first: u32,
    second: u32,
    amount: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonDistanceField {
    field_type: String,
    distance_range: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"info face="DejaVu Sans Mono" size=32 bold=0 italic=0 charset="" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=2,2
common lineHeight=38 base=30 scaleW=256 scaleH=256 pages=1 packed=0
page id=0 file="DejaVu-sdf.png"
chars count=2
char id=65 x=0 y=0 width=20 height=24 xoffset=-1 yoffset=6 xadvance=19 page=0 chnl=0
char id=86 x=22 y=0 width=20 height=24 xoffset=0 yoffset=6 xadvance=19 page=0 chnl=0
kernings count=1
kerning first=65 second=86 amount=-2
distanceField fieldType=sdf distanceRange=4
"#;

    #[test]
    fn test_parse_text_descriptor() {
        let font = FontDescriptor::from_text(SAMPLE).unwrap();

        assert_eq!(font.info.face, "DejaVu Sans Mono");
        assert_eq!(font.info.size, 32.0);
        assert_eq!(font.common.line_height, 38.0);
        assert_eq!(font.common.base, 30.0);
        assert_eq!(font.pages, vec!["DejaVu-sdf.png".to_string()]);
        assert_eq!(font.glyphs.len(), 2);
        assert_eq!(font.glyph(65).unwrap().xoffset, -1.0);
        assert_eq!(font.kerning(65, 86), -2.0);
        assert_eq!(font.kerning(86, 65), 0.0);
        assert_eq!(font.distance_field.as_ref().unwrap().field_type, "sdf");
        assert!(font.validate_pages().is_ok());
    }

    #[test]
    fn test_parse_json_descriptor() {
        let json = br#"{
            "pages": ["a.png", "b.png"],
            "chars": [{"id": 97, "index": 1, "char": "a", "width": 10, "height": 12,
                       "xoffset": 1, "yoffset": 4, "xadvance": 11, "chnl": 15,
                       "x": 0, "y": 0, "page": 0}],
            "info": {"face": "Roboto", "size": 42},
            "common": {"lineHeight": 50, "base": 40, "scaleW": 512, "scaleH": 512,
                       "pages": 2, "packed": 0},
            "distanceField": {"fieldType": "msdf", "distanceRange": 4},
            "kernings": []
        }"#;

        let font = FontDescriptor::parse("fonts/roboto.json", json).unwrap();

        assert_eq!(font.info.size, 42.0);
        assert_eq!(font.glyph(97).unwrap().xadvance, 11.0);
        assert_eq!(
            font.validate_pages(),
            Err(UnsupportedFontError::PageCount(2))
        );
    }

    #[test]
    fn test_malformed_descriptors() {
        let err = FontDescriptor::from_text("common lineHeight=abc base=1 scaleW=1 scaleH=1").unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { line: 1, .. }));

        let err = FontDescriptor::from_text("info face=\"open").unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { line: 1, .. }));

        let err = FontDescriptor::from_text("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { .. }));

        let err = FontDescriptor::from_text("info face=x size=3").unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { line: 0, .. }));
    }

    #[test]
    fn test_out_of_range_ids_are_parse_errors() {
        const COMMON: &str = "common lineHeight=40 base=32 scaleW=256 scaleH=256\n";

        for page in ["page id=1e20 file=\"a.png\"", "page id=4000000000 file=\"a.png\"", "page id=-1 file=\"a.png\"", "page id=16 file=\"a.png\""] {
            let err = FontDescriptor::from_text(&format!("{COMMON}{page}\n")).unwrap_err();
            assert!(matches!(err, FontLoadError::Parse { line: 2, .. }), "{page}");
        }

        let err = FontDescriptor::from_text(&format!(
            "{COMMON}char id=1.5 x=0 y=0 width=1 height=1 xoffset=0 yoffset=0 xadvance=1\n"
        ))
        .unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { line: 2, .. }));

        let err = FontDescriptor::from_text(&format!("{COMMON}kerning first=65 second=1e12 amount=-2\n")).unwrap_err();
        assert!(matches!(err, FontLoadError::Parse { line: 2, .. }));

        let font = FontDescriptor::from_text(&format!("{COMMON}page id=15 file=\"p.png\"\n")).unwrap();
        assert_eq!(font.pages.len(), 16);
        assert_eq!(font.pages[15], "p.png");
    }
}
