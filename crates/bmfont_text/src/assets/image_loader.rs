//! Image loading for glyph atlas pages
//!
//! Decodes PNG atlas pages into RGBA8 pixel data.

use std::path::Path;

use crate::error::ImageLoadError;

/// Decoded atlas image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (always 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageLoadError> {
        let path_ref = path.as_ref();

        log::debug!("Loading atlas image from: {:?}", path_ref);

        let img = image::open(path_ref).map_err(|e| ImageLoadError {
            url: path_ref.display().to_string(),
            message: e.to_string(),
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::info!("Loaded atlas image {}x{} from {:?}", width, height, path_ref);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Decode an image held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageLoadError> {
        let img = image::load_from_memory(bytes).map_err(|e| ImageLoadError {
            url: "<memory>".to_string(),
            message: e.to_string(),
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);

        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_image() {
        let img = ImageData::solid_color(4, 4, [255, 255, 255, 0]);
        assert_eq!(img.width, 4);
        assert_eq!(img.channels, 4);
        assert_eq!(img.size_bytes(), 4 * 4 * 4);
        assert_eq!(&img.data[0..4], &[255, 255, 255, 0]);
    }

    #[test]
    fn test_png_round_trip_through_memory() {
        let mut png = Vec::new();
        let buffer = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 40]));
        buffer
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let img = ImageData::from_bytes(&png).unwrap();
        assert_eq!((img.width, img.height), (2, 3));
        assert_eq!(&img.data[0..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ImageData::from_file("definitely/not/here.png").unwrap_err();
        assert!(err.url.ends_with("here.png"));
    }
}
