//! Asset loading
//!
//! Bitmap-font descriptors, atlas images, and the asynchronous loader
//! contract that delivers them.

pub mod bmfont;
pub mod image_loader;
pub mod font_loader;

pub use bmfont::{FontDescriptor, Glyph};
pub use image_loader::ImageData;
pub use font_loader::{atlas_image_url, FontLoader, FsFontLoader, LoadEvent, LoadEventSource, LoadTicket};
