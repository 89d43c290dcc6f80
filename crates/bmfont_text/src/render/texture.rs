//! Atlas texture with a stable identity
//!
//! The handle is shared with materials and renderers. Loading a new font
//! swaps the pixel payload inside the same texture object instead of
//! allocating a new one, so every holder of the handle sees the new image.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::assets::ImageData;

static NEXT_TEXTURE_ID: AtomicU32 = AtomicU32::new(1);

/// Unique identifier for textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug)]
struct TextureSlot {
    image: Option<ImageData>,
    version: u64,
    anisotropy: u8,
}

/// Shared handle to one atlas texture
#[derive(Debug, Clone)]
pub struct TextureHandle {
    id: TextureId,
    slot: Rc<RefCell<TextureSlot>>,
}

impl TextureHandle {
    /// Allocate an empty texture
    pub fn new() -> Self {
        Self {
            id: TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed)),
            slot: Rc::new(RefCell::new(TextureSlot {
                image: None,
                version: 0,
                anisotropy: 16,
            })),
        }
    }

    /// Texture identity; never changes
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Swap in new pixel data and flag the texture for re-upload
    pub fn replace_image(&self, image: ImageData) {
        let mut slot = self.slot.borrow_mut();
        log::debug!(
            "Texture {:?} image replaced ({}x{})",
            self.id,
            image.width,
            image.height
        );
        slot.image = Some(image);
        slot.version += 1;
    }

    /// Whether any image has been bound yet
    pub fn has_image(&self) -> bool {
        self.slot.borrow().image.is_some()
    }

    /// Dimensions of the bound image
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.slot
            .borrow()
            .image
            .as_ref()
            .map(|image| (image.width, image.height))
    }

    /// Incremented on every image swap; renderers compare it to re-upload
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }

    /// Anisotropic filtering level requested for the atlas
    pub fn anisotropy(&self) -> u8 {
        self.slot.borrow().anisotropy
    }

    /// Run `f` with the bound image, if any
    pub fn with_image<R>(&self, f: impl FnOnce(&ImageData) -> R) -> Option<R> {
        self.slot.borrow().image.as_ref().map(f)
    }

    /// Whether two handles refer to the same texture object
    pub fn same_texture(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl Default for TextureHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacing_image_keeps_identity() {
        let texture = TextureHandle::new();
        let shared = texture.clone();
        assert!(!shared.has_image());
        assert_eq!(shared.version(), 0);

        texture.replace_image(ImageData::solid_color(8, 4, [255, 255, 255, 255]));
        texture.replace_image(ImageData::solid_color(16, 16, [0, 0, 0, 255]));

        assert!(shared.same_texture(&texture));
        assert_eq!(shared.id(), texture.id());
        assert_eq!(shared.dimensions(), Some((16, 16)));
        assert_eq!(shared.version(), 2);
        assert_eq!(shared.with_image(|img| img.data[3]), Some(255));
    }

    #[test]
    fn test_new_textures_are_distinct() {
        let a = TextureHandle::new();
        let b = TextureHandle::new();
        assert_ne!(a.id(), b.id());
        assert!(!a.same_texture(&b));
        assert_eq!(a.anisotropy(), 16);
    }
}
