//! Text mesh geometry
//!
//! Turns a [`GlyphLayout`] into positioned quads (vertices and indices)
//! and keeps the bounding volumes used for culling.

use bytemuck::{Pod, Zeroable};

use super::text_layout::{GlyphLayout, PlacedGlyph};
use crate::foundation::math::Vec3;
use crate::scene::{Aabb, BoundingSphere};

/// Vertex data for text rendering
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct TextVertex {
    /// Position in layout space
    pub position: [f32; 3],
    /// UV texture coordinates
    pub uv: [f32; 2],
}

/// Vertex and index buffers of one text mesh
#[derive(Debug, Default)]
pub struct TextGeometry {
    vertices: Vec<TextVertex>,
    indices: Vec<u32>,
    bounds: Option<Aabb>,
    bounding_sphere: Option<BoundingSphere>,
    disposed: bool,
}

impl TextGeometry {
    /// Create empty geometry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the buffers from a fresh layout
    pub fn update(&mut self, layout: &GlyphLayout) {
        self.vertices.clear();
        self.indices.clear();
        self.vertices.reserve(layout.glyphs.len() * 4);
        self.indices.reserve(layout.glyphs.len() * 6);

        for glyph in &layout.glyphs {
            let Some(indices) = u32::try_from(self.vertices.len()).ok().and_then(quad_indices) else {
                log::warn!("Text geometry full; dropping glyphs from index {}", glyph.index);
                break;
            };
            self.vertices.extend_from_slice(&glyph_quad(glyph));
            self.indices.extend_from_slice(&indices);
        }

        self.disposed = false;
        self.compute_bounds();
    }

    fn compute_bounds(&mut self) {
        let mut points = self.vertices.iter().map(|v| Vec3::from(v.position));
        self.bounds = points.next().map(|first| {
            points.fold(Aabb::new(first, first), |aabb, p| aabb.expanded_to(p))
        });
        self.bounding_sphere = self
            .bounds
            .map(|aabb| BoundingSphere::enclosing(&aabb, self.vertices.iter().map(|v| Vec3::from(v.position))));
    }

    /// Vertex buffer
    pub fn vertices(&self) -> &[TextVertex] {
        &self.vertices
    }

    /// Index buffer
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of glyph quads
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Box around every vertex, `None` while empty
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Sphere around every vertex, `None` while empty
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.bounding_sphere
    }

    /// Raw vertex bytes for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for GPU upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Release the buffers
    pub fn dispose(&mut self) {
        self.vertices = Vec::new();
        self.indices = Vec::new();
        self.bounds = None;
        self.bounding_sphere = None;
        self.disposed = true;
    }

    /// Whether [`dispose`](Self::dispose) ran since the last update
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Index pattern of the quad whose first vertex is `base`; `None` past the `u32` range
fn quad_indices(base: u32) -> Option<[u32; 6]> {
    let last = base.checked_add(3)?;
    Some([
        base, base + 2, base + 1, // First triangle
        base, last, base + 2, // Second triangle
    ])
}

/// Four corners of a glyph, UVs flipped so `v1` maps to the quad's top edge
fn glyph_quad(glyph: &PlacedGlyph) -> [TextVertex; 4] {
    let rect = glyph.rect;
    let uv = glyph.uv;
    let x_min = rect.x;
    let y_min = rect.y;
    let x_max = rect.x + rect.width;
    let y_max = rect.y + rect.height;

    [
        // Bottom-left
        TextVertex {
            position: [x_min, y_min, 0.0],
            uv: [uv.u0, uv.v1],
        },
        // Top-left
        TextVertex {
            position: [x_min, y_max, 0.0],
            uv: [uv.u0, uv.v0],
        },
        // Top-right
        TextVertex {
            position: [x_max, y_max, 0.0],
            uv: [uv.u1, uv.v0],
        },
        // Bottom-right
        TextVertex {
            position: [x_max, y_min, 0.0],
            uv: [uv.u1, uv.v1],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::{layout, LayoutConfig};
    use crate::test_support::mono_font;
    use approx::assert_relative_eq;

    fn geometry_for(text: &str) -> TextGeometry {
        let font = mono_font();
        let glyphs = layout(
            &font,
            &LayoutConfig {
                text: text.to_string(),
                ..LayoutConfig::default()
            },
        );
        let mut geometry = TextGeometry::new();
        geometry.update(&glyphs);
        geometry
    }

    #[test]
    fn test_text_vertex_size() {
        assert_eq!(
            std::mem::size_of::<TextVertex>(),
            std::mem::size_of::<f32>() * 5 // 3 position + 2 uv
        );
    }

    #[test]
    fn test_quads_and_indices() {
        let geometry = geometry_for("ab");

        assert_eq!(geometry.quad_count(), 2);
        assert_eq!(geometry.indices(), &[0, 2, 1, 0, 3, 2, 4, 6, 5, 4, 7, 6]);
        assert_eq!(geometry.vertex_bytes().len(), 8 * 20);
        assert_eq!(geometry.index_bytes().len(), 12 * 4);

        // 'a' sits at pen (0, -32) with offsets (1, 8), size 18x24
        let v = geometry.vertices();
        assert_eq!(v[0].position, [1.0, -24.0, 0.0]);
        assert_eq!(v[2].position, [19.0, 0.0, 0.0]);
    }

    #[test]
    fn test_quad_indices_stop_at_u32_range() {
        assert_eq!(quad_indices(4), Some([4, 6, 5, 4, 7, 6]));
        assert_eq!(
            quad_indices(u32::MAX - 3),
            Some([u32::MAX - 3, u32::MAX - 1, u32::MAX - 2, u32::MAX - 3, u32::MAX, u32::MAX - 1])
        );
        assert_eq!(quad_indices(u32::MAX - 2), None);
        assert_eq!(quad_indices(u32::MAX), None);
    }

    #[test]
    fn test_bounds_cover_all_quads() {
        let geometry = geometry_for("ab");
        let aabb = geometry.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(1.0, -24.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(39.0, 0.0, 0.0));

        let sphere = geometry.bounding_sphere().unwrap();
        assert_eq!(sphere.center, Vec3::new(20.0, -12.0, 0.0));
        for v in geometry.vertices() {
            let d = (Vec3::from(v.position) - sphere.center).norm();
            assert!(d <= sphere.radius + 1e-4);
        }
        assert_relative_eq!(sphere.radius, (19.0f32 * 19.0 + 12.0 * 12.0).sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn test_empty_and_dispose() {
        let mut geometry = geometry_for("");
        assert_eq!(geometry.quad_count(), 0);
        assert!(geometry.bounds().is_none());

        let mut geometry2 = geometry_for("x");
        geometry2.dispose();
        assert!(geometry2.is_disposed());
        assert!(geometry2.vertices().is_empty());
        assert!(geometry2.bounding_sphere().is_none());

        geometry.dispose();
        assert!(geometry.is_disposed());
    }
}
