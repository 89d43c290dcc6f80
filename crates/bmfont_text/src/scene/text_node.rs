//! Text node controller
//!
//! Owns one text mesh and keeps its geometry, material and placement in
//! step with the node's config. Font loads are asynchronous; each request
//! carries a [`LoadTicket`] and only the newest ticket's completions are
//! applied.
//!
//! ```text
//! Uninitialized --fnt set--> FontLoading --font parsed--> Ready
//!       ^                        |   ^                      |
//!       +------ load failed -----+   +------ fnt changed ---+
//! ```

use crate::assets::{atlas_image_url, FontDescriptor, ImageData, LoadEvent, LoadTicket};
use crate::config::{ResolvedConfig, TextConfig};
use crate::error::{FontLoadError, TextError, TextResult};
use crate::foundation::math::Transform;
use crate::render::text::{layout, update_material, GlyphLayout, TextGeometry, TextMaterial};
use crate::render::TextureHandle;

use super::host::{DeclaredGeometry, Lifecycle, NodeContext, SceneHost, SceneObject};
use super::placement::{self, DEFAULT_WIDTH};
use super::scene_graph::Aabb;
use super::TextNodeKey;

/// Name the mesh is registered under on the owning node
pub const OBJECT_NAME: &str = "bmfont-text";

/// Font lifecycle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No font requested yet, or the only request failed
    Uninitialized,
    /// Waiting for the descriptor of `ticket`
    FontLoading {
        /// Ticket of the request in flight
        ticket: LoadTicket,
    },
    /// A font is loaded
    Ready,
}

/// What an update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new font was requested
    FontRequested,
    /// Text was laid out again with the current font
    Relayout,
    /// Nothing to lay out yet; a pending load will pick up the config
    Deferred,
}

/// Mesh owned by a text node
#[derive(Debug)]
pub struct TextMesh {
    /// Glyph quads
    pub geometry: TextGeometry,
    /// Current material
    pub material: TextMaterial,
    /// Atlas texture; identity survives font reloads
    pub texture: TextureHandle,
    /// Local transform
    pub transform: Transform,
    /// Drawn this frame
    pub visible: bool,
}

impl TextMesh {
    fn snapshot(&self) -> SceneObject {
        SceneObject {
            visible: self.visible,
            transform: self.transform.clone(),
            bounds: self.geometry.bounds(),
            bounding_sphere: self.geometry.bounding_sphere(),
            material: self.material.id(),
            texture: self.texture.id(),
            quad_count: self.geometry.quad_count(),
        }
    }

    /// Geometry bounds in the owning node's space
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.geometry
            .bounds()
            .map(|aabb| aabb.transformed(&self.transform))
    }
}

/// Controller of one text mesh
#[derive(Debug)]
pub struct TextNode {
    key: TextNodeKey,
    config: TextConfig,
    resolved: Option<ResolvedConfig>,
    state: NodeState,
    mesh: Option<TextMesh>,
    font: Option<FontDescriptor>,
    font_url: Option<String>,
    layout: Option<GlyphLayout>,
    generation: u64,
}

impl TextNode {
    /// Detached node with the given config
    pub fn new(key: TextNodeKey, config: TextConfig) -> Self {
        Self {
            key,
            config,
            resolved: None,
            state: NodeState::Uninitialized,
            mesh: None,
            font: None,
            font_url: None,
            layout: None,
            generation: 0,
        }
    }

    /// Registry key
    pub fn key(&self) -> TextNodeKey {
        self.key
    }

    /// Current config
    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Swap the config, returning the old one for [`Lifecycle::on_update`]
    pub fn replace_config(&mut self, config: TextConfig) -> TextConfig {
        std::mem::replace(&mut self.config, config)
    }

    /// Config of the last accepted update
    ///
    /// Font completions lay out against this, never against a config the
    /// last update rejected.
    pub fn resolved(&self) -> Option<&ResolvedConfig> {
        self.resolved.as_ref()
    }

    /// Font lifecycle state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Owned mesh; `None` while detached
    pub fn mesh(&self) -> Option<&TextMesh> {
        self.mesh.as_ref()
    }

    /// Loaded font
    pub fn font(&self) -> Option<&FontDescriptor> {
        self.font.as_ref()
    }

    /// Latest glyph layout
    pub fn layout(&self) -> Option<&GlyphLayout> {
        self.layout.as_ref()
    }

    fn current_ticket(&self) -> LoadTicket {
        LoadTicket {
            node: self.key,
            generation: self.generation,
        }
    }

    fn sync(&self, host: &mut dyn SceneHost) {
        if let Some(mesh) = &self.mesh {
            host.set_object(OBJECT_NAME, mesh.snapshot());
        }
    }

    fn request_font(&mut self, url: &str, ctx: &mut NodeContext<'_>) -> TextResult<UpdateOutcome> {
        let mesh = self.mesh.as_mut().ok_or(TextError::Detached)?;
        mesh.visible = false;

        self.generation += 1;
        let ticket = self.current_ticket();
        self.state = NodeState::FontLoading { ticket };
        self.font_url = Some(url.to_string());

        log::debug!("Node {:?} requesting font '{}' ({})", self.key, url, ticket.generation);
        ctx.loader.fetch_font(url, ticket);
        Ok(UpdateOutcome::FontRequested)
    }

    fn relayout(&mut self, resolved: &ResolvedConfig, host: &mut dyn SceneHost) -> TextResult<()> {
        let font = self.font.as_ref().ok_or(TextError::Detached)?;
        let mesh = self.mesh.as_mut().ok_or(TextError::Detached)?;

        let glyphs = layout(font, &resolved.layout);
        mesh.geometry.update(&glyphs);

        let declared = host.declared_geometry();
        let width = resolved
            .width
            .or_else(|| declared.and_then(|g| g.width))
            .unwrap_or(DEFAULT_WIDTH);
        let scale = placement::text_scale(width, glyphs.wrap_width);
        let height = resolved.height.unwrap_or(scale * glyphs.height);

        if let Some(geometry) = declared {
            let filled = DeclaredGeometry {
                width: geometry.width.or(Some(width)),
                height: geometry.height.or(Some(height)),
            };
            if filled != geometry {
                host.set_declared_geometry(filled);
            }
        }

        mesh.transform = placement::place(
            &glyphs,
            resolved.anchor,
            resolved.baseline,
            resolved.layout.align,
            width,
        );

        log::debug!(
            "Node {:?} laid out {} glyph(s) on {} line(s)",
            self.key,
            glyphs.glyphs.len(),
            glyphs.lines
        );
        self.layout = Some(glyphs);
        Ok(())
    }

    fn abandon_font_load(&mut self) {
        self.state = if self.font.is_some() {
            NodeState::Ready
        } else {
            NodeState::Uninitialized
        };
    }

    /// Apply a loader completion
    ///
    /// Completions for anything but the newest request are ignored.
    pub fn handle_load_event(&mut self, event: LoadEvent, ctx: &mut NodeContext<'_>) -> TextResult<()> {
        match event {
            LoadEvent::Font { ticket, url, result } => self.on_font_loaded(ticket, &url, result, ctx),
            LoadEvent::Image { ticket, url, image } => {
                self.on_image_loaded(ticket, &url, image, ctx.host);
                Ok(())
            }
        }
    }

    fn on_font_loaded(
        &mut self,
        ticket: LoadTicket,
        url: &str,
        result: Result<FontDescriptor, FontLoadError>,
        ctx: &mut NodeContext<'_>,
    ) -> TextResult<()> {
        if self.state != (NodeState::FontLoading { ticket }) {
            log::debug!("Node {:?} ignoring stale font '{}' ({})", self.key, url, ticket.generation);
            return Ok(());
        }

        let font = match result {
            Ok(font) => font,
            Err(e) => {
                self.abandon_font_load();
                return Err(e.into());
            }
        };
        if let Err(e) = font.validate_pages() {
            self.abandon_font_load();
            return Err(e.into());
        }
        // Everything that can fail is checked before the font is committed
        let resolved = self.resolved.clone().ok_or(TextError::Detached)?;
        if self.mesh.is_none() {
            return Err(TextError::Detached);
        }

        let page = font.pages.first().map_or("", String::as_str);
        let image_url = atlas_image_url(url, resolved.fnt_image.as_deref(), page);

        self.font = Some(font);
        self.state = NodeState::Ready;
        self.relayout(&resolved, ctx.host)?;
        ctx.loader.fetch_image(&image_url, ticket);
        self.sync(ctx.host);
        Ok(())
    }

    fn on_image_loaded(
        &mut self,
        ticket: LoadTicket,
        url: &str,
        image: Option<ImageData>,
        host: &mut dyn SceneHost,
    ) {
        if ticket != self.current_ticket() {
            log::debug!("Node {:?} ignoring stale image '{}' ({})", self.key, url, ticket.generation);
            return;
        }
        let Some(mesh) = self.mesh.as_mut() else {
            return;
        };

        match image {
            Some(image) => {
                log::info!("Atlas '{}' bound to texture {:?}", url, mesh.texture.id());
                mesh.texture.replace_image(image);
            }
            None => log::warn!("Showing text without atlas '{}'", url),
        }
        mesh.visible = true;
        self.sync(host);
    }
}

impl Lifecycle for TextNode {
    type Outcome = UpdateOutcome;

    fn on_attach(&mut self, ctx: &mut NodeContext<'_>) -> TextResult<()> {
        let resolved = ResolvedConfig::resolve(&self.config)?;
        let texture = TextureHandle::new();
        let material = TextMaterial::synthesize(resolved.mode, &resolved.style, &texture);

        self.mesh = Some(TextMesh {
            geometry: TextGeometry::new(),
            material,
            texture,
            transform: Transform::identity(),
            visible: true,
        });
        self.sync(ctx.host);
        log::debug!("Node {:?} attached", self.key);
        Ok(())
    }

    fn on_update(
        &mut self,
        previous: Option<&TextConfig>,
        ctx: &mut NodeContext<'_>,
    ) -> TextResult<UpdateOutcome> {
        if self.mesh.is_none() {
            return Err(TextError::Detached);
        }
        let resolved = ResolvedConfig::resolve(&self.config)?;
        if resolved.fnt.is_empty() {
            return Err(FontLoadError::MissingUrl.into());
        }
        self.resolved = Some(resolved.clone());

        let font_changed = self.font_url.as_deref() != Some(resolved.fnt.as_str());
        let outcome = if font_changed {
            if let Some(previous) = previous {
                log::debug!("Node {:?} font '{}' -> '{}'", self.key, previous.fnt, resolved.fnt);
            }
            self.request_font(&resolved.fnt, ctx)?
        } else if matches!(self.state, NodeState::Ready) && self.font.is_some() {
            self.relayout(&resolved, ctx.host)?;
            UpdateOutcome::Relayout
        } else {
            UpdateOutcome::Deferred
        };

        if let Some(mesh) = self.mesh.as_mut() {
            update_material(&mut mesh.material, resolved.mode, &resolved.style, &mesh.texture);
        }
        self.sync(ctx.host);
        Ok(outcome)
    }

    fn on_detach(&mut self, ctx: &mut NodeContext<'_>) {
        if let Some(mut mesh) = self.mesh.take() {
            mesh.geometry.dispose();
        }
        ctx.host.remove_object(OBJECT_NAME);

        // Outstanding completions no longer match
        self.generation += 1;
        self.state = NodeState::Uninitialized;
        log::debug!("Node {:?} detached", self.key);
    }
}
