//! Host contracts
//!
//! The host entity system drives a text node through [`Lifecycle`] and the
//! node reports its mesh back through [`SceneHost`]. [`SceneEntity`] is an
//! in-memory host used by [`TextScene`](super::TextScene) and the tests.

use std::collections::HashMap;

use crate::assets::FontLoader;
use crate::config::TextConfig;
use crate::error::TextResult;
use crate::foundation::math::Transform;
use crate::render::text::MaterialId;
use crate::render::TextureId;

use super::scene_graph::{Aabb, BoundingSphere};

/// Size declared by the node's geometry component; `None` means unsized
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeclaredGeometry {
    /// Declared width
    pub width: Option<f32>,
    /// Declared height
    pub height: Option<f32>,
}

/// What the scene graph knows about a registered mesh
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Drawn this frame
    pub visible: bool,
    /// Local transform
    pub transform: Transform,
    /// Box around the geometry, in geometry space
    pub bounds: Option<Aabb>,
    /// Sphere around the geometry, in geometry space
    pub bounding_sphere: Option<BoundingSphere>,
    /// Bound material
    pub material: MaterialId,
    /// Bound atlas texture
    pub texture: TextureId,
    /// Number of glyph quads
    pub quad_count: usize,
}

/// Outbound contract to the owning scene node
pub trait SceneHost {
    /// Register or replace a named object
    fn set_object(&mut self, name: &str, object: SceneObject);

    /// Deregister a named object
    fn remove_object(&mut self, name: &str) -> Option<SceneObject>;

    /// Named object, if registered
    fn object(&self, name: &str) -> Option<&SceneObject>;

    /// Size of the node's geometry component, if it has one
    fn declared_geometry(&self) -> Option<DeclaredGeometry>;

    /// Overwrite the node's geometry component
    fn set_declared_geometry(&mut self, geometry: DeclaredGeometry);
}

/// Collaborators a lifecycle callback may call out to
pub struct NodeContext<'a> {
    /// Owning scene node
    pub host: &'a mut dyn SceneHost,
    /// Font and image fetcher
    pub loader: &'a mut dyn FontLoader,
}

/// Inbound contract from the host entity system
pub trait Lifecycle {
    /// What an update decided to do
    type Outcome;

    /// Node was added to the scene
    fn on_attach(&mut self, ctx: &mut NodeContext<'_>) -> TextResult<()>;

    /// Config changed; `previous` is `None` on the first update
    fn on_update(
        &mut self,
        previous: Option<&TextConfig>,
        ctx: &mut NodeContext<'_>,
    ) -> TextResult<Self::Outcome>;

    /// Node is being removed from the scene
    fn on_detach(&mut self, ctx: &mut NodeContext<'_>);
}

/// In-memory scene node
#[derive(Debug, Default)]
pub struct SceneEntity {
    objects: HashMap<String, SceneObject>,
    geometry: Option<DeclaredGeometry>,
}

impl SceneEntity {
    /// Entity without a geometry component
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity with a geometry component of the given size
    pub fn with_geometry(geometry: DeclaredGeometry) -> Self {
        Self {
            objects: HashMap::new(),
            geometry: Some(geometry),
        }
    }

    /// Number of registered objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl SceneHost for SceneEntity {
    fn set_object(&mut self, name: &str, object: SceneObject) {
        self.objects.insert(name.to_string(), object);
    }

    fn remove_object(&mut self, name: &str) -> Option<SceneObject> {
        self.objects.remove(name)
    }

    fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    fn declared_geometry(&self) -> Option<DeclaredGeometry> {
        self.geometry
    }

    fn set_declared_geometry(&mut self, geometry: DeclaredGeometry) {
        self.geometry = Some(geometry);
    }
}
