//! Registry of text nodes
//!
//! Owns every node together with its scene entity, drives their
//! lifecycle, and routes loader completions back to the node that asked.
//! A failing node is logged and left alone; its siblings keep running.

use slotmap::{new_key_type, SlotMap};

use crate::assets::{FontLoader, LoadEvent, LoadEventSource};
use crate::config::TextConfig;
use crate::error::{TextError, TextResult};

use super::host::{Lifecycle, NodeContext, SceneEntity};
use super::text_node::{TextNode, UpdateOutcome};

new_key_type! {
    /// Handle to a node in a [`TextScene`]
    pub struct TextNodeKey;
}

#[derive(Debug)]
struct SceneSlot {
    node: TextNode,
    entity: SceneEntity,
}

/// Text nodes sharing one font loader
#[derive(Debug)]
pub struct TextScene<L> {
    nodes: SlotMap<TextNodeKey, SceneSlot>,
    loader: L,
}

impl<L: FontLoader> TextScene<L> {
    /// Empty scene fetching through `loader`
    pub fn new(loader: L) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            loader,
        }
    }

    /// The scene's loader
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Create a node on an entity without a geometry component
    pub fn spawn(&mut self, config: TextConfig) -> TextResult<TextNodeKey> {
        self.spawn_on(SceneEntity::new(), config)
    }

    /// Create a node on `entity`: attach, then run the first update
    ///
    /// A node that fails either step is detached and removed again.
    pub fn spawn_on(&mut self, entity: SceneEntity, config: TextConfig) -> TextResult<TextNodeKey> {
        let key = self.nodes.insert_with_key(|key| SceneSlot {
            node: TextNode::new(key, config),
            entity,
        });

        let result = self.with_node(key, |node, ctx| {
            node.on_attach(ctx)?;
            node.on_update(None, ctx)
        });

        match result {
            Ok(_) => Ok(key),
            Err(e) => {
                log::error!("Failed to create text node: {}", e);
                self.despawn(key);
                Err(e)
            }
        }
    }

    /// Replace a node's config
    pub fn update(&mut self, key: TextNodeKey, config: TextConfig) -> TextResult<UpdateOutcome> {
        let result = self.with_node(key, |node, ctx| {
            let previous = node.replace_config(config);
            node.on_update(Some(&previous), ctx)
        });
        if let Err(e) = &result {
            log::error!("Text node {:?} update abandoned: {}", key, e);
        }
        result
    }

    /// Set one option of a node from its string form
    pub fn set_attribute(&mut self, key: TextNodeKey, name: &str, value: &str) -> TextResult<UpdateOutcome> {
        let mut config = self
            .nodes
            .get(key)
            .map(|slot| slot.node.config().clone())
            .ok_or(TextError::Detached)?;
        config.set_attribute(name, value)?;
        self.update(key, config)
    }

    /// Detach and drop a node; pending completions for it are discarded
    pub fn despawn(&mut self, key: TextNodeKey) -> bool {
        match self.nodes.remove(key) {
            Some(mut slot) => {
                let mut ctx = NodeContext {
                    host: &mut slot.entity,
                    loader: &mut self.loader,
                };
                slot.node.on_detach(&mut ctx);
                true
            }
            None => false,
        }
    }

    /// Route one completion to its node
    pub fn deliver(&mut self, event: LoadEvent) -> TextResult<()> {
        let key = event.ticket().node;
        if !self.nodes.contains_key(key) {
            log::debug!("Dropping completion for removed node {:?}", key);
            return Ok(());
        }

        let result = self.with_node(key, |node, ctx| node.handle_load_event(event, ctx));
        if let Err(e) = &result {
            log::error!("Text node {:?} font load abandoned: {}", key, e);
        }
        result
    }

    fn with_node<R>(
        &mut self,
        key: TextNodeKey,
        f: impl FnOnce(&mut TextNode, &mut NodeContext<'_>) -> TextResult<R>,
    ) -> TextResult<R> {
        let slot = self.nodes.get_mut(key).ok_or(TextError::Detached)?;
        let mut ctx = NodeContext {
            host: &mut slot.entity,
            loader: &mut self.loader,
        };
        f(&mut slot.node, &mut ctx)
    }

    /// Node behind `key`
    pub fn node(&self, key: TextNodeKey) -> Option<&TextNode> {
        self.nodes.get(key).map(|slot| &slot.node)
    }

    /// Entity the node renders into
    pub fn entity(&self, key: TextNodeKey) -> Option<&SceneEntity> {
        self.nodes.get(key).map(|slot| &slot.entity)
    }

    /// Keys of every live node
    pub fn keys(&self) -> impl Iterator<Item = TextNodeKey> + '_ {
        self.nodes.keys()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<L: FontLoader + LoadEventSource> TextScene<L> {
    /// Deliver every ready completion; returns how many were handled
    ///
    /// Failures are logged per node and never stop the pump.
    pub fn pump(&mut self) -> usize {
        let events = self.loader.poll_events();
        let count = events.len();
        for event in events {
            // Already logged by `deliver`
            let _ = self.deliver(event);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FsFontLoader;
    use crate::scene::{NodeState, SceneHost, OBJECT_NAME};
    use crate::test_support::{mono_fnt, temp_dir};
    use tempfile::TempDir;

    /// The directory must outlive the scene's pending loads
    fn scene(name: &str) -> (TempDir, TextScene<FsFontLoader>) {
        crate::foundation::logging::init();
        let dir = temp_dir(name);
        std::fs::write(dir.path().join("mono.fnt"), mono_fnt()).unwrap();
        let scene = TextScene::new(FsFontLoader::with_root(dir.path()));
        (dir, scene)
    }

    fn label(text: &str, fnt: &str) -> TextConfig {
        TextConfig {
            fnt: fnt.to_string(),
            ..TextConfig::with_text(text)
        }
    }

    #[test]
    fn test_spawn_and_pump_to_visible() {
        let (_dir, mut scene) = scene("scene_pump");
        let key = scene.spawn(label("Hello", "mono.fnt")).unwrap();
        assert_eq!(scene.loader().pending(), 1);

        // Descriptor, then the (missing) atlas image
        assert_eq!(scene.pump(), 1);
        assert_eq!(scene.node(key).unwrap().state(), NodeState::Ready);
        assert!(!scene.entity(key).unwrap().object(OBJECT_NAME).unwrap().visible);

        assert_eq!(scene.pump(), 1);
        let object = scene.entity(key).unwrap().object(OBJECT_NAME).unwrap();
        assert!(object.visible);
        assert_eq!(object.quad_count, 5);
        assert_eq!(scene.pump(), 0);
    }

    #[test]
    fn test_failing_node_does_not_affect_siblings() {
        let (_dir, mut scene) = scene("scene_isolation");
        let good = scene.spawn(label("ok", "mono.fnt")).unwrap();
        let bad = scene.spawn(label("broken", "missing.fnt")).unwrap();

        assert_eq!(scene.pump(), 2);
        assert_eq!(scene.node(good).unwrap().state(), NodeState::Ready);
        assert_eq!(scene.node(bad).unwrap().state(), NodeState::Uninitialized);

        scene.pump();
        assert!(scene.entity(good).unwrap().object(OBJECT_NAME).unwrap().visible);
        assert!(!scene.entity(bad).unwrap().object(OBJECT_NAME).unwrap().visible);
    }

    #[test]
    fn test_despawned_node_drops_completions() {
        let (_dir, mut scene) = scene("scene_despawn");
        let key = scene.spawn(label("bye", "mono.fnt")).unwrap();
        assert!(scene.despawn(key));
        assert!(!scene.despawn(key));

        assert_eq!(scene.pump(), 1);
        assert!(scene.is_empty());
        assert!(scene.node(key).is_none());
    }

    #[test]
    fn test_invalid_config_never_fetches() {
        let (_dir, mut scene) = scene("scene_invalid");
        let mut config = label("Hello", "mono.fnt");
        config.baseline = "middle".to_string();

        assert!(matches!(scene.spawn(config), Err(TextError::Configuration(_))));
        assert!(scene.is_empty());
        assert_eq!(scene.loader().pending(), 0);
    }

    #[test]
    fn test_set_attribute_routes_through_update() {
        let (_dir, mut scene) = scene("scene_attribute");
        let key = scene.spawn(label("Hello", "mono.fnt")).unwrap();
        scene.pump();

        assert_eq!(scene.set_attribute(key, "text", "Hi").unwrap(), UpdateOutcome::Relayout);
        assert_eq!(scene.set_attribute(key, "color", "#f00").unwrap(), UpdateOutcome::Relayout);
        assert!(scene.set_attribute(key, "colour", "red").is_err());
        assert!(matches!(
            scene.set_attribute(key, "side", "sideways"),
            Err(TextError::Configuration(_))
        ));
        assert_eq!(scene.node(key).unwrap().layout().unwrap().glyphs.len(), 2);
        assert_eq!(scene.keys().count(), 1);
    }
}
