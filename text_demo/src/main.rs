//! Text demo application
//!
//! Loads one or more text node configs (`.ron` / `.toml`), lays them out
//! against fonts on the local filesystem, and prints the resulting mesh
//! state.
//!
//! ```text
//! text_demo [--root <dir>] [label.ron ...]
//! ```

use std::path::PathBuf;

use clap::Parser;

use bmfont_text::prelude::*;
use bmfont_text::scene::OBJECT_NAME;

/// Upper bound on loader round trips before giving up on pending loads
const MAX_PUMPS: usize = 8;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("failed to load '{path}': {source}")]
    Config {
        path: String,
        #[source]
        source: bmfont_text::config::ConfigError,
    },
}

/// Lay out text labels and print the resulting meshes
#[derive(Debug, Parser)]
#[command(name = "text_demo", version)]
struct Args {
    /// Directory font and atlas URLs are resolved against
    #[arg(long, default_value = env!("CARGO_MANIFEST_DIR"))]
    root: PathBuf,

    /// Label configs (`.ron` / `.toml`); defaults to the bundled samples
    labels: Vec<String>,
}

impl Args {
    fn label_paths(&self) -> Vec<String> {
        if self.labels.is_empty() {
            ["labels/hello.ron", "labels/caption.toml"]
                .iter()
                .map(|label| self.root.join(label).display().to_string())
                .collect()
        } else {
            self.labels.clone()
        }
    }
}

fn report(scene: &TextScene<FsFontLoader>, key: TextNodeKey, name: &str) {
    let Some(node) = scene.node(key) else {
        return;
    };
    let object = scene.entity(key).and_then(|e| e.object(OBJECT_NAME));

    println!("{name}");
    println!("  state      {:?}", node.state());
    if let Some(layout) = node.layout() {
        println!(
            "  layout     {} glyph(s), {} line(s), {:.1} x {:.1} px",
            layout.glyphs.len(),
            layout.lines,
            layout.width,
            layout.height
        );
    }
    if let Some(object) = object {
        let t = &object.transform;
        println!("  visible    {}", object.visible);
        println!(
            "  position   ({:.4}, {:.4}, {:.4})",
            t.position.x, t.position.y, t.position.z
        );
        println!("  scale      ({:.5}, {:.5}, {:.5})", t.scale.x, t.scale.y, t.scale.z);
        if let Some(sphere) = object.bounding_sphere {
            println!("  bounds     r = {:.1} px", sphere.radius);
        }
    }
    if let Some(mesh) = node.mesh() {
        println!("  material   {:?} {:?}", mesh.material.mode(), mesh.material.id());
        if let Some(bounds) = mesh.local_bounds() {
            println!(
                "  extent     ({:.3}, {:.3}) .. ({:.3}, {:.3})",
                bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
            );
        }
        if let Some((w, h)) = mesh.texture.dimensions() {
            println!("  atlas      {w}x{h}");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    log::info!("Resolving fonts under {}", args.root.display());

    let mut scene = TextScene::new(FsFontLoader::with_root(&args.root));
    let mut spawned = Vec::new();

    for path in &args.label_paths() {
        let config = TextConfig::load_from_file(path).map_err(|source| DemoError::Config {
            path: path.clone(),
            source,
        })?;
        match scene.spawn(config) {
            Ok(key) => spawned.push((key, path.clone())),
            Err(e) => log::error!("Skipping '{}': {}", path, e),
        }
    }

    for _ in 0..MAX_PUMPS {
        if scene.pump() == 0 {
            break;
        }
    }

    for (key, name) in &spawned {
        report(&scene, *key, name);
    }

    Ok(())
}
