//! Asynchronous font and atlas image loading
//!
//! Loads are fire-and-forget: a [`FontLoader`] accepts a request tagged with
//! a [`LoadTicket`] and reports completion later as a [`LoadEvent`]. The
//! ticket lets the requesting node discard completions that belong to a
//! font it no longer wants.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::assets::{FontDescriptor, ImageData};
use crate::error::FontLoadError;
use crate::scene::TextNodeKey;

/// Identity of one font request issued by a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    /// Node that issued the request
    pub node: TextNodeKey,
    /// Per-node request counter at the time of issue
    pub generation: u64,
}

/// Completion of a request issued through a [`FontLoader`]
#[derive(Debug)]
pub enum LoadEvent {
    /// A descriptor fetch finished
    Font {
        /// Ticket the request was issued with
        ticket: LoadTicket,
        /// Requested URL
        url: String,
        /// Parsed descriptor or the reason it failed
        result: Result<FontDescriptor, FontLoadError>,
    },
    /// An atlas image fetch finished; `None` is a recoverable failure
    Image {
        /// Ticket the request was issued with
        ticket: LoadTicket,
        /// Requested URL
        url: String,
        /// Decoded image
        image: Option<ImageData>,
    },
}

impl LoadEvent {
    /// Ticket the completed request was issued with
    pub fn ticket(&self) -> LoadTicket {
        match self {
            Self::Font { ticket, .. } | Self::Image { ticket, .. } => *ticket,
        }
    }
}

/// Outbound contract to whatever fetches fonts and images
///
/// Implementations must not call back into the node synchronously; the
/// completion is delivered later through [`LoadEvent`].
pub trait FontLoader {
    /// Start fetching and parsing a descriptor
    fn fetch_font(&mut self, url: &str, ticket: LoadTicket);

    /// Start fetching and decoding an atlas page image
    fn fetch_image(&mut self, url: &str, ticket: LoadTicket);
}

/// Source of completions for requests issued through a [`FontLoader`]
pub trait LoadEventSource {
    /// Take every completion that is ready
    fn poll_events(&mut self) -> Vec<LoadEvent>;
}

const DESCRIPTOR_EXTENSION: &str = ".fnt";
const IMAGE_EXTENSION: &str = ".png";

/// Resolve the atlas image URL for a descriptor
///
/// Priority: explicit override, then the descriptor URL with its `.fnt`
/// extension swapped for `.png`, then the descriptor's directory joined with
/// the page file name from the descriptor.
pub fn atlas_image_url(font_url: &str, override_url: Option<&str>, page: &str) -> String {
    if let Some(explicit) = override_url.filter(|s| !s.is_empty()) {
        return explicit.to_string();
    }

    if let Some(stem) = font_url.strip_suffix(DESCRIPTOR_EXTENSION) {
        return format!("{stem}{IMAGE_EXTENSION}");
    }

    match font_url.rfind('/') {
        Some(slash) => format!("{}/{}", &font_url[..slash], page),
        None => page.to_string(),
    }
}

#[derive(Debug)]
enum Request {
    Font { url: String, ticket: LoadTicket },
    Image { url: String, ticket: LoadTicket },
}

/// Filesystem-backed loader
///
/// Requests are queued and only resolved when the host calls
/// [`FsFontLoader::poll`], so completions always arrive after the call that
/// issued them, like a network fetch would.
#[derive(Debug, Default)]
pub struct FsFontLoader {
    root: Option<PathBuf>,
    pending: VecDeque<Request>,
}

impl FsFontLoader {
    /// Create a loader resolving relative paths against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader resolving relative paths against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            pending: VecDeque::new(),
        }
    }

    /// Number of requests waiting for the next poll
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Resolve every request queued so far
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let requests: Vec<Request> = self.pending.drain(..).collect();
        requests
            .into_iter()
            .map(|request| match request {
                Request::Font { url, ticket } => {
                    let result = self.read_font(&url);
                    LoadEvent::Font { ticket, url, result }
                }
                Request::Image { url, ticket } => {
                    let image = self.read_image(&url);
                    LoadEvent::Image { ticket, url, image }
                }
            })
            .collect()
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, FontLoadError> {
        let local = url.strip_prefix("file://").unwrap_or(url);
        if local.contains("://") {
            return Err(FontLoadError::UnsupportedScheme(url.to_string()));
        }

        let path = Path::new(local);
        Ok(match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        })
    }

    fn read_font(&self, url: &str) -> Result<FontDescriptor, FontLoadError> {
        let path = self.resolve(url)?;
        let bytes = std::fs::read(&path).map_err(|source| FontLoadError::Io {
            url: url.to_string(),
            source,
        })?;
        let font = FontDescriptor::parse(url, &bytes)?;
        log::info!(
            "Loaded font '{}' ({} glyphs, {} page(s))",
            url,
            font.glyphs.len(),
            font.pages.len()
        );
        Ok(font)
    }

    fn read_image(&self, url: &str) -> Option<ImageData> {
        let loaded = self
            .resolve(url)
            .map_err(|e| e.to_string())
            .and_then(|path| ImageData::from_file(path).map_err(|e| e.to_string()));

        match loaded {
            Ok(image) => Some(image),
            Err(message) => {
                log::error!(
                    "Could not load bmfont texture '{}': {}. Make sure it is correctly defined in the bitmap .fnt file.",
                    url,
                    message
                );
                None
            }
        }
    }
}

impl FontLoader for FsFontLoader {
    fn fetch_font(&mut self, url: &str, ticket: LoadTicket) {
        log::debug!("Queued font fetch '{}' ({:?})", url, ticket);
        self.pending.push_back(Request::Font {
            url: url.to_string(),
            ticket,
        });
    }

    fn fetch_image(&mut self, url: &str, ticket: LoadTicket) {
        log::debug!("Queued image fetch '{}' ({:?})", url, ticket);
        self.pending.push_back(Request::Image {
            url: url.to_string(),
            ticket,
        });
    }
}

impl LoadEventSource for FsFontLoader {
    fn poll_events(&mut self) -> Vec<LoadEvent> {
        self.poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn ticket(generation: u64) -> LoadTicket {
        LoadTicket {
            node: TextNodeKey::default(),
            generation,
        }
    }

    #[test]
    fn test_image_url_priority() {
        assert_eq!(
            atlas_image_url("fonts/a.fnt", Some("img/b.png"), "page.png"),
            "img/b.png"
        );
        assert_eq!(atlas_image_url("fonts/a.fnt", Some(""), "page.png"), "fonts/a.png");
        assert_eq!(atlas_image_url("fonts/a.fnt", None, "page.png"), "fonts/a.png");
        assert_eq!(atlas_image_url("fonts/a.json", None, "page.png"), "fonts/page.png");
        assert_eq!(atlas_image_url("a.json", None, "page.png"), "page.png");
    }

    #[test]
    fn test_requests_resolve_only_on_poll() {
        let dir = test_support::temp_dir("loader_poll");
        std::fs::write(dir.path().join("mono.fnt"), test_support::mono_fnt()).unwrap();

        let mut loader = FsFontLoader::with_root(dir.path());
        loader.fetch_font("mono.fnt", ticket(1));
        loader.fetch_image("mono.png", ticket(1));
        assert_eq!(loader.pending(), 2);

        let events = loader.poll();
        assert_eq!(loader.pending(), 0);
        assert_eq!(events.len(), 2);

        match &events[0] {
            LoadEvent::Font { result, .. } => {
                assert_eq!(result.as_ref().unwrap().info.size, 32.0);
            }
            other => panic!("unexpected event {other:?}"),
        }
        match &events[1] {
            LoadEvent::Image { image, ticket: t, .. } => {
                assert!(image.is_none());
                assert_eq!(t.generation, 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_remote_urls_are_rejected() {
        let mut loader = FsFontLoader::new();
        loader.fetch_font("https://example.com/font.fnt", ticket(3));

        let events = loader.poll();
        match &events[0] {
            LoadEvent::Font { result: Err(FontLoadError::UnsupportedScheme(url)), .. } => {
                assert!(url.starts_with("https://"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_missing_font_reports_io_error() {
        let mut loader = FsFontLoader::new();
        loader.fetch_font("file://does/not/exist.fnt", ticket(4));

        let events = loader.poll();
        assert!(matches!(
            &events[0],
            LoadEvent::Font { result: Err(FontLoadError::Io { .. }), .. }
        ));
    }
}
