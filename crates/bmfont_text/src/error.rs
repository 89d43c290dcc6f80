//! Error taxonomy for text nodes
//!
//! Every failure is reported through the `log` facade by whoever abandons
//! the work; none of these errors is allowed to take the process down.

use thiserror::Error;

/// Result type used throughout the crate
pub type TextResult<T> = Result<T, TextError>;

/// Invalid value for an enumerated option
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Anchor is not one of `left`, `right`, `center`, `align`
    #[error("invalid anchor '{0}'")]
    InvalidAnchor(String),

    /// Baseline is not one of `top`, `center`, `bottom`
    #[error("invalid baseline '{0}'")]
    InvalidBaseline(String),

    /// Alignment is not one of `left`, `right`, `center`
    #[error("invalid align '{0}'")]
    InvalidAlign(String),

    /// Side is not one of `front`, `back`, `double`
    #[error("unknown side string '{0}'")]
    InvalidSide(String),

    /// Wrap mode is not one of `normal`, `pre`, `nowrap`
    #[error("invalid wrap mode '{0}'")]
    InvalidWrapMode(String),

    /// Material type is not one of `SDF`, `MSDF`, `basic`
    #[error("invalid render mode '{0}'")]
    InvalidRenderMode(String),

    /// Option name is not part of the schema
    #[error("unknown option '{0}'")]
    UnknownOption(String),
}

/// Failure to fetch or parse a font descriptor
#[derive(Debug, Error)]
pub enum FontLoadError {
    /// No descriptor URL was configured
    #[error("no font specified for bmfont text")]
    MissingUrl,

    /// The loader cannot fetch this kind of URL
    #[error("unsupported URL scheme in '{0}'")]
    UnsupportedScheme(String),

    /// Reading the descriptor failed
    #[error("failed to read font '{url}': {source}")]
    Io {
        /// Descriptor URL
        url: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Text descriptor is malformed
    #[error("malformed BMFont descriptor at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// JSON descriptor is malformed
    #[error("malformed BMFont JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The descriptor parsed but cannot be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedFontError {
    /// Only single-page fonts are supported
    #[error("currently only single-page bitmap fonts are supported (font has {0} pages)")]
    PageCount(usize),
}

/// Failure to fetch or decode an atlas page image
#[derive(Debug, Error)]
#[error("could not load bmfont texture '{url}': {message}")]
pub struct ImageLoadError {
    /// Image URL
    pub url: String,
    /// What went wrong
    pub message: String,
}

/// Umbrella error for every public text operation
#[derive(Debug, Error)]
pub enum TextError {
    /// Invalid enumerated option
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Font descriptor could not be loaded
    #[error("error loading font: {0}")]
    FontLoad(#[from] FontLoadError),

    /// Font descriptor is not supported
    #[error("{0}")]
    UnsupportedFont(#[from] UnsupportedFontError),

    /// Atlas image could not be loaded
    #[error("{0}")]
    ImageLoad(#[from] ImageLoadError),

    /// Configuration file could not be loaded
    #[error("config file error: {0}")]
    ConfigFile(#[from] crate::config::ConfigError),

    /// Operation on a node after it was detached
    #[error("text node is detached")]
    Detached,
}
