//! Vision and image processing module
//!
//! Handles screen capture decoding, the template catalog, template matching,
//! and the recognition facade the orchestrator reads game state through.

pub mod capture;
pub mod markers;
pub mod matcher;
pub mod recognition;
pub mod templates;

use std::path::PathBuf;

use crate::android::Rect;

pub use matcher::{ScreenMatcher, TemplateMatcher};
pub use recognition::Recognizer;
pub use templates::{Template, TemplateCatalog, TemplateRole};

/// Best match of a template against the current screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Match confidence in [0, 1]
    pub confidence: f32,
    /// Bounding box of the best match, in device pixels
    pub rect: Rect,
}

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),
    #[error("template `{name}` ({template_w}x{template_h}) is larger than the screen ({screen_w}x{screen_h})")]
    TemplateTooLarge {
        name: String,
        template_w: u32,
        template_h: u32,
        screen_w: u32,
        screen_h: u32,
    },
    #[error("template image not found: {0}")]
    NotFound(PathBuf),
    #[error("template image is not a png: {0}")]
    NotPng(PathBuf),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
