//! Questions and the capability they require

use crate::config::BenchConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Capability a backend provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Text in, text out
    Text,
    /// Text plus images in, text out
    Multimodal,
}

impl BackendKind {
    /// Every kind, in registry slot order
    pub const ALL: [BackendKind; 2] = [BackendKind::Text, BackendKind::Multimodal];

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Multimodal => "multimodal",
        }
    }

    /// Configured model name for this kind
    pub fn model_name<'a>(&self, config: &'a BenchConfig) -> &'a str {
        match self {
            Self::Text => &config.text_model,
            Self::Multimodal => &config.multimodal_model,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an image attached to a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ImageRef {
    /// Remote image
    Url(String),
    /// Local file
    Path(PathBuf),
    /// Already-encoded image bytes
    Base64(String),
}

impl ImageRef {
    /// Interpret a string: `http(s)://` is a URL, `data:` URIs are decoded to
    /// their base64 payload, anything else is a local path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Self::Url(raw.to_string());
        }
        if let Some(rest) = raw.strip_prefix("data:") {
            if let Some((_, payload)) = rest.split_once(";base64,") {
                return Self::Base64(payload.to_string());
            }
        }
        Self::Path(PathBuf::from(raw))
    }
}

/// One question as handed to a backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Question {
    /// Question text
    pub text: String,
    /// Options for multiple-choice questions
    pub choices: Option<Vec<String>>,
    /// Attached images
    pub images: Vec<ImageRef>,
}

impl Question {
    /// Create an open-ended text question
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Attach choices; an empty list leaves the question open-ended
    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = if choices.is_empty() { None } else { Some(choices) };
        self
    }

    /// Attach images
    pub fn with_images(mut self, images: Vec<ImageRef>) -> Self {
        self.images = images;
        self
    }

    /// Attach one image
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.images.push(image);
        self
    }

    /// Multimodal iff the question carries images
    pub fn required_kind(&self) -> BackendKind {
        if self.images.is_empty() {
            BackendKind::Text
        } else {
            BackendKind::Multimodal
        }
    }

    /// Choices as a slice, if multiple-choice
    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }
}
