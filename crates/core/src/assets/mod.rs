pub mod decoder;

pub use decoder::{ColorType, DecodedImage, ImageDecoder, PngDecoder};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{config::PackConfig, DecodeError};

/// Placement of an image whose aspect ratio does not match the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Parses a pack alignment string. Matching is exact; anything other
    /// than `left`, `center` or `right` falls back to [`Alignment::Center`].
    pub fn parse(align: &str) -> Self {
        match align {
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            _ => Self::Center,
        }
    }
}

impl From<&str> for Alignment {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// A named image owned by a [`crate::ResourcePack`]. Decoding is not cached.
#[derive(Debug)]
pub struct ImageResource {
    name: String,
    base_path: PathBuf,
    alignment: Alignment,
    full_name: Option<String>,
    source: Option<String>,
    config: Arc<PackConfig>,
    decoder: Arc<dyn ImageDecoder>,
}

impl ImageResource {
    pub fn new(
        base_path: impl Into<PathBuf>,
        name: impl Into<String>,
        alignment: Alignment,
    ) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            alignment,
            full_name: None,
            source: None,
            config: Arc::new(PackConfig::default()),
            decoder: Arc::new(PngDecoder),
        }
    }

    pub(crate) fn with_backend(
        mut self,
        config: Arc<PackConfig>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        self.config = config;
        self.decoder = decoder;
        self
    }

    pub(crate) fn with_details(
        mut self,
        full_name: Option<String>,
        source: Option<String>,
    ) -> Self {
        self.full_name = full_name;
        self.source = source;
        self
    }

    /// Base name of the backing file, without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Display name, when the pack provides one.
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Decodes the backing file into a fresh pixel buffer owned by the
    /// caller. Every call decodes again.
    pub fn read_and_decode(&self) -> Result<DecodedImage, DecodeError> {
        let path = self.config.image_path(&self.base_path, &self.name)?;
        tracing::debug!(image = %self.name, path = %path.display(), "decoding image");
        self.decoder.decode(&path).map_err(|err| {
            tracing::warn!(image = %self.name, error = %err, "image decode failed");
            err
        })
    }
}
