use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::DecodeError;

/// Channel layout of a [`DecodedImage`], 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorType {
    Rgb,
    Rgba,
}

impl ColorType {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Row-major pixels ready for upload to a texture. The buffer is owned by
/// whoever holds the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
}

impl DecodedImage {
    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.color_type.channels()
    }
}

/// Turns a backing image file into pixels.
pub trait ImageDecoder: Send + Sync + std::fmt::Debug {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;
}

/// Default decoder built on the `image` crate. Images carrying alpha decode
/// to RGBA, everything else to RGB.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngDecoder;

impl ImageDecoder for PngDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let image = image::open(path).map_err(|err| match err {
            image::ImageError::IoError(source) => DecodeError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => DecodeError::Image {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;

        let decoded = if image.color().has_alpha() {
            let rgba = image.into_rgba8();
            DecodedImage {
                width: rgba.width(),
                height: rgba.height(),
                pixels: rgba.into_raw(),
                color_type: ColorType::Rgba,
            }
        } else {
            let rgb = image.into_rgb8();
            DecodedImage {
                width: rgb.width(),
                height: rgb.height(),
                pixels: rgb.into_raw(),
                color_type: ColorType::Rgb,
            }
        };
        Ok(decoded)
    }
}
