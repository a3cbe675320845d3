use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DecodeError, HuesError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pack: PackConfig,
}

impl AppConfig {
    /// Loads a configuration override from a JSON file. Missing keys keep
    /// their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
            .map_err(|err| HuesError::msg(format!("invalid config `{}`: {err}", path.display())))
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Where a pack keeps its metadata and media files, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    pub songs_file: String,
    pub images_file: String,
    pub info_file: String,
    pub songs_dir: String,
    pub images_dir: String,
    /// Tried in order when locating a song's backing file.
    pub audio_extensions: Vec<String>,
    /// Tried in order when locating an image's backing file.
    pub image_extensions: Vec<String>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            songs_file: "songs.xml".to_string(),
            images_file: "images.xml".to_string(),
            info_file: "info.xml".to_string(),
            songs_dir: "Songs".to_string(),
            images_dir: "Images".to_string(),
            audio_extensions: vec!["mp3".to_string()],
            image_extensions: vec!["png".to_string()],
        }
    }
}

impl PackConfig {
    /// Resolves the backing audio file of a loop or buildup.
    pub fn song_path(
        &self,
        base_path: &Path,
        name: &str,
    ) -> std::result::Result<PathBuf, DecodeError> {
        locate(&base_path.join(&self.songs_dir), name, &self.audio_extensions)
    }

    /// Resolves the backing file of an image.
    pub fn image_path(
        &self,
        base_path: &Path,
        name: &str,
    ) -> std::result::Result<PathBuf, DecodeError> {
        locate(&base_path.join(&self.images_dir), name, &self.image_extensions)
    }
}

fn locate(
    dir: &Path,
    name: &str,
    extensions: &[String],
) -> std::result::Result<PathBuf, DecodeError> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| DecodeError::FileNotFound {
            dir: dir.to_path_buf(),
            name: name.to_string(),
        })
}
