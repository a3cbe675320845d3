//! Resource pack model for the Hues beat-synchronised visualiser.
//!
//! A pack is a directory of XML metadata plus song and image files. The crate
//! turns it into a catalog of [`AudioResource`]s (a loop track and an optional
//! buildup, each with its own beatmap) and [`ImageResource`]s. Entries decode
//! lazily into PCM or pixels when a render or playback loop asks for them.

pub mod assets;
pub mod audio;
pub mod beat;
pub mod config;
pub mod error;
pub mod pack;

pub use assets::{Alignment, ColorType, DecodedImage, ImageDecoder, ImageResource, PngDecoder};
pub use audio::{AudioDecoder, AudioResource, DecodedPcm, SymphoniaDecoder, TrackKind};
pub use beat::{parse_beatmap, BeatEvent};
pub use config::{AppConfig, PackConfig};
pub use error::{CatalogError, DecodeError, HuesError, Result};
pub use pack::{ImageSummary, PackInfo, PackSummary, ResourcePack, SongSummary};
