//! Songs: a mandatory loop track plus an optional buildup, each with its own
//! beatmap and its own lazily decoded PCM.

pub mod decoder;

pub use decoder::{AudioDecoder, DecodedPcm, SymphoniaDecoder, BYTES_PER_SAMPLE};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::{beat::BeatEvent, config::PackConfig, DecodeError};

/// Selects one of the two tracks of an [`AudioResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Loop,
    Buildup,
}

#[derive(Debug, Default)]
struct Track {
    name: String,
    beatmap: String,
    usec_per_beat: f64,
    pcm: OnceCell<DecodedPcm>,
}

impl Track {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A named song owned by a [`crate::ResourcePack`].
///
/// Each track moves from undecoded to decoded at most once; there is no way
/// back. The decode cell makes that transition atomic, so the type can be
/// shared across threads.
#[derive(Debug)]
pub struct AudioResource {
    title: String,
    base_path: PathBuf,
    source: Option<String>,
    loop_track: Track,
    buildup: Track,
    config: Arc<PackConfig>,
    decoder: Arc<dyn AudioDecoder>,
}

impl AudioResource {
    /// Creates an undecoded song. An empty `buildup_name` means the song has
    /// no buildup.
    pub fn new(
        base_path: impl Into<PathBuf>,
        title: impl Into<String>,
        loop_name: impl Into<String>,
        buildup_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            base_path: base_path.into(),
            source: None,
            loop_track: Track::named(loop_name),
            buildup: Track::named(buildup_name),
            config: Arc::new(PackConfig::default()),
            decoder: Arc::new(SymphoniaDecoder),
        }
    }

    pub(crate) fn with_backend(
        mut self,
        config: Arc<PackConfig>,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Self {
        self.config = config;
        self.decoder = decoder;
        self
    }

    pub(crate) fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Catalog-only step run while the pack metadata is parsed.
    pub(crate) fn set_track_metadata(
        &mut self,
        kind: TrackKind,
        beatmap: String,
        usec_per_beat: Option<f64>,
    ) {
        let track = self.track_mut(kind);
        track.beatmap = beatmap;
        track.usec_per_beat = usec_per_beat.unwrap_or(0.0);
    }

    pub fn has_buildup(&self) -> bool {
        !self.buildup.name.is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Base name of the track's backing file, without extension.
    pub fn name(&self, kind: TrackKind) -> &str {
        &self.track(kind).name
    }

    pub fn beatmap(&self, kind: TrackKind) -> &str {
        &self.track(kind).beatmap
    }

    /// Classified beat slots of the track's beatmap.
    pub fn beats(&self, kind: TrackKind) -> impl Iterator<Item = BeatEvent> + '_ {
        self.track(kind).beatmap.chars().map(BeatEvent::from_char)
    }

    /// Where the song comes from, if the pack says.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Length of the decoded track in microseconds; `0.0` until decoded.
    pub fn song_duration_usec(&self, kind: TrackKind) -> f64 {
        match self.pcm(kind) {
            Some(pcm) => pcm.sample_count() as f64 / pcm.sample_rate() as f64 * 1_000_000.0,
            None => 0.0,
        }
    }

    /// Beat period from the pack metadata; `0.0` when the pack gives none.
    pub fn beat_duration_usec(&self, kind: TrackKind) -> f64 {
        self.track(kind).usec_per_beat
    }

    /// Beat period implied by the decoded length and the beatmap length.
    pub fn beat_duration_from_audio_usec(&self, kind: TrackKind) -> Option<f64> {
        let slots = self.track(kind).beatmap.chars().count();
        if slots == 0 || !self.is_decoded(kind) {
            return None;
        }
        Some(self.song_duration_usec(kind) / slots as f64)
    }

    /// Borrowed view of the decoded PCM; `None` until decoded.
    pub fn pcm_data(&self, kind: TrackKind) -> Option<&[u8]> {
        self.pcm(kind).map(DecodedPcm::data)
    }

    pub fn pcm_data_size(&self, kind: TrackKind) -> usize {
        self.sample_count(kind) * self.channel_count(kind) as usize * BYTES_PER_SAMPLE
    }

    pub fn channel_count(&self, kind: TrackKind) -> u16 {
        self.pcm(kind).map_or(0, DecodedPcm::channel_count)
    }

    pub fn sample_rate(&self, kind: TrackKind) -> u32 {
        self.pcm(kind).map_or(0, DecodedPcm::sample_rate)
    }

    pub fn sample_count(&self, kind: TrackKind) -> usize {
        self.pcm(kind).map_or(0, DecodedPcm::sample_count)
    }

    pub fn is_decoded(&self, kind: TrackKind) -> bool {
        self.pcm(kind).is_some()
    }

    /// Decodes the track's backing file into 16-bit little-endian
    /// interleaved PCM.
    ///
    /// Runs at most once per track: later calls return immediately. A failed
    /// decode leaves the track undecoded, so the call may be retried, and the
    /// other track is untouched. Decoding the buildup of a song without one
    /// does nothing.
    pub fn read_and_decode(&self, kind: TrackKind) -> Result<(), DecodeError> {
        if kind == TrackKind::Buildup && !self.has_buildup() {
            return Ok(());
        }

        let track = self.track(kind);
        track
            .pcm
            .get_or_try_init(|| {
                let path = self.config.song_path(&self.base_path, &track.name)?;
                tracing::debug!(
                    title = %self.title,
                    ?kind,
                    path = %path.display(),
                    "decoding track"
                );
                self.decoder.decode(&path)
            })
            .map(|pcm| {
                tracing::trace!(
                    title = %self.title,
                    ?kind,
                    channels = pcm.channel_count(),
                    samples = pcm.sample_count(),
                    "track ready"
                );
            })
            .map_err(|err| {
                tracing::warn!(title = %self.title, ?kind, error = %err, "track decode failed");
                err
            })
    }

    fn pcm(&self, kind: TrackKind) -> Option<&DecodedPcm> {
        self.track(kind).pcm.get()
    }

    fn track(&self, kind: TrackKind) -> &Track {
        match kind {
            TrackKind::Loop => &self.loop_track,
            TrackKind::Buildup => &self.buildup,
        }
    }

    fn track_mut(&mut self, kind: TrackKind) -> &mut Track {
        match kind {
            TrackKind::Loop => &mut self.loop_track,
            TrackKind::Buildup => &mut self.buildup,
        }
    }
}
