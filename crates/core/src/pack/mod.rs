//! The resource pack catalog.
//!
//! A pack is a directory holding `songs.xml`, `images.xml`, an optional
//! `info.xml`, and the media files they name. [`ResourcePack::init`] parses
//! the metadata once and builds undecoded [`AudioResource`] and
//! [`ImageResource`] entries; decoding happens later, per entry, on demand.

mod metadata;

pub use metadata::PackInfo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    assets::{Alignment, ImageDecoder, ImageResource, PngDecoder},
    audio::{AudioDecoder, AudioResource, SymphoniaDecoder, TrackKind},
    config::PackConfig,
    CatalogError,
};

/// Owns every song and image of one pack directory.
#[derive(Debug)]
pub struct ResourcePack {
    base_path: PathBuf,
    config: Arc<PackConfig>,
    audio_decoder: Arc<dyn AudioDecoder>,
    image_decoder: Arc<dyn ImageDecoder>,
    info: PackInfo,
    songs: Vec<AudioResource>,
    images: Vec<ImageResource>,
    initialized: bool,
}

impl ResourcePack {
    /// Creates an empty pack rooted at `path` with the default layout.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_config(path, PackConfig::default())
    }

    pub fn with_config(path: impl Into<PathBuf>, config: PackConfig) -> Self {
        Self {
            base_path: path.into(),
            config: Arc::new(config),
            audio_decoder: Arc::new(SymphoniaDecoder),
            image_decoder: Arc::new(PngDecoder),
            info: PackInfo::default(),
            songs: Vec::new(),
            images: Vec::new(),
            initialized: false,
        }
    }

    /// Replaces the decoders handed to every resource built by [`Self::init`].
    pub fn with_decoders(
        mut self,
        audio: Arc<dyn AudioDecoder>,
        image: Arc<dyn ImageDecoder>,
    ) -> Self {
        self.audio_decoder = audio;
        self.image_decoder = image;
        self
    }

    /// Parses the pack metadata and builds the catalog.
    ///
    /// Must succeed exactly once. A second call after success returns
    /// [`CatalogError::AlreadyInitialized`]. On failure nothing is kept, so
    /// the pack stays empty and uninitialised.
    pub fn init(&mut self) -> Result<(), CatalogError> {
        if self.initialized {
            return Err(CatalogError::AlreadyInitialized {
                path: self.base_path.clone(),
            });
        }

        let info = self.load_info()?;
        let songs = self.load_songs()?;
        let images = self.load_images()?;

        tracing::info!(
            path = %self.base_path.display(),
            name = info.name.as_deref().unwrap_or(""),
            songs = songs.len(),
            images = images.len(),
            "resource pack initialised"
        );

        self.info = info;
        self.songs = songs;
        self.images = images;
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Appends every song to `out` in metadata order and returns how many
    /// were appended. Buildups travel with their loop, never on their own.
    pub fn all_songs<'a>(&'a self, out: &mut Vec<&'a AudioResource>) -> usize {
        out.extend(self.songs.iter());
        self.songs.len()
    }

    /// Appends every image to `out` in metadata order and returns how many
    /// were appended.
    pub fn all_images<'a>(&'a self, out: &mut Vec<&'a ImageResource>) -> usize {
        out.extend(self.images.iter());
        self.images.len()
    }

    pub fn songs(&self) -> &[AudioResource] {
        &self.songs
    }

    pub fn images(&self) -> &[ImageResource] {
        &self.images
    }

    /// First song with the given title.
    pub fn song(&self, title: &str) -> Option<&AudioResource> {
        self.songs.iter().find(|song| song.title() == title)
    }

    pub fn image(&self, name: &str) -> Option<&ImageResource> {
        self.images.iter().find(|image| image.name() == name)
    }

    pub fn info(&self) -> &PackInfo {
        &self.info
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Serializable overview of the catalog.
    pub fn summary(&self) -> PackSummary {
        PackSummary {
            base_path: self.base_path.display().to_string(),
            info: self.info.clone(),
            songs: self.songs.iter().map(SongSummary::from).collect(),
            images: self.images.iter().map(ImageSummary::from).collect(),
        }
    }

    fn load_info(&self) -> Result<PackInfo, CatalogError> {
        let path = self.base_path.join(&self.config.info_file);
        match read_metadata(&path) {
            Ok(xml) => metadata::parse_info(&xml, &path),
            Err(CatalogError::FileNotFound { .. }) => Ok(PackInfo::default()),
            Err(err) => Err(err),
        }
    }

    fn load_songs(&self) -> Result<Vec<AudioResource>, CatalogError> {
        let path = self.base_path.join(&self.config.songs_file);
        let xml = read_metadata(&path)?;
        let records = metadata::parse_songs(&xml, &path)?;

        Ok(records
            .into_iter()
            .map(|record| {
                let mut song = AudioResource::new(
                    self.base_path.clone(),
                    record.title,
                    record.loop_name,
                    record.buildup,
                )
                .with_backend(self.config.clone(), self.audio_decoder.clone())
                .with_source(record.source);
                song.set_track_metadata(TrackKind::Loop, record.rhythm, record.beat_duration);
                song.set_track_metadata(
                    TrackKind::Buildup,
                    record.buildup_rhythm,
                    record.buildup_beat_duration,
                );
                song
            })
            .collect())
    }

    fn load_images(&self) -> Result<Vec<ImageResource>, CatalogError> {
        let path = self.base_path.join(&self.config.images_file);
        let xml = read_metadata(&path)?;
        let records = metadata::parse_images(&xml, &path)?;

        Ok(records
            .into_iter()
            .map(|record| {
                ImageResource::new(
                    self.base_path.clone(),
                    record.name,
                    Alignment::parse(&record.align),
                )
                .with_backend(self.config.clone(), self.image_decoder.clone())
                .with_details(record.full_name, record.source)
            })
            .collect())
    }
}

fn read_metadata(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Catalog overview, as printed by the command line tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSummary {
    pub base_path: String,
    pub info: PackInfo,
    pub songs: Vec<SongSummary>,
    pub images: Vec<ImageSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongSummary {
    pub title: String,
    pub loop_name: String,
    pub buildup_name: Option<String>,
    pub loop_beats: usize,
    pub buildup_beats: usize,
}

impl From<&AudioResource> for SongSummary {
    fn from(song: &AudioResource) -> Self {
        Self {
            title: song.title().to_string(),
            loop_name: song.name(TrackKind::Loop).to_string(),
            buildup_name: song
                .has_buildup()
                .then(|| song.name(TrackKind::Buildup).to_string()),
            loop_beats: song.beatmap(TrackKind::Loop).chars().count(),
            buildup_beats: song.beatmap(TrackKind::Buildup).chars().count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSummary {
    pub name: String,
    pub alignment: Alignment,
}

impl From<&ImageResource> for ImageSummary {
    fn from(image: &ImageResource) -> Self {
        Self {
            name: image.name().to_string(),
            alignment: image.alignment(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        assets::{ColorType, DecodedImage},
        audio::DecodedPcm,
        BeatEvent, DecodeError,
    };

    #[derive(Debug, Default)]
    struct SilentAudio {
        calls: AtomicUsize,
    }

    impl AudioDecoder for SilentAudio {
        fn decode(&self, _path: &Path) -> Result<DecodedPcm, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DecodedPcm::new(vec![0; 44_100 * 4], 2, 44_100)
        }
    }

    #[derive(Debug)]
    struct BlankImage;

    impl ImageDecoder for BlankImage {
        fn decode(&self, _path: &Path) -> Result<DecodedImage, DecodeError> {
            Ok(DecodedImage {
                pixels: vec![0; 16],
                width: 2,
                height: 2,
                color_type: ColorType::Rgba,
            })
        }
    }

    fn write_pack(songs: &str, images: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("songs.xml"), songs).unwrap();
        std::fs::write(dir.path().join("images.xml"), images).unwrap();
        std::fs::create_dir(dir.path().join("Songs")).unwrap();
        std::fs::create_dir(dir.path().join("Images")).unwrap();
        dir
    }

    fn fake_pack(path: &Path) -> (ResourcePack, Arc<SilentAudio>) {
        let audio = Arc::new(SilentAudio::default());
        let pack = ResourcePack::new(path).with_decoders(audio.clone(), Arc::new(BlankImage));
        (pack, audio)
    }

    const ONE_SONG: &str = r#"<songs>
        <song name="loop1"><title>Test</title><rhythm>x-o.</rhythm></song>
    </songs>"#;
    const ONE_IMAGE: &str = r#"<images><image name="bg1"><align>right</align></image></images>"#;

    #[test]
    fn single_song_and_image_pack() {
        let dir = write_pack(ONE_SONG, ONE_IMAGE);
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();

        let mut songs = Vec::new();
        assert_eq!(pack.all_songs(&mut songs), 1);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title(), "Test");
        assert!(!songs[0].has_buildup());
        assert_eq!(songs[0].beatmap(TrackKind::Loop), "x-o.");

        let mut images = Vec::new();
        assert_eq!(pack.all_images(&mut images), 1);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name(), "bg1");
        assert_eq!(images[0].alignment(), Alignment::Right);
    }

    #[test]
    fn counts_match_entries_in_order() {
        let songs = r#"<songs>
            <song name="loop_a"><title>A</title><rhythm>x</rhythm>
                <buildup>build_a</buildup><buildupRhythm>..</buildupRhythm></song>
            <song name="loop_b"><title>B</title><rhythm>o</rhythm><buildup></buildup></song>
            <song name="loop_c"><title>C</title><rhythm>+</rhythm></song>
        </songs>"#;
        let images = r#"<images>
            <image name="i1"/>
            <image name="i2"><align>left</align></image>
        </images>"#;
        let dir = write_pack(songs, images);
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();

        let mut out = Vec::new();
        assert_eq!(pack.all_songs(&mut out), 3);
        let titles: Vec<_> = out.iter().map(|song| song.title()).collect();
        assert_eq!(titles, ["A", "B", "C"]);

        let a = pack.song("A").unwrap();
        assert!(a.has_buildup());
        assert_eq!(a.name(TrackKind::Buildup), "build_a");
        assert_eq!(a.beatmap(TrackKind::Buildup), "..");
        assert!(!pack.song("B").unwrap().has_buildup());

        let mut out = Vec::new();
        assert_eq!(pack.all_images(&mut out), 2);
        assert_eq!(pack.image("i1").unwrap().alignment(), Alignment::Center);
        assert_eq!(pack.image("i2").unwrap().alignment(), Alignment::Left);
    }

    #[test]
    fn unknown_and_blank_beat_characters_keep_their_slots() {
        let songs = r#"<songs>
            <song name="loop1"><title>Test</title><rhythm> x?o </rhythm></song>
        </songs>"#;
        let dir = write_pack(songs, ONE_IMAGE);
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();

        let song = pack.song("Test").unwrap();
        assert_eq!(song.beatmap(TrackKind::Loop), " x?o ");
        let beats: Vec<_> = song.beats(TrackKind::Loop).collect();
        assert_eq!(beats.len(), 5);
        assert_eq!(
            beats,
            vec![
                BeatEvent::NoTransition,
                BeatEvent::VerticalBlur,
                BeatEvent::NoTransition,
                BeatEvent::HorizontalBlur,
                BeatEvent::NoTransition,
            ]
        );
        assert_eq!(pack.summary().songs[0].loop_beats, 5);
    }

    #[test]
    fn appends_after_existing_entries() {
        let dir = write_pack(ONE_SONG, ONE_IMAGE);
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();

        let mut songs = Vec::new();
        pack.all_songs(&mut songs);
        assert_eq!(pack.all_songs(&mut songs), 1);
        assert_eq!(songs.len(), 2);
    }

    #[test]
    fn missing_metadata_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut pack = ResourcePack::new(dir.path());

        let err = pack.init().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::FileNotFound { ref path } if path.ends_with("songs.xml")
        ));
        assert!(!pack.is_initialized());
    }

    #[test]
    fn failed_init_keeps_nothing() {
        let dir = write_pack(ONE_SONG, "<images><image/></images>");
        let (mut pack, _) = fake_pack(dir.path());

        let err = pack.init().unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { field: "name", .. }));
        assert!(pack.songs().is_empty());
        assert!(pack.images().is_empty());
        assert!(!pack.is_initialized());
    }

    #[test]
    fn malformed_songs_is_a_parse_error() {
        let dir = write_pack("<songs><song name=", ONE_IMAGE);
        let (mut pack, _) = fake_pack(dir.path());
        assert!(matches!(pack.init().unwrap_err(), CatalogError::Parse { .. }));
    }

    #[test]
    fn second_init_is_rejected() {
        let dir = write_pack(ONE_SONG, ONE_IMAGE);
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();

        let err = pack.init().unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyInitialized { .. }));
        assert_eq!(pack.songs().len(), 1);
        assert_eq!(pack.images().len(), 1);
    }

    #[test]
    fn reads_optional_pack_info() {
        let dir = write_pack(ONE_SONG, ONE_IMAGE);
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();
        assert_eq!(pack.info(), &PackInfo::default());

        std::fs::write(
            dir.path().join("info.xml"),
            "<info><name>Defaults</name><link>http://example.com</link></info>",
        )
        .unwrap();
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();
        assert_eq!(pack.info().name.as_deref(), Some("Defaults"));
        assert_eq!(pack.info().link.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn resources_decode_through_the_pack_layout() {
        let dir = write_pack(ONE_SONG, ONE_IMAGE);
        std::fs::write(dir.path().join("Songs/loop1.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("Images/bg1.png"), b"").unwrap();
        let (mut pack, audio) = fake_pack(dir.path());
        pack.init().unwrap();

        let song = pack.song("Test").unwrap();
        song.read_and_decode(TrackKind::Loop).unwrap();
        song.read_and_decode(TrackKind::Loop).unwrap();
        assert_eq!(audio.calls.load(Ordering::SeqCst), 1);
        assert_eq!(song.pcm_data_size(TrackKind::Loop), 44_100 * 4);
        assert!((song.song_duration_usec(TrackKind::Loop) - 1_000_000.0).abs() < 1e-6);

        let image = pack.image("bg1").unwrap().read_and_decode().unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(pack.base_path(), dir.path());
    }

    #[test]
    fn custom_layout_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tracks.xml"), ONE_SONG).unwrap();
        std::fs::write(dir.path().join("pictures.xml"), ONE_IMAGE).unwrap();
        std::fs::create_dir(dir.path().join("Audio")).unwrap();
        std::fs::write(dir.path().join("Audio/loop1.ogg"), b"").unwrap();

        let config = PackConfig {
            songs_file: "tracks.xml".to_string(),
            images_file: "pictures.xml".to_string(),
            songs_dir: "Audio".to_string(),
            audio_extensions: vec!["ogg".to_string()],
            ..PackConfig::default()
        };
        let mut pack = ResourcePack::with_config(dir.path(), config)
            .with_decoders(Arc::new(SilentAudio::default()), Arc::new(BlankImage));
        pack.init().unwrap();

        pack.song("Test").unwrap().read_and_decode(TrackKind::Loop).unwrap();
        assert!(pack.song("Test").unwrap().is_decoded(TrackKind::Loop));
    }

    #[test]
    fn summary_serializes_catalog() {
        let dir = write_pack(ONE_SONG, ONE_IMAGE);
        let (mut pack, _) = fake_pack(dir.path());
        pack.init().unwrap();

        let json = serde_json::to_value(pack.summary()).unwrap();
        assert_eq!(json["songs"][0]["title"], "Test");
        assert_eq!(json["songs"][0]["loop_beats"], 4);
        assert!(json["songs"][0]["buildup_name"].is_null());
        assert_eq!(json["images"][0]["alignment"], "right");
    }
}
