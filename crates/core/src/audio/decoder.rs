use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::DecodeError;

/// Bytes per sample of one channel in a [`DecodedPcm`] buffer.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Interleaved 16-bit little-endian PCM for one track.
///
/// The buffer length always equals
/// `sample_count * channel_count * BYTES_PER_SAMPLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPcm {
    data: Vec<u8>,
    channel_count: u16,
    sample_count: usize,
    sample_rate: u32,
}

impl DecodedPcm {
    /// Wraps raw interleaved bytes, deriving the per-channel sample count.
    pub fn new(data: Vec<u8>, channel_count: u16, sample_rate: u32) -> Result<Self, DecodeError> {
        if channel_count == 0 {
            return Err(DecodeError::InconsistentPcm("zero channels".to_string()));
        }
        if sample_rate == 0 {
            return Err(DecodeError::InconsistentPcm("zero sample rate".to_string()));
        }
        let frame_bytes = channel_count as usize * BYTES_PER_SAMPLE;
        if data.len() % frame_bytes != 0 {
            return Err(DecodeError::InconsistentPcm(format!(
                "{} bytes is not a whole number of {channel_count}-channel frames",
                data.len()
            )));
        }
        Ok(Self {
            sample_count: data.len() / frame_bytes,
            data,
            channel_count,
            sample_rate,
        })
    }

    /// Builds a buffer from interleaved samples.
    pub fn from_samples(
        samples: &[i16],
        channel_count: u16,
        sample_rate: u32,
    ) -> Result<Self, DecodeError> {
        let data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(data, channel_count, sample_rate)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Samples per channel.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Turns a backing audio file into PCM.
pub trait AudioDecoder: Send + Sync + std::fmt::Debug {
    fn decode(&self, path: &Path) -> Result<DecodedPcm, DecodeError>;
}

/// Default decoder built on symphonia. Handles every format symphonia was
/// compiled with, MP3 included.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedPcm, DecodeError> {
        let audio_err = |message: String| DecodeError::Audio {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| audio_err(err.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| audio_err("no decodable audio track".to_string()))?;
        let track_id = track.id;
        let mut channel_count = track
            .codec_params
            .channels
            .map(|channels| channels.count() as u16)
            .unwrap_or(0);
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|err| audio_err(err.to_string()))?;

        let mut data = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break
                }
                Err(err) => return Err(audio_err(err.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    channel_count = spec.channels.count() as u16;
                    sample_rate = spec.rate;

                    let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    samples.copy_interleaved_ref(decoded);
                    data.extend(samples.samples().iter().flat_map(|s| s.to_le_bytes()));
                }
                // A corrupt frame is skipped, as players do.
                Err(SymphoniaError::DecodeError(message)) => {
                    tracing::debug!(
                        path = %path.display(),
                        reason = message,
                        "skipping undecodable packet"
                    );
                }
                Err(err) => return Err(audio_err(err.to_string())),
            }
        }

        DecodedPcm::new(data, channel_count, sample_rate)
    }
}
