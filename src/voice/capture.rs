//! Audio capture from microphone
//!
//! Capture is frame-oriented: the device callback slices incoming audio into
//! fixed-size 16-bit mono frames tagged with their RMS energy, and the capture
//! loop pulls them synchronously through [`FrameSource::read_frame`].

use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Samples per captured frame (64ms at 16kHz)
pub const FRAME_SIZE: usize = 1024;

/// Bounded frame queue depth (~4s of audio) between device callback and reader
const FRAME_QUEUE_DEPTH: usize = 64;

/// One fixed-size block of mono 16-bit PCM with its precomputed RMS energy
#[derive(Debug, Clone)]
pub struct AudioFrame {
    samples: Vec<i16>,
    energy: f32,
}

impl AudioFrame {
    /// Wrap a sample block, computing its RMS energy
    #[must_use]
    pub fn new(samples: Vec<i16>) -> Self {
        let energy = rms_energy(&samples);
        Self { samples, energy }
    }

    /// RMS energy of this frame, on the i16 amplitude scale
    #[must_use]
    pub const fn energy(&self) -> f32 {
        self.energy
    }

    /// Raw PCM samples
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Frame duration in seconds at the capture sample rate
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / SAMPLE_RATE as f32
    }
}

/// Calculate RMS energy of PCM samples
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms_energy(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let v = f64::from(s);
            v * v
        })
        .sum();
    #[allow(clippy::cast_possible_truncation)]
    let rms = (sum_squares / samples.len() as f64).sqrt() as f32;
    rms
}

/// Blocking per-frame audio source
///
/// The cpal-backed implementation is not `Send`; sources are opened on the
/// thread that reads them.
pub trait FrameSource {
    /// Read the next frame, blocking until one is available
    ///
    /// # Errors
    ///
    /// Returns error if the device stalls or the stream has ended
    fn read_frame(&mut self) -> Result<AudioFrame>;
}

/// Captures audio frames from the default input device
pub struct CpalMicrophone {
    // Held to keep the stream alive; dropping stops capture
    _stream: Stream,
    frames: Receiver<AudioFrame>,
}

impl CpalMicrophone {
    /// Open the default input device at 16kHz mono
    ///
    /// # Errors
    ///
    /// Returns error if no device is available or no suitable config exists
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable audio config found".to_string()))?;

        let config: StreamConfig = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio capture initialized"
        );

        let (tx, rx) = sync_channel::<AudioFrame>(FRAME_QUEUE_DEPTH);
        let mut pending: Vec<i16> = Vec::with_capacity(FRAME_SIZE);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_samples(&mut pending, data, &tx);
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            frames: rx,
        })
    }
}

/// Slice callback samples into fixed frames and hand them to the reader.
///
/// Uses `try_send` so the realtime callback never blocks; a full queue drops
/// the frame with a warning.
fn push_samples(pending: &mut Vec<i16>, data: &[f32], tx: &SyncSender<AudioFrame>) {
    for &sample in data {
        #[allow(clippy::cast_possible_truncation)]
        let s = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        pending.push(s);

        if pending.len() == FRAME_SIZE {
            let frame = AudioFrame::new(std::mem::replace(
                pending,
                Vec::with_capacity(FRAME_SIZE),
            ));
            if tx.try_send(frame).is_err() {
                tracing::warn!("frame queue full, dropping audio frame");
            }
        }
    }
}

impl FrameSource for CpalMicrophone {
    fn read_frame(&mut self) -> Result<AudioFrame> {
        self.frames
            .recv_timeout(Duration::from_secs(2))
            .map_err(|_| Error::Audio("timed out waiting for audio frame".to_string()))
    }
}

/// Convert i16 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
