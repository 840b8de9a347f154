//! Energy-based speech segmentation
//!
//! Frames stream in from capture and the segmenter decides where an utterance
//! starts and ends: speech begins when frame energy crosses the threshold,
//! and the utterance closes after enough trailing silence. A short pre-roll
//! of frames from just before the trigger is prepended so leading consonants
//! are not clipped.

use std::collections::VecDeque;

use crate::voice::capture::{AudioFrame, SAMPLE_RATE};

/// Frames of audio kept from before the speech trigger
pub const PRE_ROLL_FRAMES: usize = 20;

/// Seconds of trailing silence that close an utterance
pub const TRAILING_SILENCE_SECS: f32 = 1.5;

/// Maximum seconds of audio buffered for a single utterance
pub const MAX_UTTERANCE_SECS: f32 = 10.0;

/// VAD sensitivity preset
///
/// Higher sensitivity means a lower energy threshold, so quieter speech
/// triggers capture. The tradeoff is more false triggers from ambient noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    /// Only loud, close speech triggers (threshold 4000)
    Low,
    /// Normal speaking volume (threshold 1000)
    Medium,
    /// Quiet or distant speech (threshold 300)
    High,
}

impl Sensitivity {
    /// Parse from a config string, defaulting to `Medium` on unknown input
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Energy threshold on the i16 RMS scale
    #[must_use]
    pub const fn threshold(self) -> f32 {
        match self {
            Self::Low => 4000.0,
            Self::Medium => 1000.0,
            Self::High => 300.0,
        }
    }

    /// Minimum utterance length in seconds; shorter segments are discarded
    #[must_use]
    pub const fn min_phrase_secs(self) -> f32 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 0.4,
            Self::High => 0.3,
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

/// A complete speech segment ready for transcription
#[derive(Debug, Clone)]
pub struct Utterance {
    samples: Vec<i16>,
}

impl Utterance {
    /// Wrap raw samples as an utterance
    #[must_use]
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// PCM samples at the capture sample rate
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Utterance duration in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / SAMPLE_RATE as f32
    }
}

/// Segmenter state machine output for a single frame
#[derive(Debug)]
enum State {
    /// Waiting for energy to cross the threshold
    Idle,
    /// Accumulating an utterance
    Capturing { silence_frames: usize },
}

/// Slices a frame stream into utterances using an energy gate
pub struct SpeechSegmenter {
    threshold: f32,
    min_phrase_secs: f32,
    state: State,
    pre_roll: VecDeque<AudioFrame>,
    captured: Vec<i16>,
    max_samples: usize,
}

impl SpeechSegmenter {
    /// Create a segmenter with the preset threshold for `sensitivity`
    #[must_use]
    pub fn new(sensitivity: Sensitivity) -> Self {
        Self::with_threshold(sensitivity.threshold(), sensitivity.min_phrase_secs())
    }

    /// Create a segmenter with an explicit threshold (used after calibration)
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn with_threshold(threshold: f32, min_phrase_secs: f32) -> Self {
        Self {
            threshold,
            min_phrase_secs,
            state: State::Idle,
            pre_roll: VecDeque::with_capacity(PRE_ROLL_FRAMES),
            captured: Vec::new(),
            max_samples: (MAX_UTTERANCE_SECS * SAMPLE_RATE as f32) as usize,
        }
    }

    /// Active energy threshold
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Raise the threshold from measured ambient noise
    ///
    /// The preset acts as a floor: calibration only ever makes triggering
    /// stricter, never looser.
    pub fn calibrate(&mut self, ambient_rms: f32) {
        let calibrated = self.threshold.max(ambient_rms * 1.5);
        if (calibrated - self.threshold).abs() > f32::EPSILON {
            tracing::info!(
                ambient_rms,
                old_threshold = self.threshold,
                new_threshold = calibrated,
                "raised VAD threshold from ambient noise"
            );
        }
        self.threshold = calibrated;
    }

    /// Feed one frame; returns a completed utterance when one closes
    ///
    /// Segments shorter than the minimum phrase length are discarded and
    /// yield `None`.
    pub fn push_frame(&mut self, frame: &AudioFrame) -> Option<Utterance> {
        let is_speech = frame.energy() >= self.threshold;

        match self.state {
            State::Idle => {
                if is_speech {
                    self.captured.clear();
                    for held in &self.pre_roll {
                        self.captured.extend_from_slice(held.samples());
                    }
                    self.pre_roll.clear();
                    self.captured.extend_from_slice(frame.samples());
                    self.state = State::Capturing { silence_frames: 0 };
                } else {
                    if self.pre_roll.len() == PRE_ROLL_FRAMES {
                        self.pre_roll.pop_front();
                    }
                    self.pre_roll.push_back(frame.clone());
                }
                None
            }
            State::Capturing {
                ref mut silence_frames,
            } => {
                self.captured.extend_from_slice(frame.samples());

                if is_speech {
                    *silence_frames = 0;
                } else {
                    *silence_frames += 1;
                }

                let silence_secs = *silence_frames as f32 * frame.duration_secs();
                let full = self.captured.len() >= self.max_samples;

                if silence_secs >= TRAILING_SILENCE_SECS || full {
                    self.finish()
                } else {
                    None
                }
            }
        }
    }

    /// Close the current segment, applying the minimum phrase filter
    fn finish(&mut self) -> Option<Utterance> {
        self.state = State::Idle;
        let samples = std::mem::take(&mut self.captured);

        #[allow(clippy::cast_precision_loss)]
        let duration = samples.len() as f32 / SAMPLE_RATE as f32;

        if duration < self.min_phrase_secs {
            tracing::debug!(duration_secs = duration, "discarded sub-minimum segment");
            return None;
        }

        tracing::debug!(duration_secs = duration, "captured utterance");
        Some(Utterance { samples })
    }

    /// Discard any in-progress segment and buffered pre-roll
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.captured.clear();
        self.pre_roll.clear();
    }
}
