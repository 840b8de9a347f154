//! Voice pipeline: capture, segmentation, wake word gating, STT, TTS, playback

pub mod capture;
pub mod listener;
pub mod playback;
pub mod recorder;
pub mod segmenter;
pub mod stt;
pub mod tts;
pub mod wake;

pub use capture::{samples_to_wav, AudioFrame, CpalMicrophone, FrameSource, FRAME_SIZE, SAMPLE_RATE};
pub use listener::{ListenerEvent, VoiceListener};
pub use playback::{DecodedAudio, PlaybackEvent, SpeechPlaybackQueue};
pub use recorder::PushToTalkRecorder;
pub use segmenter::{Sensitivity, SpeechSegmenter, Utterance};
pub use stt::{OpenAiTranscriber, Transcriber};
pub use tts::{OpenAiSynthesizer, Synthesizer};
pub use wake::{GateDecision, ListeningState, WakeWordGate};
