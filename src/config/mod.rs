//! Configuration management
//!
//! Runtime [`Config`] is assembled from defaults, the optional TOML overlay
//! file, and environment/CLI overrides applied by the binary.

pub mod file;

use crate::orchestrator::Verbosity;
use crate::voice::Sensitivity;

use file::VoxConfigFile;

/// Default seconds the wake gate stays active after the last command
pub const DEFAULT_ACTIVE_TIMEOUT_SECS: u64 = 60;

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key (STT, TTS, and chat)
    pub openai_api_key: Option<String>,

    /// Voice listener configuration
    pub voice: VoiceConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// LLM assistant configuration
    pub llm: LlmConfig,
}

/// Voice listener configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable the always-on voice command listener
    pub enabled: bool,

    /// VAD sensitivity preset
    pub sensitivity: Sensitivity,

    /// Wake word, lowercase (e.g. "jarvis")
    pub wake_word: String,

    /// Seconds to stay in active command mode after the wake word
    pub active_timeout_secs: u64,

    /// STT model identifier
    pub stt_model: String,

    /// Language hint for transcription (None = auto-detect)
    pub language: Option<String>,
}

/// Text-to-speech configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Speak assistant responses aloud
    pub enabled: bool,

    /// TTS model identifier
    pub model: String,

    /// TTS voice identifier
    pub voice: String,

    /// Speed multiplier, clamped to 0.25 - 4.0
    pub speed: f32,
}

/// LLM assistant configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Route commands through the LLM instead of the pattern parser
    pub assistant_mode: bool,

    /// Chat model identifier
    pub model: String,

    /// Response verbosity level
    pub verbosity: Verbosity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            voice: VoiceConfig {
                enabled: true,
                sensitivity: Sensitivity::Medium,
                wake_word: "jarvis".to_string(),
                active_timeout_secs: DEFAULT_ACTIVE_TIMEOUT_SECS,
                stt_model: "whisper-1".to_string(),
                language: None,
            },
            tts: TtsConfig {
                enabled: true,
                model: "tts-1".to_string(),
                voice: "onyx".to_string(),
                speed: 1.0,
            },
            llm: LlmConfig {
                assistant_mode: true,
                model: "gpt-4o-mini".to_string(),
                verbosity: Verbosity::Balanced,
            },
        }
    }
}

impl Config {
    /// Build a config from the standard file path, falling back to defaults
    #[must_use]
    pub fn load() -> Self {
        Self::from_overlay(&file::load_config_file())
    }

    /// Apply a TOML overlay on top of the defaults
    #[must_use]
    pub fn from_overlay(overlay: &VoxConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(key) = &overlay.api_keys.openai {
            config.openai_api_key = Some(key.clone());
        }

        if let Some(enabled) = overlay.voice.enabled {
            config.voice.enabled = enabled;
        }
        if let Some(s) = &overlay.voice.sensitivity {
            config.voice.sensitivity = Sensitivity::parse(s);
        }
        if let Some(word) = &overlay.voice.wake_word {
            config.voice.wake_word = word.trim().to_lowercase();
        }
        if let Some(secs) = overlay.voice.active_timeout_secs {
            config.voice.active_timeout_secs = secs;
        }
        if let Some(model) = &overlay.voice.stt_model {
            config.voice.stt_model = model.clone();
        }
        if let Some(lang) = &overlay.voice.language {
            config.voice.language = Some(lang.clone());
        }

        if let Some(enabled) = overlay.tts.enabled {
            config.tts.enabled = enabled;
        }
        if let Some(model) = &overlay.tts.model {
            config.tts.model = model.clone();
        }
        if let Some(voice) = &overlay.tts.voice {
            config.tts.voice = voice.clone();
        }
        if let Some(speed) = overlay.tts.speed {
            config.tts.speed = speed.clamp(0.25, 4.0);
        }

        if let Some(assistant) = overlay.llm.assistant_mode {
            config.llm.assistant_mode = assistant;
        }
        if let Some(model) = &overlay.llm.model {
            config.llm.model = model.clone();
        }
        if let Some(v) = &overlay.llm.verbosity {
            config.llm.verbosity = Verbosity::parse(v);
        }

        config
    }

    /// Snapshot the current settings as a persistable overlay
    #[must_use]
    pub fn to_overlay(&self) -> VoxConfigFile {
        VoxConfigFile {
            voice: file::VoiceFileConfig {
                enabled: Some(self.voice.enabled),
                sensitivity: Some(self.voice.sensitivity.to_string()),
                wake_word: Some(self.voice.wake_word.clone()),
                active_timeout_secs: Some(self.voice.active_timeout_secs),
                stt_model: Some(self.voice.stt_model.clone()),
                language: self.voice.language.clone(),
            },
            tts: file::TtsFileConfig {
                enabled: Some(self.tts.enabled),
                model: Some(self.tts.model.clone()),
                voice: Some(self.tts.voice.clone()),
                speed: Some(self.tts.speed),
            },
            llm: file::LlmFileConfig {
                assistant_mode: Some(self.llm.assistant_mode),
                model: Some(self.llm.model.clone()),
                verbosity: Some(self.llm.verbosity.to_string()),
            },
            api_keys: file::ApiKeysFileConfig {
                openai: self.openai_api_key.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.voice.wake_word, "jarvis");
        assert_eq!(config.voice.active_timeout_secs, 60);
        assert_eq!(config.voice.sensitivity, Sensitivity::Medium);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn overlay_wins_over_defaults() {
        let mut overlay = VoxConfigFile::default();
        overlay.voice.wake_word = Some("  Friday ".to_string());
        overlay.voice.sensitivity = Some("low".to_string());
        overlay.tts.speed = Some(9.0);

        let config = Config::from_overlay(&overlay);
        assert_eq!(config.voice.wake_word, "friday");
        assert_eq!(config.voice.sensitivity, Sensitivity::Low);
        // out-of-range speed is clamped
        assert!((config.tts.speed - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn overlay_roundtrip_preserves_settings() {
        let mut config = Config::default();
        config.voice.wake_word = "computer".to_string();
        config.llm.assistant_mode = false;

        let restored = Config::from_overlay(&config.to_overlay());
        assert_eq!(restored.voice.wake_word, "computer");
        assert!(!restored.llm.assistant_mode);
    }
}
