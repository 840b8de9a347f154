//! TOML configuration file loading and saving
//!
//! Supports `~/.config/vox/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoxConfigFile {
    /// Voice listener configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// LLM assistant configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Voice listener configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoiceFileConfig {
    /// Enable the always-on voice command listener
    pub enabled: Option<bool>,

    /// VAD sensitivity ("low", "medium", "high")
    pub sensitivity: Option<String>,

    /// Wake word (e.g. "jarvis")
    pub wake_word: Option<String>,

    /// Seconds to stay in active command mode after the wake word
    pub active_timeout_secs: Option<u64>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Language hint for transcription (None = auto-detect)
    pub language: Option<String>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TtsFileConfig {
    /// Speak assistant responses aloud
    pub enabled: Option<bool>,

    /// TTS model (e.g. "tts-1")
    pub model: Option<String>,

    /// TTS voice identifier (e.g. "onyx")
    pub voice: Option<String>,

    /// TTS speed multiplier (0.25 - 4.0)
    pub speed: Option<f32>,
}

/// LLM assistant configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LlmFileConfig {
    /// Route commands through the LLM instead of the pattern parser
    pub assistant_mode: Option<bool>,

    /// Chat model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// Response verbosity ("concise", "balanced", "detailed")
    pub verbosity: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VoxConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> VoxConfigFile {
    let Some(path) = config_file_path() else {
        return VoxConfigFile::default();
    };
    load_from(&path)
}

/// Load a TOML config file from an explicit path
#[must_use]
pub fn load_from(path: &Path) -> VoxConfigFile {
    if !path.exists() {
        return VoxConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VoxConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VoxConfigFile::default()
        }
    }
}

/// Persist a config overlay to an explicit path, creating parent directories
///
/// # Errors
///
/// Returns error if serialization or the write fails
pub fn save_to(path: &Path, config: &VoxConfigFile) -> Result<()> {
    let content =
        toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;

    tracing::debug!(path = %path.display(), "saved config file");
    Ok(())
}

/// Return the config file path: `~/.config/vox/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vox").join("config.toml"))
}
