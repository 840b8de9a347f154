//! Text-to-speech synthesis via the OpenAI audio API

use async_trait::async_trait;
use serde_json::json;

use crate::{Error, Result};

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Voices available for synthesis
pub const VOICES: &[&str] = &["alloy", "echo", "fable", "nova", "onyx", "shimmer"];

/// Synthesizes spoken audio from text
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// OpenAI TTS client
pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    voice: String,
    speed: f32,
}

impl OpenAiSynthesizer {
    /// Create a synthesis client
    ///
    /// Unknown voices fall back to "onyx"; speed is clamped to the API range.
    #[must_use]
    pub fn new(api_key: String, model: String, voice: String, speed: f32) -> Self {
        let voice = if VOICES.contains(&voice.as_str()) {
            voice
        } else {
            tracing::warn!(requested = %voice, "unknown TTS voice, falling back to onyx");
            "onyx".to_string()
        };

        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            voice,
            speed: speed.clamp(0.25, 4.0),
        }
    }

    /// Active voice identifier
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }
}

#[async_trait]
impl Synthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(SPEECH_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "voice": self.voice,
                "input": text,
                "speed": self.speed,
                "response_format": "mp3",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!(
                "speech request failed ({status}): {body}"
            )));
        }

        let audio = response.bytes().await?.to_vec();

        tracing::debug!(
            text_len = text.len(),
            audio_bytes = audio.len(),
            voice = %self.voice,
            "speech synthesized"
        );

        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_voice_falls_back() {
        let tts = OpenAiSynthesizer::new(
            "key".to_string(),
            "tts-1".to_string(),
            "gravelly".to_string(),
            1.0,
        );
        assert_eq!(tts.voice(), "onyx");
    }

    #[test]
    fn known_voice_is_kept() {
        let tts = OpenAiSynthesizer::new(
            "key".to_string(),
            "tts-1".to_string(),
            "nova".to_string(),
            1.0,
        );
        assert_eq!(tts.voice(), "nova");
    }
}
