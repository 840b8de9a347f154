//! Speech-to-text transcription via the OpenAI audio API

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Error, Result};

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Converts captured speech audio into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV-encoded audio
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is malformed
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String>;
}

/// OpenAI Whisper transcription client
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    api_key: String,
    model: String,
    language: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiTranscriber {
    /// Create a transcription client
    #[must_use]
    pub fn new(api_key: String, model: String, language: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            language,
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String> {
        let audio_len = wav.len();

        let file_part = reqwest::multipart::Part::bytes(wav)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Stt(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        if let Some(lang) = &self.language {
            form = form.text("language", lang.clone());
        }

        let response = self
            .client
            .post(TRANSCRIPTION_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Stt(format!(
                "transcription request failed ({status}): {body}"
            )));
        }

        let parsed: TranscriptionResponse = response.json().await?;
        let text = parsed.text.trim().to_string();

        tracing::debug!(
            audio_bytes = audio_len,
            transcript_len = text.len(),
            "transcription complete"
        );

        Ok(text)
    }
}
