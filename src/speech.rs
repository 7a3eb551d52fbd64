use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait Transcriber: Send + Sync {
    fn backend_name(&self) -> &'static str;
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn backend_name(&self) -> &'static str;
    /// Returns encoded audio (MPEG for the ElevenLabs backend).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionPayload {
    #[serde(default)]
    text: String,
}

pub fn transcript_from_payload(payload: serde_json::Value) -> Result<String> {
    let parsed = serde_json::from_value::<TranscriptionPayload>(payload)
        .context("transcription payload did not match the expected shape")?;
    Ok(parsed.text.trim().to_string())
}

pub fn audio_mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    match lower.rsplit('.').next() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("flac") => "audio/flac",
        _ => "audio/wav",
    }
}

#[derive(Debug, Clone)]
pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl WhisperClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    fn backend_name(&self) -> &'static str {
        "openai-whisper"
    }

    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(audio_mime_for(file_name))
            .context("invalid audio mime type")?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("failed to reach transcription service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "transcription service returned {}: {}",
                status,
                body.trim()
            ));
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .context("failed to decode transcription response")?;
        transcript_from_payload(payload)
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: String,
        voice_id: String,
        model_id: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id,
            model_id,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    fn backend_name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&SynthesisRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .context("failed to reach speech synthesis service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "speech synthesis service returned {}: {}",
                status,
                body.trim()
            ));
        }

        let audio = response
            .bytes()
            .await
            .context("failed to read synthesized speech")?;
        Ok(audio.to_vec())
    }
}
