use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;

use crate::assistant::Assistant;
use crate::speech::{SpeechSynthesizer, Transcriber};
use crate::telemetry::TelemetrySink;

pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't generate a response.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReply {
    pub transcript: String,
    pub reply_text: String,
    pub audio: Vec<u8>,
}

/// Speech in, speech out: transcribe, answer through the assistant, synthesize.
///
/// Unlike `Assistant::respond`, failures of the speech services are returned
/// to the caller.
#[derive(Clone)]
pub struct VoicePipeline {
    transcriber: Arc<dyn Transcriber>,
    assistant: Assistant,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    telemetry: TelemetrySink,
}

impl VoicePipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        assistant: Assistant,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        telemetry: TelemetrySink,
    ) -> Self {
        Self {
            transcriber,
            assistant,
            synthesizer,
            telemetry,
        }
    }

    pub async fn reply_to_audio(&self, audio: Vec<u8>, file_name: &str) -> Result<VoiceReply> {
        if audio.is_empty() {
            return Err(anyhow::anyhow!("No audio file received: '{}' is empty", file_name));
        }

        tracing::info!(bytes = audio.len(), file = file_name, "transcribing recording");
        let transcript = self
            .transcriber
            .transcribe(audio, file_name)
            .await
            .context("transcription failed")?;
        tracing::info!(transcript = %transcript, "transcribed recording");

        let reply = self.assistant.respond(&transcript).await;
        let reply_text = if reply.is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            reply
        };

        let audio = self
            .synthesizer
            .synthesize(&reply_text)
            .await
            .context("speech synthesis failed")?;

        self.telemetry.emit(
            "voice.replied",
            json!({
                "transcript_chars": transcript.chars().count(),
                "reply_chars": reply_text.chars().count(),
                "audio_bytes": audio.len(),
                "transcriber": self.transcriber.backend_name(),
                "synthesizer": self.synthesizer.backend_name()
            }),
        );

        Ok(VoiceReply {
            transcript,
            reply_text,
            audio,
        })
    }
}
