use std::sync::Arc;

use anyhow::{Context, Result};

use crate::assistant::{Assistant, AssistantSettings};
use crate::completion::OpenAiChatClient;
use crate::config::RuntimeConfig;
use crate::search::SerpApiClient;
use crate::speech::{ElevenLabsClient, WhisperClient};
use crate::telemetry::TelemetrySink;
use crate::voice::VoicePipeline;
use crate::weather::OpenWeatherClient;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const SERP_API_KEY: &str = "SERP_API_KEY";
pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";

pub fn env_present(key: &str) -> bool {
    std::env::var(key)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

pub fn require_env(key: &str, purpose: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{key} is required for {purpose}"))
}

pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("hark-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

pub fn build_chat_client(cfg: &RuntimeConfig, http: &reqwest::Client) -> Result<OpenAiChatClient> {
    let api_key = require_env(OPENAI_API_KEY, "chat completions")?;
    Ok(OpenAiChatClient::new(http.clone(), &cfg.chat_base_url, api_key))
}

pub fn build_weather_client(
    cfg: &RuntimeConfig,
    http: &reqwest::Client,
) -> Result<OpenWeatherClient> {
    let api_key = require_env(WEATHER_API_KEY, "weather lookups")?;
    Ok(OpenWeatherClient::new(
        http.clone(),
        &cfg.weather_base_url,
        api_key,
    ))
}

pub fn build_search_client(cfg: &RuntimeConfig, http: &reqwest::Client) -> Result<SerpApiClient> {
    let api_key = require_env(SERP_API_KEY, "web search")?;
    Ok(SerpApiClient::new(http.clone(), &cfg.search_base_url, api_key))
}

pub fn build_assistant(cfg: &RuntimeConfig, telemetry: &TelemetrySink) -> Result<Assistant> {
    let http = build_http_client()?;
    build_assistant_with_client(cfg, &http, telemetry)
}

pub fn build_assistant_with_client(
    cfg: &RuntimeConfig,
    http: &reqwest::Client,
    telemetry: &TelemetrySink,
) -> Result<Assistant> {
    let chat = build_chat_client(cfg, http)?;
    let weather = build_weather_client(cfg, http)?;
    let search = build_search_client(cfg, http)?;
    Ok(Assistant::new(
        Arc::new(chat),
        Arc::new(weather),
        Arc::new(search),
        AssistantSettings::from_config(cfg),
        telemetry.clone(),
    ))
}

pub fn build_voice_pipeline(cfg: &RuntimeConfig, telemetry: &TelemetrySink) -> Result<VoicePipeline> {
    let http = build_http_client()?;
    let assistant = build_assistant_with_client(cfg, &http, telemetry)?;
    let transcriber = WhisperClient::new(
        http.clone(),
        &cfg.chat_base_url,
        require_env(OPENAI_API_KEY, "speech transcription")?,
        cfg.transcription_model.clone(),
    );
    let synthesizer = ElevenLabsClient::new(
        http,
        &cfg.tts_base_url,
        require_env(ELEVENLABS_API_KEY, "speech synthesis")?,
        cfg.tts_voice_id.clone(),
        cfg.tts_model.clone(),
    );
    Ok(VoicePipeline::new(
        Arc::new(transcriber),
        assistant,
        Arc::new(synthesizer),
        telemetry.clone(),
    ))
}
