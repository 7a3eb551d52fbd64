use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://serpapi.com";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_TTS_BASE_URL: &str = "https://api.elevenlabs.io";
/// ElevenLabs premade voice "Rachel".
pub const DEFAULT_TTS_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub profile: String,
    pub config_path: String,
    pub chat_model: String,
    pub chat_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub weather_base_url: String,
    pub search_base_url: String,
    pub transcription_model: String,
    pub tts_base_url: String,
    pub tts_voice_id: String,
    pub tts_model: String,
    pub max_prompt_chars: usize,
    pub show_sensitive_config: bool,
    pub telemetry_enabled: bool,
    pub telemetry_path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub chat_model: Option<String>,
    pub chat_base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub weather_base_url: Option<String>,
    pub search_base_url: Option<String>,
    pub transcription_model: Option<String>,
    pub tts_base_url: Option<String>,
    pub tts_voice_id: Option<String>,
    pub tts_model: Option<String>,
    pub max_prompt_chars: Option<usize>,
    pub telemetry_enabled: Option<bool>,
    pub telemetry_path: Option<String>,
}

pub fn load_profiles(config_path: &str) -> Result<ProfilesFile> {
    let path = Path::new(config_path);
    if !path.exists() {
        return Ok(ProfilesFile::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile config file at '{}'", path.display()))?;
    toml::from_str::<ProfilesFile>(&content).with_context(|| {
        format!(
            "invalid profile configuration in '{}'. Check field names and value types.",
            path.display()
        )
    })
}

fn select_profile(cli: &Cli, profiles: &ProfilesFile) -> Result<ProfileConfig> {
    let selected = cli.profile.trim();
    if selected.is_empty() {
        return Err(anyhow::anyhow!(
            "profile name cannot be empty. Set --profile <name>."
        ));
    }

    if selected == "default" && !profiles.profiles.contains_key("default") {
        return Ok(ProfileConfig::default());
    }

    profiles.profiles.get(selected).cloned().ok_or_else(|| {
        let mut names = profiles.profiles.keys().cloned().collect::<Vec<String>>();
        names.sort();
        if names.is_empty() {
            anyhow::anyhow!(
                "profile '{}' not found in '{}'. No profiles are defined yet.",
                selected,
                cli.config_path
            )
        } else {
            anyhow::anyhow!(
                "profile '{}' not found in '{}'. Available profiles: {}",
                selected,
                cli.config_path,
                names.join(", ")
            )
        }
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Precedence: command line / environment, then profile, then built-in default.
pub fn resolve_runtime_config(cli: &Cli, profiles: &ProfilesFile) -> Result<RuntimeConfig> {
    let profile = select_profile(cli, profiles)?;

    let temperature = cli.temperature.or(profile.temperature).unwrap_or(0.7);
    if !(0.0..=2.0).contains(&temperature) {
        return Err(anyhow::anyhow!(
            "invalid value for temperature: {} (expected 0.0 to 2.0)",
            temperature
        ));
    }

    Ok(RuntimeConfig {
        profile: cli.profile.trim().to_string(),
        config_path: cli.config_path.clone(),
        chat_model: non_blank(cli.chat_model.clone())
            .or(non_blank(profile.chat_model))
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        chat_base_url: non_blank(cli.chat_base_url.clone())
            .or(non_blank(profile.chat_base_url))
            .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string()),
        temperature,
        max_tokens: cli
            .max_tokens
            .or(profile.max_tokens)
            .unwrap_or(150)
            .max(1),
        weather_base_url: non_blank(cli.weather_base_url.clone())
            .or(non_blank(profile.weather_base_url))
            .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
        search_base_url: non_blank(cli.search_base_url.clone())
            .or(non_blank(profile.search_base_url))
            .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
        transcription_model: non_blank(cli.transcription_model.clone())
            .or(non_blank(profile.transcription_model))
            .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
        tts_base_url: non_blank(cli.tts_base_url.clone())
            .or(non_blank(profile.tts_base_url))
            .unwrap_or_else(|| DEFAULT_TTS_BASE_URL.to_string()),
        tts_voice_id: non_blank(cli.tts_voice_id.clone())
            .or(non_blank(profile.tts_voice_id))
            .unwrap_or_else(|| DEFAULT_TTS_VOICE_ID.to_string()),
        tts_model: non_blank(cli.tts_model.clone())
            .or(non_blank(profile.tts_model))
            .unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
        max_prompt_chars: cli
            .max_prompt_chars
            .or(profile.max_prompt_chars)
            .unwrap_or(4_000),
        show_sensitive_config: cli.show_sensitive_config,
        telemetry_enabled: cli
            .telemetry_enabled
            .or(profile.telemetry_enabled)
            .unwrap_or(true),
        telemetry_path: non_blank(cli.telemetry_path.clone())
            .or(non_blank(profile.telemetry_path))
            .unwrap_or_else(|| ".hark/telemetry/events.jsonl".to_string()),
    })
}

pub fn enforce_prompt_limit(prompt: &str, max_chars: usize) -> Result<()> {
    let length = prompt.chars().count();
    if max_chars > 0 && length > max_chars {
        return Err(anyhow::anyhow!(
            "prompt exceeds maximum length ({} chars > {} limit). Shorten the prompt or increase max_prompt_chars.",
            length,
            max_chars
        ));
    }
    Ok(())
}

/// Trims the prompt and rejects empty or oversized input.
pub fn validate_prompt(prompt: &str, max_chars: usize) -> Result<String> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("No text provided: the prompt is empty"));
    }
    enforce_prompt_limit(trimmed, max_chars)?;
    Ok(trimmed.to_string())
}
