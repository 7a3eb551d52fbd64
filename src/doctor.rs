use anyhow::Result;

use crate::config::RuntimeConfig;
use crate::provider::{
    ELEVENLABS_API_KEY, OPENAI_API_KEY, SERP_API_KEY, WEATHER_API_KEY, env_present,
};

pub struct CredentialCheck {
    pub key: &'static str,
    pub purpose: &'static str,
    pub present: bool,
}

pub fn credential_checks() -> Vec<CredentialCheck> {
    [
        (OPENAI_API_KEY, "chat completions and transcription"),
        (WEATHER_API_KEY, "weather lookups"),
        (SERP_API_KEY, "web search"),
        (ELEVENLABS_API_KEY, "speech synthesis (speak only)"),
    ]
    .into_iter()
    .map(|(key, purpose)| CredentialCheck {
        key,
        purpose,
        present: env_present(key),
    })
    .collect()
}

pub fn text_ready(checks: &[CredentialCheck]) -> bool {
    checks
        .iter()
        .filter(|check| check.key != ELEVENLABS_API_KEY)
        .all(|check| check.present)
}

pub fn run_doctor(cfg: &RuntimeConfig) -> Result<()> {
    println!(
        "Active profile: '{}' (config: {})",
        cfg.profile, cfg.config_path
    );

    let checks = credential_checks();
    println!("Credential check:");
    for check in &checks {
        let status = if check.present { "set" } else { "missing" };
        println!("- {} ({}): {status}", check.key, check.purpose);
    }

    println!(
        "Chat: model={} base_url={} temperature={} max_tokens={}",
        cfg.chat_model, cfg.chat_base_url, cfg.temperature, cfg.max_tokens
    );
    println!("Weather: base_url={}", cfg.weather_base_url);
    println!("Search: base_url={}", cfg.search_base_url);
    println!(
        "Speech: transcription_model={} tts_base_url={} voice_id={} tts_model={}",
        cfg.transcription_model, cfg.tts_base_url, cfg.tts_voice_id, cfg.tts_model
    );
    println!(
        "Telemetry: enabled={} path={}",
        cfg.telemetry_enabled, cfg.telemetry_path
    );

    if text_ready(&checks) {
        println!("Text assistant: ready");
    } else {
        println!("Text assistant: not ready");
        println!("Tip: export the missing keys above, then re-run hark doctor");
    }

    Ok(())
}
