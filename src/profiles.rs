use anyhow::Result;

use crate::config::{ProfilesFile, RuntimeConfig};

pub fn profile_names(profiles: &ProfilesFile) -> Vec<String> {
    let mut names = profiles.profiles.keys().cloned().collect::<Vec<String>>();
    if !names.iter().any(|name| name == "default") {
        names.push("default".to_string());
    }
    names.sort();
    names
}

pub fn run_profiles_list(profiles: &ProfilesFile, cfg: &RuntimeConfig) -> Result<()> {
    println!("Configured profiles (active='{}'):", cfg.profile);
    for name in profile_names(profiles) {
        let marker = if name == cfg.profile { "*" } else { " " };
        let source = if profiles.profiles.contains_key(&name) {
            "configured"
        } else {
            "implicit"
        };
        println!("{marker} {name} ({source})");
    }

    Ok(())
}

pub fn run_profiles_show(cfg: &RuntimeConfig) -> Result<()> {
    println!("Active profile: {}", cfg.profile);
    println!("Config path: {}", cfg.config_path);
    println!("Chat model: {}", cfg.chat_model);
    println!("Chat base URL: {}", cfg.chat_base_url);
    println!("Temperature: {}", cfg.temperature);
    println!("Max tokens: {}", cfg.max_tokens);
    println!("Weather base URL: {}", cfg.weather_base_url);
    println!("Search base URL: {}", cfg.search_base_url);
    println!("Transcription model: {}", cfg.transcription_model);
    println!("TTS base URL: {}", cfg.tts_base_url);
    println!("TTS voice id: {}", cfg.tts_voice_id);
    println!("TTS model: {}", cfg.tts_model);
    println!("Max prompt chars: {}", cfg.max_prompt_chars);
    println!("Telemetry enabled: {}", cfg.telemetry_enabled);
    println!("Telemetry path: {}", cfg.telemetry_path);
    Ok(())
}
