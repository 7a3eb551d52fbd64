use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::level_filters::LevelFilter;

use hark_cli::chat::run_chat;
use hark_cli::cli::{Cli, Commands, ProfileCommands, TelemetryCommands, command_label};
use hark_cli::config::{RuntimeConfig, load_profiles, resolve_runtime_config, validate_prompt};
use hark_cli::doctor::run_doctor;
use hark_cli::error::{categorize_error, format_cli_error};
use hark_cli::intent::clean_city_name;
use hark_cli::profiles::{run_profiles_list, run_profiles_show};
use hark_cli::provider::{
    build_assistant, build_http_client, build_search_client, build_voice_pipeline,
    build_weather_client,
};
use hark_cli::search::{SearchResult, SearchService};
use hark_cli::telemetry::{TelemetrySink, round_metric, run_telemetry_report};
use hark_cli::weather::{WeatherService, format_weather_reply};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(&cli.log_filter) {
        eprintln!("{err:#}");
    }

    let show_sensitive = cli.show_sensitive_config;
    if let Err(err) = run_cli(cli).await {
        eprintln!("{}", format_cli_error(&err, show_sensitive));
        tracing::error!(category = %categorize_error(&err).code(), "command failed");
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(log_filter: &str) -> Result<()> {
    let level = log_filter
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(log_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

async fn run_cli(cli: Cli) -> Result<()> {
    let profiles = load_profiles(&cli.config_path)?;
    let cfg = resolve_runtime_config(&cli, &profiles)?;
    let label = command_label(&cli.command);
    let telemetry = TelemetrySink::new(&cfg, label.clone());
    let started_at = Instant::now();

    let outcome = dispatch(cli.command, &cfg, &profiles, &telemetry).await;
    let latency_ms = round_metric(started_at.elapsed().as_secs_f64() * 1000.0);
    match &outcome {
        Ok(()) => telemetry.emit("command.completed", json!({ "latency_ms": latency_ms })),
        Err(err) => telemetry.emit(
            "command.failed",
            json!({
                "latency_ms": latency_ms,
                "category": categorize_error(err).code()
            }),
        ),
    }
    outcome
}

async fn dispatch(
    command: Commands,
    cfg: &RuntimeConfig,
    profiles: &hark_cli::config::ProfilesFile,
    telemetry: &TelemetrySink,
) -> Result<()> {
    match command {
        Commands::Ask { prompt } => {
            let prompt = validate_prompt(&prompt.join(" "), cfg.max_prompt_chars)?;
            let assistant = build_assistant(cfg, telemetry)?;
            tracing::info!(model = %cfg.chat_model, "Using model");
            let reply = assistant.respond_detailed(&prompt).await;
            tracing::info!(source = reply.source.label(), "reply ready");
            println!("{}", reply.text);
        }
        Commands::Chat => {
            let assistant = build_assistant(cfg, telemetry)?;
            run_chat(cfg, &assistant, telemetry).await?;
        }
        Commands::Speak { input, output } => run_speak(cfg, telemetry, &input, &output).await?,
        Commands::Weather { city } => {
            let city = clean_city_name(&city.join(" "));
            if city.is_empty() {
                return Err(anyhow::anyhow!("invalid value for city: it is empty"));
            }
            let client = build_weather_client(cfg, &build_http_client()?)?;
            let report = client.current(&city).await?;
            println!("{}", format_weather_reply(&report));
        }
        Commands::Search { query } => {
            let query = validate_prompt(&query.join(" "), cfg.max_prompt_chars)?;
            let client = build_search_client(cfg, &build_http_client()?)?;
            let results = client.search(&query).await?;
            print_search_results(&results);
        }
        Commands::Doctor => run_doctor(cfg)?,
        Commands::Profiles { command } => match command {
            ProfileCommands::List => run_profiles_list(profiles, cfg)?,
            ProfileCommands::Show => run_profiles_show(cfg)?,
        },
        Commands::Telemetry { command } => match command {
            TelemetryCommands::Report { path, limit } => run_telemetry_report(cfg, path, limit)?,
        },
    }
    Ok(())
}

async fn run_speak(
    cfg: &RuntimeConfig,
    telemetry: &TelemetrySink,
    input: &str,
    output: &str,
) -> Result<()> {
    let audio = tokio::fs::read(input)
        .await
        .with_context(|| format!("failed to read audio input '{input}'"))?;
    let file_name = Path::new(input)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.wav".to_string());

    let pipeline = build_voice_pipeline(cfg, telemetry)?;
    let reply = pipeline.reply_to_audio(audio, &file_name).await?;

    tokio::fs::write(output, &reply.audio)
        .await
        .with_context(|| format!("failed to write audio reply to '{output}'"))?;

    println!("You said: {}", reply.transcript);
    println!("Reply: {}", reply.reply_text);
    println!("Audio reply written to {output} ({} bytes)", reply.audio.len());
    Ok(())
}

fn print_search_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No search results.");
        return;
    }
    for (index, result) in results.iter().enumerate() {
        match result {
            SearchResult::KnowledgeAnswer { title, .. } => {
                println!("{}. [answer] {}", index + 1, title);
            }
            SearchResult::Organic { title, link, .. } => {
                println!("{}. {} <{}>", index + 1, title, link);
            }
        }
        println!("   {}", result.snippet());
    }
}
