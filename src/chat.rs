use std::io::{self, Write};

use anyhow::{Context, Result};
use serde_json::json;

use crate::assistant::Assistant;
use crate::config::{RuntimeConfig, enforce_prompt_limit};
use crate::error::format_cli_error;
use crate::telemetry::TelemetrySink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Exit,
    Status,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedChatCommand {
    NotACommand,
    Command(ChatCommand),
    UnknownCommand(String),
}

pub fn parse_chat_command(input: &str) -> ParsedChatCommand {
    let trimmed = input.trim();

    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("/exit") {
        return ParsedChatCommand::Command(ChatCommand::Exit);
    }

    if !trimmed.starts_with('/') {
        return ParsedChatCommand::NotACommand;
    }

    let slashless = trimmed.trim_start_matches('/');
    if slashless.is_empty() {
        return ParsedChatCommand::UnknownCommand("/".to_string());
    }

    let command = slashless
        .split_whitespace()
        .next()
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();

    match command.as_str() {
        "exit" | "quit" => ParsedChatCommand::Command(ChatCommand::Exit),
        "status" => ParsedChatCommand::Command(ChatCommand::Status),
        "help" => ParsedChatCommand::Command(ChatCommand::Help),
        other => ParsedChatCommand::UnknownCommand(format!("/{other}")),
    }
}

pub fn print_chat_help() {
    println!("Chat commands:");
    println!("- /help: show command quick reference");
    println!("- /status: show active profile, model and collaborators");
    println!("- /exit: end interactive chat");
    println!("Anything else is sent to the assistant. Lines are answered independently.");
}

fn print_chat_status(cfg: &RuntimeConfig, assistant: &Assistant) {
    let settings = assistant.settings();
    println!("Profile: {}", cfg.profile);
    println!(
        "Model: {} (temperature={}, max_tokens={})",
        settings.model, settings.temperature, settings.max_tokens
    );
    println!("Collaborators: {}", assistant.backend_summary());
    println!(
        "Telemetry: enabled={} path={}",
        cfg.telemetry_enabled, cfg.telemetry_path
    );
}

pub async fn run_chat(
    cfg: &RuntimeConfig,
    assistant: &Assistant,
    telemetry: &TelemetrySink,
) -> Result<()> {
    telemetry.emit(
        "chat.started",
        json!({
            "model": assistant.settings().model.clone(),
            "profile": cfg.profile.clone()
        }),
    );

    println!("Interactive mode started. Type /help for commands or /exit to quit.");
    let stdin = io::stdin();
    let mut line = String::new();
    let mut turns = 0usize;

    loop {
        print!("hark> ");
        io::stdout().flush().context("failed to flush stdout")?;
        line.clear();
        let read = stdin
            .read_line(&mut line)
            .context("failed to read input from stdin")?;
        if read == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_chat_command(input) {
            ParsedChatCommand::NotACommand => {}
            ParsedChatCommand::UnknownCommand(command) => {
                println!("Unknown command '{command}'. Use /help.");
                continue;
            }
            ParsedChatCommand::Command(ChatCommand::Exit) => break,
            ParsedChatCommand::Command(ChatCommand::Help) => {
                print_chat_help();
                continue;
            }
            ParsedChatCommand::Command(ChatCommand::Status) => {
                print_chat_status(cfg, assistant);
                continue;
            }
        }

        if let Err(err) = enforce_prompt_limit(input, cfg.max_prompt_chars) {
            eprintln!("{}", format_cli_error(&err, cfg.show_sensitive_config));
            continue;
        }

        let reply = assistant.respond(input).await;
        turns += 1;
        println!("{reply}");
    }

    telemetry.emit("chat.finished", json!({ "turns": turns }));
    Ok(())
}
