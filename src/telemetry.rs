use std::collections::{BTreeMap, BTreeSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::config::RuntimeConfig;

pub fn unix_ms_now() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Rounds to three decimals so latency fields stay readable in the JSONL.
pub fn round_metric(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Append-only JSONL event stream shared by every component of one run.
///
/// Clones write to the same file through the same lock. A disabled sink
/// drops events without touching the filesystem.
#[derive(Debug, Clone)]
pub struct TelemetrySink {
    enabled: bool,
    path: PathBuf,
    run_id: String,
    command: String,
    profile: String,
    write_lock: Arc<Mutex<()>>,
}

impl TelemetrySink {
    pub fn new(cfg: &RuntimeConfig, command: String) -> Self {
        Self {
            enabled: cfg.telemetry_enabled,
            path: PathBuf::from(&cfg.telemetry_path),
            run_id: format!("run-{}-{}", unix_ms_now(), std::process::id()),
            command,
            profile: cfg.profile.clone(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: PathBuf::new(),
            run_id: String::new(),
            command: String::new(),
            profile: String::new(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Payload keys are merged over the envelope; a write failure is logged
    /// and otherwise ignored.
    pub fn emit(&self, event: &str, payload: Value) {
        if !self.enabled {
            return;
        }

        let mut record = json!({
            "ts_unix_ms": unix_ms_now(),
            "event": event,
            "run_id": self.run_id,
            "command": self.command,
            "profile": self.profile,
        });
        if let (Some(envelope), Value::Object(fields)) = (record.as_object_mut(), payload) {
            envelope.extend(fields);
        }

        if let Err(err) = self.append(&record) {
            tracing::warn!(
                event,
                path = %self.path.display(),
                error = %format!("{err:#}"),
                "telemetry write failed"
            );
        }
    }

    fn append(&self, record: &Value) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("failed to create telemetry directory '{}'", dir.display())
            })?;
        }

        let mut line = serde_json::to_string(record)
            .with_context(|| format!("failed to encode telemetry event for '{}'", self.command))?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .with_context(|| format!("failed to append to telemetry file '{}'", self.path.display()))
    }
}

#[derive(Debug, Default)]
pub struct TelemetrySummary {
    pub total_lines: usize,
    pub parsed_events: usize,
    pub parse_errors: usize,
    pub unique_runs: BTreeSet<String>,
    pub command_counts: BTreeMap<String, usize>,
    pub command_completed: usize,
    pub command_failed: usize,
    pub reply_sources: BTreeMap<String, usize>,
    pub collaborator_failures: BTreeMap<String, usize>,
    pub last_event_ts_unix_ms: Option<u128>,
}

impl TelemetrySummary {
    fn record(&mut self, event: &Value) {
        self.parsed_events += 1;

        if let Some(run_id) = event.get("run_id").and_then(Value::as_str)
            && !run_id.is_empty()
        {
            self.unique_runs.insert(run_id.to_string());
        }
        if let Some(command) = event.get("command").and_then(Value::as_str)
            && !command.is_empty()
        {
            bump(&mut self.command_counts, command);
        }
        if let Some(ts) = event.get("ts_unix_ms").and_then(Value::as_u64) {
            let ts = u128::from(ts);
            self.last_event_ts_unix_ms = Some(self.last_event_ts_unix_ms.map_or(ts, |seen| seen.max(ts)));
        }

        match event.get("event").and_then(Value::as_str) {
            Some("command.completed") => self.command_completed += 1,
            Some("command.failed") => self.command_failed += 1,
            Some("assistant.replied") => bump(&mut self.reply_sources, label(event, "source")),
            Some("collaborator.failed") => {
                bump(&mut self.collaborator_failures, label(event, "collaborator"))
            }
            _ => {}
        }
    }
}

fn label<'a>(event: &'a Value, key: &str) -> &'a str {
    event
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown")
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    *counts.entry(key.to_string()).or_default() += 1;
}

/// Summarises the most recent `limit` lines (newest first). Blank lines are
/// skipped, unparsable ones counted as parse errors.
pub fn summarize_telemetry_lines(lines: Vec<String>, limit: usize) -> TelemetrySummary {
    let mut summary = TelemetrySummary {
        total_lines: lines.len(),
        ..TelemetrySummary::default()
    };

    for line in lines.iter().rev().take(limit.max(1)) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(event) => summary.record(&event),
            Err(_) => summary.parse_errors += 1,
        }
    }

    summary
}

fn print_counts(title: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    println!("{title}:");
    for (name, count) in counts {
        println!("- {name}: {count}");
    }
}

pub fn run_telemetry_report(
    cfg: &RuntimeConfig,
    path_override: Option<String>,
    limit: usize,
) -> Result<()> {
    let path = path_override.unwrap_or_else(|| cfg.telemetry_path.clone());
    let path = Path::new(&path);
    if !path.exists() {
        println!("No telemetry recorded yet at '{}'.", path.display());
        return Ok(());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read telemetry file '{}'", path.display()))?;
    let lines = content.lines().map(str::to_string).collect::<Vec<String>>();
    let summary = summarize_telemetry_lines(lines, limit);

    println!("Telemetry report for {}", path.display());
    println!(
        "Events: {} parsed of {} lines ({} unreadable), {} runs",
        summary.parsed_events,
        summary.total_lines,
        summary.parse_errors,
        summary.unique_runs.len()
    );
    println!(
        "Commands: completed={} failed={}",
        summary.command_completed, summary.command_failed
    );
    print_counts("Events per command", &summary.command_counts);
    print_counts("Reply sources", &summary.reply_sources);
    print_counts("Collaborator failures", &summary.collaborator_failures);

    if let Some(last_ts) = summary.last_event_ts_unix_ms {
        println!("Last event ts_unix_ms: {last_ts}");
    }

    Ok(())
}
