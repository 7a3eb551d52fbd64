//! Decision engine behind every reply.
//!
//! A reply is produced by a short chain of steps, each of which either
//! settles the answer or hands over to the next one:
//!
//! 1. weather: a weather-sounding question with a resolvable city is answered
//!    from the weather service and never reaches the language model;
//! 2. primary answer: one chat completion with the persona prompt;
//! 3. search: if that answer admits uncertainty, one web search and one more
//!    completion grounded on the results.
//!
//! Collaborator failures in steps 1 and 3 (search only) degrade to the next
//! fallback. Anything else surfaces as an apology string; `respond` never
//! returns an error.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::json;

use crate::completion::{ChatCompletion, ChatTurn, CompletionRequest};
use crate::config::RuntimeConfig;
use crate::error::render_error_message;
use crate::intent::{clean_city_name, extract_city, is_weather_query, signals_uncertainty};
use crate::search::{SearchResult, SearchService, build_search_context};
use crate::telemetry::{TelemetrySink, round_metric};
use crate::weather::{WeatherReport, WeatherService, format_weather_reply};

pub const PRIMARY_SYSTEM_PROMPT: &str = "You are a helpful personal assistant with access to real-time data and search capabilities.\n\
If you're unsure about something or need current information, say so directly and I will search for it.\n\
Keep responses concise and informative.";

pub const GROUNDED_SYSTEM_PROMPT: &str =
    "You are a helpful personal assistant with access to real-time data and search capabilities.";

pub const APOLOGY_PREFIX: &str = "I apologize, but I encountered an error: ";

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub show_sensitive_errors: bool,
}

impl AssistantSettings {
    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        Self {
            model: cfg.chat_model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            show_sensitive_errors: cfg.show_sensitive_config,
        }
    }
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 150,
            show_sensitive_errors: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Weather,
    Primary,
    PrimaryAfterEmptySearch,
    SearchAugmented,
    Apology,
}

impl ReplySource {
    pub fn label(self) -> &'static str {
        match self {
            ReplySource::Weather => "weather",
            ReplySource::Primary => "primary",
            ReplySource::PrimaryAfterEmptySearch => "primary-after-empty-search",
            ReplySource::SearchAugmented => "search-augmented",
            ReplySource::Apology => "apology",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub source: ReplySource,
}

impl AssistantReply {
    fn new(text: String, source: ReplySource) -> Self {
        Self { text, source }
    }
}

/// Cheap to clone; collaborators are shared read-only between requests.
#[derive(Clone)]
pub struct Assistant {
    chat: Arc<dyn ChatCompletion>,
    weather: Arc<dyn WeatherService>,
    search: Arc<dyn SearchService>,
    settings: AssistantSettings,
    telemetry: TelemetrySink,
}

impl Assistant {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        weather: Arc<dyn WeatherService>,
        search: Arc<dyn SearchService>,
        settings: AssistantSettings,
        telemetry: TelemetrySink,
    ) -> Self {
        Self {
            chat,
            weather,
            search,
            settings,
            telemetry,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn backend_summary(&self) -> String {
        format!(
            "chat={} weather={} search={}",
            self.chat.backend_name(),
            self.weather.backend_name(),
            self.search.backend_name()
        )
    }

    pub async fn respond(&self, user_input: &str) -> String {
        self.respond_detailed(user_input).await.text
    }

    pub async fn respond_detailed(&self, user_input: &str) -> AssistantReply {
        let started_at = Instant::now();
        let reply = match self.run_pipeline(user_input).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "assistant pipeline failed");
                AssistantReply::new(self.apology(&err), ReplySource::Apology)
            }
        };

        self.telemetry.emit(
            "assistant.replied",
            json!({
                "source": reply.source.label(),
                "reply_chars": reply.text.chars().count(),
                "latency_ms": round_metric(started_at.elapsed().as_secs_f64() * 1000.0)
            }),
        );
        reply
    }

    pub fn apology(&self, err: &anyhow::Error) -> String {
        format!(
            "{APOLOGY_PREFIX}{}",
            render_error_message(err, self.settings.show_sensitive_errors)
        )
    }

    async fn run_pipeline(&self, user_input: &str) -> Result<AssistantReply> {
        if let Some(report) = self.weather_step(user_input).await {
            return Ok(AssistantReply::new(
                format_weather_reply(&report),
                ReplySource::Weather,
            ));
        }

        let primary = self.primary_answer(user_input).await?;
        if !signals_uncertainty(&primary) {
            return Ok(AssistantReply::new(primary, ReplySource::Primary));
        }

        tracing::info!("primary answer signals uncertainty; consulting search");
        self.search_step(user_input, primary).await
    }

    /// `None` means "not answerable as weather"; the caller falls through.
    async fn weather_step(&self, user_input: &str) -> Option<WeatherReport> {
        if !is_weather_query(user_input) {
            return None;
        }
        let Some(city) = extract_city(user_input) else {
            tracing::debug!("weather intent without a recognisable city");
            return None;
        };
        let cleaned = clean_city_name(&city);
        match self.weather.current(&cleaned).await {
            Ok(report) => {
                tracing::info!(city = %report.city, country = %report.country, "answered from weather service");
                Some(report)
            }
            Err(err) => {
                self.record_collaborator_failure("weather", &err);
                None
            }
        }
    }

    async fn primary_answer(&self, user_input: &str) -> Result<String> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatTurn::system(PRIMARY_SYSTEM_PROMPT),
                ChatTurn::user(user_input),
            ],
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        };
        self.chat
            .complete(&request)
            .await
            .context("primary chat completion failed")
    }

    async fn search_step(&self, user_input: &str, primary: String) -> Result<AssistantReply> {
        let results = self.search_results(user_input).await;
        if results.is_empty() {
            return Ok(AssistantReply::new(
                primary,
                ReplySource::PrimaryAfterEmptySearch,
            ));
        }

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatTurn::system(GROUNDED_SYSTEM_PROMPT),
                ChatTurn::system(build_search_context(&results)),
                ChatTurn::user(user_input),
            ],
            temperature: None,
            max_tokens: None,
        };
        let grounded = self
            .chat
            .complete(&request)
            .await
            .context("search-grounded chat completion failed")?;

        if grounded.is_empty() {
            return Ok(AssistantReply::new(primary, ReplySource::Primary));
        }
        Ok(AssistantReply::new(grounded, ReplySource::SearchAugmented))
    }

    async fn search_results(&self, user_input: &str) -> Vec<SearchResult> {
        match self.search.search(user_input).await {
            Ok(results) => {
                tracing::debug!(count = results.len(), "search results collected");
                results
            }
            Err(err) => {
                self.record_collaborator_failure("search", &err);
                Vec::new()
            }
        }
    }

    fn record_collaborator_failure(&self, collaborator: &str, err: &anyhow::Error) {
        let detail = render_error_message(err, self.settings.show_sensitive_errors);
        tracing::warn!(collaborator, error = %detail, "collaborator call failed; falling back");
        self.telemetry.emit(
            "collaborator.failed",
            json!({
                "collaborator": collaborator,
                "error": detail
            }),
        );
    }
}
