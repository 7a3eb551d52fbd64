use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub description: String,
    pub city: String,
    pub country: String,
    pub timestamp: String,
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    fn backend_name(&self) -> &'static str;
    /// `city` is expected to be cleaned already (see `intent::clean_city_name`).
    async fn current(&self, city: &str) -> Result<WeatherReport>;
}

#[derive(Debug, Deserialize)]
struct OpenWeatherPayload {
    main: OpenWeatherMain,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
    wind: OpenWeatherWind,
    name: String,
    sys: OpenWeatherSys,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherSys {
    #[serde(default)]
    country: String,
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn weather_report_from_payload(
    payload: serde_json::Value,
    timestamp: String,
) -> Result<WeatherReport> {
    let parsed = serde_json::from_value::<OpenWeatherPayload>(payload)
        .context("weather payload did not match the expected shape")?;
    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|condition| condition.description)
        .context("weather payload has no conditions")?;
    Ok(WeatherReport {
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        description,
        city: parsed.name,
        country: parsed.sys.country,
        timestamp,
    })
}

pub fn format_weather_reply(report: &WeatherReport) -> String {
    format!(
        "Based on real-time data as of {},\n\
         the current weather in {}, {} is:\n\
         - Temperature: {}°C (feels like {}°C)\n\
         - Conditions: {}\n\
         - Humidity: {}%\n\
         - Wind Speed: {} m/s",
        report.timestamp,
        report.city,
        report.country,
        report.temperature,
        report.feels_like,
        report.description,
        report.humidity,
        report.wind_speed
    )
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    fn backend_name(&self) -> &'static str {
        "openweathermap"
    }

    async fn current(&self, city: &str) -> Result<WeatherReport> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|err| err.without_url())
            .with_context(|| format!("failed to reach weather service for '{city}'"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "weather service returned {} for '{}': {}",
                status,
                city,
                body.trim()
            ));
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| err.without_url())
            .context("failed to decode weather response")?;
        weather_report_from_payload(payload, now_timestamp())
    }
}
