//! String heuristics that steer the assistant: weather intent, city
//! extraction and uncertainty detection. Nothing here touches the network.

const WEATHER_KEYWORDS: [&str; 3] = ["weather", "temperature", "forecast"];

/// Ordered; the first phrase found in the text wins.
pub const WEATHER_PHRASES: [&str; 14] = [
    "weather of",
    "weather in",
    "weather for",
    "weather at",
    "temperature in",
    "temperature for",
    "temperature at",
    "forecast for",
    "forecast in",
    "weather update for",
    "weather update in",
    "what's the weather in",
    "what's the weather like in",
    "how's the weather in",
];

const LOCATION_MARKERS: [&str; 4] = ["in", "for", "at", "of"];
const LOCATION_STOPWORDS: [&str; 5] = ["the", "a", "an", "pakistan", "india"];

pub const UNCERTAINTY_MARKERS: [&str; 14] = [
    "i don't have",
    "i don't know",
    "i am not sure",
    "i cannot",
    "i can't",
    "unable to",
    "don't have access",
    "no access to",
    "not available",
    "cannot provide",
    "latest information",
    "current information",
    "real-time information",
    "up-to-date",
];

pub fn is_weather_query(input: &str) -> bool {
    let lower = input.to_lowercase();
    WEATHER_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

/// Pulls a single city name out of free text.
///
/// Multi-word cities and non-English phrasing are not handled; the phrase
/// branch keeps everything up to the first delimiter, the token branch only
/// ever returns one word.
pub fn extract_city(text: &str) -> Option<String> {
    let text = text.to_lowercase();

    for phrase in WEATHER_PHRASES {
        if let Some(idx) = text.find(phrase) {
            let remaining = text[idx + phrase.len()..].trim();
            let city = first_segment(remaining, ",");
            let city = first_segment(city, "?");
            let city = first_segment(city, " in ").trim();
            return non_empty(capitalize_first(city));
        }
    }

    let words = text.split(' ').collect::<Vec<&str>>();
    for pair in words.windows(2) {
        let (marker, next) = (pair[0], pair[1]);
        if LOCATION_MARKERS.contains(&marker) && !LOCATION_STOPWORDS.contains(&next) {
            return non_empty(capitalize_first(next));
        }
    }

    None
}

/// Normalises an extracted city before it is sent to the weather service.
/// Only the first occurrence of each pattern is touched.
pub fn clean_city_name(city: &str) -> String {
    city.to_lowercase()
        .replacen(" city", "", 1)
        .replacen(" in ", " ", 1)
        .trim()
        .to_string()
}

pub fn signals_uncertainty(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    UNCERTAINTY_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

fn first_segment<'a>(text: &'a str, delimiter: &str) -> &'a str {
    text.split(delimiter).next().unwrap_or_default()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
