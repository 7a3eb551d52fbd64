#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Credentials,
    Input,
    Collaborator,
    Audio,
    Internal,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::Credentials => "CREDENTIALS",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Collaborator => "COLLABORATOR",
            ErrorCategory::Audio => "AUDIO",
            ErrorCategory::Internal => "INTERNAL",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            ErrorCategory::Credentials => {
                "Export OPENAI_API_KEY, WEATHER_API_KEY, SERP_API_KEY (and ELEVENLABS_API_KEY for speak), then run hark doctor."
            }
            ErrorCategory::Input => "Run hark --help and correct command arguments or profile values.",
            ErrorCategory::Collaborator => {
                "Check network access and base URLs, then retry with RUST_LOG=info for request logs."
            }
            ErrorCategory::Audio => {
                "Check that the input recording exists and the output path is writable."
            }
            ErrorCategory::Internal => {
                "Retry with RUST_LOG=debug. If it persists, capture logs and open an issue."
            }
        }
    }
}

pub fn categorize_error(err: &anyhow::Error) -> ErrorCategory {
    let msg = format!("{err:#}").to_ascii_lowercase();

    if msg.contains("api_key is required") || msg.contains("credential") {
        return ErrorCategory::Credentials;
    }

    if msg.contains("no text provided")
        || msg.contains("no audio")
        || msg.contains("invalid value")
        || msg.contains("prompt exceeds")
        || msg.contains("profile")
        || msg.contains("failed to read input")
    {
        return ErrorCategory::Input;
    }

    if msg.contains("audio") || msg.contains("transcri") || msg.contains("speech") {
        return ErrorCategory::Audio;
    }

    if msg.contains("service") || msg.contains("failed to reach") {
        return ErrorCategory::Collaborator;
    }

    ErrorCategory::Internal
}

pub fn format_cli_error(err: &anyhow::Error, show_sensitive_config: bool) -> String {
    let category = categorize_error(err);
    let rendered_error = render_error_message(err, show_sensitive_config);
    format!(
        "[{}] {}\nHint: {}",
        category.code(),
        rendered_error,
        category.hint()
    )
}

pub fn render_error_message(err: &anyhow::Error, show_sensitive_config: bool) -> String {
    let rendered = format!("{err:#}");
    if show_sensitive_config {
        rendered
    } else {
        redact_sensitive_text(&rendered)
    }
}

const SECRET_MARKERS: [&str; 4] = ["api_key=", "appid=", "Bearer ", "xi-api-key: "];

/// Masks credential values that collaborators may echo back in error text.
pub fn redact_sensitive_text(text: &str) -> String {
    SECRET_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| redact_after_marker(&acc, marker))
}

pub fn redact_after_marker(text: &str, marker: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    while let Some(offset) = text[cursor..].find(marker) {
        let value_start = cursor + offset + marker.len();
        out.push_str(&text[cursor..value_start]);

        let remainder = &text[value_start..];
        let end = remainder
            .find(|ch: char| {
                ch.is_whitespace()
                    || matches!(
                        ch,
                        '&' | '"' | '\'' | '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';'
                    )
            })
            .unwrap_or(remainder.len());
        if end > 0 {
            out.push_str("[REDACTED]");
        }
        cursor = value_start + end;
    }

    out.push_str(&text[cursor..]);
    out
}
