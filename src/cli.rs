use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    #[command(about = "List configured profiles and highlight the active profile")]
    List,
    #[command(about = "Show the active profile's resolved runtime settings")]
    Show,
}

#[derive(Debug, Subcommand)]
pub enum TelemetryCommands {
    #[command(about = "Summarize telemetry events from a JSONL stream")]
    Report {
        #[arg(long)]
        path: Option<String>,
        #[arg(long, default_value_t = 5000)]
        limit: usize,
    },
}

const CLI_EXAMPLES: &str = "Examples:\n\
  hark ask \"What's the weather in Paris?\"\n\
  hark ask \"Who won the most recent Champions League final?\"\n\
  hark chat\n\
  hark speak --input question.wav --output reply.mp3\n\
  hark weather Lahore\n\
  hark search \"rust 2024 edition release date\"\n\
  hark --profile dev --chat-model gpt-4o-mini ask \"Summarize today's tech news\"\n\
  hark profiles show\n\
  hark telemetry report --limit 2000\n\
\n\
Credentials are read from OPENAI_API_KEY, WEATHER_API_KEY, SERP_API_KEY and ELEVENLABS_API_KEY.";

#[derive(Debug, Parser)]
#[command(name = "hark")]
#[command(about = "Personal assistant for text and voice with live weather and search fallback")]
#[command(after_long_help = CLI_EXAMPLES)]
pub struct Cli {
    #[arg(long, env = "HARK_PROFILE", default_value = "default")]
    pub profile: String,

    #[arg(long, env = "HARK_CONFIG", default_value = ".hark/config.toml")]
    pub config_path: String,

    #[arg(long, env = "HARK_CHAT_MODEL")]
    pub chat_model: Option<String>,

    #[arg(long, env = "HARK_CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    #[arg(long, env = "HARK_TEMPERATURE")]
    pub temperature: Option<f32>,

    #[arg(long, env = "HARK_MAX_TOKENS")]
    pub max_tokens: Option<u32>,

    #[arg(long, env = "HARK_WEATHER_BASE_URL")]
    pub weather_base_url: Option<String>,

    #[arg(long, env = "HARK_SEARCH_BASE_URL")]
    pub search_base_url: Option<String>,

    #[arg(long, env = "HARK_TRANSCRIPTION_MODEL")]
    pub transcription_model: Option<String>,

    #[arg(long, env = "HARK_TTS_BASE_URL")]
    pub tts_base_url: Option<String>,

    #[arg(long, env = "HARK_TTS_VOICE_ID")]
    pub tts_voice_id: Option<String>,

    #[arg(long, env = "HARK_TTS_MODEL")]
    pub tts_model: Option<String>,

    #[arg(long, env = "HARK_MAX_PROMPT_CHARS")]
    pub max_prompt_chars: Option<usize>,

    #[arg(long, env = "HARK_SHOW_SENSITIVE_CONFIG", default_value_t = false)]
    pub show_sensitive_config: bool,

    #[arg(long, env = "HARK_TELEMETRY_ENABLED", action = clap::ArgAction::Set)]
    pub telemetry_enabled: Option<bool>,

    #[arg(long, env = "HARK_TELEMETRY_PATH")]
    pub telemetry_path: Option<String>,

    #[arg(long, env = "RUST_LOG", default_value = "error")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Ask a single question and print the assistant's reply")]
    Ask {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    #[command(about = "Run interactive chat mode (each line is answered independently)")]
    Chat,
    #[command(about = "Transcribe a recorded question, answer it, and write the spoken reply")]
    Speak {
        #[arg(long)]
        input: String,
        #[arg(long, default_value = "reply.mp3")]
        output: String,
    },
    #[command(about = "Fetch current weather for a city directly from the weather service")]
    Weather {
        #[arg(required = true)]
        city: Vec<String>,
    },
    #[command(about = "Run a web search and print the collected results")]
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    #[command(about = "Check credentials and resolved collaborator settings")]
    Doctor,
    #[command(about = "Inspect profile configuration and active resolved profile state")]
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    #[command(about = "Telemetry utilities and reporting")]
    Telemetry {
        #[command(subcommand)]
        command: TelemetryCommands,
    },
}

pub fn command_label(command: &Commands) -> String {
    match command {
        Commands::Ask { .. } => "ask".to_string(),
        Commands::Chat => "chat".to_string(),
        Commands::Speak { .. } => "speak".to_string(),
        Commands::Weather { .. } => "weather".to_string(),
        Commands::Search { .. } => "search".to_string(),
        Commands::Doctor => "doctor".to_string(),
        Commands::Profiles { command } => match command {
            ProfileCommands::List => "profiles.list".to_string(),
            ProfileCommands::Show => "profiles.show".to_string(),
        },
        Commands::Telemetry { command } => match command {
            TelemetryCommands::Report { .. } => "telemetry.report".to_string(),
        },
    }
}
