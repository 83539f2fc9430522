// Centralized configuration for the welcome bot

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Default location of the per-server welcome configuration
pub const DEFAULT_WELCOME_CONFIG: &str = "welcome.json";

/// Language used when `BOT_LANG` is unset or unknown
pub const DEFAULT_LANG: &str = "en";

/// Discord embed colors
pub mod colors {
    pub const PRIMARY: u32 = 0x00bfff;
    pub const INFO: u32 = 0x3498db;
}

/// Errors raised while loading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingEnv(&'static str),

    #[error("invalid embed color `{0}`, expected a hex value like #00bfff")]
    InvalidColor(String),

    #[error("no configuration file provided (looked for {0})")]
    MissingFile(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse welcome configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no server configuration provided")]
    NoServers,

    #[error("invalid locale table: {0}")]
    Locales(String),
}

/// Process-level settings, read once from the environment
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub lang: String,
    pub embed_color: u32,
    pub welcome_config: PathBuf,
}

impl BotConfig {
    /// Read settings from the environment (call `dotenvy::dotenv()` first)
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var("DISCORD_TOKEN").map_err(|_| ConfigError::MissingEnv("DISCORD_TOKEN"))?;
        let lang = env::var("BOT_LANG").unwrap_or_else(|_| DEFAULT_LANG.to_string());

        let embed_color = match env::var("EMBED_COLOR") {
            Ok(raw) => parse_hex_color(&raw)?,
            Err(_) => colors::PRIMARY,
        };

        let welcome_config = env::var("WELCOME_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_WELCOME_CONFIG));

        Ok(Self {
            token,
            lang,
            embed_color,
            welcome_config,
        })
    }
}

/// Parse `#rrggbb`, `0xrrggbb` (or `0X`) or `rrggbb` into an RGB value
pub fn parse_hex_color(raw: &str) -> Result<u32, ConfigError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidColor(raw.to_string()));
    }

    u32::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidColor(raw.to_string()))
}
