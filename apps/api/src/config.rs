use std::num::NonZeroU64;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// How the binary runs once configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Interactive prompt loop on stdin.
    Repl,
    /// HTTP API exposing each tool.
    Serve,
    /// Operator step: run the calendar consent flow and write the token file.
    ProvisionCalendar,
}

impl FromStr for AppMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repl" => Ok(AppMode::Repl),
            "serve" => Ok(AppMode::Serve),
            "provision-calendar" => Ok(AppMode::ProvisionCalendar),
            other => {
                bail!("Unknown APP_MODE '{other}' (expected repl, serve or provision-calendar)")
            }
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the chat provider key is missing; the other provider
/// credentials are optional here and checked by the tool that needs them.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: AppMode,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub calendar: CalendarConfig,
    pub vapi: VapiConfig,
    pub whatsapp: WhatsAppConfig,
    pub http_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub client_secret_file: PathBuf,
    pub token_file: PathBuf,
    pub base_url: String,
    pub time_zone: String,
}

#[derive(Debug, Clone)]
pub struct VapiConfig {
    pub api_key: Option<String>,
    pub phone_number_id: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub base_url: String,
    pub template_name: String,
    pub template_language: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            mode: env_or("APP_MODE", "repl").parse()?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            calendar: CalendarConfig {
                client_secret_file: env_or("GOOGLE_CLIENT_SECRET_FILE", "client_secret.json")
                    .into(),
                token_file: env_or("GOOGLE_TOKEN_FILE", "token.json").into(),
                base_url: env_or(
                    "GOOGLE_CALENDAR_BASE_URL",
                    "https://www.googleapis.com/calendar/v3",
                ),
                time_zone: env_or("CALENDAR_TIME_ZONE", "UTC"),
            },
            vapi: VapiConfig {
                api_key: optional_env("VAPI_API_KEY"),
                phone_number_id: optional_env("VAPI_PHONE_NUMBER_ID"),
                base_url: env_or("VAPI_BASE_URL", "https://api.vapi.ai"),
            },
            whatsapp: WhatsAppConfig {
                access_token: optional_env("WHATSAPP_ACCESS_TOKEN"),
                phone_number_id: optional_env("WHATSAPP_PHONE_NUMBER_ID"),
                base_url: env_or("WHATSAPP_BASE_URL", "https://graph.facebook.com/v22.0"),
                template_name: env_or("WHATSAPP_TEMPLATE_NAME", "job_pitch_quotation"),
                template_language: env_or("WHATSAPP_TEMPLATE_LANGUAGE", "en_US"),
            },
            http_timeout_secs: parse_timeout_secs(&env_or("HTTP_TIMEOUT_SECS", "30"))?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as missing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Request timeout in seconds. Zero is rejected: it would fail every provider call.
fn parse_timeout_secs(raw: &str) -> Result<u64> {
    let secs = raw
        .trim()
        .parse::<NonZeroU64>()
        .context("HTTP_TIMEOUT_SECS must be a positive whole number of seconds")?;
    Ok(secs.get())
}
