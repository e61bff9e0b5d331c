use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub default_duration_minutes: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("HOSPITAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("HOSPITAL_API_URL not set, using default");
                    DEFAULT_API_URL.to_string()
                }),
            api_token: env::var("HOSPITAL_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            request_timeout_secs: parse_or_default("HOSPITAL_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            default_duration_minutes: parse_or_default(
                "BOOKING_DEFAULT_DURATION_MINUTES",
                DEFAULT_DURATION_MINUTES,
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - API base URL is empty");
        }
        if !config.is_authenticated() {
            warn!("HOSPITAL_API_TOKEN not set, requests will be sent without authorization");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.trim().is_empty()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_token.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
