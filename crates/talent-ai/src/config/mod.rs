use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub providers: ProvidersConfig,
    pub screening: ScreeningConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            providers: ProvidersConfig::from_env()?,
            screening: ScreeningConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "o4-mini";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODELS: [&str; 3] =
    ["gemini-2.5-flash", "gemini-2.0-flash", "gemini-1.5-flash"];
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Generative-text provider settings for the screening cascade.
///
/// A missing API key does not fail configuration loading; the corresponding
/// client reports itself unavailable at call time and the cascade falls
/// through to the next provider.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
    pub request_timeout: Duration,
}

impl ProvidersConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = match env::var("PROVIDER_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        Ok(Self {
            openai: OpenAiConfig::from_env(),
            gemini: GeminiConfig::from_env(),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Primary generative provider (OpenAI-compatible responses endpoint).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl OpenAiConfig {
    fn from_env() -> Self {
        Self {
            api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }
}

/// Secondary generative provider (Gemini-compatible generateContent endpoint).
///
/// Carries an ordered model-variant list; `GEMINI_MODEL` overrides the head
/// of the list, the remaining variants stay as fallbacks.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
}

impl GeminiConfig {
    fn from_env() -> Self {
        let mut models: Vec<String> = DEFAULT_GEMINI_MODELS
            .iter()
            .map(|model| model.to_string())
            .collect();
        if let Some(preferred) = non_empty(env::var("GEMINI_MODEL").ok()) {
            models.retain(|model| model != &preferred);
            models.insert(0, preferred);
        }

        Self {
            api_key: non_empty(env::var("GEMINI_API_KEY").ok()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            models,
        }
    }
}

/// Org-wide screening settings that are not stored per job.
#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    /// Actor name recorded on automatic audit-trail entries.
    pub automation_actor: String,
}

impl ScreeningConfig {
    fn from_env() -> Self {
        Self {
            automation_actor: env::var("SCREENING_ACTOR")
                .unwrap_or_else(|_| "ai-screener".to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidTimeout,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidTimeout => {
                write!(f, "PROVIDER_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
