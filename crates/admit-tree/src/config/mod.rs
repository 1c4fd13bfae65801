use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::catalog::CatalogMode;

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

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.sample.json";
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let catalog_path =
            env::var("APP_CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());
        let strict = match env::var("APP_CATALOG_STRICT") {
            Ok(value) => parse_flag("APP_CATALOG_STRICT", &value)?,
            Err(_) => false,
        };

        let timeout_secs = match env::var("APP_CHAT_TIMEOUT_SECS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_CHAT_TIMEOUT_SECS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            catalog: CatalogConfig {
                path: PathBuf::from(catalog_path),
                mode: if strict {
                    CatalogMode::Strict
                } else {
                    CatalogMode::Lenient
                },
            },
            chat: ChatConfig {
                endpoint: non_empty_var("APP_CHAT_ENDPOINT"),
                api_key: non_empty_var("APP_CHAT_API_KEY"),
                timeout_secs,
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name }),
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
    /// Colored output, enabled for local development only.
    pub ansi: bool,
}

/// Where catalog snapshots are read from and how strictly they are parsed.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// A snapshot file, or a directory whose newest `*.json` file is used.
    pub path: PathBuf,
    pub mode: CatalogMode,
}

/// Upstream chat completion settings. Chat is disabled without an endpoint.
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "APP_CHAT_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_CATALOG_PATH",
            "APP_CATALOG_STRICT",
            "APP_CHAT_ENDPOINT",
            "APP_CHAT_API_KEY",
            "APP_CHAT_TIMEOUT_SECS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.ansi);
        assert_eq!(config.catalog.path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(config.catalog.mode, CatalogMode::Lenient);
        assert!(config.chat.endpoint.is_none());
        assert_eq!(config.chat.timeout_secs, 30);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 5001));
        reset_env();
    }

    #[test]
    fn reads_catalog_and_chat_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CATALOG_PATH", "/srv/catalog");
        env::set_var("APP_CATALOG_STRICT", "yes");
        env::set_var("APP_CHAT_ENDPOINT", "https://chat.example.test/v1/chat/completions");
        env::set_var("APP_CHAT_API_KEY", "  ");
        env::set_var("APP_CHAT_TIMEOUT_SECS", "12");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.catalog.path, PathBuf::from("/srv/catalog"));
        assert_eq!(config.catalog.mode, CatalogMode::Strict);
        assert_eq!(
            config.chat.endpoint.as_deref(),
            Some("https://chat.example.test/v1/chat/completions")
        );
        assert!(config.chat.api_key.is_none(), "blank key counts as unset");
        assert_eq!(config.chat.timeout_secs, 12);
        reset_env();
    }

    #[test]
    fn rejects_unparseable_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        env::set_var("APP_CHAT_TIMEOUT_SECS", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTimeout)));
        env::remove_var("APP_CHAT_TIMEOUT_SECS");

        env::set_var("APP_CATALOG_STRICT", "sometimes");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFlag {
                name: "APP_CATALOG_STRICT"
            })
        ));
        env::remove_var("APP_CATALOG_STRICT");

        env::set_var("APP_PORT", "not-a-port");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        reset_env();
    }
}
