use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MODEL_PATH: &str = "public/model.onnx";
const DEFAULT_MODEL_LOAD_TIMEOUT_SECS: u64 = 30;

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
    pub model: ModelConfig,
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
            model: ModelConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the scoring model lives and how it is brought up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Output to read class scores from; `None` falls back to positional selection.
    pub output_name: Option<String>,
    pub load_timeout: Duration,
    /// Load the model before the server reports ready.
    pub preload: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            output_name: None,
            load_timeout: Duration::from_secs(DEFAULT_MODEL_LOAD_TIMEOUT_SECS),
            preload: false,
        }
    }
}

impl ModelConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let path = env::var("APP_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.path);

        let output_name = env::var("APP_MODEL_OUTPUT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let load_timeout = match env::var("APP_MODEL_LOAD_TIMEOUT_SECS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidLoadTimeout),
            },
            Err(_) => defaults.load_timeout,
        };

        let preload = match env::var("APP_MODEL_PRELOAD") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_MODEL_PRELOAD",
            })?,
            Err(_) => defaults.preload,
        };

        Ok(Self {
            path,
            output_name,
            load_timeout,
            preload,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLoadTimeout,
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLoadTimeout => {
                write!(f, "APP_MODEL_LOAD_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidFlag { name } => {
                write!(f, "{name} must be one of true/false, yes/no, on/off, 1/0")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLoadTimeout
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_MODEL_PATH",
            "APP_MODEL_OUTPUT",
            "APP_MODEL_LOAD_TIMEOUT_SECS",
            "APP_MODEL_PRELOAD",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_model_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MODEL_PATH", "/srv/models/credit.onnx");
        env::set_var("APP_MODEL_OUTPUT", " probabilities ");
        env::set_var("APP_MODEL_LOAD_TIMEOUT_SECS", "5");
        env::set_var("APP_MODEL_PRELOAD", "yes");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.model.path, PathBuf::from("/srv/models/credit.onnx"));
        assert_eq!(config.model.output_name.as_deref(), Some("probabilities"));
        assert_eq!(config.model.load_timeout, Duration::from_secs(5));
        assert!(config.model.preload);
        reset_env();
    }

    #[test]
    fn rejects_zero_load_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MODEL_LOAD_TIMEOUT_SECS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidLoadTimeout)
        ));
        reset_env();
    }

    #[test]
    fn rejects_unknown_preload_flag() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MODEL_PRELOAD", "sometimes");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFlag {
                name: "APP_MODEL_PRELOAD"
            })
        ));
        reset_env();
    }
}
