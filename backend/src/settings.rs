//! Application configuration loaded via OrthoConfig.
//!
//! Every value is optional; accessors supply the fallbacks. Variables use
//! the `APP_` prefix (`APP_ENVIRONMENT`, `APP_PORT`, `APP_DATABASE_URL`, ...)
//! and the same keys are accepted as command-line flags.

use std::ffi::OsString;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::validation::{Locale, UnsupportedLocale};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_DIR: &str = "logs";

/// Whether diagnostics are exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Error envelopes carry `stack` and `details`; verbose logs.
    Development,
    #[default]
    Production,
}

impl RunMode {
    /// Only the exact value `development` enables development mode.
    pub fn from_environment(environment: Option<&str>) -> Self {
        match environment.map(str::trim) {
            Some("development") => Self::Development,
            _ => Self::Production,
        }
    }

    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub const fn default_log_level(self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Production => "warn",
        }
    }
}

/// Errors raised while loading or interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(String),
    #[error("invalid bind host `{host}`: {message}")]
    BindHost { host: String, message: String },
    #[error(transparent)]
    Locale(#[from] UnsupportedLocale),
}

/// Server settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// `development` or anything else (production).
    pub environment: Option<String>,
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL URL; users are kept in memory when absent.
    pub database_url: Option<String>,
    /// Fallback locale for validation messages (`es` or `en`).
    pub locale: Option<String>,
    /// Directory receiving `error.log`.
    pub log_dir: Option<PathBuf>,
}

impl AppSettings {
    /// Load from the environment and the given arguments.
    ///
    /// # Errors
    /// Returns [`SettingsError::Load`] when a source cannot be parsed.
    pub fn load_with_args<I, T>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::load_from_iter(args).map_err(|err| SettingsError::Load(err.to_string()))
    }

    pub fn run_mode(&self) -> RunMode {
        RunMode::from_environment(self.environment.as_deref())
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// # Errors
    /// Returns [`SettingsError::BindHost`] when the host is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host();
        let ip: IpAddr = host.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::BindHost {
                host: host.to_owned(),
                message: err.to_string(),
            }
        })?;
        Ok(SocketAddr::new(ip, self.port()))
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// # Errors
    /// Returns [`SettingsError::Locale`] for tags with no built-in catalog.
    pub fn locale(&self) -> Result<Locale, SettingsError> {
        match self.locale.as_deref() {
            Some(tag) => Ok(tag.parse()?),
            None => Ok(Locale::default()),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
    }
}
