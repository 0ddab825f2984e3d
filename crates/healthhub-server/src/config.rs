//! Application configuration.
//!
//! Loaded from a TOML file (`healthhub.toml` by default, overridable with
//! `--config` or `HEALTHHUB_CONFIG`), with serde defaults for every
//! section so a missing file yields a runnable development configuration.
//! A handful of environment variables override individual values after
//! the file is read.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u32,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout_ms() -> u32 {
    30_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Only `memory` is implemented; the relational backend lives behind
    /// the same traits in an external collaborator.
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_backend() -> String {
    "memory".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Shared secret presented by the pharmacy service in `x-service-key`.
    #[serde(default = "default_pharmacy_key")]
    pub pharmacy_service_key: String,
    /// Bearer token seeded for the bootstrap admin. Token issuance for
    /// everyone else is the external auth collaborator's job.
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
}

fn default_pharmacy_key() -> String {
    "dev-pharmacy-key".into()
}
fn default_admin_token() -> String {
    "dev-admin-token".into()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            pharmacy_service_key: default_pharmacy_key(),
            admin_token: default_admin_token(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_hospital_name")]
    pub hospital_name: String,
    #[serde(default = "default_hospital_place")]
    pub hospital_place: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
}

fn default_hospital_name() -> String {
    "HealthHub General".into()
}
fn default_hospital_place() -> String {
    "Alger".into()
}
fn default_admin_username() -> String {
    "admin".into()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            hospital_name: default_hospital_name(),
            hospital_place: default_hospital_place(),
            admin_username: default_admin_username(),
        }
    }
}

impl AppConfig {
    /// Returns the first violation, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.request_timeout_ms == 0 {
            return Err("server.request_timeout_ms must be > 0".into());
        }
        if self.storage.backend != "memory" {
            return Err(format!(
                "storage.backend '{}' is not supported (only 'memory')",
                self.storage.backend
            ));
        }
        let level = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&level.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.auth.pharmacy_service_key.is_empty() {
            return Err("auth.pharmacy_service_key must not be empty".into());
        }
        if self.auth.admin_token.is_empty() {
            return Err("auth.admin_token must not be empty".into());
        }
        if self.bootstrap.admin_username.is_empty() {
            return Err("bootstrap.admin_username must not be empty".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.server.request_timeout_ms))
    }
}

/// Loads configuration from `path` (missing file falls back to defaults),
/// applies environment overrides, validates.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
    let candidate = path.unwrap_or("healthhub.toml");
    let mut config: AppConfig = if Path::new(candidate).exists() {
        let raw = std::fs::read_to_string(candidate)
            .map_err(|e| format!("cannot read {candidate}: {e}"))?;
        toml::from_str(&raw).map_err(|e| format!("cannot parse {candidate}: {e}"))?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<(), String> {
    if let Ok(host) = std::env::var("HEALTHHUB_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("HEALTHHUB_PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| format!("HEALTHHUB_PORT '{port}' is not a port number"))?;
    }
    if let Ok(key) = std::env::var("HEALTHHUB_PHARMACY_KEY") {
        config.auth.pharmacy_service_key = key;
    }
    if let Ok(token) = std::env::var("HEALTHHUB_ADMIN_TOKEN") {
        config.auth.admin_token = token;
    }
    Ok(())
}
