use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::MatchingConfig;
use crate::services::PoolLimits;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub services: ServiceSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub pooling: PoolingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Upstream services
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    pub trip_service_url: String,
    pub user_service_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    /// Pools are kept in process memory when unset
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolingSettings {
    pub flexibility_days: u32,
    pub min_compatibility_score: f64,
    pub max_distance_km: f64,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
}

impl PoolingSettings {
    pub fn matching_config(&self) -> MatchingConfig {
        MatchingConfig {
            flexibility_days: self.flexibility_days,
            min_compatibility_score: self.min_compatibility_score,
            max_distance_km: self.max_distance_km,
        }
    }

    pub fn limits(&self) -> PoolLimits {
        PoolLimits {
            max_pool_size: self.max_pool_size,
            min_pool_size: self.min_pool_size,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Built-in values for every required setting
fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let matching = MatchingConfig::default();
    let limits = PoolLimits::default();

    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8086)?
        .set_default("services.trip_service_url", "http://localhost:8085")?
        .set_default("services.user_service_url", "http://localhost:8083")?
        .set_default("services.timeout_secs", 30)?
        .set_default("pooling.flexibility_days", i64::from(matching.flexibility_days))?
        .set_default("pooling.min_compatibility_score", matching.min_compatibility_score)?
        .set_default("pooling.max_distance_km", matching.max_distance_km)?
        .set_default("pooling.max_pool_size", i64::from(limits.max_pool_size))?
        .set_default("pooling.min_pool_size", i64::from(limits.min_pool_size))?
        .set_default("logging.level", default_log_level())?
        .set_default("logging.format", default_log_format())
}

fn environment() -> Environment {
    Environment::with_prefix("POOLING")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with POOLING__)
    /// 4. DATABASE_URL / REDIS_URL / LOG_LEVEL / LOG_FORMAT, when set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., POOLING__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

/// Conventional unprefixed variables and the setting each one overrides
const PLAIN_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("DATABASE_URL", "database.url"),
    ("REDIS_URL", "cache.redis_url"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

/// Apply the conventional unprefixed variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    apply_overrides(settings, |name| std::env::var(name).ok())
}

fn apply_overrides<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (variable, key) in PLAIN_ENV_OVERRIDES {
        if let Some(value) = lookup(variable) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        with_defaults(Config::builder())
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_without_any_file() {
        let settings = from_toml("");

        assert_eq!(settings.server.port, 8086);
        assert_eq!(settings.services.timeout_secs, 30);
        assert!(settings.database.url.is_none());
        assert!(settings.cache.redis_url.is_none());
        assert_eq!(settings.pooling.matching_config(), MatchingConfig::default());
        assert_eq!(settings.pooling.limits(), PoolLimits::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let settings = from_toml(
            r#"
            [server]
            port = 9000

            [database]
            url = "postgres://pool:secret@db/pooling"
            max_connections = 4

            [pooling]
            flexibility_days = 5
            min_compatibility_score = 0.7
            "#,
        );

        assert_eq!(settings.server.port, 9000);
        assert_eq!(
            settings.database.url.as_deref(),
            Some("postgres://pool:secret@db/pooling")
        );
        assert_eq!(settings.database.max_connections, Some(4));
        assert_eq!(settings.pooling.flexibility_days, 5);
        assert_eq!(settings.pooling.min_compatibility_score, 0.7);
        assert_eq!(settings.pooling.max_distance_km, 50.0);
    }

    #[test]
    fn test_default_logging() {
        let settings = from_toml("");

        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_plain_env_vars_override_file() {
        let layered = with_defaults(Config::builder())
            .unwrap()
            .add_source(File::from_str("[logging]\nlevel = \"warn\"", FileFormat::Toml))
            .build()
            .unwrap();

        let settings: Settings = apply_overrides(layered, |name| match name {
            "LOG_LEVEL" => Some("debug".to_string()),
            "REDIS_URL" => Some("redis://cache:6379".to_string()),
            _ => None,
        })
        .unwrap()
        .try_deserialize()
        .unwrap();

        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, "json");
        assert_eq!(settings.cache.redis_url.as_deref(), Some("redis://cache:6379"));
        assert!(settings.database.url.is_none());
    }
}
