use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

use crate::error::ConfigError;

/// Origins always allowed by CORS, on top of `FRONTEND_URL`.
pub const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Memory,
    Redis,
}

impl FromStr for Storage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Storage::Memory),
            "redis" => Ok(Storage::Redis),
            other => Err(format!("unknown storage backend {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub frontend_url: Option<String>,
    pub storage: Storage,
    pub redis_url: String,
    pub meili_url: String,
    /// Only read when `storage` is Redis.
    pub meili_key: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let storage = try_load("STORAGE", "memory")?;

        let meili_key = match storage {
            Storage::Redis => Some(read_secret("MEILI_ADMIN_KEY")?),
            Storage::Memory => None,
        };

        Ok(Self {
            port: try_load("PORT", "3000")?,
            environment: try_load("ENV", "development")?,
            frontend_url: var("FRONTEND_URL"),
            storage,
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379")?,
            meili_url: try_load("MEILI_URL", "http://127.0.0.1:7700")?,
            meili_key,
        })
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        DEFAULT_ORIGINS
            .iter()
            .map(|origin| origin.to_string())
            .chain(self.frontend_url.clone())
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
            frontend_url: None,
            storage: Storage::Memory,
            redis_url: "redis://127.0.0.1:6379".into(),
            meili_url: "http://127.0.0.1:7700".into(),
            meili_key: None,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &str) -> Result<String, ConfigError> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            ConfigError::Secret {
                name: secret_name.to_string(),
                source: e,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums() {
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("redis".parse::<Storage>(), Ok(Storage::Redis));
        assert!("sqlite".parse::<Storage>().is_err());
    }

    #[test]
    fn test_allowed_origins() {
        let config = Config {
            frontend_url: Some("https://names.example".into()),
            ..Config::default()
        };

        let origins = config.allowed_origins();
        assert_eq!(origins.len(), 5);
        assert_eq!(origins.last().map(String::as_str), Some("https://names.example"));
    }

    #[test]
    fn test_try_load_default() {
        let port: u16 = try_load("NURSERY_TEST_UNSET_PORT", "4100").unwrap();
        assert_eq!(port, 4100);

        let bad: Result<u16, _> = try_load("NURSERY_TEST_UNSET_PORT", "not-a-port");
        assert!(matches!(bad, Err(ConfigError::Invalid { .. })));
    }
}
