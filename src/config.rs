use std::env;
use std::str::FromStr;

/// Runtime settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// In-memory storage when unset
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// actix default (one per core) when unset
    pub workers: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            db_max_connections: 5,
            workers: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: non_empty(&lookup, "CAFE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parsed(&lookup, "CAFE_PORT").unwrap_or(defaults.port),
            database_url: non_empty(&lookup, "DATABASE_URL"),
            db_max_connections: parsed(&lookup, "CAFE_DB_MAX_CONNECTIONS")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.db_max_connections),
            workers: parsed(&lookup, "CAFE_WORKERS").filter(|n| *n > 0),
        }
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = non_empty(lookup, name)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring malformed setting, using default");
            None
        }
    }
}
