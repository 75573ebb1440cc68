//! Process settings read from the environment (a `.env` file is honoured when present).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/catalog";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// Which `ProductStore` backs the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Empty map-backed store; nothing survives a restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid {
                key: "CATALOG_STORE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
    pub store: StoreBackend,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            bind_addr: parse_or(&lookup, "CATALOG_BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?,
            max_connections: parse_or(&lookup, "CATALOG_MAX_CONNECTIONS", Some(DEFAULT_MAX_CONNECTIONS))?,
            body_limit: parse_or(&lookup, "CATALOG_BODY_LIMIT", Some(DEFAULT_BODY_LIMIT))?,
            store: parse_or(&lookup, "CATALOG_STORE", Some(StoreBackend::Postgres))?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => default.ok_or(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(s.bind_addr.port(), 3000);
        assert_eq!(s.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(s.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(s.store, StoreBackend::Postgres);
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("CATALOG_BIND_ADDR", "127.0.0.1:8080"),
            ("CATALOG_MAX_CONNECTIONS", "12"),
            ("CATALOG_BODY_LIMIT", "1024"),
            ("CATALOG_STORE", "Memory"),
        ])
        .unwrap();
        assert_eq!(s.database_url, "postgres://db/shop");
        assert_eq!(s.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(s.max_connections, 12);
        assert_eq!(s.body_limit, 1024);
        assert_eq!(s.store, StoreBackend::Memory);
    }

    #[test]
    fn rejects_bad_values() {
        let err = settings(&[("CATALOG_MAX_CONNECTIONS", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CATALOG_MAX_CONNECTIONS", .. }));
        assert!(settings(&[("CATALOG_STORE", "redis")]).is_err());
        assert!(settings(&[("CATALOG_BIND_ADDR", "nowhere")]).is_err());
    }
}
