use anyhow::{bail, Context};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };

        let kind = lookup("USER_STORE").unwrap_or_else(|| "postgres".into());
        let store = match kind.as_str() {
            "postgres" => StoreConfig::Postgres {
                database_url: lookup("DATABASE_URL").context("DATABASE_URL is not set")?,
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            },
            "memory" => StoreConfig::Memory,
            other => bail!("unknown USER_STORE {other:?}, expected postgres or memory"),
        };

        Ok(Self { host, port, store })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_postgres_on_8080() {
        let cfg = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/users")])).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.store,
            StoreConfig::Postgres {
                database_url: "postgres://db/users".into(),
                max_connections: 10,
            }
        );
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(AppConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn memory_store_needs_no_database() {
        let cfg = AppConfig::from_lookup(lookup(&[("USER_STORE", "memory"), ("APP_PORT", "3333")])).unwrap();
        assert_eq!(cfg.store, StoreConfig::Memory);
        assert_eq!(cfg.port, 3333);
    }

    #[test]
    fn rejects_unknown_store_and_bad_port() {
        assert!(AppConfig::from_lookup(lookup(&[("USER_STORE", "redis")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("USER_STORE", "memory"), ("APP_PORT", "x")])).is_err());
    }
}
