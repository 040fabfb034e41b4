use std::env;

use sea_orm::ConnectOptions;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://cinema.sqlite?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// `DATABASE_URL`, `CINEMA_BIND_ADDR` and `DATABASE_MAX_CONNECTIONS`,
    /// each falling back to its default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let bind_addr =
            lookup("CINEMA_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        default = DEFAULT_MAX_CONNECTIONS,
                        "Invalid DATABASE_MAX_CONNECTIONS, using default"
                    );
                    DEFAULT_MAX_CONNECTIONS
                }
            },
        };

        Self {
            database_url,
            bind_addr,
            max_connections,
        }
    }

    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.database_url.clone());
        options
            .max_connections(self.max_connections)
            .sqlx_logging(false);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://cinema@localhost/cinema"),
            ("CINEMA_BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ]);
        assert_eq!(config.database_url, "postgres://cinema@localhost/cinema");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn test_invalid_pool_size_falls_back() {
        for raw in ["lots", "0", "-3"] {
            let config = config_from(&[("DATABASE_MAX_CONNECTIONS", raw)]);
            assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        }
    }
}
