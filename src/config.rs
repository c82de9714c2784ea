use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings read from the process environment (and `.env`, when
/// `main` has loaded one).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_pool_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parsed(&lookup, "PORT", 8080)?;
        let db_pool_size = parsed(&lookup, "DB_POOL_SIZE", 10)?;
        if db_pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_POOL_SIZE",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            db_pool_size,
        })
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&'static str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/tailoring")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.db_pool_size, 10);
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(config(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(
            config(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://db/tailoring"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("DB_POOL_SIZE", "4"),
        ])
        .unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.db_pool_size, 4);
    }

    #[test]
    fn malformed_port_is_rejected() {
        let err = config(&[("DATABASE_URL", "postgres://db"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "PORT has invalid value 'eighty'");
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = config(&[("DATABASE_URL", "postgres://db"), ("DB_POOL_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_POOL_SIZE", .. }));
    }
}
