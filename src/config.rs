//! # config — reads configuration from environment variables
//!
//! | Variable             | Default        | Description                           |
//! |----------------------|----------------|---------------------------------------|
//! | `DATABASE_URL`       | unset          | PostgreSQL URL; unset = in-memory     |
//! | `BIND_ADDR`          | `0.0.0.0:3000` | Address the dashboard listens on      |
//! | `API_KEY`            | unset          | Required `X-API-Key` value, if set    |
//! | `DB_MAX_CONNECTIONS` | `5`            | Pool size                             |

use std::net::SocketAddr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url:       Option<String>,
    pub bind_addr:          SocketAddr,
    /// `None` = every request is allowed (dev mode).
    pub api_key:            Option<String>,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = non_empty("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:3000")?;

        let db_max_connections: u32 = match non_empty("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive number")?,
            None => 5,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            bind_addr,
            api_key: non_empty("API_KEY"),
            db_max_connections,
        })
    }
}
