//! Server Settings
//!
//! Read from `TNSQUERY_*` environment variables (a `.env` file is loaded
//! first by `main`).

use anyhow::Context;
use std::env;
use std::net::{IpAddr, SocketAddr};

/// Development-only service key, accepted in debug builds
const DEV_API_KEY: &str = "dev-api-key";

#[derive(Clone)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub api_key: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = var_or("TNSQUERY_HOST", "0.0.0.0")
            .parse()
            .context("TNSQUERY_HOST must be an IP address")?;
        let port = var_or("TNSQUERY_PORT", "8080")
            .parse()
            .context("TNSQUERY_PORT must be a port number")?;
        let db_max_connections = var_or("TNSQUERY_DB_MAX_CONNECTIONS", "5")
            .parse()
            .context("TNSQUERY_DB_MAX_CONNECTIONS must be a positive integer")?;

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "postgres://{}:{}@{}:{}/{}",
                var_or("TNSQUERY_DB_USER", "tnsquery"),
                var_or("TNSQUERY_DB_PASS", "tnsquery"),
                var_or("TNSQUERY_DB_HOST", "localhost"),
                var_or("TNSQUERY_DB_PORT", "5432"),
                var_or("TNSQUERY_DB_BASE", "tnsquery"),
            ),
        };

        let api_key = match env::var("TNSQUERY_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ if cfg!(debug_assertions) => {
                tracing::warn!("TNSQUERY_API_KEY not set, using the development key");
                DEV_API_KEY.to_string()
            }
            _ => anyhow::bail!("TNSQUERY_API_KEY must be set in production"),
        };

        Ok(Self {
            host,
            port,
            database_url,
            db_max_connections,
            api_key,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
