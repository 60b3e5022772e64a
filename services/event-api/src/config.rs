use std::net::SocketAddr;

use anyhow::Result;

use crate::db::DbConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub dev_mode: bool,
    /// Base URL prefixed to every link; empty gives root-relative hrefs.
    pub public_url: String,
    /// `None` selects the in-memory store.
    pub database: Option<DbConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("EVREG_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = std::env::var("EVREG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dev_mode = std::env::var("EVREG_DEV")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let public_url = std::env::var("EVREG_PUBLIC_URL").unwrap_or_default();

        let database = DbConfig::from_env();

        Ok(Self {
            listen_addr,
            log_level,
            dev_mode,
            public_url,
            database,
        })
    }
}
