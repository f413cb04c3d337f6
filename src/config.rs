use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

use crate::registry::CleanupConfig;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),

    #[error("invalid HOST value '{0}'")]
    InvalidHost(String),
}

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub cleanup: CleanupConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cleanup: CleanupConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `HOST` and `PORT` from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        if let Some(host) = lookup("HOST").filter(|v| !v.is_empty()) {
            config.host = host
                .parse()
                .map_err(|_| ConfigError::InvalidHost(host.clone()))?;
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
