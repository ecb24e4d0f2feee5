use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got `{value}`")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number between 0 and 65535",
                value,
            })?,
            None => defaults.port,
        };

        let body_limit_bytes = match read("HYDRO_BODY_LIMIT_BYTES") {
            Some(value) => match value.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "HYDRO_BODY_LIMIT_BYTES",
                        expected: "a positive byte count",
                        value,
                    })
                }
            },
            None => defaults.body_limit_bytes,
        };

        Ok(Self {
            host: read("HYDRO_BIND_HOST").unwrap_or(defaults.host),
            port,
            allowed_origins: read("HYDRO_ALLOWED_ORIGINS")
                .map(|value| parse_origin_list(&value))
                .unwrap_or_default(),
            body_limit_bytes,
        })
    }

    pub fn bind_addr(&self) -> String {
        match self.host.parse::<SocketAddr>() {
            Ok(addr) => addr.to_string(),
            Err(_) if self.host.contains(':') && !self.host.starts_with('[') => {
                format!("[{}]:{}", self.host, self.port)
            }
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty() && origin != "*")
        .collect()
}
