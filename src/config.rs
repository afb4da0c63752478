use std::{env, net::SocketAddr};

use crate::{auth::token_service::AuthConfig, Error, Result};

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("DB_URL").unwrap_or_else(|_| "mem://".to_string()),
            namespace: env::var("DB_NS").unwrap_or_else(|_| "goonj".to_string()),
            database: env::var("DB_NAME").unwrap_or_else(|_| "goonj".to_string()),
            username: env::var("DB_USER").ok().filter(|v| !v.is_empty()),
            password: env::var("DB_PASSWORD").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            url: "mem://".to_string(),
            namespace: "goonj".to_string(),
            database: "goonj".to_string(),
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub rate_limit_per_minute: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let bind_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| Error::ConfigInvalid {
                key: "BIND_HOST".to_string(),
            })?;

        Ok(Self {
            db: DbConfig::from_env(),
            bind_addr,
            auth: AuthConfig::from_env()?,
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(150),
        })
    }
}
