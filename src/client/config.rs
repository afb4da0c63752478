use std::{env, path::PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub store_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            store_path: None,
        }
    }

    /// Reads `GOONJ_API_URL` and `GOONJ_STORE_PATH`. Without a store path the
    /// client keeps its state in memory.
    pub fn from_env() -> Self {
        let api_url = env::var("GOONJ_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(api_url);
        config.store_path = env::var("GOONJ_STORE_PATH")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
