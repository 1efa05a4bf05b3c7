use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendConfig {
    /// Base address of the backend invoice ledger. Absent means standalone
    /// mode: issuance falls back to local generation and every other
    /// backend-dependent operation fails with a configuration error.
    pub base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "3005".to_string())
            .parse()?;

        let base_url = env::var("BACKEND_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            server: ServerConfig { host, port },
            backend: BackendConfig { base_url },
            service_name: "invoice-gateway".to_string(),
        })
    }
}
