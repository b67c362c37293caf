//! Server configuration.

use std::net::IpAddr;
use std::path::PathBuf;

/// Configuration for the HTTP API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database holding the corpus view and payroll table.
    pub database: PathBuf,
    /// Host IP address to bind to.
    pub host: IpAddr,
    /// Port to bind the server to.
    pub port: u16,
    /// Minutes between scheduled dependency-index rebuilds.
    pub cache_expiration_minutes: u64,
    /// CORS origin allow-list.
    pub cors_origins: Vec<String>,
    /// Enable CORS for all origins (development mode).
    pub cors_all: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("formu.db"),
            host: [127, 0, 0, 1].into(),
            port: 8080,
            cache_expiration_minutes: 60,
            cors_origins: vec!["http://localhost:5173".to_string()],
            cors_all: false,
        }
    }
}
