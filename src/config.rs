use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// History database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub current_path: PathBuf,
    pub history_path: Option<PathBuf>,
    pub latitude: f64,
    pub longitude: f64,
    pub http_port: u16,
    pub refresh_interval_secs: u64,
    pub log_level: String,
    pub database: DatabaseConfig,
}

/// Command line flags; every flag can also come from the environment
#[derive(Debug, Parser)]
#[command(name = "gastrak-server", about = "Serve fuel price observations over HTTP")]
pub struct Cli {
    /// Path to the current data CSV file
    #[arg(long, env = "GASTRAK_CURRENT")]
    pub current: Option<PathBuf>,

    /// Path to the history CSV file or SQLite database
    #[arg(long, env = "GASTRAK_HISTORY")]
    pub history: Option<PathBuf>,

    /// Map centre latitude
    #[arg(long, env = "GASTRAK_LATITUDE", default_value_t = 0.0)]
    pub latitude: f64,

    /// Map centre longitude
    #[arg(long, env = "GASTRAK_LONGITUDE", default_value_t = 0.0)]
    pub longitude: f64,

    #[arg(long, env = "HTTP_PORT", default_value_t = 8000)]
    pub port: u16,

    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 60)]
    pub refresh_interval_secs: u64,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 4)]
    pub database_max_connections: u32,

    #[arg(long, env = "DATABASE_ACQUIRE_TIMEOUT_SECS", default_value_t = 30)]
    pub database_acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 4,
            acquire_timeout_secs: 30,
        }
    }
}

impl Cli {
    /// Validate flags and build the application config
    pub fn into_config(self) -> Result<AppConfig, String> {
        let current_path = self
            .current
            .ok_or("usage: gastrak-server --current=... --latitude=... --longitude=...")?;

        let config = AppConfig {
            current_path,
            history_path: self.history,
            latitude: self.latitude,
            longitude: self.longitude,
            http_port: self.port,
            refresh_interval_secs: self.refresh_interval_secs,
            log_level: self.log_level.to_lowercase(),
            database: DatabaseConfig {
                max_connections: self.database_max_connections,
                acquire_timeout_secs: self.database_acquire_timeout_secs,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

impl AppConfig {
    /// Parse flags and environment (after loading `.env`)
    pub fn from_env() -> Result<Self, String> {
        Cli::parse().into_config()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.current_path.as_os_str().is_empty() {
            return Err("--current must not be empty".to_string());
        }

        if self.latitude == 0.0 || self.longitude == 0.0 {
            return Err("--latitude and --longitude are required".to_string());
        }

        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!(
                "Invalid map centre: {}, {}",
                self.latitude, self.longitude
            ));
        }

        if self.refresh_interval_secs == 0 {
            return Err("REFRESH_INTERVAL_SECS must be greater than 0".to_string());
        }

        if self.database.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        Ok(())
    }

    /// Get refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            current_path: PathBuf::from("data/current.csv"),
            history_path: None,
            latitude: 47.6062,
            longitude: -122.3321,
            http_port: 8000,
            refresh_interval_secs: 60,
            log_level: "info".to_string(),
            database: DatabaseConfig::default(),
        }
    }
}
