use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};

/// Configuration for the stores API server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub host: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Secret used to sign tokens; a random one is generated when absent
    pub jwt_secret: Option<String>,
    /// Lifetime of access tokens in minutes
    pub access_token_minutes: u64,
    /// Lifetime of refresh tokens in days
    pub refresh_token_days: u64,
    /// Directory for rolling log files
    pub log_dir: Option<PathBuf>,
    /// Emit logs as JSON on stdout
    pub log_json: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub access_token_minutes: Option<u64>,
    #[serde(default)]
    pub refresh_token_days: Option<u64>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_json: Option<bool>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "stores-api", about = "REST API for stores, items and tags")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to bind to
    #[clap(long, env = "STORES_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[clap(long, env = "STORES_PORT")]
    pub port: Option<u16>,

    /// Secret used to sign tokens
    #[clap(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in minutes
    #[clap(long, env = "ACCESS_TOKEN_MINUTES")]
    pub access_token_minutes: Option<u64>,

    /// Refresh token lifetime in days
    #[clap(long, env = "REFRESH_TOKEN_DAYS")]
    pub refresh_token_days: Option<u64>,

    /// Directory for rolling log files
    #[clap(long, env = "STORES_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[clap(long, env = "STORES_LOG_JSON")]
    pub log_json: Option<bool>,

    /// Debug mode
    #[clap(long, env = "STORES_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            host: update.host.unwrap_or(self.host),
            port: update.port.unwrap_or(self.port),
            jwt_secret: update.jwt_secret.or(self.jwt_secret),
            access_token_minutes: update.access_token_minutes.unwrap_or(self.access_token_minutes),
            refresh_token_days: update.refresh_token_days.unwrap_or(self.refresh_token_days),
            log_dir: update.log_dir.or(self.log_dir),
            log_json: update.log_json.unwrap_or(self.log_json),
        }
    }

    /// Returns the access token lifetime as a Duration, saturating on overflow
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_minutes.saturating_mul(60))
    }

    /// Returns the refresh token lifetime as a Duration, saturating on overflow
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_days.saturating_mul(24 * 60 * 60))
    }

    /// Parses `host:port` into a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("data.db".to_string(), |path| path.join("data.db").to_string_lossy().to_string());

    Config {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 5000,
        jwt_secret: None,
        access_token_minutes: 15,
        refresh_token_days: 30,
        log_dir: None,
        log_json: false,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: &CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url.clone(),
        host: args.host.clone(),
        port: args.port,
        jwt_secret: args.jwt_secret.clone(),
        access_token_minutes: args.access_token_minutes,
        refresh_token_days: args.refresh_token_days,
        log_dir: args.log_dir.clone(),
        log_json: args.log_json,
    }
}

/// Returns the platform config directory, if it can be determined
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "stores-api", "stores-api") {
        Some(proj_dirs) => Some(proj_dirs.config_dir().to_path_buf()),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: &CliArgs) -> Config {
    let config_dir = get_config_dir_path().and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_dir.clone());
    let file_update = config_from_file(config_dir.map(|dir| dir.join("config.toml"))).unwrap_or_default();

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    info!("Final configuration: database_url={}, listen={}:{}, access_token={}min, refresh_token={}d",
          config.database_url, config.host, config.port, config.access_token_minutes, config.refresh_token_days);

    config
}

#[cfg(test)]
mod tests;
