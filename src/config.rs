//! # Configuration
//!
//! Configuration is resolved in the following order (later sources override
//! earlier ones):
//! 1. **Built-in defaults**
//! 2. **TOML file** - the path in `ECOM_CONFIG`, otherwise `./ecommerce.toml` if present
//! 3. **Environment** - `ECOM_BIND_ADDR`, `ECOM_DATABASE_URL`, `ECOM_UPLOAD_DIR`,
//!    `ECOM_IMAGE_BASE_URL`, `ECOM_LOG_JSON`, `ECOM_SESSION_TTL_SECS`,
//!    `ECOM_PASSWORD_HASH_COST`
//!
//! ```toml
//! bind_addr = "0.0.0.0:8000"
//! database_url = "sqlite://ecommerce.db"
//! upload_dir = "images"
//! image_base_url = "http://localhost:8000/images"
//! session_ttl_secs = 86400
//! password_hash_cost = 12
//!
//! [admin]
//! username = "admin"
//! email = "admin@example.com"
//! password = "change-me"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "ECOM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "ecommerce.toml";

/// bcrypt accepts costs 4 through 31
pub const MIN_PASSWORD_HASH_COST: u32 = 4;
pub const MAX_PASSWORD_HASH_COST: u32 = 31;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    /// Directory uploaded product images are written to and served from
    pub upload_dir: PathBuf,
    /// Prefix joined with stored image names in product responses
    pub image_base_url: String,
    pub default_page_size: u32,
    pub log_json: bool,
    /// Seconds a session token stays valid after sign-in
    pub session_ttl_secs: u64,
    /// bcrypt cost factor for stored passwords
    pub password_hash_cost: u32,
    /// Administrator account created at start-up when missing
    pub admin: Option<AdminAccount>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://ecommerce.db".to_string(),
            upload_dir: PathBuf::from("images"),
            image_base_url: "http://localhost:8000/images".to_string(),
            default_page_size: 50,
            log_json: false,
            session_ttl_secs: 24 * 60 * 60,
            password_hash_cost: bcrypt::DEFAULT_COST,
            admin: None,
        }
    }
}

impl AppConfig {
    /// Loads defaults, the optional TOML file and environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigParseError {
            message: e.to_string(),
        })
    }

    /// Applies `ECOM_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ECOM_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("ECOM_DATABASE_URL") {
            self.database_url = value;
        }
        if let Some(value) = lookup("ECOM_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("ECOM_IMAGE_BASE_URL") {
            self.image_base_url = value;
        }
        if let Some(value) = lookup("ECOM_LOG_JSON") {
            self.log_json = value.parse().map_err(|_| ConfigError::InvalidConfiguration {
                message: format!("ECOM_LOG_JSON must be true or false, got '{}'", value),
            })?;
        }
        if let Some(value) = lookup("ECOM_SESSION_TTL_SECS") {
            self.session_ttl_secs = value.parse().map_err(|_| ConfigError::InvalidConfiguration {
                message: format!("ECOM_SESSION_TTL_SECS must be a number of seconds, got '{}'", value),
            })?;
        }
        if let Some(value) = lookup("ECOM_PASSWORD_HASH_COST") {
            self.password_hash_cost = value.parse().map_err(|_| ConfigError::InvalidConfiguration {
                message: format!("ECOM_PASSWORD_HASH_COST must be a number, got '{}'", value),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "database_url must not be empty".to_string(),
            });
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "default_page_size must be greater than zero".to_string(),
            });
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "session_ttl_secs must be greater than zero".to_string(),
            });
        }
        if !(MIN_PASSWORD_HASH_COST..=MAX_PASSWORD_HASH_COST).contains(&self.password_hash_cost) {
            return Err(ConfigError::InvalidConfiguration {
                message: format!(
                    "password_hash_cost must be between {} and {}",
                    MIN_PASSWORD_HASH_COST, MAX_PASSWORD_HASH_COST
                ),
            });
        }
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("bind_addr '{}' is not a socket address", self.bind_addr),
            });
        }
        Ok(())
    }
}
