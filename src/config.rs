//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `REGISTRAR_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `REGISTRAR_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database_url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `REGISTRAR_AUTH__SESSION__TIMEOUT=12h` sets the `auth.session.timeout` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Database**: `database_url` - PostgreSQL connection string
//! - **Admin User**: `admin_username`, `admin_password` - Initial admin created on first startup
//! - **Security**: `secret_key`, `cors` - Session signing key and CORS settings
//! - **Authentication**: `auth.session`, `auth.password` - Cookie and password policy

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "REGISTRAR_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection string; DATABASE_URL overrides this if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Username for the initial admin user (created on first startup)
    pub admin_username: String,
    /// Password for the initial admin user
    pub admin_password: String,
    /// Secret key for session token signing (required for production)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Password validation rules
    pub password: PasswordConfig,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session timeout duration
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for session token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

/// Password validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests; "*" allows all
    pub allowed_origins: Vec<String>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            admin_username: "admin".to_string(),
            admin_password: "adminpass".to_string(),
            secret_key: None,
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(24 * 60 * 60), // 24 hours
            cookie_name: "registrar_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "strict".to_string(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            allow_credentials: true,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // DATABASE_URL wins over anything in the file
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                config.database_url = Some(url);
            }
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Build the figment for this config (file + env overrides)
    fn figment(args: &Args) -> Figment {
        Figment::from(figment::providers::Serialized::defaults(Config::default()))
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("REGISTRAR_").split("__"))
    }

    /// Validate configuration consistency before starting the server
    pub fn validate(&self) -> Result<(), String> {
        match self.secret_key.as_deref() {
            None | Some("") => {
                return Err(
                    "secret_key must be set (use REGISTRAR_SECRET_KEY or the config file)".to_string(),
                );
            }
            Some(key) if key.len() < 32 => {
                return Err("secret_key must be at least 32 characters".to_string());
            }
            Some(_) => {}
        }

        if self.auth.password.min_length > self.auth.password.max_length {
            return Err("auth.password.min_length cannot exceed max_length".to_string());
        }

        match self.auth.session.cookie_same_site.as_str() {
            "strict" | "lax" | "none" => {}
            other => {
                return Err(format!(
                    "auth.session.cookie_same_site must be 'strict', 'lax', or 'none', got '{other}'"
                ));
            }
        }

        if self.admin_username.is_empty() {
            return Err("admin_username cannot be empty".to_string());
        }

        Ok(())
    }

    /// Session token expiry as chrono duration for claim timestamps
    pub fn session_timeout(&self) -> Duration {
        self.auth.session.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            secret_key: Some("0123456789abcdef0123456789abcdef".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn default_config_fails_validation_without_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn short_secret_key_is_rejected() {
        let config = Config {
            secret_key: Some("too-short".to_string()),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("32 characters"));
    }

    #[test]
    fn bad_same_site_is_rejected() {
        let mut config = valid_config();
        config.auth.session.cookie_same_site = "sideways".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_are_applied() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("REGISTRAR_PORT", "9999");
            jail.set_env("REGISTRAR_ADMIN_USERNAME", "root");
            let args = Args {
                config: "missing.yaml".to_string(),
                validate: false,
            };
            let config: Config = Config::figment(&args).extract()?;
            assert_eq!(config.port, 9999);
            assert_eq!(config.admin_username, "root");
            Ok(())
        });
    }
}
