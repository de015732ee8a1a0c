/// Configuration management for Story Service
///
/// All settings come from environment variables (a `.env` file is loaded first by
/// the binary). Unset values fall back to development defaults; production refuses
/// to start with permissive CORS or a weak JWT secret.
use crate::jobs::story_reaper::DEFAULT_INTERVAL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimum HS256 secret length accepted outside development.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token validation
    pub auth: AuthConfig,
    /// Image upload storage
    pub uploads: UploadConfig,
    /// Expired-story reaper
    pub reaper: ReaperConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Number of HTTP workers
    pub workers: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Which story store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown STORAGE_BACKEND '{other}'")),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Run embedded migrations at startup
    pub run_migrations: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded story images are written to
    pub dir: PathBuf,
    /// Per-image size limit
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("STORY_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("STORY_SERVICE_PORT", 5000)?,
                workers: parse_env_or("STORY_SERVICE_WORKERS", 4)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:4200".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                backend: std::env::var("STORAGE_BACKEND")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()?
                    .unwrap_or(StorageBackend::Postgres),
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/stories".to_string()),
                max_connections: parse_env_or("DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_env_or("DATABASE_RUN_MIGRATIONS", true)?,
            },
            auth: {
                let jwt_secret = match std::env::var("JWT_SECRET") {
                    Ok(secret) => secret,
                    Err(_) if production => {
                        return Err("JWT_SECRET must be set in production".to_string())
                    }
                    Err(_) => "development-only-secret-change-me-please".to_string(),
                };
                if production && jwt_secret.len() < MIN_JWT_SECRET_LEN {
                    return Err(format!(
                        "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes in production"
                    ));
                }
                AuthConfig { jwt_secret }
            },
            uploads: UploadConfig {
                dir: std::env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("uploads")),
                max_bytes: parse_env_or("UPLOAD_MAX_BYTES", 5 * 1024 * 1024)?,
            },
            reaper: {
                let interval_secs = parse_env_or(
                    "STORY_REAPER_INTERVAL_SECS",
                    DEFAULT_INTERVAL.as_secs(),
                )?;
                if interval_secs == 0 {
                    return Err("STORY_REAPER_INTERVAL_SECS must be greater than 0".to_string());
                }
                ReaperConfig {
                    enabled: parse_env_or("STORY_REAPER_ENABLED", false)?,
                    interval_secs,
                }
            },
        })
    }
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "APP_ENV",
        "CORS_ALLOWED_ORIGINS",
        "JWT_SECRET",
        "STORAGE_BACKEND",
        "STORY_SERVICE_PORT",
        "STORY_REAPER_ENABLED",
        "STORY_REAPER_INTERVAL_SECS",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_development_defaults() {
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.app.port, 5000);
        assert_eq!(cfg.database.backend, StorageBackend::Postgres);
        assert_eq!(cfg.uploads.max_bytes, 5 * 1024 * 1024);
        assert!(!cfg.reaper.enabled);
        assert_eq!(cfg.reaper.interval_secs, 300);
    }

    #[test]
    #[serial]
    fn test_production_requires_strong_secret() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://stories.example.com");
        std::env::set_var("JWT_SECRET", "short");
        assert!(Config::from_env().is_err());

        std::env::set_var("JWT_SECRET", "a".repeat(MIN_JWT_SECRET_LEN));
        assert!(Config::from_env().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_production_rejects_wildcard_cors() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        std::env::set_var("JWT_SECRET", "a".repeat(MIN_JWT_SECRET_LEN));
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_storage_backend_parsing() {
        clear_env();
        std::env::set_var("STORAGE_BACKEND", "memory");
        assert_eq!(
            Config::from_env().unwrap().database.backend,
            StorageBackend::Memory
        );
        std::env::set_var("STORAGE_BACKEND", "cassandra");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_reaper_interval_must_be_positive() {
        clear_env();
        std::env::set_var("STORY_REAPER_ENABLED", "true");
        std::env::set_var("STORY_REAPER_INTERVAL_SECS", "0");
        assert!(Config::from_env().is_err());

        std::env::set_var("STORY_REAPER_INTERVAL_SECS", "60");
        assert_eq!(Config::from_env().unwrap().reaper.interval_secs, 60);
        clear_env();
    }
}
