/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_uploads")]
    pub uploads: UploadSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,

    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadSettings {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_per_window")]
    pub max_per_window: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_count_threshold_secs")]
    pub count_threshold_secs: u64,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// Environment variables use the `WAVECAST` prefix with `__` between
    /// section and key, e.g. `WAVECAST_AUTH__JWT_SECRET` overrides
    /// `auth.jwt_secret`. A config file given on the command line is
    /// required to exist; the implicit `config.toml` is optional.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match config_path {
            Some(path) => {
                settings = settings.add_source(config::File::with_name(path));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("WAVECAST")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set WAVECAST_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.uploads.max_per_window == 0 {
            return Err(ServerError::Config(
                "uploads.max_per_window must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        media_dir: default_media_dir(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/wavecast.db".to_string()
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("./data/media")
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        access_ttl_minutes: default_access_ttl_minutes(),
        refresh_ttl_days: default_refresh_ttl_days(),
    }
}

fn default_access_ttl_minutes() -> i64 {
    30
}

fn default_refresh_ttl_days() -> i64 {
    7
}

fn default_uploads() -> UploadSettings {
    UploadSettings {
        window_secs: default_window_secs(),
        max_per_window: default_max_per_window(),
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_per_window() -> usize {
    5
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        count_threshold_secs: default_count_threshold_secs(),
    }
}

fn default_count_threshold_secs() -> u64 {
    25
}
