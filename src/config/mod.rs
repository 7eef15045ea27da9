use std::env;
use std::path::PathBuf;

use crate::services::uploads::{PERMANENT_AREA, TEMP_AREA};

/// Runtime configuration for the catalog backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the statically served file tree (default: "./public")
    pub public_dir: PathBuf,

    /// Maximum accepted upload size in bytes (default: 10 MB)
    pub max_upload_size: usize,

    /// Secret used to sign and verify JWTs
    pub jwt_secret: String,

    /// Port for the HTTP listener (default: 3000)
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("./public"),
            max_upload_size: 10 * 1024 * 1024, // 10 MB
            jwt_secret: "secret".to_string(),
            port: 3000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.public_dir),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
        }
    }

    /// Directory holding files staged for promotion
    pub fn temp_upload_dir(&self) -> PathBuf {
        self.public_dir.join(TEMP_AREA)
    }

    /// Directory holding files owned by committed products
    pub fn permanent_upload_dir(&self) -> PathBuf {
        self.public_dir.join(PERMANENT_AREA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_dir, PathBuf::from("./public"));
    }

    #[test]
    fn test_upload_dirs_are_siblings() {
        let config = AppConfig::default();
        assert_eq!(
            config.temp_upload_dir().parent(),
            config.permanent_upload_dir().parent()
        );
        assert!(config.temp_upload_dir().ends_with("temp-uploads"));
        assert!(config.permanent_upload_dir().ends_with("uploads"));
    }
}
