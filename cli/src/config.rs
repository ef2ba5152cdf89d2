use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use pantry_core::recognition::{DEFAULT_API_URL, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL};

pub struct Config {
    pub db_path: PathBuf,
    pub api_key: Option<String>,
    pub api_url: String,
    pub vision_model: String,
    pub text_model: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let db_path = match env_value("PANTRY_DB") {
            Some(path) => PathBuf::from(path),
            None => {
                let proj_dirs = ProjectDirs::from("", "", "pantry")
                    .context("Could not determine home directory")?;
                let data_dir = proj_dirs.data_dir().to_path_buf();
                std::fs::create_dir_all(&data_dir).with_context(|| {
                    format!("Failed to create data directory: {}", data_dir.display())
                })?;
                data_dir.join("pantry.db")
            }
        };

        Ok(Config {
            db_path,
            api_key: env_value("SILICONFLOW_API_KEY"),
            api_url: env_value("PANTRY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            vision_model: env_value("PANTRY_VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            text_model: env_value("PANTRY_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
        })
    }

    /// Only the commands that call the recognition API need a key.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("SILICONFLOW_API_KEY is not set. Export it to use scan or voice")
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
