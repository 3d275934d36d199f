use anyhow::{Context, Result};
use blogmark::Options;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "blogmark.json";

/// Top-level blogmark.json schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogConfig {
    #[serde(default = "default_posts_dir")]
    pub posts_dir: String,

    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default)]
    pub render: Options,

    /// Directory relative paths are resolved against: the one holding the
    /// config file.
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
            out_dir: default_out_dir(),
            render: Options::default(),
            root: PathBuf::from("."),
        }
    }
}

fn default_posts_dir() -> String {
    "posts".to_string()
}

fn default_out_dir() -> String {
    "dist/posts".to_string()
}

impl BlogConfig {
    pub fn posts_path(&self) -> PathBuf {
        self.root.join(&self.posts_dir)
    }

    pub fn out_path(&self) -> PathBuf {
        self.root.join(&self.out_dir)
    }
}

/// Load config from a blogmark.json file, or return defaults if missing.
pub fn load_config(config_path: &Path) -> Result<BlogConfig> {
    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if config_path.exists() {
        let raw = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let mut config: BlogConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        config.root = root;
        Ok(config)
    } else {
        log::info!("{} not found, using defaults", config_path.display());
        Ok(BlogConfig {
            root,
            ..BlogConfig::default()
        })
    }
}
