use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "pagecapture.json";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CaptureProfileConfig {
    #[serde(rename = "localOnly")]
    pub local_only: Option<bool>,
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
    #[serde(rename = "allowedHosts")]
    pub allowed_hosts: Vec<String>,
    #[serde(rename = "rewriteOrigins")]
    pub rewrite_origins: Vec<String>,
    #[serde(rename = "stubMarkers")]
    pub stub_markers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CaptureConfig {
    pub profiles: HashMap<String, CaptureProfileConfig>,
    #[serde(rename = "defaultProfile")]
    pub default_profile: Option<String>,
    #[serde(rename = "allowedHosts")]
    pub allowed_hosts: Vec<String>,
    #[serde(rename = "rewriteOrigins")]
    pub rewrite_origins: Vec<String>,
    #[serde(rename = "stubMarkers")]
    pub stub_markers: Vec<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
    #[serde(rename = "fetchTimeoutSecs")]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(rename = "navigationTimeoutSecs")]
    pub navigation_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CaptureConfig,
    pub path: PathBuf,
}

pub fn load_config(target: &Path) -> Result<Option<LoadedConfig>> {
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()?.join(target)
    };

    let file_path = if resolved.is_dir() {
        resolved.join(CONFIG_FILE_NAME)
    } else {
        resolved
    };

    if !file_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&file_path)
        .with_context(|| format!("reading config {}", file_path.display()))?;

    let config: CaptureConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", file_path.display()))?;

    tracing::debug!(path = %file_path.display(), "loaded capture config");

    Ok(Some(LoadedConfig {
        config,
        path: file_path,
    }))
}
