//! Dashboard configuration
//!
//! Values come from `config.json` in the platform config directory when it
//! exists, otherwise from the defaults below. `OEI_API_BASE_URL` overrides the
//! backend address either way.

use anyhow::Context;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_BASE_URL_ENV: &str = "OEI_API_BASE_URL";

#[derive(Resource, Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub satellite_limit: usize,
    pub pass_window_hours: u32,
    pub min_elevation_deg: f64,
    /// Screen-space margin kept around fitted geometry
    pub fit_padding_px: f32,
    pub layout_retry_ms: u64,
    /// Equirectangular world image under `assets/`; `null` draws no basemap
    pub basemap_path: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            satellite_limit: 1000,
            pass_window_hours: 24,
            min_elevation_deg: 10.0,
            fit_padding_px: 20.0,
            layout_retry_ms: 150,
            basemap_path: Some("world_shaded_32k.png".to_string()),
        }
    }
}

impl DashboardConfig {
    /// Load from the platform config directory, falling back to defaults.
    ///
    /// - macOS: ~/Library/Application Support/orbital-dashboard/config.json
    /// - Linux: ~/.config/orbital-dashboard/config.json
    /// - Windows: %APPDATA%\orbital-dashboard\config\config.json
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => match Self::from_file(&path) {
                Ok(config) => {
                    info!("[CONFIG] loaded {}", path.display());
                    config
                }
                Err(err) => {
                    warn!("[CONFIG] {:#}; using defaults", err);
                    Self::default()
                }
            },
            _ => Self::default(),
        };
        config.apply_base_url_override(std::env::var(API_BASE_URL_ENV).ok());
        info!("[CONFIG] backend at {}", config.api_base_url);
        config
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "orbital-dashboard")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self, anyhow::Error> {
        let mut config: Self = serde_json::from_str(contents)?;
        config.api_base_url = normalize_base_url(&config.api_base_url);
        Ok(config)
    }

    pub fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.api_base_url = normalize_base_url(&url);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn layout_retry(&self) -> Duration {
        Duration::from_millis(self.layout_retry_ms)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
