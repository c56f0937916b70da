use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::collector::FailurePolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "ko-KR";

/// Run settings. Every field may be omitted from the TOML file.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
    pub pages: u32,
    pub year: i32,
    pub month: u32,
    pub top: usize,
    pub bins: usize,
    pub concurrency: usize,
    pub request_timeout_secs: Option<u64>,
    pub on_page_failure: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            pages: 5,
            year: 2024,
            month: 12,
            top: 10,
            bins: 20,
            concurrency: 1,
            request_timeout_secs: None,
            on_page_failure: FailurePolicy::Continue,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `NOWPLAYING_*` env overrides.
    /// Without an explicit path the platform config dir is tried; a missing file there is fine.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config: {}", path.display()))
    }

    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("NOWPLAYING_API_KEY").filter(|s| !s.trim().is_empty()) { self.api_key = v; }
        if let Some(v) = get("NOWPLAYING_BASE_URL").filter(|s| !s.trim().is_empty()) { self.base_url = v; }
        if let Some(v) = get("NOWPLAYING_PAGES").and_then(|s| s.parse().ok()) { self.pages = v; }
        if let Some(v) = get("NOWPLAYING_CONCURRENCY").and_then(|s| s.parse().ok()) { self.concurrency = v; }
    }

    /// The shipped default key is empty; network commands need a real one.
    pub fn require_api_key(&self) -> crate::error::Result<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(crate::error::Error::Config(
                "missing TMDB API key (set api_key, NOWPLAYING_API_KEY or --api-key)".to_string(),
            ));
        }
        Ok(key)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "nowplaying", "nowplaying").map(|d| d.config_dir().join("config.toml"))
}
