// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "ETL_SETTINGS_PATH";
const DEFAULT_PATH: &str = "config/settings.toml";

/// Application settings. The store endpoint and database are injected by
/// the surrounding deployment; this core never hardcodes them.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store: StoreSettings,
    #[serde(default)]
    pub topics: TopicSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the document-store data API.
    pub endpoint: String,
    pub database: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopicSettings {
    pub n_topics: usize,
    /// Vocabulary cap: top terms by document frequency.
    pub max_features: usize,
    /// Below this combined corpus size the fit is skipped for the run.
    pub min_corpus_size: usize,
    /// Gibbs sampling iterations.
    pub iterations: usize,
    pub seed: u64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            n_topics: 5,
            max_features: 500,
            min_corpus_size: 10,
            iterations: 200,
            seed: 42,
            alpha: 0.1,
            beta: 0.01,
        }
    }
}

/// Load settings from an explicit TOML path.
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("parsing settings from {}", path.display()))?;
    Ok(settings)
}

/// Load settings using env var + fallback:
/// 1) $ETL_SETTINGS_PATH
/// 2) config/settings.toml
pub fn load_default() -> Result<Settings> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("ETL_SETTINGS_PATH points to non-existent path"));
    }
    load_from(Path::new(DEFAULT_PATH))
}
