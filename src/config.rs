// src/config.rs
//! Feed registry + taxonomy configuration, loaded from TOML.
//!
//! The registry is an ordered list of named endpoints; the taxonomy is an
//! ordered list of category rules (label + keyword stems), an optional
//! relevance term set, and a fallback label. Both are plain data passed into
//! the pipeline entry point, so tests can run alternative registries side by
//! side.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/feeds.toml";
pub const ENV_CONFIG_PATH: &str = "RADAR_CONFIG_PATH";

static EMBEDDED_TOML: &str = include_str!("../config/feeds.toml");

static EMBEDDED: Lazy<RadarConfig> =
    Lazy::new(|| RadarConfig::from_toml_str(EMBEDDED_TOML).expect("valid embedded feeds config"));

/// One registry entry. Names are display strings and need not be unique;
/// endpoints are unique per run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

/// One classification rule: the label applies when any term occurs in the
/// item text.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Taxonomy {
    /// Label assigned when no category rule matches.
    pub default_label: String,
    /// Domain pre-filter terms. Empty set disables the relevance stage.
    #[serde(default)]
    pub relevance_terms: Vec<String>,
    /// Rules are applied in declaration order.
    #[serde(default)]
    pub categories: Vec<CategoryRule>,
}

impl Taxonomy {
    /// Terms are matched against lowercased text; hold them lowercase too.
    pub fn normalize_terms(&mut self) {
        for t in &mut self.relevance_terms {
            *t = t.trim().to_lowercase();
        }
        for rule in &mut self.categories {
            for t in &mut rule.terms {
                *t = t.trim().to_lowercase();
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadarConfig {
    pub sources: Vec<FeedSource>,
    pub taxonomy: Taxonomy,
}

impl RadarConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: RadarConfig = toml::from_str(s).context("parsing feeds config")?;
        if cfg.sources.is_empty() {
            return Err(anyhow!("feeds config lists no sources"));
        }
        if cfg.taxonomy.default_label.trim().is_empty() {
            return Err(anyhow!("feeds config has an empty default label"));
        }
        cfg.taxonomy.normalize_terms();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feeds config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolution order:
    /// 1) $RADAR_CONFIG_PATH
    /// 2) config/feeds.toml relative to the working directory
    /// 3) the copy embedded at compile time
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("RADAR_CONFIG_PATH points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::embedded())
    }

    /// The compiled-in default registry and taxonomy.
    pub fn embedded() -> Self {
        EMBEDDED.clone()
    }
}
