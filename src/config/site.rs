//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Writing
    pub date_format: String,
    pub words_per_minute: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "folio".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "Anonymous".to_string(),
            language: "en".to_string(),

            url: "http://localhost".to_string(),
            root: "/".to_string(),

            posts_dir: "posts".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            date_format: "YYYY-MM-DD".to_string(),
            words_per_minute: 200,
            highlight: HighlightConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Site root with exactly one leading and one trailing slash
    pub fn root_path(&self) -> String {
        let trimmed = self.root.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}

/// Code block highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}
