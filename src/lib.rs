//! folio: a small Markdown blog engine
//!
//! Posts are Markdown files with YAML front-matter. They are served as HTML
//! pages and as a JSON index sorted by creation date, or exported as a
//! static site.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use std::path::{Path, PathBuf};

pub use error::{Error, Result};

/// Name of the site configuration file inside the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A blog site rooted at a directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the post sources
    pub posts_dir: PathBuf,
    /// Static assets served under /static
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Open a site directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            static_dir,
            public_dir,
        }
    }

    /// Create a post loader for this site
    pub fn loader(&self) -> content::PostLoader {
        content::PostLoader::new(self)
    }

    /// Export the static site
    pub fn build(&self) -> anyhow::Result<()> {
        commands::build::run(self)
    }

    /// Delete the public directory
    pub fn clean(&self) -> anyhow::Result<()> {
        commands::clean::run(self)
    }
}
