//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary; post content is the only value
//! rendered without escaping.

use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Post, PostDate, PostMeta};
use crate::error::Result;
use crate::helpers::{date_xml, format_date};

/// Default stylesheet referenced by the layout
pub const STYLESHEET: &str = include_str!("theme/style.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("error.html", include_str!("theme/error.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("date_xml", date_xml_filter);

        Ok(Self { tera })
    }

    /// Render the index page listing every post
    pub fn render_index(&self, config: &SiteConfig, posts: &[PostMeta]) -> Result<String> {
        let mut context = base_context(config);
        context.insert("posts", posts);
        Ok(self.tera.render("index.html", &context)?)
    }

    /// Render a single post page with links to its neighbours
    pub fn render_post(
        &self,
        config: &SiteConfig,
        post: &Post,
        prev: Option<&PostMeta>,
        next: Option<&PostMeta>,
    ) -> Result<String> {
        let mut context = base_context(config);
        context.insert("post", post);
        context.insert("prev_post", &prev);
        context.insert("next_post", &next);
        Ok(self.tera.render("post.html", &context)?)
    }

    /// Render an error page
    pub fn render_error(&self, config: &SiteConfig, heading: &str, message: &str) -> Result<String> {
        let mut context = base_context(config);
        context.insert("heading", heading);
        context.insert("message", message);
        Ok(self.tera.render("error.html", &context)?)
    }
}

/// Site values shared by every page
#[derive(Debug, Clone, Serialize)]
struct ConfigData {
    title: String,
    subtitle: String,
    description: String,
    author: String,
    language: String,
    root: String,
    date_format: String,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: config.root_path(),
            date_format: config.date_format.clone(),
        }
    }
}

fn base_context(config: &SiteConfig) -> Context {
    let mut context = Context::new();
    context.insert("config", &ConfigData::from(config));
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert("current_year", &chrono::Utc::now().year());
    context
}

fn parse_date_value(name: &str, value: &tera::Value) -> tera::Result<PostDate> {
    let s = tera::try_get_value!(name, "value", String, value);
    PostDate::parse(&s).ok_or_else(|| tera::Error::msg(format!("{}: invalid date {:?}", name, s)))
}

/// Tera filter: format a date with a Moment.js-style pattern
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let date = parse_date_value("date_format", value)?;
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };
    Ok(tera::Value::String(format_date(&date.local(), &format)))
}

/// Tera filter: machine-readable date for `<time datetime>`
fn date_xml_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let date = parse_date_value("date_xml", value)?;
    Ok(tera::Value::String(date_xml(&date.local())))
}
