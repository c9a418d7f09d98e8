//! Post loader - resolves slugs and loads posts from the posts directory

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Post, PostMeta};
use crate::config::HighlightConfig;
use crate::error::{Error, Result};
use crate::Blog;

/// Extensions recognised as post sources, in lookup order
const POST_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Loads posts from the posts directory
pub struct PostLoader {
    posts_dir: PathBuf,
    highlight: HighlightConfig,
    renderer: OnceLock<MarkdownRenderer>,
}

impl PostLoader {
    /// Create a new post loader
    pub fn new(blog: &Blog) -> Self {
        Self {
            posts_dir: blog.posts_dir.clone(),
            highlight: blog.config.highlight.clone(),
            renderer: OnceLock::new(),
        }
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    fn renderer(&self) -> &MarkdownRenderer {
        self.renderer
            .get_or_init(|| MarkdownRenderer::with_options(&self.highlight))
    }

    /// Discover every post source, keyed by slug
    pub fn discover(&self) -> Result<BTreeMap<String, PathBuf>> {
        let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();
        if !self.posts_dir.is_dir() {
            tracing::debug!("Posts directory {:?} does not exist", self.posts_dir);
            return Ok(sources);
        }

        for entry in WalkDir::new(&self.posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let Some(slug) = slug_of(path) else {
                tracing::warn!("Skipping {:?}: file name is not a URL-safe slug", path);
                continue;
            };

            if let Some(first) = sources.get(&slug) {
                return Err(Error::DuplicateSlug {
                    slug,
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
            sources.insert(slug, path.to_path_buf());
        }

        Ok(sources)
    }

    /// Resolve a slug to its source file
    pub fn resolve(&self, slug: &str) -> Result<PathBuf> {
        if !is_valid_slug(slug) {
            return Err(Error::NotFound(slug.to_string()));
        }

        let mut found: Option<PathBuf> = None;
        for ext in POST_EXTENSIONS {
            let candidate = self.posts_dir.join(format!("{}.{}", slug, ext));
            if !candidate.is_file() {
                continue;
            }
            if let Some(first) = found {
                return Err(Error::DuplicateSlug {
                    slug: slug.to_string(),
                    first,
                    second: candidate,
                });
            }
            found = Some(candidate);
        }

        found.ok_or_else(|| Error::NotFound(slug.to_string()))
    }

    /// Load a single post with its rendered content
    pub fn load_post(&self, slug: &str) -> Result<Post> {
        let path = self.resolve(slug)?;
        let source = fs::read_to_string(&path)?;
        let (fm, body) =
            FrontMatter::parse(&source).map_err(|e| Error::malformed(&path, e.to_string()))?;

        let content = self.renderer().render(body);
        tracing::debug!("Loaded post {} from {:?}", slug, path);

        Ok(Post {
            meta: PostMeta::from_front_matter(slug.to_string(), path, fm),
            content,
        })
    }

    /// Load a post's metadata without rendering its body
    pub fn load_meta(&self, slug: &str, path: &Path) -> Result<PostMeta> {
        let source = fs::read_to_string(path)?;
        let (fm, _) =
            FrontMatter::parse(&source).map_err(|e| Error::malformed(path, e.to_string()))?;
        Ok(PostMeta::from_front_matter(
            slug.to_string(),
            path.to_path_buf(),
            fm,
        ))
    }

    /// Load metadata for every post, newest first
    pub fn load_index(&self) -> Result<Vec<PostMeta>> {
        let mut posts = self
            .discover()?
            .iter()
            .map(|(slug, path)| self.load_meta(slug, path))
            .collect::<Result<Vec<_>>>()?;

        sort_newest_first(&mut posts);
        tracing::debug!("Indexed {} posts", posts.len());

        Ok(posts)
    }
}

/// Sort by creation date descending, then by slug so equal dates stay deterministic
pub fn sort_newest_first(posts: &mut [PostMeta]) {
    posts.sort_by(|a, b| {
        b.created_date
            .instant()
            .cmp(&a.created_date.instant())
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| POST_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Slug of a post source: its file stem, when URL-safe
fn slug_of(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    is_valid_slug(stem).then(|| stem.to_string())
}

/// A URL-safe slug that cannot escape the posts directory
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains("..")
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
