//! Generator module - exports the blog as static HTML and JSON files

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::PostLoader;
use crate::templates::{TemplateRenderer, STYLESHEET};
use crate::Blog;

/// What a static export produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildSummary {
    pub posts: usize,
    pub assets: usize,
}

/// Static site generator using the built-in templates
pub struct Generator {
    blog: Blog,
    loader: PostLoader,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            loader: blog.loader(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<BuildSummary> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        let index = self.loader.load_index()?;

        // Index page
        let html = self.renderer.render_index(&self.blog.config, &index)?;
        write_file(&public_dir.join("index.html"), &html)?;

        // JSON index payload
        let json = serde_json::to_string_pretty(&index)?;
        write_file(&public_dir.join("api").join("posts.json"), &json)?;

        // Post pages
        for meta in &index {
            let post = self.loader.load_post(&meta.slug)?;
            let html = self.renderer.render_post(
                &self.blog.config,
                &post,
                post.prev(&index),
                post.next(&index),
            )?;
            let output_path = public_dir.join(meta.path()).join("index.html");
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        let assets = self.copy_static_assets()?;

        Ok(BuildSummary {
            posts: index.len(),
            assets,
        })
    }

    /// Copy the static directory to public/static, adding the default stylesheet
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        let dest_dir = self.blog.public_dir.join("static");
        let mut copied = 0;

        if static_dir.is_dir() {
            for entry in WalkDir::new(static_dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }

                let relative = path.strip_prefix(static_dir)?;
                let dest = dest_dir.join(relative);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
                copied += 1;
            }
        }

        let stylesheet = dest_dir.join("style.css");
        if !stylesheet.exists() {
            write_file(&stylesheet, STYLESHEET)?;
        }

        Ok(copied)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostMeta;
    use crate::error::Error;

    fn write_post(blog: &Blog, slug: &str, created: &str) {
        fs::create_dir_all(&blog.posts_dir).unwrap();
        fs::write(
            blog.posts_dir.join(format!("{}.md", slug)),
            format!(
                "---\ntitle: Post {slug}\ncreatedDate: {created}\nlastUpdatedDate: {created}\nauthor: Jane\nestimatedReadingTimeInMins: 1\n---\n\nBody of {slug}.\n"
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_generate_site() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        write_post(&blog, "alpha", "2024-01-01");
        write_post(&blog, "beta", "2024-03-01");
        fs::create_dir_all(blog.static_dir.join("img")).unwrap();
        fs::write(blog.static_dir.join("img/logo.svg"), "<svg/>").unwrap();

        let summary = Generator::new(&blog).unwrap().generate().unwrap();
        assert_eq!(summary, BuildSummary { posts: 2, assets: 1 });

        let public = &blog.public_dir;
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.find("Post beta").unwrap() < index.find("Post alpha").unwrap());

        let alpha = fs::read_to_string(public.join("posts/alpha/index.html")).unwrap();
        assert!(alpha.contains("<p>Body of alpha.</p>"));
        assert!(alpha.contains("/posts/beta/"));

        let json = fs::read_to_string(public.join("api/posts.json")).unwrap();
        let payload: Vec<PostMeta> = serde_json::from_str(&json).unwrap();
        let slugs: Vec<_> = payload.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["beta", "alpha"]);
        assert!(!json.contains("content"));

        assert!(public.join("static/img/logo.svg").is_file());
        assert!(public.join("static/style.css").is_file());
    }

    #[test]
    fn test_generate_keeps_custom_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(&blog.static_dir).unwrap();
        fs::write(blog.static_dir.join("style.css"), "body { color: red; }").unwrap();

        let summary = Generator::new(&blog).unwrap().generate().unwrap();
        assert_eq!(summary.posts, 0);
        let css = fs::read_to_string(blog.public_dir.join("static/style.css")).unwrap();
        assert_eq!(css, "body { color: red; }");
    }

    #[test]
    fn test_generate_fails_on_malformed_post() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        write_post(&blog, "broken", "yesterday");

        let err = Generator::new(&blog).unwrap().generate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MalformedMetadata { .. })
        ));
    }
}
