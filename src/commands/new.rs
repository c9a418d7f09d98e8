//! Create a new post

use anyhow::{bail, Result};
use indexmap::IndexSet;
use std::fs;
use std::path::PathBuf;

use crate::content::loader::is_valid_slug;
use crate::content::{FrontMatter, PostDate};
use crate::Blog;

/// Options for a new post
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    /// Defaults to the slugified title
    pub slug: Option<String>,
    /// Defaults to the site author
    pub author: Option<String>,
    pub categories: Vec<String>,
}

/// Scaffold a post file dated today and return its path
pub fn create_post(blog: &Blog, options: &NewPost) -> Result<PathBuf> {
    let title = options.title.trim();
    if title.is_empty() {
        bail!("A post needs a title");
    }

    let slug = match &options.slug {
        Some(slug) => slug.clone(),
        None => slug::slugify(title),
    };
    if !is_valid_slug(&slug) {
        bail!("{:?} is not a valid slug; pass one with --slug", slug);
    }

    // Refuse to shadow any existing source for this slug
    let loader = blog.loader();
    match loader.resolve(&slug) {
        Ok(existing) => bail!("File already exists: {:?}", existing),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    let today = PostDate::from_date(chrono::Local::now().date_naive());
    let front_matter = FrontMatter {
        title: title.to_string(),
        created_date: today.clone(),
        last_updated_date: today,
        categories: options.categories.iter().cloned().collect::<IndexSet<_>>(),
        author: options
            .author
            .clone()
            .unwrap_or_else(|| blog.config.author.clone()),
        estimated_reading_time_in_mins: 1,
    };

    fs::create_dir_all(&blog.posts_dir)?;
    let file_path = blog.posts_dir.join(format!("{}.md", slug));
    let content = format!("{}\nWrite something here.\n", front_matter.to_block()?);
    fs::write(&file_path, content)?;

    tracing::info!("Created post {} at {:?}", slug, file_path);
    Ok(file_path)
}

/// Run the new command
pub fn run(blog: &Blog, options: &NewPost) -> Result<()> {
    let path = create_post(blog, options)?;
    println!("Created: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(
            &blog,
            &NewPost {
                title: "Hello, World: Part 2".to_string(),
                categories: vec!["rust".to_string(), "misc".to_string(), "rust".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(path, blog.posts_dir.join("hello-world-part-2.md"));

        let post = blog.loader().load_post("hello-world-part-2").unwrap();
        assert_eq!(post.meta.title, "Hello, World: Part 2");
        assert_eq!(post.meta.author, "Anonymous");
        assert_eq!(
            post.meta.categories.iter().collect::<Vec<_>>(),
            vec!["rust", "misc"]
        );
        assert_eq!(post.meta.created_date, post.meta.last_updated_date);
        assert_eq!(post.meta.estimated_reading_time_in_mins, 1);
        assert!(post.content.contains("Write something here."));
    }

    #[test]
    fn test_create_post_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let options = NewPost {
            title: "Twice".to_string(),
            author: Some("Someone".to_string()),
            ..Default::default()
        };

        create_post(&blog, &options).unwrap();
        let err = create_post(&blog, &options).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_create_post_rejects_bad_slug() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let options = NewPost {
            title: "Fine".to_string(),
            slug: Some("../escape".to_string()),
            ..Default::default()
        };
        assert!(create_post(&blog, &options).is_err());
        assert!(create_post(&blog, &NewPost::default()).is_err());
    }
}
