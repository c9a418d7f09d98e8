//! Post models

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::frontmatter::{FrontMatter, PostDate};

/// Post metadata, as listed on the index page and the JSON index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    /// URL-safe identifier, the source file stem
    pub slug: String,

    pub title: String,

    /// Creation date, serialized exactly as written in the source
    pub created_date: PostDate,

    pub last_updated_date: PostDate,

    /// Categories in source order, without duplicates
    pub categories: IndexSet<String>,

    pub author: String,

    pub estimated_reading_time_in_mins: u32,

    /// Source file the post was read from
    #[serde(skip)]
    pub source: PathBuf,
}

impl PostMeta {
    /// Combine a slug and its front-matter into a metadata record
    pub fn from_front_matter(slug: String, source: PathBuf, fm: FrontMatter) -> Self {
        Self {
            slug,
            title: fm.title,
            created_date: fm.created_date,
            last_updated_date: fm.last_updated_date,
            categories: fm.categories,
            author: fm.author,
            estimated_reading_time_in_mins: fm.estimated_reading_time_in_mins,
            source,
        }
    }

    /// URL path of the post page, relative to the site root
    pub fn path(&self) -> String {
        format!("posts/{}/", self.slug)
    }
}

/// A fully loaded post with its rendered body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub meta: PostMeta,

    /// Rendered HTML content
    pub content: String,
}

impl Post {
    pub fn slug(&self) -> &str {
        &self.meta.slug
    }

    /// Get the post published just before this one in an index
    pub fn prev<'a>(&self, index: &'a [PostMeta]) -> Option<&'a PostMeta> {
        let pos = index.iter().position(|p| p.slug == self.meta.slug)?;
        index.get(pos + 1)
    }

    /// Get the post published just after this one in an index
    pub fn next<'a>(&self, index: &'a [PostMeta]) -> Option<&'a PostMeta> {
        let pos = index.iter().position(|p| p.slug == self.meta.slug)?;
        pos.checked_sub(1).and_then(|i| index.get(i))
    }
}
