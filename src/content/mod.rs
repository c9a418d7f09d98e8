//! Content module - handles posts, front-matter and markdown rendering

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{FrontMatter, FrontMatterError, PostDate};
pub use loader::PostLoader;
pub use markdown::{count_words, estimate_reading_time, MarkdownRenderer, MORE_MARKER};
pub use post::{Post, PostMeta};
