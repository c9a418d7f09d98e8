//! List posts

use anyhow::Result;

use crate::content::PostMeta;
use crate::helpers::format_date;
use crate::Blog;

/// Print the post index, newest first
pub fn run(blog: &Blog) -> Result<()> {
    let posts = blog.loader().load_index()?;

    println!("Posts ({}):", posts.len());
    for post in &posts {
        println!("  {}", format_line(post, &blog.config.date_format));
    }

    Ok(())
}

fn format_line(post: &PostMeta, date_format: &str) -> String {
    format!(
        "{}  {:>3} min  {} [{}]",
        format_date(&post.created_date.local(), date_format),
        post.estimated_reading_time_in_mins,
        post.title,
        post.slug
    )
}
