//! Export the static site

use anyhow::Result;

use crate::generator::{BuildSummary, Generator};
use crate::Blog;

/// Generate the static site into the public directory
pub fn run(blog: &Blog) -> Result<()> {
    let summary = build(blog)?;
    println!(
        "Generated {} posts and {} assets in {:?}",
        summary.posts, summary.assets, blog.public_dir
    );
    Ok(())
}

/// Generate the static site, returning what was written
pub fn build(blog: &Blog) -> Result<BuildSummary> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?;
    let summary = generator.generate()?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts in {:.2}s",
        summary.posts,
        duration.as_secs_f64()
    );

    Ok(summary)
}
