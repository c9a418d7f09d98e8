//! Validate every post

use anyhow::{bail, Result};
use std::fs;

use crate::content::{estimate_reading_time, FrontMatter};
use crate::Blog;

/// Outcome of checking the posts directory
#[derive(Debug, Default)]
pub struct CheckReport {
    pub checked: usize,
    /// Posts that cannot be loaded
    pub errors: Vec<String>,
    /// Posts that load but look inconsistent
    pub warnings: Vec<String>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse every post and compare its declared reading time with an estimate
pub fn check_posts(blog: &Blog) -> Result<CheckReport> {
    let loader = blog.loader();
    let mut report = CheckReport::default();

    for (slug, path) in loader.discover()? {
        report.checked += 1;

        let source = fs::read_to_string(&path)?;
        let (fm, body) = match FrontMatter::parse(&source) {
            Ok(parsed) => parsed,
            Err(e) => {
                report.errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };

        let estimate = estimate_reading_time(body, blog.config.words_per_minute);
        let declared = fm.estimated_reading_time_in_mins;
        if declared.abs_diff(estimate) > 1 {
            let message = format!(
                "{}: declares {} min reading time, estimated {} min",
                slug, declared, estimate
            );
            tracing::warn!("{}", message);
            report.warnings.push(message);
        }

        if fm.last_updated_date.instant() < fm.created_date.instant() {
            let message = format!(
                "{}: lastUpdatedDate {} is before createdDate {}",
                slug, fm.last_updated_date, fm.created_date
            );
            tracing::warn!("{}", message);
            report.warnings.push(message);
        }
    }

    Ok(report)
}

/// Run the check command
pub fn run(blog: &Blog) -> Result<()> {
    let report = check_posts(blog)?;

    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for error in &report.errors {
        println!("error: {}", error);
    }

    if !report.is_ok() {
        bail!(
            "{} of {} posts have malformed metadata",
            report.errors.len(),
            report.checked
        );
    }

    println!("Checked {} posts", report.checked);
    Ok(())
}
