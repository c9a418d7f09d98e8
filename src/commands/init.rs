//! Initialize a new blog

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::templates::STYLESHEET;
use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# folio configuration

# Site
title: folio
subtitle: ''
description: ''
author: Anonymous
language: en

# URL
url: http://localhost
root: /

# Directory
posts_dir: posts
static_dir: static
public_dir: public

# Writing
date_format: YYYY-MM-DD
words_per_minute: 200
highlight:
  enable: true
  theme: base16-ocean.dark
  line_number: true
"#;

const HELLO_WORLD: &str = r#"---
title: Hello World
createdDate: 2024-01-01
lastUpdatedDate: 2024-01-01
categories:
  - meta
author: Anonymous
estimatedReadingTimeInMins: 1
---

Welcome to your new blog. Posts live in the `posts` directory; each file
starts with a front-matter block and the file name is the post's slug.

```rust
fn main() {
    println!("Hello, world!");
}
```
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("{:?} already contains a site", target_dir);
    }

    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("posts/hello-world.md"), HELLO_WORLD)?;
    fs::write(target_dir.join("static/style.css"), STYLESHEET)?;

    tracing::debug!("Wrote site skeleton to {:?}", target_dir);
    Ok(())
}
