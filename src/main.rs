//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands::new::NewPost;
use folio::Blog;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A small Markdown blog engine", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Slug (file name) of the post; defaults to the slugified title
        #[arg(short, long)]
        slug: Option<String>,

        /// Author; defaults to the site author
        #[arg(short, long)]
        author: Option<String>,

        /// Category, may be repeated
        #[arg(short = 'C', long = "category")]
        categories: Vec<String>,
    },

    /// Export the static site
    #[command(alias = "g", alias = "generate")]
    Build,

    /// Start the blog server
    #[command(alias = "s", alias = "server")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List posts, newest first
    List,

    /// Validate every post's front-matter
    Check,

    /// Delete the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized empty blog in {:?}", target_dir);
        }

        Commands::New {
            title,
            slug,
            author,
            categories,
        } => {
            let blog = Blog::new(&base_dir)?;
            let options = NewPost {
                title,
                slug,
                author,
                categories,
            };
            folio::commands::new::run(&blog, &options)?;
        }

        Commands::Build => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.build()?;
        }

        Commands::Serve { port, ip } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&blog, &ip, port).await?;
        }

        Commands::List => {
            let blog = Blog::new(&base_dir)?;
            folio::commands::list::run(&blog)?;
        }

        Commands::Check => {
            let blog = Blog::new(&base_dir)?;
            folio::commands::check::run(&blog)?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
