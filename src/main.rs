//! CLI entry point for milkyway

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "milkyway")]
#[command(version)]
#[command(about = "A Markdown blog board with a folder-of-posts content repository", long_about = None)]
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
    /// Initialize a new board
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Category path, folders joined by '/'
        #[arg(short = 'C', long)]
        category: String,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,

        /// Pin the post above all others
        #[arg(long)]
        pinned: bool,
    },

    /// Delete a post
    Delete {
        /// Category path of the post
        category: String,

        /// Slug of the post (file name without extension)
        slug: String,
    },

    /// Start the API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured address)
        #[arg(short, long)]
        ip: Option<String>,

        /// Watch content for changes and notify live reload clients
        #[arg(short, long)]
        watch: bool,
    },

    /// List board content
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "milkyway=debug,info"
    } else {
        "milkyway=info"
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
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing board in {:?}", target_dir);
            milkyway::commands::init::init_site(&target_dir)?;
            println!("Initialized board in {:?}", target_dir);
        }

        Commands::New {
            title,
            category,
            tags,
            pinned,
        } => {
            let board = milkyway::Board::new(&base_dir)?;
            tracing::info!("Creating new post in {}: {}", category, title);
            let tags = milkyway::commands::new::parse_tags(tags.as_deref());
            milkyway::commands::new::create_post(&board, &title, &category, tags, pinned)?;
        }

        Commands::Delete { category, slug } => {
            let board = milkyway::Board::new(&base_dir)?;
            milkyway::commands::delete::run(&board, &category, &slug)?;
        }

        Commands::Serve { port, ip, watch } => {
            let board = milkyway::Board::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| board.config.server.ip.clone());
            let port = port.unwrap_or(board.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            milkyway::server::start(&board, &ip, port, watch).await?;
        }

        Commands::List { r#type } => {
            let board = milkyway::Board::new(&base_dir)?;
            milkyway::commands::list::run(&board, &r#type)?;
        }
    }

    Ok(())
}
