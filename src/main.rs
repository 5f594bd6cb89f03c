//! CLI entry point for bandsite

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bandsite::client::{HttpPostSource, LocalPostSource};
use bandsite::content::{Language, ListingRequest};

#[derive(Parser)]
#[command(name = "bandsite")]
#[command(author = "Joshua Fuego")]
#[command(version)]
#[command(about = "A small band website serving paginated markdown posts", long_about = None)]
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured address)
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List one page of posts
    List {
        /// Post language (en, es; defaults to the configured language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u64,

        /// Posts per page (defaults to the configured page size)
        #[arg(short = 'n', long)]
        limit: Option<u64>,
    },

    /// Read posts page by page, from a running server or the posts directory
    Feed {
        /// Base URL of a server (reads the local posts directory when omitted)
        #[arg(short, long)]
        url: Option<String>,

        /// Post language (en, es; defaults to the configured language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Posts per page (defaults to the configured page size)
        #[arg(short = 'n', long)]
        limit: Option<u64>,

        /// Maximum number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u64,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "bandsite=debug,info"
    } else {
        "bandsite=info"
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
            tracing::info!("Initializing site in {:?}", target_dir);
            bandsite::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Serve { port, ip, open } => {
            let site = bandsite::Site::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| site.config.server.ip.clone());
            let port = port.unwrap_or(site.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            bandsite::server::start(&site, &ip, port, open).await?;
        }

        Commands::List { lang, page, limit } => {
            let site = bandsite::Site::new(&base_dir)?;
            let limit = limit.unwrap_or(site.config.per_page);
            if page == 0 || limit == 0 {
                anyhow::bail!("page and limit must be at least 1");
            }
            let language = lang
                .as_deref()
                .map_or_else(|| site.config.default_language(), Language::parse);
            let request = ListingRequest::new(language, page, limit);
            bandsite::commands::list::run(&site, &request)?;
        }

        Commands::Feed {
            url,
            lang,
            limit,
            pages,
        } => {
            let site = bandsite::Site::new(&base_dir)?;
            let limit = limit.unwrap_or(site.config.per_page);
            if limit == 0 {
                anyhow::bail!("limit must be at least 1");
            }
            let language = lang
                .as_deref()
                .map_or_else(|| site.config.default_language(), Language::parse);
            let config = &site.config.feed;
            match url {
                Some(url) => {
                    let source = HttpPostSource::new(url.as_str());
                    bandsite::commands::feed::run(source, &url, language, limit, pages, config)
                        .await?;
                }
                None => {
                    let source = LocalPostSource::new(site.loader());
                    let origin = site.posts_dir.display().to_string();
                    bandsite::commands::feed::run(source, &origin, language, limit, pages, config)
                        .await?;
                }
            }
        }

        Commands::Version => {
            println!("bandsite version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
