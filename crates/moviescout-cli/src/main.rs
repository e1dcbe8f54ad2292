use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use moviescout_core::{Config, Explorer, Message, MovieCard, SearchParams, SearchResult};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "moviescout")]
#[command(version, about = "Search a movie catalog and keep a list of favorites", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "MOVIESCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        /// Movie title (substring match on the catalog side)
        #[arg(short, long)]
        title: Option<String>,
        /// Release year
        #[arg(short, long)]
        year: Option<String>,
        /// IMDb identifier, e.g. tt0078748
        #[arg(short, long)]
        id: Option<String>,
        /// Results page
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search as you type: one title per line on stdin, sent once typing settles
    Browse,
    /// List favorite movies
    Favorites,
    /// Add or remove a movie from favorites by IMDb identifier
    Toggle {
        /// IMDb identifier, e.g. tt0078748
        id: String,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file (creating it with defaults if missing)
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moviescout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let Some(command) = cli.command else {
        println!("No command specified. Try --help");
        return Ok(());
    };

    if let Commands::Config { save } = command {
        if !save {
            print!("{}", config.to_toml()?);
            return Ok(());
        }

        let path = match cli.config {
            Some(path) => path,
            None => Config::config_path()?,
        };
        config
            .save_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let explorer = Explorer::from_config(&config);

    let outcome = match command {
        Commands::Search {
            title,
            year,
            id,
            page,
        } => {
            let params = SearchParams {
                title,
                year,
                id,
                page: Some(page),
            };
            tracing::info!("Searching with {:?}", params);
            search(&explorer, &params).await
        }
        Commands::Browse => browse(&explorer, config.ui.debounce()).await,
        Commands::Favorites => {
            list_favorites(&explorer);
            Ok(())
        }
        Commands::Toggle { id } => toggle(&explorer, &id).await,
        Commands::Config { .. } => Ok(()),
    };

    print_messages(&explorer.drain_messages());
    outcome
}

async fn search(explorer: &Explorer, params: &SearchParams) -> anyhow::Result<()> {
    let Some(result) = explorer.search(params).await? else {
        return Ok(());
    };

    if result.items.is_empty() {
        println!("No movies found. Adjust filters and try again.");
        return Ok(());
    }

    print_cards(&explorer.annotate(&result));
    print_paging(&result);
    Ok(())
}

/// Read titles from stdin and search for each one once input pauses
async fn browse(explorer: &Explorer, quiet: Duration) -> anyhow::Result<()> {
    let (tx, mut debouncer) = moviescout_core::debounce(quiet);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line.trim().to_string()).is_err() {
                break;
            }
        }
    });

    while let Some(title) = debouncer.next().await {
        if title.is_empty() {
            continue;
        }

        tracing::info!("Searching for {:?}", title);
        // Failures are already queued as messages; keep reading input
        if let Err(e) = search(explorer, &SearchParams::new().title(title)).await {
            tracing::debug!("Search failed: {}", e);
        }
        print_messages(&explorer.drain_messages());
    }

    Ok(())
}

fn list_favorites(explorer: &Explorer) {
    let favorites = explorer.favorite_movies();
    if favorites.is_empty() {
        println!("No favorites yet.");
        return;
    }

    let cards: Vec<MovieCard> = favorites
        .into_iter()
        .map(|movie| MovieCard {
            movie,
            favorite: true,
        })
        .collect();
    print_cards(&cards);
}

async fn toggle(explorer: &Explorer, id: &str) -> anyhow::Result<()> {
    let result = explorer
        .search(&SearchParams::new().id(id))
        .await?
        .context("Lookup was superseded")?;

    let movie = result
        .items
        .into_iter()
        .find(|m| m.id == id)
        .with_context(|| format!("No movie with id {}", id))?;

    explorer.toggle_favorite(movie);
    Ok(())
}

fn print_cards(cards: &[MovieCard]) {
    for card in cards {
        let marker = if card.favorite { "★" } else { "☆" };
        println!(
            "{} {} ({})  {}",
            marker,
            card.movie.title,
            card.movie.year,
            card.movie.imdb_url()
        );
    }
}

fn print_paging(result: &SearchResult) {
    println!(
        "\nPage {} of {} ({} movies)",
        result.page, result.total_pages, result.total
    );
    if result.has_next_page() {
        println!("More results: --page {}", result.page + 1);
    }
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        eprintln!("[{}] {}", message.severity, message.text);
    }
}
