//! AnimeNox catalog CLI application.

use anyhow::{Context, Result};
use catalog::{FetchGateway, ListingController, ListingState, MetadataClient, Section};
use clap::{Parser, Subcommand};
use shared::helpers::{format_duration, sort_anime, truncate_text};
use shared::{
    Anime, AnimeStatus, Config, Library, LocalStore, SearchFilters, SortBy, ANIME_GENRES,
    ANIME_SEASONS,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List trending anime
    Trending {
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List popular anime
    Popular {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List currently airing anime
    Ongoing {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List finished anime
    Completed {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Search anime by title
    Search {
        query: String,
        #[arg(long)]
        genre: Option<String>,
        /// ongoing or completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        /// popularity, rating, latest or title
        #[arg(long, default_value = "popularity")]
        sort: String,
    },
    /// List anime of one genre
    Genre {
        name: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show details and episodes of one anime
    Info { id: String },
    /// Add or remove an anime from favorites
    Favorite { id: String },
    /// Show recently viewed anime
    Recent {
        /// Forget the viewing history instead
        #[arg(long)]
        clear: bool,
    },
    /// Show favorite anime
    Favorites,
    /// Show the genres and seasons available as filters
    Genres,
    /// Interactive browsing session
    Browse {
        #[arg(long, default_value = "trending")]
        section: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config =
        shared::LogConfig::from_settings(&config.logging, &config.log_dir(), "catalog");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let client = MetadataClient::new(&config.metadata).context("Failed to create metadata client")?;
    let gateway = FetchGateway::new(client);

    match args.command {
        Command::Trending { pages } => list_section(gateway, Section::Trending, pages, &config).await,
        Command::Popular { pages } => list_section(gateway, Section::Popular, pages, &config).await,
        Command::Ongoing { pages } => list_section(gateway, Section::Ongoing, pages, &config).await,
        Command::Completed { pages } => {
            list_section(gateway, Section::Completed, pages, &config).await
        }
        Command::Search {
            query,
            genre,
            status,
            year,
            sort,
        } => {
            let status = status
                .map(|s| s.parse::<AnimeStatus>())
                .transpose()?
                .map(|s| match s {
                    AnimeStatus::Ongoing => "Ongoing".to_string(),
                    AnimeStatus::Completed => "Completed".to_string(),
                });
            let filters = SearchFilters {
                genre,
                status,
                year,
                sort_by: sort.parse::<SortBy>()?,
                query: Some(query.clone()),
                ..Default::default()
            };

            let results = gateway.search(&query, &filters, 1).await;
            print_list(&sort_anime(&results, filters.sort_by));
            Ok(())
        }
        Command::Genre { name, page } => {
            print_list(&gateway.fetch_by_genre(&name, page).await);
            Ok(())
        }
        Command::Info { id } => {
            let library = open_library(&config)?;
            match gateway.fetch_by_id(&id).await {
                Some(anime) => {
                    print_details(&anime, library.is_favorite(&anime.id)?);
                    library
                        .record_view(&anime)
                        .context("Failed to record recent view")?;
                }
                None => println!("No anime found with id {}", id),
            }
            Ok(())
        }
        Command::Favorite { id } => {
            let library = open_library(&config)?;
            if library.toggle_favorite(&id)? {
                println!("Added {} to favorites", id);
            } else {
                println!("Removed {} from favorites", id);
            }
            Ok(())
        }
        Command::Recent { clear } => {
            let library = open_library(&config)?;
            if clear {
                if library.clear_recent()? {
                    println!("Viewing history cleared");
                } else {
                    println!("Nothing viewed yet");
                }
                return Ok(());
            }
            let recent = library.recent()?;
            if recent.is_empty() {
                println!("Nothing viewed yet");
            }
            for entry in recent {
                println!(
                    "{:<10} {}  ({})",
                    entry.anime_id,
                    entry.title,
                    entry.viewed_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        Command::Favorites => {
            let library = open_library(&config)?;
            let favorites = library.favorites()?;
            if favorites.is_empty() {
                println!("No favorites yet");
            }
            for id in favorites {
                match gateway.fetch_by_id(&id).await {
                    Some(anime) => println!("{:<10} {}", anime.id, anime.title),
                    None => println!("{:<10} (unavailable)", id),
                }
            }
            Ok(())
        }
        Command::Genres => {
            println!("Genres:  {}", ANIME_GENRES.join(", "));
            println!("Seasons: {}", ANIME_SEASONS.join(", "));
            Ok(())
        }
        Command::Browse { section } => browse(gateway, section.parse()?, &config).await,
    }
}

fn open_library(config: &Config) -> Result<Library> {
    let store = LocalStore::open(config.storage_dir(), config.storage.enabled)
        .context("Failed to open local store")?;
    Ok(Library::new(store, config.storage.max_recent))
}

async fn list_section(
    gateway: FetchGateway,
    section: Section,
    pages: u32,
    config: &Config,
) -> Result<()> {
    let controller = ListingController::open(gateway, section, &config.listing).await;
    for _ in 1..pages {
        if !controller.snapshot().has_more {
            break;
        }
        controller.load_more().await;
    }

    print_state(&controller.snapshot());
    Ok(())
}

/// Line-oriented browsing: plain text searches, an empty line clears the
/// search, `/`-commands drive the listing.
async fn browse(gateway: FetchGateway, section: Section, config: &Config) -> Result<()> {
    let controller = ListingController::new(gateway, section, &config.listing);
    let mut updates = controller.subscribe();

    let renderer = tokio::spawn(async move {
        let mut last_shown: Option<ListingState> = None;
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.loading || last_shown.as_ref() == Some(&state) {
                continue;
            }
            print_state(&state);
            last_shown = Some(state);
        }
    });

    println!(
        "Sections: {}. Commands: /more, /refresh, /section <name>, /quit",
        Section::BROWSABLE
            .iter()
            .map(Section::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    controller.change_section(section).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        match line {
            "/quit" | "/q" => break,
            "/more" => controller.load_more().await,
            "/refresh" => controller.refresh().await,
            _ if line.starts_with("/section") => {
                match line.trim_start_matches("/section").trim().parse::<Section>() {
                    Ok(section) => controller.change_section(section).await,
                    Err(e) => println!("{}", e),
                }
            }
            _ => controller.search(line, None),
        }
    }

    drop(controller);
    renderer.await.context("Renderer task failed")?;
    Ok(())
}

fn print_state(state: &ListingState) {
    let heading = match state.current_section {
        Section::Search => format!("search \"{}\"", state.search_query),
        section => section.to_string(),
    };
    println!("== {} (page {}) ==", heading, state.page);

    if let Some(error) = &state.error {
        println!("{} Type /refresh to try again.", error);
        return;
    }
    print_list(&state.items);
    if state.has_more {
        println!("-- more available (/more) --");
    }
}

fn print_list(items: &[Anime]) {
    if items.is_empty() {
        println!("No anime found");
    }
    for (i, anime) in items.iter().enumerate() {
        let rating = anime
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}. {:<10} {:<45} {:>4}  {}",
            i + 1,
            anime.id,
            truncate_text(&anime.title, 42),
            rating,
            anime.status
        );
    }
}

fn print_details(anime: &Anime, favorite: bool) {
    println!("{}{}", anime.title, if favorite { " ★" } else { "" });
    println!("  id:       {}", anime.id);
    println!("  status:   {}", anime.status);
    println!("  released: {}", anime.release_date);
    if let Some(rating) = anime.rating {
        println!("  rating:   {:.1}", rating);
    }
    if let Some(kind) = &anime.media_type {
        println!("  type:     {}", kind);
    }
    if let Some(country) = &anime.country {
        println!("  country:  {}", country);
    }
    match (anime.current_episode, anime.total_episodes) {
        (Some(current), Some(total)) => println!("  episodes: {}/{}", current, total),
        (None, Some(total)) => println!("  episodes: {}", total),
        _ => {}
    }
    if !anime.genres.is_empty() {
        println!("  genres:   {}", anime.genres.join(", "));
    }
    println!("  image:    {}", anime.image);
    println!();
    println!("{}", truncate_text(&anime.description, 600));

    if !anime.episodes.is_empty() {
        println!();
        for episode in &anime.episodes {
            let length = episode
                .duration
                .map(|minutes| format_duration(u64::from(minutes) * 60))
                .unwrap_or_default();
            println!("  {:>4}. {:<50} {:>7}", episode.number, truncate_text(&episode.title, 48), length);
        }
    }
}
