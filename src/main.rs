use clap::Parser;
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use dialoguer::{Input, Select};
use movie_shelf::{
    CatalogConfig, DEFAULT_BASE_URL, FileStore, KeyValueStore, MemoryStore,
    MovieShelf, MovieShelfError, MovieSummary, OmdbClient, SessionStatus,
    platform_default_from_colorfgbg,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Search a movie catalog, page through results and keep a shelf of favorites
#[derive(Parser, Debug)]
#[command(name = "movie-shelf", version, about)]
struct Cli {
    /// Search term to run right away
    term: Option<String>,

    /// OMDb API key
    #[arg(long, env = "OMDB_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of the catalog
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Give up on a catalog request after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory for favorites and settings (defaults to the system data directory)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Errors that end the interactive session
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Setup(#[from] MovieShelfError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Menu entries offered after each step
#[derive(Debug, Clone, Copy)]
enum Action {
    Search,
    NextPage,
    PreviousPage,
    GoToPage,
    ToggleFavorite,
    Favorites,
    ToggleTheme,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Search => "New search",
            Action::NextPage => "Next page",
            Action::PreviousPage => "Previous page",
            Action::GoToPage => "Go to page...",
            Action::ToggleFavorite => "Add/remove a favorite",
            Action::Favorites => "Show favorites",
            Action::ToggleTheme => "Toggle light/dark",
            Action::Quit => "Quit",
        }
    }
}

type Shelf = MovieShelf<OmdbClient, Arc<dyn KeyValueStore>>;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the file store, falling back to memory when no data directory is usable
fn open_store(data_dir: Option<&PathBuf>) -> Arc<dyn KeyValueStore> {
    let opened = match data_dir {
        Some(dir) => FileStore::at(dir),
        None => FileStore::open(),
    };

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "favorites will not be saved for this session");
            eprintln!("Warning: {}. Favorites will not be saved.", e);
            Arc::new(MemoryStore::new())
        }
    }
}

fn theme_for(shelf: &Shelf) -> Box<dyn Theme> {
    if shelf.preference().is_dark() {
        Box::new(ColorfulTheme::default())
    } else {
        Box::new(SimpleTheme)
    }
}

fn describe(movie: &MovieSummary, favorite: bool) -> String {
    let marker = if favorite { "*" } else { " " };
    match &movie.media_type {
        Some(kind) => format!("[{}] {} ({}) [{}]", marker, movie.title, movie.year, kind),
        None => format!("[{}] {} ({})", marker, movie.title, movie.year),
    }
}

fn print_session(shelf: &Shelf) {
    let session = shelf.session();

    match session.status() {
        SessionStatus::Idle => {
            println!("\nReady to discover movies? Search for your favorite films.");
        }
        SessionStatus::Loading => {
            println!("\nLoading...");
        }
        SessionStatus::Failed => {
            println!(
                "\n{}",
                session.error_message().unwrap_or("Something went wrong.")
            );
        }
        SessionStatus::Ready => {
            println!(
                "\n=== Results for '{}' (page {} of {}, {} total) ===\n",
                session.term(),
                session.page(),
                session.page_count(),
                session.total_results()
            );
            for movie in session.results() {
                println!("{}", describe(movie, shelf.is_favorite(&movie.id)));
            }
        }
    }

    println!("\nFavorites: {}", shelf.favorites().len());
}

fn available_actions(shelf: &Shelf) -> Vec<Action> {
    let session = shelf.session();
    let mut actions = vec![Action::Search];

    if session.has_next_page() {
        actions.push(Action::NextPage);
    }
    if session.has_previous_page() {
        actions.push(Action::PreviousPage);
    }
    if session.page_count() > 1 {
        actions.push(Action::GoToPage);
    }
    if !session.results().is_empty() {
        actions.push(Action::ToggleFavorite);
    }

    actions.extend([Action::Favorites, Action::ToggleTheme, Action::Quit]);
    actions
}

fn prompt_search(shelf: &mut Shelf, theme: &dyn Theme) -> Result<(), CliError> {
    let term: String = Input::with_theme(theme)
        .with_prompt("Search movies")
        .allow_empty(true)
        .interact_text()?;

    if !shelf.search(&term) {
        println!("Please enter a search term.");
    }
    Ok(())
}

fn prompt_page(shelf: &mut Shelf, theme: &dyn Theme) -> Result<(), CliError> {
    let last_page = shelf.session().page_count();
    let page: u32 = Input::with_theme(theme)
        .with_prompt(format!("Page (1-{})", last_page))
        .interact_text()?;

    if !shelf.change_page(page) {
        println!("There is no page {}.", page);
    }
    Ok(())
}

fn prompt_toggle_favorite(shelf: &mut Shelf, theme: &dyn Theme) -> Result<(), CliError> {
    let results = shelf.session().results().to_vec();
    let items: Vec<String> = results
        .iter()
        .map(|movie| describe(movie, shelf.is_favorite(&movie.id)))
        .collect();

    let selection = Select::with_theme(theme)
        .with_prompt("Toggle favorite")
        .items(&items)
        .default(0)
        .interact_opt()?;

    if let Some(movie) = selection.and_then(|index| results.get(index)) {
        if shelf.toggle_favorite(movie) {
            println!("Added '{}' to favorites.", movie.title);
        } else {
            println!("Removed '{}' from favorites.", movie.title);
        }
    }
    Ok(())
}

fn prompt_favorites(shelf: &mut Shelf, theme: &dyn Theme) -> Result<(), CliError> {
    if shelf.favorites().is_empty() {
        println!("\nNo favorites yet. Add movies to your favorites to see them here.");
        return Ok(());
    }

    let favorites = shelf.favorites().to_vec();
    let mut items: Vec<String> = favorites
        .iter()
        .map(|movie| {
            let poster = movie.poster().unwrap_or("no poster");
            format!("{} <{}>", describe(movie, true), poster)
        })
        .collect();
    items.push("Back".to_string());

    let selection = Select::with_theme(theme)
        .with_prompt("Select a favorite to remove it")
        .items(&items)
        .default(items.len() - 1)
        .interact_opt()?;

    if let Some(movie) = selection.and_then(|index| favorites.get(index)) {
        shelf.remove_favorite(&movie.id);
        println!("Removed '{}' from favorites.", movie.title);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = CatalogConfig {
        base_url: cli.base_url,
        api_key: cli.api_key,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };
    let client = OmdbClient::new(config).map_err(MovieShelfError::from)?;
    let store = open_store(cli.data_dir.as_ref());
    let platform_default =
        platform_default_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref());

    let mut shelf = MovieShelf::new(client, store, platform_default);

    if let Some(term) = cli.term {
        shelf.search(&term);
    }

    loop {
        print_session(&shelf);

        let theme = theme_for(&shelf);
        let actions = available_actions(&shelf);
        let labels: Vec<&str> = actions.iter().map(|action| action.label()).collect();

        let selection = Select::with_theme(theme.as_ref())
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact_opt()?;

        let Some(action) = selection.and_then(|index| actions.get(index).copied()) else {
            return Ok(());
        };

        match action {
            Action::Search => prompt_search(&mut shelf, theme.as_ref())?,
            Action::NextPage => {
                shelf.next_page();
            }
            Action::PreviousPage => {
                shelf.previous_page();
            }
            Action::GoToPage => prompt_page(&mut shelf, theme.as_ref())?,
            Action::ToggleFavorite => prompt_toggle_favorite(&mut shelf, theme.as_ref())?,
            Action::Favorites => prompt_favorites(&mut shelf, theme.as_ref())?,
            Action::ToggleTheme => {
                let preference = shelf.toggle_preference();
                println!(
                    "Switched to {} mode.",
                    if preference.is_dark() { "dark" } else { "light" }
                );
            }
            Action::Quit => return Ok(()),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("\nError: {}", e);
        process::exit(1);
    }
}
