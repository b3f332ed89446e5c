//! newsweather - Headlines and current weather from the command line
//!
//! Each invocation restores the last snapshots, runs one command against the
//! news and weather endpoints, prints the result and persists what changed.

use std::error::Error;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use newsweather::app::{App, Collaborators};
use newsweather::cli::{Cli, Command};
use newsweather::config::Config;
use newsweather::data::Article;
use newsweather::location::FixedLocation;
use newsweather::store::{FileStore, KeyValueStore, MemoryStore};
use newsweather::view;

/// Logs go to stderr so command output on stdout stays clean
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn find_article<S>(app: &App<S>, id: &str) -> Result<Article, String>
where
    S: KeyValueStore + Clone,
{
    app.find_article(id)
        .ok_or_else(|| format!("No article with id '{}' in cached news or favorites", id))
}

async fn run<S>(cli: Cli, config: Config, store: S) -> Result<(), Box<dyn Error>>
where
    S: KeyValueStore + Clone,
{
    let mut collaborators = Collaborators::default();
    if let Some(coordinates) = cli.command.coordinates() {
        collaborators.location = Box::new(FixedLocation(coordinates));
    }
    let mut app = App::start(&config, store, collaborators).await;

    match cli.command {
        Command::News { query } => {
            let snapshot = app.search_news(query.as_deref().unwrap_or("")).await;
            print_lines(view::status_line(&snapshot));
            let articles = snapshot.value.unwrap_or_default();
            print_lines(view::build_article_lines(&articles, |a| app.is_favorite(a)));
        }
        Command::Weather { .. } => {
            let snapshot = app.refresh_weather().await;
            print_lines(view::status_line(&snapshot));
            print_lines(view::build_weather_lines(app.weather().value.as_ref()));
        }
        Command::Article { id } => {
            let article = find_article(&app, &id)?;
            print_lines(view::build_article_detail_lines(&article, app.is_favorite(&article)));
        }
        Command::Favorite { id } => {
            let article = find_article(&app, &id)?;
            let now_favorite = app.toggle_favorite(&article).await;
            let verb = if now_favorite { "Added" } else { "Removed" };
            println!("{} favorite: {}", verb, article.title);
        }
        Command::Favorites => {
            let favorites = app.favorites();
            println!("{} favorite(s)", favorites.count());
            print_lines(favorites.articles().map(|a| view::article_line(a, true)));
        }
        Command::Theme => {
            let settings = app.toggle_theme().await;
            println!("Theme: {}", settings.theme.label());
        }
        Command::Units => {
            let settings = app.toggle_units().await;
            println!("Units: {}", settings.units.symbol());
        }
        Command::Profile => {
            let identity = app.profile().await;
            print_lines(view::build_profile_lines(&identity, app.settings()));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    let store = match cli.data_dir.clone() {
        Some(dir) => Some(FileStore::with_dir(dir)),
        None => FileStore::new(),
    };

    match store {
        Some(store) => run(cli, config, store).await,
        None => {
            warn!("no data directory available, nothing will be persisted");
            run(cli, config, MemoryStore::new()).await
        }
    }
}
