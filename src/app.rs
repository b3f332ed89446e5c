//! Application state for the headlines and weather screens
//!
//! [`App`] owns the two cache-backed fetchers, the favorites ledger and the
//! preferences, and exposes the actions the screens trigger: searching,
//! clearing a search, pulling to refresh, toggling favorites, theme and units,
//! and signing out.

use reqwest::Client;
use tokio::sync::mpsc;

use crate::config::{Config, LocationConfig};
use crate::data::{Article, NewsClient, NewsRequest, WeatherClient, WeatherReading, WeatherRequest};
use crate::favorites::FavoritesLedger;
use crate::fetcher::{CachedFetcher, Snapshot};
use crate::location::{resolve_coordinates, LocationProvider, UnavailableLocation};
use crate::services::{self, AuthProvider, Identity, NoPush, Notice, PushProvider, SignedOut};
use crate::settings::{Preferences, Settings};
use crate::store::KeyValueStore;

/// External capabilities the application depends on
pub struct Collaborators {
    pub location: Box<dyn LocationProvider>,
    pub auth: Box<dyn AuthProvider>,
    pub push: Box<dyn PushProvider>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            location: Box::new(UnavailableLocation),
            auth: Box::new(SignedOut),
            push: Box::new(NoPush),
        }
    }
}

/// Main application struct managing state and data
pub struct App<S> {
    news: CachedFetcher<NewsClient, S>,
    weather: CachedFetcher<WeatherClient, S>,
    favorites: FavoritesLedger<S>,
    preferences: Preferences<S>,
    collaborators: Collaborators,
    location: LocationConfig,
    default_topic: String,
    /// Current search box text
    query: String,
}

impl<S: KeyValueStore + Clone> App<S> {
    /// Builds the application and restores everything persisted from earlier runs
    ///
    /// Cached news and weather snapshots are published immediately so there is
    /// something to show before the first network request completes.
    pub async fn start(config: &Config, store: S, collaborators: Collaborators) -> Self {
        Self::start_with_client(config, store, collaborators, Client::new()).await
    }

    /// Same as [`App::start`] with a caller-supplied HTTP client
    pub async fn start_with_client(
        config: &Config,
        store: S,
        collaborators: Collaborators,
        http: Client,
    ) -> Self {
        let news_client = NewsClient::new(config.news.api_key.clone())
            .with_client(http.clone())
            .with_base_url(config.news.base_url.clone())
            .with_language(config.news.language.clone());
        let weather_client = WeatherClient::new(config.weather.api_key.clone())
            .with_client(http)
            .with_base_url(config.weather.base_url.clone());

        let ordering = config.fetch.ordering();
        let news = CachedFetcher::new(news_client, store.clone()).with_ordering(ordering);
        let mut weather = CachedFetcher::new(weather_client, store.clone()).with_ordering(ordering);
        if !config.weather.persist_snapshot {
            weather = weather.without_persistence();
        }

        news.restore().await;
        weather.restore().await;

        Self {
            news,
            weather,
            favorites: FavoritesLedger::load(store.clone()).await,
            preferences: Preferences::load(store, config.display.settings()).await,
            collaborators,
            location: config.location.clone(),
            default_topic: config.news.default_topic.clone(),
            query: String::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Updates the search box text without fetching; narrows the visible list
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Submits a search; an empty query requests the default topic
    pub async fn search_news(&mut self, query: &str) -> Snapshot<Vec<Article>> {
        self.query = query.to_string();
        let request = NewsRequest::from_query(&self.query, &self.default_topic);
        self.news.load(&request).await
    }

    /// Clears the search box and reloads the default topic
    pub async fn clear_search(&mut self) -> Snapshot<Vec<Article>> {
        self.search_news("").await
    }

    /// Loads weather for the device position, or the fallback coordinate
    pub async fn refresh_weather(&self) -> Snapshot<WeatherReading> {
        let coordinates = resolve_coordinates(
            self.collaborators.location.as_ref(),
            self.location.timeout(),
            self.location.fallback,
        )
        .await;
        self.weather.load(&WeatherRequest::from(coordinates)).await
    }

    /// Pull-to-refresh: reloads news for the current query and weather together
    pub async fn refresh(&self) -> (Snapshot<Vec<Article>>, Snapshot<WeatherReading>) {
        let request = NewsRequest::from_query(&self.query, &self.default_topic);
        futures::join!(self.news.load(&request), self.refresh_weather())
    }

    pub fn news(&self) -> Snapshot<Vec<Article>> {
        self.news.current()
    }

    pub fn news_fetcher(&self) -> &CachedFetcher<NewsClient, S> {
        &self.news
    }

    /// Weather state with temperatures in the preferred unit
    pub fn weather(&self) -> Snapshot<WeatherReading> {
        let mut snapshot = self.weather.current();
        let units = self.preferences.get().units;
        snapshot.value = snapshot.value.map(|w| w.in_unit(units));
        snapshot
    }

    /// Articles to list: the current ones narrowed by the search box text
    pub fn visible_articles(&self) -> Vec<Article> {
        let articles = self.news.current().value.unwrap_or_default();
        let query = self.query.trim();
        if query.is_empty() {
            articles
        } else {
            articles.into_iter().filter(|a| a.matches(query)).collect()
        }
    }

    /// Looks an article up by identifier in the current list, then in favorites
    pub fn find_article(&self, article_id: &str) -> Option<Article> {
        self.news
            .current()
            .value
            .and_then(|articles| articles.into_iter().find(|a| a.id() == article_id))
            .or_else(|| self.favorites.get(article_id).cloned())
    }

    pub fn is_favorite(&self, article: &Article) -> bool {
        self.favorites.is_favorite(article.id())
    }

    /// Toggles the article's favorite status; returns whether it is now a favorite
    pub async fn toggle_favorite(&mut self, article: &Article) -> bool {
        self.favorites.toggle(article).await.contains_key(article.id())
    }

    pub fn favorites(&self) -> &FavoritesLedger<S> {
        &self.favorites
    }

    pub fn settings(&self) -> Settings {
        self.preferences.get()
    }

    pub async fn toggle_theme(&mut self) -> Settings {
        self.preferences.toggle_theme().await
    }

    pub async fn toggle_units(&mut self) -> Settings {
        self.preferences.toggle_units().await
    }

    /// The signed-in identity, or an empty one rendered as a guest
    pub async fn profile(&self) -> Identity {
        self.collaborators
            .auth
            .current_identity()
            .await
            .unwrap_or_default()
    }

    pub async fn sign_out(&self) -> Notice {
        services::sign_out(self.collaborators.auth.as_ref()).await
    }

    /// Requests push permission and routes foreground messages to `notices`
    pub async fn enable_notifications(&self, notices: mpsc::Sender<Notice>) -> Option<String> {
        services::register_notifications(self.collaborators.push.as_ref(), notices).await
    }
}
