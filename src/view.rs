//! Plain-text rendering for the command-line front end
//!
//! Values are rounded here and nowhere else; the model keeps full precision.

use crate::data::{Article, WeatherReading};
use crate::fetcher::Snapshot;
use crate::services::Identity;
use crate::settings::Settings;

const FAVORITE_MARK: &str = "\u{2605}";
const NOT_FAVORITE_MARK: &str = "\u{2606}";
const UNKNOWN_SOURCE: &str = "Unknown source";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn mark(favorite: bool) -> &'static str {
    if favorite {
        FAVORITE_MARK
    } else {
        NOT_FAVORITE_MARK
    }
}

/// Status banner for a snapshot: the user-facing message, if any
pub fn status_line<T>(snapshot: &Snapshot<T>) -> Option<String> {
    snapshot.message().map(|m| format!("! {}", m))
}

/// Weather summary lines, or a placeholder when nothing is known yet
pub fn build_weather_lines(weather: Option<&WeatherReading>) -> Vec<String> {
    match weather {
        Some(w) => {
            let mut lines = Vec::new();
            if let Some(name) = w.location_name.as_deref() {
                lines.push(name.to_string());
            }
            lines.push(format!(
                "{}  {} (feels {})",
                w.temperature,
                w.description,
                w.feels_like
            ));
            lines.push(format!(
                "Humidity {}%  Wind {} km/h  [{}]",
                w.humidity,
                w.wind_kph.round(),
                w.condition.as_str()
            ));
            lines
        }
        None => vec!["No weather data".to_string()],
    }
}

/// One line per article: favorite mark, title, source and identifier
pub fn article_line(article: &Article, favorite: bool) -> String {
    let source = article.source_name().unwrap_or(UNKNOWN_SOURCE);
    let mut line = format!("{} {} ({})", mark(favorite), article.title, source);
    if let Some(published) = article.published() {
        line.push_str(&format!(" {}", published.format(TIME_FORMAT)));
    }
    line.push_str(&format!("\n    {}", article.id()));
    let summary = article.summary();
    if !summary.is_empty() {
        line.push_str(&format!("\n    {}", summary));
    }
    line
}

pub fn build_article_lines<'a, F>(articles: &'a [Article], is_favorite: F) -> Vec<String>
where
    F: Fn(&'a Article) -> bool,
{
    if articles.is_empty() {
        return vec!["No articles".to_string()];
    }
    articles
        .iter()
        .map(|a| article_line(a, is_favorite(a)))
        .collect()
}

/// Full view of one article: title, source and time, image, body, link and share text
pub fn build_article_detail_lines(article: &Article, favorite: bool) -> Vec<String> {
    let mut meta = article.source_name().unwrap_or(UNKNOWN_SOURCE).to_string();
    if let Some(published) = article.published() {
        meta.push_str(&format!(" \u{2022} {}", published.format(TIME_FORMAT)));
    }

    let mut lines = vec![format!("{} {}", mark(favorite), article.title), meta];
    if let Some(image) = article.url_to_image.as_deref().filter(|u| !u.is_empty()) {
        lines.push(format!("Image: {}", image));
    }
    lines.push(String::new());
    lines.push(article.body().to_string());
    lines.push(String::new());
    if let Some(url) = article.url.as_deref().filter(|u| !u.is_empty()) {
        lines.push(format!("Open in browser: {}", url));
    }
    lines.push("Share:".to_string());
    lines.extend(article.share_text().lines().map(|l| format!("  {}", l)));
    lines
}

/// Profile card followed by the current preferences
pub fn build_profile_lines(identity: &Identity, settings: Settings) -> Vec<String> {
    let mut lines = vec![
        format!("[{}] {}", identity.initial(), identity.name_or_guest()),
        identity.email_or_placeholder().to_string(),
    ];
    if let Some(photo) = identity.photo_url.as_deref() {
        lines.push(photo.to_string());
    }
    let palette = settings.theme.palette();
    lines.push(format!("Theme: {}", settings.theme.label()));
    lines.push(format!(
        "  background {}  card {}  text {}  primary {}",
        palette.background, palette.card, palette.text, palette.primary
    ));
    lines.push(format!("Units: {}", settings.units.symbol()));
    lines
}
