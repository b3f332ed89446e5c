//! Theme and unit preferences
//!
//! [`Preferences`] is the one place these settings change. Each update goes
//! through [`Preferences::update`], which persists whatever changed, so
//! callers hold a reference to it instead of reaching for global state.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::TemperatureUnit;
use crate::store::{self, KeyValueStore, THEME_KEY, UNITS_KEY};

/// Light or dark appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: "#f5f5f5",
                card: "#fff",
                text: "#000",
                primary: "#007bff",
            },
            Theme::Dark => Palette {
                background: "#121212",
                card: "#1e1e1e",
                text: "#fff",
                primary: "#0d6efd",
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

/// Colors used to render a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub primary: &'static str,
}

/// Current preference values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub theme: Theme,
    pub units: TemperatureUnit,
}

/// Persisted settings shared by every screen
#[derive(Debug)]
pub struct Preferences<S> {
    store: S,
    current: Settings,
}

impl<S: KeyValueStore> Preferences<S> {
    /// Loads stored preferences, using `defaults` for anything not stored yet
    pub async fn load(store: S, defaults: Settings) -> Self {
        let theme = store::read_json(&store, THEME_KEY).await.unwrap_or(defaults.theme);
        let units = store::read_json(&store, UNITS_KEY).await.unwrap_or(defaults.units);
        Self {
            store,
            current: Settings { theme, units },
        }
    }

    pub fn get(&self) -> Settings {
        self.current
    }

    /// Applies `change` and persists every value it modified
    pub async fn update(&mut self, change: impl FnOnce(&mut Settings)) -> Settings {
        let before = self.current;
        change(&mut self.current);

        if self.current.theme != before.theme {
            if let Err(err) = store::write_json(&self.store, THEME_KEY, &self.current.theme).await {
                warn!(error = %err, "failed to persist theme preference");
            }
        }
        if self.current.units != before.units {
            if let Err(err) = store::write_json(&self.store, UNITS_KEY, &self.current.units).await {
                warn!(error = %err, "failed to persist unit preference");
            }
        }
        self.current
    }

    pub async fn toggle_theme(&mut self) -> Settings {
        self.update(|s| s.theme = s.theme.toggled()).await
    }

    pub async fn toggle_units(&mut self) -> Settings {
        self.update(|s| s.units = s.units.toggled()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_defaults_when_nothing_stored() {
        let prefs = Preferences::load(MemoryStore::new(), Settings::default()).await;
        assert_eq!(prefs.get().theme, Theme::Light);
        assert_eq!(prefs.get().units, TemperatureUnit::Celsius);
    }

    #[tokio::test]
    async fn test_configured_defaults_are_used() {
        let defaults = Settings {
            theme: Theme::Dark,
            units: TemperatureUnit::Fahrenheit,
        };
        let prefs = Preferences::load(MemoryStore::new(), defaults).await;
        assert_eq!(prefs.get(), defaults);
    }

    #[tokio::test]
    async fn test_toggle_theme_persists() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::load(store.clone(), Settings::default()).await;

        let settings = prefs.toggle_theme().await;
        assert_eq!(settings.theme, Theme::Dark);

        let reloaded = Preferences::load(store.clone(), Settings::default()).await;
        assert_eq!(reloaded.get().theme, Theme::Dark);
        assert_eq!(
            store.get_item(THEME_KEY).await.unwrap().as_deref(),
            Some("\"dark\"")
        );
    }

    #[tokio::test]
    async fn test_toggle_units_persists_only_units() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::load(store.clone(), Settings::default()).await;

        prefs.toggle_units().await;

        assert_eq!(
            store.get_item(UNITS_KEY).await.unwrap().as_deref(),
            Some("\"fahrenheit\"")
        );
        assert!(store.get_item(THEME_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_without_change_writes_nothing() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::load(store.clone(), Settings::default()).await;

        prefs.update(|_| {}).await;

        assert!(store.get_item(THEME_KEY).await.unwrap().is_none());
        assert!(store.get_item(UNITS_KEY).await.unwrap().is_none());
    }

    #[test]
    fn test_palettes_differ() {
        assert_eq!(Theme::Light.palette().background, "#f5f5f5");
        assert_eq!(Theme::Dark.palette().background, "#121212");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
