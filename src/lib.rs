//! newsweather library
//!
//! Headlines and current weather backed by last-good snapshots, a persistent
//! favorites set and theme/unit preferences. The binary in `main.rs` is a thin
//! front end over [`app::App`].

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod favorites;
pub mod fetcher;
pub mod location;
pub mod services;
pub mod settings;
pub mod store;
pub mod view;
