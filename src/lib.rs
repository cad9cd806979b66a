//! Tonearm - library browser for a music server
//!
//! A Libadwaita desktop client that browses albums, artists, genres and
//! playlists in paged cover grids, with search, sorting, filtering and
//! back/forward navigation that restores pages without fetching them again.

pub mod backend;
pub mod config;
pub mod error;
pub mod state;
pub mod ui;

// Re-export key types for convenience
pub use {
    backend::{MediaProvider, PlaybackManager, ServerManager},
    config::{SettingsManager, UserSettings},
    error::{ProviderError, UiError},
    state::{AppState, AppStateEvent, ConnectionState},
    ui::TonearmApplication,
};
