//! Centralized state management with broadcast updates to UI components.

pub mod app_state;
pub mod connection;

pub use {
    app_state::{AppState, AppStateEvent},
    connection::{ConnectionEvent, ConnectionState},
};
