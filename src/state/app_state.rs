//! Global application state with reactive update mechanisms.
//!
//! This module provides the central `AppState` container that manages
//! shared state across the application with thread-safe access and
//! broadcast notifications.

use std::sync::Arc;

use {
    parking_lot::RwLock,
    tokio::sync::broadcast::{Receiver, Sender, channel},
    tracing::debug,
};

use crate::{
    backend::NowPlaying,
    state::connection::{ConnectionEvent, ConnectionState},
};

/// Central state container with thread-safe access.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server connection state.
    connection: Arc<RwLock<ConnectionState>>,
    /// Currently playing entry, if any.
    now_playing: Arc<RwLock<Option<NowPlaying>>>,
    /// Broadcast channel for state change notifications.
    state_tx: Sender<AppStateEvent>,
}

/// Application state change events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppStateEvent {
    /// The connection state changed.
    ConnectionChanged(ConnectionState),
    /// The now-playing entry changed.
    NowPlayingChanged(Option<NowPlaying>),
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates a new application state instance.
    #[must_use]
    pub fn new() -> Self {
        let (state_tx, _) = channel(16);

        Self {
            connection: Arc::new(RwLock::new(ConnectionState::default())),
            now_playing: Arc::new(RwLock::new(None)),
            state_tx,
        }
    }

    /// Applies a connection event and notifies subscribers on change.
    ///
    /// # Arguments
    ///
    /// * `event` - Connection lifecycle input
    ///
    /// # Returns
    ///
    /// `true` if the transition was valid and applied.
    pub fn apply_connection_event(&self, event: ConnectionEvent) -> bool {
        let next = {
            let mut connection = self.connection.write();
            let Some(next) = connection.next(event) else {
                return false;
            };
            *connection = next;
            next
        };
        debug!(state = ?next, "Connection state changed");
        let _ = self.state_tx.send(AppStateEvent::ConnectionChanged(next));
        true
    }

    /// Updates the now-playing entry and notifies subscribers.
    ///
    /// # Arguments
    ///
    /// * `now_playing` - New entry, or `None` when playback stopped
    pub fn update_now_playing(&self, now_playing: Option<NowPlaying>) {
        *self.now_playing.write() = now_playing.clone();
        let _ = self
            .state_tx
            .send(AppStateEvent::NowPlayingChanged(now_playing));
    }

    /// Subscribes to application state changes.
    ///
    /// # Returns
    ///
    /// A broadcast receiver for state change events.
    pub fn subscribe(&self) -> Receiver<AppStateEvent> {
        self.state_tx.subscribe()
    }

    /// Gets the current connection state.
    pub fn get_connection_state(&self) -> ConnectionState {
        *self.connection.read()
    }

    /// Gets the now-playing entry.
    pub fn get_now_playing(&self) -> Option<NowPlaying> {
        self.now_playing.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        backend::NowPlaying,
        state::{
            AppState, AppStateEvent,
            connection::{ConnectionEvent::{ConnectRequested, Connected}, ConnectionState},
        },
    };

    #[test]
    fn test_app_state_creation() {
        let app_state = AppState::new();
        assert_eq!(app_state.get_connection_state(), ConnectionState::Disconnected);
        assert!(app_state.get_now_playing().is_none());
    }

    #[test]
    fn test_connection_events_are_broadcast() {
        let app_state = AppState::new();
        let mut receiver = app_state.subscribe();

        assert!(app_state.apply_connection_event(ConnectRequested));
        assert!(app_state.apply_connection_event(Connected));
        assert!(!app_state.apply_connection_event(Connected));

        assert_eq!(
            receiver.try_recv().unwrap(),
            AppStateEvent::ConnectionChanged(ConnectionState::Connecting)
        );
        assert_eq!(
            receiver.try_recv().unwrap(),
            AppStateEvent::ConnectionChanged(ConnectionState::Connected)
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_now_playing_update() {
        let app_state = AppState::new();
        let mut receiver = app_state.subscribe();
        let entry = NowPlaying {
            title: "Teardrop".to_string(),
            artist: "Massive Attack".to_string(),
        };

        app_state.update_now_playing(Some(entry.clone()));
        assert_eq!(app_state.get_now_playing(), Some(entry.clone()));
        assert_eq!(
            receiver.try_recv().unwrap(),
            AppStateEvent::NowPlayingChanged(Some(entry))
        );
    }
}
