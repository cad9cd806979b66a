//! Server connection state machine.

use tracing::warn;

/// Where the application stands with its media server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No session; the login prompt is shown.
    #[default]
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// A session is established and browsing is enabled.
    Connected,
}

/// Inputs that move the connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The user asked to connect.
    ConnectRequested,
    /// The server accepted the session.
    Connected,
    /// The attempt failed.
    ConnectFailed,
    /// The user logged out or switched servers.
    LoggedOut,
}

impl ConnectionState {
    /// Computes the next state, or `None` if the event is invalid here.
    #[must_use]
    pub fn next(self, event: ConnectionEvent) -> Option<ConnectionState> {
        use {ConnectionEvent as E, ConnectionState as S};

        match (self, event) {
            (S::Disconnected, E::ConnectRequested) => Some(S::Connecting),
            (S::Connecting, E::Connected) => Some(S::Connected),
            (S::Connecting, E::ConnectFailed) => Some(S::Disconnected),
            (S::Connected | S::Connecting, E::LoggedOut) => Some(S::Disconnected),
            (state, event) => {
                warn!(?state, ?event, "Ignoring invalid connection transition");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::state::connection::{
        ConnectionEvent::{ConnectFailed, ConnectRequested, Connected, LoggedOut},
        ConnectionState,
    };

    #[test]
    fn test_happy_path() {
        let state = ConnectionState::default();
        let state = state.next(ConnectRequested).unwrap();
        assert_eq!(state, ConnectionState::Connecting);
        let state = state.next(Connected).unwrap();
        assert_eq!(state, ConnectionState::Connected);
        assert_eq!(state.next(LoggedOut), Some(ConnectionState::Disconnected));
    }

    #[test]
    fn test_failed_attempt_returns_to_disconnected() {
        assert_eq!(
            ConnectionState::Connecting.next(ConnectFailed),
            Some(ConnectionState::Disconnected)
        );
    }

    #[test]
    fn test_invalid_transitions() {
        assert_eq!(ConnectionState::Disconnected.next(Connected), None);
        assert_eq!(ConnectionState::Connected.next(ConnectRequested), None);
        assert_eq!(ConnectionState::Disconnected.next(LoggedOut), None);
    }
}
