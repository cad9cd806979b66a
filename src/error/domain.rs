//! Domain-specific error types using `thiserror`.
//!
//! This module defines the error enums reported by the backend collaborators
//! (media provider, image manager, update checker) and by the UI layer itself.

use std::{io::Error as IoError, result::Result as StdResult};

use {anyhow::Error, serde_json::Error as SerdeJsonError, thiserror::Error};

/// Errors reported by a media provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The library catalog could not be read.
    #[error("Library IO error: {0}")]
    Io(#[from] IoError),
    /// The library catalog could not be parsed.
    #[error("Library format error: {0}")]
    Format(#[from] SerdeJsonError),
    /// The provider is not connected to a server.
    #[error("Not connected to a server")]
    NotConnected,
    /// The server rejected or failed the request.
    #[error("Server error: {reason}")]
    Server { reason: String },
}

/// Errors reported while fetching cover images.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The image could not be read.
    #[error("Image IO error: {0}")]
    Io(#[from] IoError),
    /// The load was cancelled before it completed.
    #[error("Image load cancelled")]
    Cancelled,
}

/// Errors reported by the update checker.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The release feed request failed.
    #[error("Release feed request failed: {0}")]
    Request(String),
    /// The release feed carried no usable tag.
    #[error("Release feed has no tag")]
    MissingTag,
}

impl From<ureq::Error> for UpdateError {
    fn from(err: ureq::Error) -> Self {
        UpdateError::Request(err.to_string())
    }
}

/// UI-related errors.
#[derive(Error, Debug)]
pub enum UiError {
    /// GTK/Libadwaita initialization error.
    #[error("UI initialization error: {0}")]
    InitializationError(String),
    /// Widget creation error.
    #[error("Widget creation error: {0}")]
    WidgetError(String),
    /// No page is registered for a route.
    #[error("No page for route: {0}")]
    UnknownRoute(String),
}

/// Operational error context propagation with `anyhow`.
pub type Result<T> = StdResult<T, Error>;

#[cfg(test)]
mod tests {
    use crate::error::domain::{ImageError, ProviderError, UiError, UpdateError};

    #[test]
    fn test_provider_error_display() {
        assert_eq!(
            ProviderError::NotConnected.to_string(),
            "Not connected to a server"
        );

        let server_error = ProviderError::Server {
            reason: "timeout".to_string(),
        };
        assert_eq!(server_error.to_string(), "Server error: timeout");
    }

    #[test]
    fn test_image_and_update_error_display() {
        assert_eq!(ImageError::Cancelled.to_string(), "Image load cancelled");
        assert_eq!(UpdateError::MissingTag.to_string(), "Release feed has no tag");
        assert_eq!(
            UpdateError::Request("503".to_string()).to_string(),
            "Release feed request failed: 503"
        );
    }

    #[test]
    fn test_ui_error_display() {
        let init_error = UiError::InitializationError("Failed to init GTK".to_string());
        assert_eq!(
            init_error.to_string(),
            "UI initialization error: Failed to init GTK"
        );

        let route_error = UiError::UnknownRoute("Album(42)".to_string());
        assert_eq!(route_error.to_string(), "No page for route: Album(42)");
    }
}
