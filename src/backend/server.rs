//! Server session management.

use std::{path::PathBuf, sync::Arc};

use {
    parking_lot::RwLock,
    tracing::{debug, info},
};

use crate::{
    backend::memory::{Library, MemoryProvider},
    error::ProviderError,
};

/// Connection lifecycle of the media server.
pub trait ServerManager: Send + Sync {
    /// Connects to the configured server.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the server cannot be reached or rejects the login.
    fn connect(&self) -> Result<(), ProviderError>;

    /// Ends the session, optionally forgetting the stored credentials.
    fn logout(&self, forget_credentials: bool);

    /// Asks the server to rescan its library.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NotConnected` if there is no session.
    fn rescan_library(&self) -> Result<(), ProviderError>;
}

/// "Server" backed by a library catalog file feeding a [`MemoryProvider`].
pub struct LocalLibraryServer {
    library_path: PathBuf,
    provider: Arc<MemoryProvider>,
    connected: RwLock<bool>,
}

impl LocalLibraryServer {
    /// Creates a server over a catalog file.
    ///
    /// # Arguments
    ///
    /// * `library_path` - Catalog file read on connect and rescan
    /// * `provider` - Provider that serves the loaded catalog
    #[must_use]
    pub fn new(library_path: PathBuf, provider: Arc<MemoryProvider>) -> Self {
        Self {
            library_path,
            provider,
            connected: RwLock::new(false),
        }
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.connected.read()
    }
}

impl ServerManager for LocalLibraryServer {
    fn connect(&self) -> Result<(), ProviderError> {
        let library = Library::load(&self.library_path)?;
        self.provider.replace_library(library);
        *self.connected.write() = true;
        info!(path = %self.library_path.display(), "Connected to local library");
        Ok(())
    }

    fn logout(&self, forget_credentials: bool) {
        info!(forget_credentials, "Logging out");
        *self.connected.write() = false;
        self.provider.replace_library(Library::default());
    }

    fn rescan_library(&self) -> Result<(), ProviderError> {
        if !self.is_connected() {
            return Err(ProviderError::NotConnected);
        }
        debug!("Rescanning library");
        let library = Library::load(&self.library_path)?;
        self.provider.replace_library(library);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::write, sync::Arc};

    use tempfile::TempDir;

    use crate::{
        backend::{
            memory::MemoryProvider,
            models::AlbumFilter,
            provider::MediaProvider,
            server::{LocalLibraryServer, ServerManager},
        },
        error::ProviderError,
    };

    #[test]
    fn test_connect_rescan_logout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("library.json");
        write(&path, r#"{"albums":[{"id":"1","name":"One"}]}"#).unwrap();

        let provider = Arc::new(MemoryProvider::default());
        let server = LocalLibraryServer::new(path.clone(), provider.clone());

        assert!(matches!(server.rescan_library(), Err(ProviderError::NotConnected)));

        server.connect().unwrap();
        assert!(server.is_connected());
        assert_eq!(provider.iterate_albums("", &AlbumFilter::default()).count(), 1);

        write(&path, r#"{"albums":[{"id":"1"},{"id":"2"}]}"#).unwrap();
        server.rescan_library().unwrap();
        assert_eq!(provider.iterate_albums("", &AlbumFilter::default()).count(), 2);

        server.logout(true);
        assert!(!server.is_connected());
        assert_eq!(provider.iterate_albums("", &AlbumFilter::default()).count(), 0);
    }

    #[test]
    fn test_connect_fails_on_corrupt_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("library.json");
        write(&path, "{").unwrap();

        let server = LocalLibraryServer::new(path, Arc::new(MemoryProvider::default()));
        assert!(server.connect().is_err());
        assert!(!server.is_connected());
    }
}
