//! User preference management with XDG Base Directory compliance.
//!
//! This module provides user settings management with proper XDG directory
//! usage for config and cache files.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

/// Environment variable overriding the library catalog location.
pub const LIBRARY_PATH_ENV: &str = "TONEARM_LIBRARY";

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Page shown once a server connection is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartupPage {
    /// The album grid.
    #[default]
    Albums,
    /// Favorite albums.
    Favorites,
    /// The playlist grid.
    Playlists,
}

impl StartupPage {
    /// All startup pages in preference-dialog order.
    pub const ALL: [StartupPage; 3] = [
        StartupPage::Albums,
        StartupPage::Favorites,
        StartupPage::Playlists,
    ];

    /// Display label used in the preferences dialog.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StartupPage::Albums => "Albums",
            StartupPage::Favorites => "Favorites",
            StartupPage::Playlists => "Playlists",
        }
    }

    /// Parses a display label back into a startup page.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` for an unknown label.
    pub fn from_label(label: &str) -> Result<Self, SettingsError> {
        Self::ALL
            .into_iter()
            .find(|page| page.label() == label)
            .ok_or_else(|| SettingsError::InvalidValue {
                reason: format!("unknown startup page {label:?}"),
            })
    }
}

/// Serializable user settings structure with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Page navigated to after connecting.
    pub startup_page: StartupPage,
    /// Whether to install the system tray menu when the host supports one.
    pub enable_system_tray: bool,
    /// Whether the close-window shortcut hides to the tray instead of doing nothing.
    pub close_to_system_tray: bool,
    /// Last release tag the user was told about.
    pub last_checked_version: Option<String>,
    /// Persisted sort order of the album grid.
    pub album_sort_order: String,
    /// Persisted sort order of the artist grid.
    pub artist_sort_order: String,
    /// Theme preference (system/light/dark).
    pub theme_preference: String,
    /// Library catalog location, overriding the default config-dir file.
    pub library_path: Option<String>,
    /// Main window width in pixels.
    pub window_width: i32,
    /// Main window height in pixels.
    pub window_height: i32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            startup_page: StartupPage::Albums,
            enable_system_tray: true,
            close_to_system_tray: false,
            last_checked_version: None,
            album_sort_order: "Recently Added".to_string(),
            artist_sort_order: "Name (A-Z)".to_string(),
            theme_preference: "system".to_string(),
            library_path: None,
            window_width: 1200,
            window_height: 800,
        }
    }
}

/// Handles loading, saving, and validation of user preferences.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe user settings storage.
    settings: RwLock<UserSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Custom path for the settings file
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            from_str(&contents)?
        } else {
            debug!("Creating new default settings file: {:?}", config_path);
            UserSettings::default()
        };

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Replaces the settings and saves them to disk.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be saved to disk.
    pub fn update_settings(&self, new_settings: UserSettings) -> Result<(), SettingsError> {
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    /// Applies an in-place edit to the settings and saves them to disk.
    ///
    /// # Arguments
    ///
    /// * `edit` - Mutation applied under the write lock
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be saved to disk.
    pub fn update_with<F>(&self, edit: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut UserSettings),
    {
        edit(&mut self.settings.write());
        self.save_settings()
    }

    /// Saves the current settings to disk.
    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Ensures proper XDG directory usage for config and cache files.
///
/// # Returns
///
/// The path to the configuration file.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("tonearm");
    config_dir.push("settings.json");
    config_dir
}

/// Gets the cache directory path.
#[must_use]
pub fn get_cache_dir() -> PathBuf {
    let mut cache_dir = get_xdg_cache_home();
    cache_dir.push("tonearm");
    cache_dir
}

/// Resolves the library catalog location.
///
/// Precedence: `TONEARM_LIBRARY`, then the `library_path` setting, then
/// `library.json` next to the settings file.
#[must_use]
pub fn get_library_path(settings: &UserSettings) -> PathBuf {
    if let Ok(path) = var(LIBRARY_PATH_ENV)
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }

    if let Some(path) = &settings.library_path {
        return PathBuf::from(path);
    }

    let mut path = get_xdg_config_home();
    path.push("tonearm");
    path.push("library.json");
    path
}

/// Gets the XDG config home directory following XDG Base Directory specification.
///
/// Uses `XDG_CONFIG_HOME` environment variable if set, otherwise defaults to $HOME/.config
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}

/// Gets the XDG cache home directory following XDG Base Directory specification.
///
/// Uses `XDG_CACHE_HOME` environment variable if set, otherwise defaults to $HOME/.cache
fn get_xdg_cache_home() -> PathBuf {
    if let Ok(cache_home) = var("XDG_CACHE_HOME")
        && !cache_home.is_empty()
    {
        return PathBuf::from(cache_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".cache");
        return path;
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind::NotFound};

    use {
        serde_json::{from_str, to_string},
        tempfile::TempDir,
    };

    use crate::config::settings::{SettingsError, SettingsManager, StartupPage, UserSettings};

    #[test]
    fn test_user_settings_default() {
        let settings = UserSettings::default();
        assert_eq!(settings.startup_page, StartupPage::Albums);
        assert!(settings.enable_system_tray);
        assert!(!settings.close_to_system_tray);
        assert!(settings.last_checked_version.is_none());
        assert_eq!(settings.album_sort_order, "Recently Added");
        assert_eq!(settings.theme_preference, "system");
    }

    #[test]
    fn test_user_settings_serialization() {
        let settings = UserSettings {
            startup_page: StartupPage::Playlists,
            close_to_system_tray: true,
            last_checked_version: Some("v0.9.0".to_string()),
            album_sort_order: "Title (A-Z)".to_string(),
            ..UserSettings::default()
        };

        let serialized = to_string(&settings).unwrap();
        let deserialized: UserSettings = from_str(&serialized).unwrap();
        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: UserSettings = from_str(r#"{"startup_page":"Favorites"}"#).unwrap();
        assert_eq!(settings.startup_page, StartupPage::Favorites);
        assert_eq!(settings.artist_sort_order, "Name (A-Z)");
        assert!(settings.enable_system_tray);
    }

    #[test]
    fn test_update_with_persists_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        let manager = SettingsManager::with_config_path(path.clone()).unwrap();
        manager
            .update_with(|s| s.last_checked_version = Some("v1.2.0".to_string()))
            .unwrap();

        let reloaded = SettingsManager::with_config_path(path).unwrap();
        assert_eq!(
            reloaded.get_settings().last_checked_version.as_deref(),
            Some("v1.2.0")
        );
    }

    #[test]
    fn test_startup_page_labels_round_trip() {
        for page in StartupPage::ALL {
            assert_eq!(StartupPage::from_label(page.label()).unwrap(), page);
        }
        assert!(matches!(
            StartupPage::from_label("Tracks"),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_settings_error_display() {
        let io_error = Error::new(NotFound, "File not found");
        let settings_error = SettingsError::IoError(io_error);
        assert!(settings_error.to_string().contains("IO error"));

        let invalid_value_error = SettingsError::InvalidValue {
            reason: "test reason".to_string(),
        };
        assert_eq!(
            invalid_value_error.to_string(),
            "Invalid settings value: test reason"
        );
    }
}
