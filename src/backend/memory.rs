//! In-process media provider backed by a JSON library catalog.
//!
//! The catalog is loaded once per connect (and again on rescan) and served
//! from memory. Every request is recorded so callers can observe exactly
//! which listings the UI asked for.

use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::Path,
};

use {
    parking_lot::{Mutex, RwLock},
    serde::{Deserialize, Serialize},
    tracing::{debug, info},
};

use crate::{
    backend::{
        models::{Album, AlbumFilter, Artist, Genre, Playlist},
        provider::{MediaIter, MediaProvider},
    },
    error::ProviderError,
};

/// The whole library as stored in the catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Library {
    /// All albums.
    pub albums: Vec<Album>,
    /// All artists.
    pub artists: Vec<Artist>,
    /// All playlists.
    pub playlists: Vec<Playlist>,
    /// Explicit genre list; derived from album tags when empty.
    pub genres: Vec<Genre>,
}

impl Library {
    /// Loads a catalog file. A missing file is an empty library.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        if !path.exists() {
            info!(path = %path.display(), "Library catalog not found, starting empty");
            return Ok(Library::default());
        }

        let contents = read_to_string(path)?;
        let library: Library = serde_json::from_str(&contents)?;
        debug!(
            albums = library.albums.len(),
            artists = library.artists.len(),
            playlists = library.playlists.len(),
            "Loaded library catalog"
        );
        Ok(library)
    }
}

/// A request the provider served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// `get_genres`
    Genres,
    /// `get_playlists`
    Playlists,
    /// `get_album`
    Album(String),
    /// `iterate_albums`
    Albums {
        /// Requested sort order.
        sort_order: String,
        /// Requested filter.
        filter: AlbumFilter,
    },
    /// `search_albums`
    SearchAlbums {
        /// Search query.
        query: String,
        /// Requested filter.
        filter: AlbumFilter,
    },
    /// `iterate_artists`
    Artists {
        /// Requested sort order.
        sort_order: String,
    },
    /// `search_artists`
    SearchArtists {
        /// Search query.
        query: String,
    },
}

/// Media provider serving a [`Library`] from memory.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    library: RwLock<Library>,
    calls: Mutex<Vec<ProviderCall>>,
    offline: RwLock<bool>,
}

impl MemoryProvider {
    /// Creates a provider serving the given library.
    #[must_use]
    pub fn new(library: Library) -> Self {
        Self {
            library: RwLock::new(library),
            calls: Mutex::new(Vec::new()),
            offline: RwLock::new(false),
        }
    }

    /// Replaces the served library.
    pub fn replace_library(&self, library: Library) {
        *self.library.write() = library;
    }

    /// Returns every request served so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    /// Makes the fallible requests fail with `ProviderError::NotConnected`.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().push(call);
    }

    fn ensure_online(&self) -> Result<(), ProviderError> {
        if *self.offline.read() {
            return Err(ProviderError::NotConnected);
        }
        Ok(())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn sort_albums(albums: &mut [Album], sort_order: &str) {
    match sort_order {
        "Title (A-Z)" => albums.sort_by_key(|a| a.name.to_lowercase()),
        "Artist (A-Z)" => albums.sort_by(|a, b| {
            a.artist_name
                .to_lowercase()
                .cmp(&b.artist_name.to_lowercase())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }),
        "Year (newest first)" => albums.sort_by(|a, b| b.year.cmp(&a.year)),
        "Year (oldest first)" => albums.sort_by(|a, b| a.year.cmp(&b.year)),
        // "Recently Added" and anything unknown
        _ => albums.sort_by(|a, b| b.created.cmp(&a.created)),
    }
}

impl MediaProvider for MemoryProvider {
    fn get_genres(&self) -> Result<Vec<Genre>, ProviderError> {
        self.record(ProviderCall::Genres);
        self.ensure_online()?;
        let library = self.library.read();
        if !library.genres.is_empty() {
            return Ok(library.genres.clone());
        }

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for genre in library.albums.iter().flat_map(|a| a.genres.iter()) {
            *counts.entry(genre.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(name, album_count)| Genre {
                name: name.to_string(),
                album_count,
            })
            .collect())
    }

    fn get_playlists(&self) -> Result<Vec<Playlist>, ProviderError> {
        self.record(ProviderCall::Playlists);
        self.ensure_online()?;
        Ok(self.library.read().playlists.clone())
    }

    fn get_album(&self, id: &str) -> Result<Option<Album>, ProviderError> {
        self.record(ProviderCall::Album(id.to_string()));
        self.ensure_online()?;
        Ok(self.library.read().albums.iter().find(|a| a.id == id).cloned())
    }

    fn iterate_albums(&self, sort_order: &str, filter: &AlbumFilter) -> MediaIter<Album> {
        self.record(ProviderCall::Albums {
            sort_order: sort_order.to_string(),
            filter: filter.clone(),
        });
        let mut albums: Vec<Album> = self
            .library
            .read()
            .albums
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        sort_albums(&mut albums, sort_order);
        Box::new(albums.into_iter())
    }

    fn search_albums(&self, query: &str, filter: &AlbumFilter) -> MediaIter<Album> {
        self.record(ProviderCall::SearchAlbums {
            query: query.to_string(),
            filter: filter.clone(),
        });
        let albums: Vec<Album> = self
            .library
            .read()
            .albums
            .iter()
            .filter(|a| filter.matches(a))
            .filter(|a| contains_ignore_case(&a.name, query) || contains_ignore_case(&a.artist_name, query))
            .cloned()
            .collect();
        Box::new(albums.into_iter())
    }

    fn iterate_artists(&self, sort_order: &str) -> MediaIter<Artist> {
        self.record(ProviderCall::Artists {
            sort_order: sort_order.to_string(),
        });
        let mut artists = self.library.read().artists.clone();
        match sort_order {
            "Album Count" => artists.sort_by(|a, b| b.album_count.cmp(&a.album_count)),
            _ => artists.sort_by_key(|a| a.name.to_lowercase()),
        }
        Box::new(artists.into_iter())
    }

    fn search_artists(&self, query: &str) -> MediaIter<Artist> {
        self.record(ProviderCall::SearchArtists {
            query: query.to_string(),
        });
        let artists: Vec<Artist> = self
            .library
            .read()
            .artists
            .iter()
            .filter(|a| contains_ignore_case(&a.name, query))
            .cloned()
            .collect();
        Box::new(artists.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::TempDir;

    use crate::backend::{
        memory::{Library, MemoryProvider, ProviderCall},
        models::{Album, AlbumFilter, Artist},
        provider::MediaProvider,
    };

    fn sample_library() -> Library {
        let album = |id: &str, name: &str, artist: &str, year: u32, created: u64, genre: &str| Album {
            id: id.to_string(),
            name: name.to_string(),
            artist_name: artist.to_string(),
            year: Some(year),
            created,
            genres: vec![genre.to_string()],
            ..Album::default()
        };

        Library {
            albums: vec![
                album("1", "Moon Safari", "Air", 1998, 3, "Electronic"),
                album("2", "Blue Train", "John Coltrane", 1957, 1, "Jazz"),
                album("3", "Kind of Blue", "Miles Davis", 1959, 2, "Jazz"),
            ],
            artists: vec![
                Artist {
                    id: "a1".to_string(),
                    name: "Miles Davis".to_string(),
                    album_count: 1,
                    ..Artist::default()
                },
                Artist {
                    id: "a2".to_string(),
                    name: "Air".to_string(),
                    album_count: 4,
                    ..Artist::default()
                },
            ],
            ..Library::default()
        }
    }

    #[test]
    fn test_album_sort_orders() {
        let provider = MemoryProvider::new(sample_library());

        let recent: Vec<String> = provider
            .iterate_albums("Recently Added", &AlbumFilter::default())
            .map(|a| a.id)
            .collect();
        assert_eq!(recent, ["1", "3", "2"]);

        let by_title: Vec<String> = provider
            .iterate_albums("Title (A-Z)", &AlbumFilter::default())
            .map(|a| a.id)
            .collect();
        assert_eq!(by_title, ["2", "3", "1"]);

        let oldest: Vec<String> = provider
            .iterate_albums("Year (oldest first)", &AlbumFilter::default())
            .map(|a| a.id)
            .collect();
        assert_eq!(oldest, ["2", "3", "1"]);
    }

    #[test]
    fn test_search_matches_title_or_artist() {
        let provider = MemoryProvider::new(sample_library());

        let hits: Vec<String> = provider
            .search_albums("moon", &AlbumFilter::default())
            .map(|a| a.id)
            .collect();
        assert_eq!(hits, ["1"]);

        let by_artist: Vec<String> = provider
            .search_albums("davis", &AlbumFilter::default())
            .map(|a| a.id)
            .collect();
        assert_eq!(by_artist, ["3"]);
    }

    #[test]
    fn test_genres_are_derived_from_albums() {
        let provider = MemoryProvider::new(sample_library());
        let genres = provider.get_genres().unwrap();

        assert_eq!(genres.len(), 2);
        assert_eq!(genres[0].name, "Electronic");
        assert_eq!(genres[1].name, "Jazz");
        assert_eq!(genres[1].album_count, 2);
    }

    #[test]
    fn test_artist_orders() {
        let provider = MemoryProvider::new(sample_library());
        let by_count: Vec<String> = provider.iterate_artists("Album Count").map(|a| a.name).collect();
        assert_eq!(by_count, ["Air", "Miles Davis"]);
    }

    #[test]
    fn test_calls_are_recorded_in_order() {
        let provider = MemoryProvider::new(sample_library());
        let _ = provider.iterate_albums("Title (A-Z)", &AlbumFilter::default());
        let _ = provider.search_artists("air");

        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::Albums {
                    sort_order: "Title (A-Z)".to_string(),
                    filter: AlbumFilter::default(),
                },
                ProviderCall::SearchArtists {
                    query: "air".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_library_load() {
        let temp_dir = TempDir::new().unwrap();

        let missing = Library::load(&temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(missing, Library::default());

        let path = temp_dir.path().join("library.json");
        write(&path, r#"{"albums":[{"id":"9","name":"Selected Ambient Works"}]}"#).unwrap();
        let library = Library::load(&path).unwrap();
        assert_eq!(library.albums.len(), 1);
        assert_eq!(library.albums[0].name, "Selected Ambient Works");

        write(&path, "not json").unwrap();
        assert!(Library::load(&path).is_err());
    }

    #[test]
    fn test_offline_provider_fails_lookups() {
        let provider = MemoryProvider::new(sample_library());
        provider.set_offline(true);
        assert!(provider.get_genres().is_err());
        assert!(provider.get_playlists().is_err());
        assert!(provider.get_album("1").is_err());

        provider.set_offline(false);
        assert!(provider.get_album("1").unwrap().is_some());
    }
}
