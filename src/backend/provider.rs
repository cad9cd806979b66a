//! The media provider capability.

use crate::{
    backend::models::{Album, AlbumFilter, Artist, Genre, Playlist},
    error::ProviderError,
};

/// Lazily evaluated listing handed out by a provider.
pub type MediaIter<T> = Box<dyn Iterator<Item = T> + Send>;

/// Sort orders understood by [`MediaProvider::iterate_albums`].
pub const ALBUM_SORT_ORDERS: [&str; 5] = [
    "Recently Added",
    "Title (A-Z)",
    "Artist (A-Z)",
    "Year (newest first)",
    "Year (oldest first)",
];

/// Sort orders understood by [`MediaProvider::iterate_artists`].
pub const ARTIST_SORT_ORDERS: [&str; 2] = ["Name (A-Z)", "Album Count"];

/// Read access to a media server's library.
///
/// Listing methods never fail up front; a provider that hits an error while
/// paging ends the iterator early and logs the cause.
pub trait MediaProvider: Send + Sync {
    /// Lists all genres.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the server request fails.
    fn get_genres(&self) -> Result<Vec<Genre>, ProviderError>;

    /// Lists all playlists visible to the user.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the server request fails.
    fn get_playlists(&self) -> Result<Vec<Playlist>, ProviderError>;

    /// Looks up a single album.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the server request fails.
    fn get_album(&self, id: &str) -> Result<Option<Album>, ProviderError>;

    /// Lists albums in the given sort order, narrowed by the filter.
    fn iterate_albums(&self, sort_order: &str, filter: &AlbumFilter) -> MediaIter<Album>;

    /// Lists albums matching a search query, narrowed by the filter.
    fn search_albums(&self, query: &str, filter: &AlbumFilter) -> MediaIter<Album>;

    /// Lists artists in the given sort order.
    fn iterate_artists(&self, sort_order: &str) -> MediaIter<Artist>;

    /// Lists artists matching a search query.
    fn search_artists(&self, query: &str) -> MediaIter<Artist>;
}
