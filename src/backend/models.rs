//! Library entities as delivered by a media provider.

use serde::{Deserialize, Serialize};

/// An album in the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
    /// Provider-assigned identifier.
    pub id: String,
    /// Album title.
    pub name: String,
    /// Identifier of the album artist.
    pub artist_id: String,
    /// Display name of the album artist.
    pub artist_name: String,
    /// Identifier of the cover image, if any.
    pub cover_art_id: String,
    /// Release year.
    pub year: Option<u32>,
    /// Genre names.
    pub genres: Vec<String>,
    /// Whether the user starred the album.
    pub favorite: bool,
    /// Monotonic "added to library" stamp used by the recently-added order.
    pub created: u64,
}

/// An artist in the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    /// Provider-assigned identifier.
    pub id: String,
    /// Artist name.
    pub name: String,
    /// Identifier of the artist image, if any.
    pub cover_art_id: String,
    /// Number of albums by this artist.
    pub album_count: u32,
    /// Whether the user starred the artist.
    pub favorite: bool,
}

/// A playlist on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playlist {
    /// Provider-assigned identifier.
    pub id: String,
    /// Playlist name.
    pub name: String,
    /// Owner user name.
    pub owner: String,
    /// Identifier of the playlist cover, if any.
    pub cover_art_id: String,
    /// Number of tracks.
    pub track_count: u32,
}

/// A genre and how many albums carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    /// Genre name, also its identifier.
    pub name: String,
    /// Number of albums tagged with this genre.
    pub album_count: u32,
}

/// Predicates narrowing an album listing.
///
/// A page carries `Option<AlbumFilter>`: `None` means the page cannot be
/// filtered at all, while `Some(AlbumFilter::default())` means it can be
/// filtered but no predicate is active yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumFilter {
    /// Album must carry at least one of these genres (empty = any).
    pub genres: Vec<String>,
    /// Inclusive lower bound on the release year.
    pub min_year: Option<u32>,
    /// Inclusive upper bound on the release year.
    pub max_year: Option<u32>,
    /// Only starred albums.
    pub favorites_only: bool,
}

impl AlbumFilter {
    /// Whether no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.min_year.is_none()
            && self.max_year.is_none()
            && !self.favorites_only
    }

    /// Whether an album passes every active predicate.
    ///
    /// Albums without a year fail any active year bound.
    #[must_use]
    pub fn matches(&self, album: &Album) -> bool {
        if self.favorites_only && !album.favorite {
            return false;
        }

        if !self.genres.is_empty()
            && !album
                .genres
                .iter()
                .any(|g| self.genres.iter().any(|f| f.eq_ignore_ascii_case(g)))
        {
            return false;
        }

        match (self.min_year, self.max_year, album.year) {
            (None, None, _) => true,
            (_, _, None) => false,
            (min, max, Some(year)) => {
                min.is_none_or(|min| year >= min) && max.is_none_or(|max| year <= max)
            }
        }
    }
}

/// What the player is currently playing, as shown in the window title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// Track or album title.
    pub title: String,
    /// Primary artist name.
    pub artist: String,
}

#[cfg(test)]
mod tests {
    use crate::backend::models::{Album, AlbumFilter};

    fn album(year: Option<u32>, genres: &[&str], favorite: bool) -> Album {
        Album {
            id: "al-1".to_string(),
            name: "Blue Train".to_string(),
            year,
            genres: genres.iter().map(ToString::to_string).collect(),
            favorite,
            ..Album::default()
        }
    }

    #[test]
    fn test_default_filter_is_empty_and_matches_everything() {
        let filter = AlbumFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&album(None, &[], false)));
        assert!(filter.matches(&album(Some(1957), &["Jazz"], true)));
    }

    #[test]
    fn test_genre_filter_is_case_insensitive() {
        let filter = AlbumFilter {
            genres: vec!["jazz".to_string()],
            ..AlbumFilter::default()
        };
        assert!(!filter.is_empty());
        assert!(filter.matches(&album(None, &["Jazz", "Bop"], false)));
        assert!(!filter.matches(&album(None, &["Rock"], false)));
    }

    #[test]
    fn test_year_bounds_are_inclusive_and_reject_unknown_years() {
        let filter = AlbumFilter {
            min_year: Some(1950),
            max_year: Some(1959),
            ..AlbumFilter::default()
        };
        assert!(filter.matches(&album(Some(1950), &[], false)));
        assert!(filter.matches(&album(Some(1959), &[], false)));
        assert!(!filter.matches(&album(Some(1960), &[], false)));
        assert!(!filter.matches(&album(None, &[], false)));
    }

    #[test]
    fn test_favorites_only() {
        let filter = AlbumFilter {
            favorites_only: true,
            ..AlbumFilter::default()
        };
        assert!(filter.matches(&album(None, &[], true)));
        assert!(!filter.matches(&album(None, &[], false)));
    }
}
