//! Backend collaborators the UI layer talks to.
//!
//! The capabilities here (`MediaProvider`, `ImageManager`, `PlaybackManager`,
//! `ServerManager`, `UpdateChecker`) are the whole boundary of the UI. The
//! concrete types are the in-process implementations the binary runs with: a
//! JSON library catalog, an on-disk cover directory, a bookkeeping playback
//! controller, and a release-feed update checker.

pub mod images;
pub mod memory;
pub mod models;
pub mod playback;
pub mod provider;
pub mod server;
pub mod update;

pub use {
    images::{CoverImage, FileImageManager, ImageLoadHandle, ImageManager},
    memory::{Library, MemoryProvider, ProviderCall},
    models::{Album, AlbumFilter, Artist, Genre, NowPlaying, Playlist},
    playback::{LocalPlayback, PlaybackManager},
    provider::{ALBUM_SORT_ORDERS, ARTIST_SORT_ORDERS, MediaIter, MediaProvider},
    server::{LocalLibraryServer, ServerManager},
    update::{ReleaseFeedChecker, UpdateChecker, UpdateOutcome},
};
