//! The playback capability and a bookkeeping implementation.
//!
//! Audio output is not part of this crate. `LocalPlayback` tracks what was
//! asked to play, the transport state, and the volume, and publishes the
//! now-playing entry through `AppState` so the window title follows it.

use std::sync::Arc;

use {
    parking_lot::RwLock,
    tracing::{debug, info, warn},
};

use crate::{
    backend::{
        models::{AlbumFilter, NowPlaying},
        provider::MediaProvider,
    },
    state::AppState,
};

/// Lowest volume accepted by [`PlaybackManager::set_volume`].
pub const MIN_VOLUME: i32 = 0;
/// Highest volume accepted by [`PlaybackManager::set_volume`].
pub const MAX_VOLUME: i32 = 100;

/// Playback commands issued by the UI.
pub trait PlaybackManager: Send + Sync {
    /// Replaces the queue with an album and starts playing.
    fn play_album(&self, album_id: &str, shuffle: bool);

    /// Replaces the queue with an artist's albums and starts playing.
    fn play_artist(&self, artist_id: &str);

    /// Replaces the queue with a playlist and starts playing.
    fn play_playlist(&self, playlist_id: &str);

    /// Replaces the queue with albums matching the filter, shuffled.
    fn shuffle_albums(&self, filter: &AlbumFilter);

    /// Toggles between playing and paused.
    fn play_pause(&self);

    /// Seeks to the start of the track, or to the previous track near the start.
    fn seek_back_or_previous(&self);

    /// Skips to the next track.
    fn seek_next(&self);

    /// Current volume in percent.
    fn volume(&self) -> i32;

    /// Sets the volume, clamped to `MIN_VOLUME..=MAX_VOLUME`.
    fn set_volume(&self, volume: i32);
}

#[derive(Debug)]
struct PlaybackStatus {
    volume: i32,
    playing: bool,
    now_playing: Option<NowPlaying>,
}

/// Playback manager that records state without producing audio.
pub struct LocalPlayback {
    provider: Arc<dyn MediaProvider>,
    app_state: Arc<AppState>,
    status: RwLock<PlaybackStatus>,
}

impl LocalPlayback {
    /// Creates a playback manager resolving items through the provider.
    ///
    /// # Arguments
    ///
    /// * `provider` - Media provider used to look up queued items
    /// * `app_state` - State hub that receives now-playing changes
    #[must_use]
    pub fn new(provider: Arc<dyn MediaProvider>, app_state: Arc<AppState>) -> Self {
        Self {
            provider,
            app_state,
            status: RwLock::new(PlaybackStatus {
                volume: MAX_VOLUME,
                playing: false,
                now_playing: None,
            }),
        }
    }

    /// Whether the transport is currently playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status.read().playing
    }

    fn start(&self, now_playing: Option<NowPlaying>) {
        let Some(now_playing) = now_playing else {
            warn!("Nothing to play");
            return;
        };

        info!(title = %now_playing.title, artist = %now_playing.artist, "Starting playback");
        {
            let mut status = self.status.write();
            status.playing = true;
            status.now_playing = Some(now_playing.clone());
        }
        self.app_state.update_now_playing(Some(now_playing));
    }
}

impl PlaybackManager for LocalPlayback {
    fn play_album(&self, album_id: &str, shuffle: bool) {
        debug!(album_id, shuffle, "Play album");
        let album = match self.provider.get_album(album_id) {
            Ok(album) => album,
            Err(e) => {
                warn!(album_id, error = %e, "Failed to look up album");
                None
            }
        };
        self.start(album.map(|a| NowPlaying {
            title: a.name,
            artist: a.artist_name,
        }));
    }

    fn play_artist(&self, artist_id: &str) {
        debug!(artist_id, "Play artist");
        let first = self
            .provider
            .iterate_albums("Recently Added", &AlbumFilter::default())
            .find(|a| a.artist_id == artist_id);
        self.start(first.map(|a| NowPlaying {
            title: a.name,
            artist: a.artist_name,
        }));
    }

    fn play_playlist(&self, playlist_id: &str) {
        debug!(playlist_id, "Play playlist");
        let playlist = match self.provider.get_playlists() {
            Ok(playlists) => playlists.into_iter().find(|p| p.id == playlist_id),
            Err(e) => {
                warn!(playlist_id, error = %e, "Failed to look up playlist");
                None
            }
        };
        self.start(playlist.map(|p| NowPlaying {
            title: p.name,
            artist: p.owner,
        }));
    }

    fn shuffle_albums(&self, filter: &AlbumFilter) {
        debug!(?filter, "Shuffle albums");
        let first = self.provider.iterate_albums("Recently Added", filter).next();
        self.start(first.map(|a| NowPlaying {
            title: a.name,
            artist: a.artist_name,
        }));
    }

    fn play_pause(&self) {
        let mut status = self.status.write();
        if status.now_playing.is_none() {
            debug!("Play/pause ignored, nothing queued");
            return;
        }
        status.playing = !status.playing;
        debug!(playing = status.playing, "Play/pause toggled");
    }

    fn seek_back_or_previous(&self) {
        debug!("Seek back or previous");
    }

    fn seek_next(&self) {
        debug!("Seek next");
    }

    fn volume(&self) -> i32 {
        self.status.read().volume
    }

    fn set_volume(&self, volume: i32) {
        let clamped = volume.clamp(MIN_VOLUME, MAX_VOLUME);
        debug!(requested = volume, volume = clamped, "Set volume");
        self.status.write().volume = clamped;
    }
}
