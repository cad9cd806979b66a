//! Adapters for the album, artist, genre and playlist grids.

use std::{iter::once_with, rc::Rc, sync::Arc};

use crate::{
    backend::{
        ALBUM_SORT_ORDERS, ARTIST_SORT_ORDERS, Album, AlbumFilter, Artist, Genre, MediaProvider,
        PlaybackManager, Playlist,
    },
    config::SettingsManager,
    error::ResultExt,
    ui::{
        browsing::{
            adapter::{ActionButton, GridViewPageAdapter, SortableGridViewPageAdapter},
            router::Route,
        },
        views::grid_model::{GridActions, GridViewItemModel, GridViewIterator},
    },
};

const ALBUM_PLACEHOLDER: &str = "media-optical-symbolic";
const ARTIST_PLACEHOLDER: &str = "avatar-default-symbolic";
const GENRE_PLACEHOLDER: &str = "folder-music-symbolic";
const PLAYLIST_PLACEHOLDER: &str = "view-list-symbolic";
const SHUFFLE_ICON: &str = "media-playlist-shuffle-symbolic";

/// Collaborators shared by every adapter.
#[derive(Clone)]
pub struct AdapterContext {
    /// Library access.
    pub provider: Arc<dyn MediaProvider>,
    /// Playback commands for the play actions.
    pub playback: Arc<dyn PlaybackManager>,
    /// Persisted sort orders.
    pub settings: Arc<SettingsManager>,
    /// Navigation requests from item actions.
    pub navigate: Rc<dyn Fn(Route)>,
}

/// Builds the adapter for a grid route; detail routes have none.
#[must_use]
pub fn adapter_for_route(route: &Route, ctx: &AdapterContext) -> Option<Rc<dyn GridViewPageAdapter>> {
    let adapter: Rc<dyn GridViewPageAdapter> = match route {
        Route::Albums => Rc::new(AlbumsPageAdapter::new(ctx.clone())),
        Route::Favorites => Rc::new(FavoritesPageAdapter::new(ctx.clone())),
        Route::Genre(name) => Rc::new(GenrePageAdapter::new(ctx.clone(), name)),
        Route::Artists => Rc::new(ArtistsPageAdapter::new(ctx.clone())),
        Route::Genres => Rc::new(GenresPageAdapter::new(ctx.clone())),
        Route::Playlists => Rc::new(PlaylistsPageAdapter::new(ctx.clone())),
        Route::Album(_) | Route::Artist(_) | Route::Playlist(_) => return None,
    };
    Some(adapter)
}

fn album_item(album: Album) -> GridViewItemModel {
    GridViewItemModel {
        name: album.name,
        id: album.id,
        cover_art_id: album.cover_art_id,
        secondary: album.artist_name,
        secondary_id: album.artist_id,
    }
}

fn artist_item(artist: Artist) -> GridViewItemModel {
    GridViewItemModel {
        name: artist.name,
        id: artist.id,
        cover_art_id: artist.cover_art_id,
        secondary: album_count_label(artist.album_count),
        secondary_id: String::new(),
    }
}

fn genre_item(genre: Genre) -> GridViewItemModel {
    GridViewItemModel {
        secondary: album_count_label(genre.album_count),
        id: genre.name.clone(),
        name: genre.name,
        cover_art_id: String::new(),
        secondary_id: String::new(),
    }
}

fn playlist_item(playlist: Playlist) -> GridViewItemModel {
    GridViewItemModel {
        name: playlist.name,
        id: playlist.id,
        cover_art_id: playlist.cover_art_id,
        secondary: playlist.owner,
        secondary_id: String::new(),
    }
}

fn album_count_label(count: u32) -> String {
    if count == 1 {
        "1 album".to_string()
    } else {
        format!("{count} albums")
    }
}

fn matches_query(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.to_lowercase())
}

fn shuffle_button(ctx: &AdapterContext) -> ActionButton {
    let playback = ctx.playback.clone();
    ActionButton {
        label: "Shuffle".to_string(),
        icon_name: SHUFFLE_ICON,
        on_clicked: Rc::new(move |filter: &AlbumFilter| playback.shuffle_albums(filter)),
    }
}

fn navigate_with(ctx: &AdapterContext, to_route: fn(String) -> Route) -> Rc<dyn Fn(&str)> {
    let navigate = ctx.navigate.clone();
    Rc::new(move |id: &str| navigate(to_route(id.to_string())))
}

fn connect_album_actions(ctx: &AdapterContext, actions: &mut GridActions) {
    let playback = ctx.playback.clone();
    actions.on_play = Some(Rc::new(move |id: &str| playback.play_album(id, false)));
    actions.on_show_item_page = Some(navigate_with(ctx, Route::Album));
    actions.on_show_secondary_page = Some(navigate_with(ctx, Route::Artist));
}

fn album_iter(ctx: &AdapterContext, sort_order: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
    Box::new(ctx.provider.iterate_albums(sort_order, filter).map(album_item))
}

fn album_search_iter(ctx: &AdapterContext, query: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
    Box::new(ctx.provider.search_albums(query, filter).map(album_item))
}

/// All albums, sortable and filterable.
pub struct AlbumsPageAdapter {
    ctx: AdapterContext,
}

impl AlbumsPageAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }
}

impl GridViewPageAdapter for AlbumsPageAdapter {
    fn title(&self) -> String {
        "Albums".to_string()
    }

    fn filter(&self) -> Option<AlbumFilter> {
        Some(AlbumFilter::default())
    }

    fn placeholder_resource(&self) -> &'static str {
        ALBUM_PLACEHOLDER
    }

    fn route(&self) -> Route {
        Route::Albums
    }

    fn action_button(&self) -> Option<ActionButton> {
        Some(shuffle_button(&self.ctx))
    }

    fn iter(&self, sort_order: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        album_iter(&self.ctx, sort_order, filter)
    }

    fn search_iter(&self, query: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        album_search_iter(&self.ctx, query, filter)
    }

    fn connect_grid_actions(&self, actions: &mut GridActions) {
        connect_album_actions(&self.ctx, actions);
    }

    fn as_sortable(&self) -> Option<&dyn SortableGridViewPageAdapter> {
        Some(self)
    }
}

impl SortableGridViewPageAdapter for AlbumsPageAdapter {
    fn sort_orders(&self) -> (Vec<String>, String) {
        let options = ALBUM_SORT_ORDERS.iter().map(ToString::to_string).collect();
        let selected = self.ctx.settings.get_settings().album_sort_order.clone();
        (options, selected)
    }

    fn save_sort_order(&self, sort_order: &str) {
        self.ctx
            .settings
            .update_with(|s| sort_order.clone_into(&mut s.album_sort_order))
            .or_degrade("saving album sort order");
    }
}

/// Favorite albums.
pub struct FavoritesPageAdapter {
    ctx: AdapterContext,
}

impl FavoritesPageAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }
}

impl GridViewPageAdapter for FavoritesPageAdapter {
    fn title(&self) -> String {
        "Favorites".to_string()
    }

    fn filter(&self) -> Option<AlbumFilter> {
        Some(AlbumFilter {
            favorites_only: true,
            ..AlbumFilter::default()
        })
    }

    fn placeholder_resource(&self) -> &'static str {
        ALBUM_PLACEHOLDER
    }

    fn route(&self) -> Route {
        Route::Favorites
    }

    fn action_button(&self) -> Option<ActionButton> {
        Some(shuffle_button(&self.ctx))
    }

    fn iter(&self, sort_order: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        album_iter(&self.ctx, sort_order, filter)
    }

    fn search_iter(&self, query: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        album_search_iter(&self.ctx, query, filter)
    }

    fn connect_grid_actions(&self, actions: &mut GridActions) {
        connect_album_actions(&self.ctx, actions);
    }
}

/// Albums of one genre.
pub struct GenrePageAdapter {
    ctx: AdapterContext,
    genre: String,
}

impl GenrePageAdapter {
    /// Creates the adapter for a genre.
    #[must_use]
    pub fn new(ctx: AdapterContext, genre: &str) -> Self {
        Self {
            ctx,
            genre: genre.to_string(),
        }
    }
}

impl GridViewPageAdapter for GenrePageAdapter {
    fn title(&self) -> String {
        self.genre.clone()
    }

    fn filter(&self) -> Option<AlbumFilter> {
        Some(AlbumFilter {
            genres: vec![self.genre.clone()],
            ..AlbumFilter::default()
        })
    }

    fn placeholder_resource(&self) -> &'static str {
        ALBUM_PLACEHOLDER
    }

    fn route(&self) -> Route {
        Route::Genre(self.genre.clone())
    }

    fn action_button(&self) -> Option<ActionButton> {
        Some(shuffle_button(&self.ctx))
    }

    fn iter(&self, sort_order: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        album_iter(&self.ctx, sort_order, filter)
    }

    fn search_iter(&self, query: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        album_search_iter(&self.ctx, query, filter)
    }

    fn connect_grid_actions(&self, actions: &mut GridActions) {
        connect_album_actions(&self.ctx, actions);
    }
}

/// All artists, sortable, not filterable.
pub struct ArtistsPageAdapter {
    ctx: AdapterContext,
}

impl ArtistsPageAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }
}

impl GridViewPageAdapter for ArtistsPageAdapter {
    fn title(&self) -> String {
        "Artists".to_string()
    }

    fn filter(&self) -> Option<AlbumFilter> {
        None
    }

    fn placeholder_resource(&self) -> &'static str {
        ARTIST_PLACEHOLDER
    }

    fn route(&self) -> Route {
        Route::Artists
    }

    fn iter(&self, sort_order: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        Box::new(self.ctx.provider.iterate_artists(sort_order).map(artist_item))
    }

    fn search_iter(&self, query: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        Box::new(self.ctx.provider.search_artists(query).map(artist_item))
    }

    fn connect_grid_actions(&self, actions: &mut GridActions) {
        let playback = self.ctx.playback.clone();
        actions.on_play = Some(Rc::new(move |id: &str| playback.play_artist(id)));
        actions.on_show_item_page = Some(navigate_with(&self.ctx, Route::Artist));
    }

    fn as_sortable(&self) -> Option<&dyn SortableGridViewPageAdapter> {
        Some(self)
    }
}

impl SortableGridViewPageAdapter for ArtistsPageAdapter {
    fn sort_orders(&self) -> (Vec<String>, String) {
        let options = ARTIST_SORT_ORDERS.iter().map(ToString::to_string).collect();
        let selected = self.ctx.settings.get_settings().artist_sort_order.clone();
        (options, selected)
    }

    fn save_sort_order(&self, sort_order: &str) {
        self.ctx
            .settings
            .update_with(|s| sort_order.clone_into(&mut s.artist_sort_order))
            .or_degrade("saving artist sort order");
    }
}

/// All genres. The list is fetched when the grid asks for its first batch.
pub struct GenresPageAdapter {
    ctx: AdapterContext,
}

impl GenresPageAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }

    fn genres(&self, query: Option<String>) -> Box<dyn GridViewIterator> {
        let provider = self.ctx.provider.clone();
        Box::new(
            once_with(move || provider.get_genres().or_degrade("loading genres"))
                .flatten()
                .filter(move |genre| query.as_deref().is_none_or(|q| matches_query(&genre.name, q)))
                .map(genre_item),
        )
    }
}

impl GridViewPageAdapter for GenresPageAdapter {
    fn title(&self) -> String {
        "Genres".to_string()
    }

    fn filter(&self) -> Option<AlbumFilter> {
        None
    }

    fn placeholder_resource(&self) -> &'static str {
        GENRE_PLACEHOLDER
    }

    fn route(&self) -> Route {
        Route::Genres
    }

    fn iter(&self, _sort_order: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        self.genres(None)
    }

    fn search_iter(&self, query: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        self.genres(Some(query.to_string()))
    }

    fn connect_grid_actions(&self, actions: &mut GridActions) {
        let playback = self.ctx.playback.clone();
        actions.on_play = Some(Rc::new(move |name: &str| {
            playback.shuffle_albums(&AlbumFilter {
                genres: vec![name.to_string()],
                ..AlbumFilter::default()
            });
        }));
        actions.on_show_item_page = Some(navigate_with(&self.ctx, Route::Genre));
    }
}

/// All playlists. The list is fetched when the grid asks for its first batch.
pub struct PlaylistsPageAdapter {
    ctx: AdapterContext,
}

impl PlaylistsPageAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }

    fn playlists(&self, query: Option<String>) -> Box<dyn GridViewIterator> {
        let provider = self.ctx.provider.clone();
        Box::new(
            once_with(move || provider.get_playlists().or_degrade("loading playlists"))
                .flatten()
                .filter(move |p| query.as_deref().is_none_or(|q| matches_query(&p.name, q)))
                .map(playlist_item),
        )
    }
}

impl GridViewPageAdapter for PlaylistsPageAdapter {
    fn title(&self) -> String {
        "Playlists".to_string()
    }

    fn filter(&self) -> Option<AlbumFilter> {
        None
    }

    fn placeholder_resource(&self) -> &'static str {
        PLAYLIST_PLACEHOLDER
    }

    fn route(&self) -> Route {
        Route::Playlists
    }

    fn iter(&self, _sort_order: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        self.playlists(None)
    }

    fn search_iter(&self, query: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
        self.playlists(Some(query.to_string()))
    }

    fn connect_grid_actions(&self, actions: &mut GridActions) {
        let playback = self.ctx.playback.clone();
        actions.on_play = Some(Rc::new(move |id: &str| playback.play_playlist(id)));
        actions.on_show_item_page = Some(navigate_with(&self.ctx, Route::Playlist));
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    use tempfile::TempDir;

    use crate::{
        backend::{
            Album, AlbumFilter, Genre, Library, LocalPlayback, MemoryProvider, Playlist,
            ProviderCall,
        },
        config::SettingsManager,
        state::AppState,
        ui::{
            browsing::{
                adapter::GridViewPageAdapter,
                adapters::{
                    AdapterContext, AlbumsPageAdapter, GenresPageAdapter, adapter_for_route,
                },
                router::Route,
            },
            views::grid_model::GridActions,
        },
    };

    struct Fixture {
        ctx: AdapterContext,
        provider: Arc<MemoryProvider>,
        app_state: Arc<AppState>,
        routes: Rc<RefCell<Vec<Route>>>,
        _temp_dir: TempDir,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(MemoryProvider::new(Library {
            albums: vec![Album {
                id: "al-1".to_string(),
                name: "Moon Safari".to_string(),
                artist_id: "ar-1".to_string(),
                artist_name: "Air".to_string(),
                genres: vec!["Electronic".to_string()],
                ..Album::default()
            }],
            genres: vec![
                Genre {
                    name: "Electronic".to_string(),
                    album_count: 1,
                },
                Genre {
                    name: "Jazz".to_string(),
                    album_count: 2,
                },
            ],
            playlists: vec![Playlist {
                id: "pl-1".to_string(),
                name: "Evening".to_string(),
                owner: "me".to_string(),
                ..Playlist::default()
            }],
            ..Library::default()
        }));
        let app_state = Arc::new(AppState::new());
        let temp_dir = TempDir::new().unwrap();
        let settings =
            SettingsManager::with_config_path(temp_dir.path().join("settings.json")).unwrap();
        let routes = Rc::new(RefCell::new(Vec::new()));
        let sink = routes.clone();

        Fixture {
            ctx: AdapterContext {
                provider: provider.clone(),
                playback: Arc::new(LocalPlayback::new(provider.clone(), app_state.clone())),
                settings: Arc::new(settings),
                navigate: Rc::new(move |route: Route| sink.borrow_mut().push(route)),
            },
            provider,
            app_state,
            routes,
            _temp_dir: temp_dir,
        }
    }

    #[test]
    fn test_album_items_link_to_artist() {
        let fixture = fixture();
        let adapter = AlbumsPageAdapter::new(fixture.ctx.clone());
        let items = adapter
            .iter("Recently Added", &AlbumFilter::default())
            .next_n(10);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Moon Safari");
        assert_eq!(items[0].secondary, "Air");
        assert_eq!(items[0].secondary_id, "ar-1");
    }

    #[test]
    fn test_album_sort_order_is_persisted() {
        let fixture = fixture();
        let adapter = AlbumsPageAdapter::new(fixture.ctx.clone());
        let sortable = adapter.as_sortable().unwrap();

        let (options, selected) = sortable.sort_orders();
        assert!(options.contains(&"Title (A-Z)".to_string()));
        assert_eq!(selected, "Recently Added");

        sortable.save_sort_order("Title (A-Z)");
        assert_eq!(sortable.sort_orders().1, "Title (A-Z)");
        assert_eq!(
            fixture.ctx.settings.get_settings().album_sort_order,
            "Title (A-Z)"
        );
    }

    #[test]
    fn test_filters_distinguish_unfilterable_pages() {
        let fixture = fixture();
        let filter_of = |route: Route| adapter_for_route(&route, &fixture.ctx).unwrap().filter();

        assert_eq!(filter_of(Route::Albums), Some(AlbumFilter::default()));
        assert!(filter_of(Route::Favorites).unwrap().favorites_only);
        assert_eq!(
            filter_of(Route::Genre("Jazz".to_string())).unwrap().genres,
            vec!["Jazz".to_string()]
        );
        assert_eq!(filter_of(Route::Artists), None);
        assert_eq!(filter_of(Route::Playlists), None);
        assert!(adapter_for_route(&Route::Album("al-1".to_string()), &fixture.ctx).is_none());
    }

    #[test]
    fn test_genre_list_is_fetched_lazily() {
        let fixture = fixture();
        let adapter = GenresPageAdapter::new(fixture.ctx.clone());
        let mut iter = adapter.iter("", &AlbumFilter::default());
        assert!(fixture.provider.calls().is_empty());

        let names: Vec<String> = iter.next_n(10).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Electronic".to_string(), "Jazz".to_string()]);
        assert_eq!(fixture.provider.calls(), vec![ProviderCall::Genres]);

        let found = adapter.search_iter("jaz", &AlbumFilter::default()).next_n(10);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].secondary, "2 albums");
    }

    #[test]
    fn test_genre_failure_yields_empty_grid() {
        let fixture = fixture();
        fixture.provider.set_offline(true);
        let adapter = GenresPageAdapter::new(fixture.ctx.clone());
        assert!(adapter.iter("", &AlbumFilter::default()).next_n(10).is_empty());
    }

    #[test]
    fn test_album_actions() {
        let fixture = fixture();
        let adapter = AlbumsPageAdapter::new(fixture.ctx.clone());
        let mut actions = GridActions::default();
        adapter.connect_grid_actions(&mut actions);

        actions.show_item_page("al-1");
        actions.show_secondary_page("ar-1");
        assert_eq!(
            *fixture.routes.borrow(),
            vec![
                Route::Album("al-1".to_string()),
                Route::Artist("ar-1".to_string())
            ]
        );

        actions.play("al-1");
        assert_eq!(
            fixture.app_state.get_now_playing().map(|n| n.title),
            Some("Moon Safari".to_string())
        );
    }

    #[test]
    fn test_shuffle_button_uses_page_filter() {
        let fixture = fixture();
        let adapter = adapter_for_route(&Route::Favorites, &fixture.ctx).unwrap();
        let button = adapter.action_button().unwrap();
        assert_eq!(button.label, "Shuffle");

        (button.on_clicked)(&adapter.filter().unwrap());
        assert!(fixture.app_state.get_now_playing().is_none());
        assert!(matches!(
            fixture.provider.calls().last(),
            Some(ProviderCall::Albums { filter, .. }) if filter.favorites_only
        ));
    }

    #[test]
    fn test_playlist_items() {
        let fixture = fixture();
        let adapter = adapter_for_route(&Route::Playlists, &fixture.ctx).unwrap();
        let items = adapter.iter("", &AlbumFilter::default()).next_n(10);
        assert_eq!(items[0].name, "Evening");
        assert_eq!(items[0].secondary, "me");
        assert!(items[0].secondary_id.is_empty());
        assert!(adapter.action_button().is_none());
    }
}
