//! Browsing flow tests across adapters, pages and the router.
//!
//! Pages here run on the headless grid model, so the whole navigation path
//! from an item action to back/forward history is exercised without a display.

#[cfg(test)]
mod browsing_flow_tests {
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    use tempfile::TempDir;

    use crate::{
        backend::{
            Album, AlbumFilter, Library, LocalPlayback, MediaProvider, MemoryProvider,
            ProviderCall,
        },
        config::SettingsManager,
        state::AppState,
        ui::{
            browsing::{
                AdapterContext, GridViewPage, GridViewPageAdapter, Page, Route, Router, WidgetPool,
                adapter_for_route, adapters::GenresPageAdapter,
            },
            views::{GridActions, GridViewModel},
        },
    };

    struct Fixture {
        router: Router,
        ctx: AdapterContext,
        provider: Arc<MemoryProvider>,
        requested: Rc<RefCell<Vec<Route>>>,
        _temp_dir: TempDir,
    }

    fn library() -> Library {
        let album = |id: &str, name: &str, genre: &str| Album {
            id: id.to_string(),
            name: name.to_string(),
            artist_id: "ar-1".to_string(),
            artist_name: "Massive Attack".to_string(),
            genres: vec![genre.to_string()],
            ..Album::default()
        };
        Library {
            albums: vec![
                album("al-1", "Mezzanine", "Trip-Hop"),
                album("al-2", "Blue Lines", "Trip-Hop"),
                album("al-3", "Heligoland", "Electronic"),
            ],
            ..Library::default()
        }
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let settings =
            SettingsManager::with_config_path(temp_dir.path().join("settings.json")).unwrap();
        let provider = Arc::new(MemoryProvider::new(library()));
        let requested: Rc<RefCell<Vec<Route>>> = Rc::default();

        let ctx = AdapterContext {
            provider: provider.clone(),
            playback: Arc::new(LocalPlayback::new(provider.clone(), Arc::new(AppState::new()))),
            settings: Arc::new(settings),
            navigate: {
                let requested = requested.clone();
                Rc::new(move |route: Route| requested.borrow_mut().push(route))
            },
        };

        let (factory_ctx, pool) = (ctx.clone(), Rc::new(RefCell::new(WidgetPool::new())));
        let dyn_provider: Arc<dyn MediaProvider> = provider.clone();
        let router = Router::new(Box::new(move |route: &Route| {
            let adapter = adapter_for_route(route, &factory_ctx)?;
            let page = GridViewPage::<GridViewModel>::new(
                adapter,
                pool.clone(),
                dyn_provider.clone(),
                (),
            );
            Some(Box::new(page) as Box<dyn Page>)
        }));

        Fixture {
            router,
            ctx,
            provider,
            requested,
            _temp_dir: temp_dir,
        }
    }

    #[test]
    fn test_genre_drill_down_and_back() {
        let mut fx = fixture();
        fx.router.enable_navigation();
        fx.router.activate_navigation_button(3);
        assert_eq!(fx.router.current_route(), Some(Route::Genres));

        let mut actions = GridActions::default();
        GenresPageAdapter::new(fx.ctx.clone()).connect_grid_actions(&mut actions);
        actions.show_item_page("Trip-Hop");
        let route = fx.requested.borrow_mut().pop().unwrap();
        assert_eq!(route, Route::Genre("Trip-Hop".to_string()));

        fx.router.navigate_to(route).unwrap();
        assert!(fx.router.can_go_back());
        let genre_filter = AlbumFilter {
            genres: vec!["Trip-Hop".to_string()],
            ..AlbumFilter::default()
        };
        assert!(fx.provider.calls().iter().any(
            |call| matches!(call, ProviderCall::Albums { filter, .. } if *filter == genre_filter)
        ));

        assert!(fx.router.go_back());
        assert_eq!(fx.router.current_route(), Some(Route::Genres));
        assert!(fx.router.can_go_forward());
    }

    #[test]
    fn test_detail_routes_are_refused() {
        let mut fx = fixture();
        fx.router.navigate_to(Route::Albums).unwrap();

        assert!(fx.router.navigate_to(Route::Album("al-1".to_string())).is_err());
        assert_eq!(fx.router.current_route(), Some(Route::Albums));
        assert!(!fx.router.can_go_back());
    }

    #[test]
    fn test_genre_page_skips_genre_fetch() {
        let fx = fixture();
        let adapter = adapter_for_route(&Route::Genre("Electronic".to_string()), &fx.ctx).unwrap();
        let page = GridViewPage::<GridViewModel>::new(
            adapter,
            Rc::new(RefCell::new(WidgetPool::new())),
            fx.provider.clone(),
            (),
        );

        assert!(page.genre_filter_disabled());
        assert!(page.load_genres().is_empty());
        assert!(!fx.provider.calls().contains(&ProviderCall::Genres));

        let albums = adapter_for_route(&Route::Albums, &fx.ctx).unwrap();
        let page = GridViewPage::<GridViewModel>::new(
            albums,
            Rc::new(RefCell::new(WidgetPool::new())),
            fx.provider.clone(),
            (),
        );
        assert!(!page.genre_filter_disabled());
        assert_eq!(page.load_genres(), vec!["Electronic", "Trip-Hop"]);
    }
}
