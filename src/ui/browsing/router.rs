//! Page routing with back/forward history.
//!
//! Leaving a page freezes it into a [`SavedPage`], which gives its widgets back
//! to the pool. Going back or forward restores the saved page instead of
//! building a new one, so no data is fetched again.

use std::fmt::{Display, Formatter, Result as FmtResult};

use {
    libadwaita::gtk::Widget,
    tracing::{debug, warn},
};

use crate::error::UiError;

/// A browsable destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// All albums.
    Albums,
    /// All artists.
    Artists,
    /// Favorite albums.
    Favorites,
    /// All genres.
    Genres,
    /// Albums of one genre.
    Genre(String),
    /// All playlists.
    Playlists,
    /// One album.
    Album(String),
    /// One artist.
    Artist(String),
    /// One playlist.
    Playlist(String),
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Route::Albums => write!(f, "albums"),
            Route::Artists => write!(f, "artists"),
            Route::Favorites => write!(f, "favorites"),
            Route::Genres => write!(f, "genres"),
            Route::Genre(name) => write!(f, "genre/{name}"),
            Route::Playlists => write!(f, "playlists"),
            Route::Album(id) => write!(f, "album/{id}"),
            Route::Artist(id) => write!(f, "artist/{id}"),
            Route::Playlist(id) => write!(f, "playlist/{id}"),
        }
    }
}

/// Destinations of the navigation buttons, in button order.
///
/// There are no Now Playing or Tracks pages, so Favorites is the first
/// button and `<Control>1` opens it. `<Control>6` and `<Control>7` have no
/// button and do nothing.
pub const NAVIGATION_ROUTES: [Route; 5] = [
    Route::Favorites,
    Route::Albums,
    Route::Artists,
    Route::Genres,
    Route::Playlists,
];

/// A live page shown in the browsing pane.
pub trait Page {
    /// Route the page was built for.
    fn route(&self) -> Route;

    /// Detaches the page, releasing its widgets.
    fn save(self: Box<Self>) -> Box<dyn SavedPage>;

    /// Fetches the page contents again.
    fn reload(&mut self);

    /// Focuses the search box. Returns `false` if the page has none.
    fn focus_search(&self) -> bool {
        false
    }

    /// Selects every item on the page.
    fn select_all(&mut self) {}

    /// Root widget, for pages that have one.
    fn widget(&self) -> Option<Widget> {
        None
    }
}

/// A detached page kept in the history.
pub trait SavedPage {
    /// Route of the detached page.
    fn route(&self) -> Route;

    /// Rebuilds the live page.
    fn restore(self: Box<Self>) -> Box<dyn Page>;
}

/// Builds the page for a route, or `None` when the route has no page.
pub type PageFactory = Box<dyn Fn(&Route) -> Option<Box<dyn Page>>>;

/// Observer of page switches.
pub type PageChanged = Box<dyn Fn(Option<&dyn Page>)>;

/// Current page plus back and forward history.
pub struct Router {
    factory: PageFactory,
    current: Option<Box<dyn Page>>,
    back: Vec<Box<dyn SavedPage>>,
    forward: Vec<Box<dyn SavedPage>>,
    navigation_enabled: bool,
    on_page_changed: Option<PageChanged>,
}

impl Router {
    /// Creates a router with no page and navigation disabled.
    ///
    /// # Arguments
    ///
    /// * `factory` - Builds pages for routes
    #[must_use]
    pub fn new(factory: PageFactory) -> Self {
        Self {
            factory,
            current: None,
            back: Vec::new(),
            forward: Vec::new(),
            navigation_enabled: false,
            on_page_changed: None,
        }
    }

    /// Registers the observer called after every page switch.
    pub fn connect_page_changed(&mut self, on_page_changed: PageChanged) {
        self.on_page_changed = Some(on_page_changed);
    }

    /// Route of the current page.
    #[must_use]
    pub fn current_route(&self) -> Option<Route> {
        self.current.as_ref().map(|page| page.route())
    }

    /// The current page.
    #[must_use]
    pub fn current_page(&self) -> Option<&dyn Page> {
        self.current.as_deref()
    }

    /// Whether there is a page to go back to.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    /// Whether there is a page to go forward to.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Shows the page for a route, pushing the current page onto the back stack.
    ///
    /// Navigating to the route already shown does nothing.
    ///
    /// # Errors
    ///
    /// Returns `UiError::UnknownRoute` if no page exists for the route; the
    /// current page stays in place.
    pub fn navigate_to(&mut self, route: Route) -> Result<(), UiError> {
        if self.current_route().as_ref() == Some(&route) {
            debug!(%route, "Already on route");
            return Ok(());
        }

        let Some(page) = (self.factory)(&route) else {
            warn!(%route, "No page for route");
            return Err(UiError::UnknownRoute(route.to_string()));
        };

        debug!(%route, "Navigating");
        if let Some(current) = self.current.take() {
            self.back.push(current.save());
        }
        self.forward.clear();
        self.current = Some(page);
        self.notify();
        Ok(())
    }

    /// Restores the previous page. Returns `false` if the back stack is empty.
    pub fn go_back(&mut self) -> bool {
        let Some(saved) = self.back.pop() else {
            return false;
        };
        debug!(route = %saved.route(), "Going back");
        if let Some(current) = self.current.take() {
            self.forward.push(current.save());
        }
        self.current = Some(saved.restore());
        self.notify();
        true
    }

    /// Restores the next page. Returns `false` if the forward stack is empty.
    pub fn go_forward(&mut self) -> bool {
        let Some(saved) = self.forward.pop() else {
            return false;
        };
        debug!(route = %saved.route(), "Going forward");
        if let Some(current) = self.current.take() {
            self.back.push(current.save());
        }
        self.current = Some(saved.restore());
        self.notify();
        true
    }

    /// Reloads the current page.
    pub fn reload(&mut self) {
        if let Some(page) = self.current.as_mut() {
            page.reload();
        }
    }

    /// Replaces the current page without recording history.
    pub fn set_page(&mut self, page: Option<Box<dyn Page>>) {
        if let Some(current) = self.current.take() {
            // Saving releases the page's pooled widgets.
            drop(current.save());
        }
        self.current = page;
        self.notify();
    }

    /// Drops the back and forward history.
    pub fn clear_history(&mut self) {
        self.back.clear();
        self.forward.clear();
    }

    /// Focuses the current page's search box.
    pub fn focus_search(&self) -> bool {
        self.current.as_ref().is_some_and(|page| page.focus_search())
    }

    /// Selects all items on the current page.
    pub fn select_all(&mut self) {
        if let Some(page) = self.current.as_mut() {
            page.select_all();
        }
    }

    /// Enables the navigation buttons.
    pub fn enable_navigation(&mut self) {
        self.navigation_enabled = true;
    }

    /// Disables the navigation buttons.
    pub fn disable_navigation(&mut self) {
        self.navigation_enabled = false;
    }

    /// Whether the navigation buttons are enabled.
    #[must_use]
    pub fn is_navigation_enabled(&self) -> bool {
        self.navigation_enabled
    }

    /// Navigates to the destination of the `index`-th navigation button.
    ///
    /// Ignored while navigation is disabled or if no such button exists.
    pub fn activate_navigation_button(&mut self, index: usize) {
        if !self.navigation_enabled {
            debug!(index, "Navigation disabled");
            return;
        }
        let Some(route) = NAVIGATION_ROUTES.get(index).cloned() else {
            debug!(index, "No navigation button");
            return;
        };
        // Unknown routes are already logged by navigate_to.
        let _ = self.navigate_to(route);
    }

    fn notify(&self) {
        if let Some(on_page_changed) = &self.on_page_changed {
            on_page_changed(self.current.as_deref());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::{
        error::UiError,
        ui::browsing::router::{Page, Route, Router, SavedPage},
    };

    #[derive(Default)]
    struct Log {
        saves: Vec<Route>,
        restores: Vec<Route>,
        reloads: usize,
    }

    struct StubPage {
        route: Route,
        log: Rc<RefCell<Log>>,
    }

    struct StubSaved {
        route: Route,
        log: Rc<RefCell<Log>>,
    }

    impl Page for StubPage {
        fn route(&self) -> Route {
            self.route.clone()
        }

        fn save(self: Box<Self>) -> Box<dyn SavedPage> {
            self.log.borrow_mut().saves.push(self.route.clone());
            Box::new(StubSaved {
                route: self.route,
                log: self.log,
            })
        }

        fn reload(&mut self) {
            self.log.borrow_mut().reloads += 1;
        }

        fn focus_search(&self) -> bool {
            true
        }
    }

    impl SavedPage for StubSaved {
        fn route(&self) -> Route {
            self.route.clone()
        }

        fn restore(self: Box<Self>) -> Box<dyn Page> {
            self.log.borrow_mut().restores.push(self.route.clone());
            Box::new(StubPage {
                route: self.route,
                log: self.log,
            })
        }
    }

    fn router() -> (Router, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let factory_log = log.clone();
        let router = Router::new(Box::new(move |route| match route {
            Route::Album(_) | Route::Artist(_) | Route::Playlist(_) => None,
            route => Some(Box::new(StubPage {
                route: route.clone(),
                log: factory_log.clone(),
            }) as Box<dyn Page>),
        }));
        (router, log)
    }

    #[test]
    fn test_back_and_forward_restore_saved_pages() {
        let (mut router, log) = router();
        router.navigate_to(Route::Albums).unwrap();
        router.navigate_to(Route::Artists).unwrap();
        assert_eq!(log.borrow().saves, vec![Route::Albums]);

        assert!(router.go_back());
        assert_eq!(router.current_route(), Some(Route::Albums));
        assert_eq!(log.borrow().restores, vec![Route::Albums]);
        assert!(router.can_go_forward());

        assert!(router.go_forward());
        assert_eq!(router.current_route(), Some(Route::Artists));
        assert!(!router.go_forward());
    }

    #[test]
    fn test_navigation_clears_forward_history() {
        let (mut router, _) = router();
        router.navigate_to(Route::Albums).unwrap();
        router.navigate_to(Route::Artists).unwrap();
        router.go_back();
        router.navigate_to(Route::Genres).unwrap();
        assert!(!router.can_go_forward());
        assert!(router.can_go_back());
    }

    #[test]
    fn test_unknown_route_keeps_current_page() {
        let (mut router, log) = router();
        router.navigate_to(Route::Albums).unwrap();
        let result = router.navigate_to(Route::Album("al-1".to_string()));
        assert!(matches!(result, Err(UiError::UnknownRoute(_))));
        assert_eq!(router.current_route(), Some(Route::Albums));
        assert!(log.borrow().saves.is_empty());
    }

    #[test]
    fn test_same_route_is_not_pushed() {
        let (mut router, _) = router();
        router.navigate_to(Route::Albums).unwrap();
        router.navigate_to(Route::Albums).unwrap();
        assert!(!router.can_go_back());
    }

    #[test]
    fn test_logout_sequence() {
        let (mut router, log) = router();
        router.enable_navigation();
        router.navigate_to(Route::Albums).unwrap();
        router.navigate_to(Route::Playlists).unwrap();

        router.disable_navigation();
        router.set_page(None);
        router.clear_history();

        assert!(router.current_route().is_none());
        assert!(!router.can_go_back());
        assert_eq!(log.borrow().saves, vec![Route::Albums, Route::Playlists]);
        assert!(!router.focus_search());
    }

    #[test]
    fn test_navigation_buttons() {
        let (mut router, _) = router();
        router.activate_navigation_button(1);
        assert!(router.current_route().is_none());

        router.enable_navigation();
        router.activate_navigation_button(1);
        assert_eq!(router.current_route(), Some(Route::Albums));
        router.activate_navigation_button(6);
        assert_eq!(router.current_route(), Some(Route::Albums));
    }

    #[test]
    fn test_reload_and_page_changed() {
        let (mut router, log) = router();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        router.connect_page_changed(Box::new(move |page| {
            sink.borrow_mut().push(page.map(|p| p.route()));
        }));

        router.navigate_to(Route::Favorites).unwrap();
        router.reload();
        assert_eq!(log.borrow().reloads, 1);
        assert!(router.focus_search());
        assert_eq!(*changes.borrow(), vec![Some(Route::Favorites)]);
    }
}
