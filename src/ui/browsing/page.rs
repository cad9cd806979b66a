//! Grid page lifecycle: construction, reload, search, sort and save/restore.
//!
//! A page mediates between its adapter and a [`Grid`]. Leaving the page turns
//! it into a [`SavedGridViewPage`] that carries the grid contents (the browsing
//! state and, while a search is active, the search state) and hands the grid
//! back to the widget pool. Restoring reattaches a pooled grid and repopulates
//! it from the saved state without asking the provider again.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use tracing::{debug, warn};

use crate::{
    backend::{AlbumFilter, MediaProvider},
    ui::{
        browsing::{
            adapter::{ActionButton, GridViewPageAdapter},
            pool::{WidgetKind, WidgetPool},
            router::{Page, Route, SavedPage},
        },
        views::grid_model::{Grid, GridActions, GridViewState, SharedIter},
    },
};

/// State of the sort selector in the page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrderSelect {
    /// Offered sort orders.
    pub options: Vec<String>,
    /// Selected sort order.
    pub selected: String,
    /// Whether the selector accepts input.
    pub enabled: bool,
}

impl SortOrderSelect {
    fn from_adapter(adapter: &dyn GridViewPageAdapter) -> Option<Self> {
        adapter.as_sortable().map(|sortable| {
            let (options, selected) = sortable.sort_orders();
            Self {
                options,
                selected,
                enabled: true,
            }
        })
    }
}

/// Genre names offered by a page's filter button.
///
/// A base filter that already names genres disables genre filtering, so the
/// provider is not asked at all. A provider failure degrades to no genres.
///
/// # Arguments
///
/// * `provider` - Media provider to ask for genres
/// * `base_filter` - The adapter's base filter
pub fn load_genres(provider: &dyn MediaProvider, base_filter: Option<&AlbumFilter>) -> Vec<String> {
    if base_filter.is_some_and(|filter| !filter.genres.is_empty()) {
        return Vec::new();
    }

    match provider.get_genres() {
        Ok(genres) => genres.into_iter().map(|genre| genre.name).collect(),
        Err(e) => {
            warn!(error = %e, "Failed to load genres");
            Vec::new()
        }
    }
}

/// A live browsing page showing a grid.
pub struct GridViewPage<G: Grid> {
    adapter: Rc<dyn GridViewPageAdapter>,
    pool: Rc<RefCell<WidgetPool>>,
    provider: Arc<dyn MediaProvider>,
    context: G::Context,
    grid: G,
    grid_state: Option<GridViewState>,
    sort_order: Option<SortOrderSelect>,
    filter: Option<AlbumFilter>,
    search_text: String,
}

impl<G: Grid> GridViewPage<G> {
    /// Builds a page and starts browsing with the adapter's iterator.
    ///
    /// # Arguments
    ///
    /// * `adapter` - Page-specific behavior
    /// * `pool` - Pool the grid is obtained from and released to
    /// * `provider` - Media provider, used for the filter button's genre list
    /// * `context` - Resources for building a new grid
    pub fn new(
        adapter: Rc<dyn GridViewPageAdapter>,
        pool: Rc<RefCell<WidgetPool>>,
        provider: Arc<dyn MediaProvider>,
        context: G::Context,
    ) -> Self {
        let sort_order = SortOrderSelect::from_adapter(adapter.as_ref());
        let filter = adapter.filter();
        let selected = sort_order
            .as_ref()
            .map(|s| s.selected.clone())
            .unwrap_or_default();
        let iter = SharedIter::new(adapter.iter(&selected, &filter.clone().unwrap_or_default()));

        let placeholder = adapter.placeholder_resource();
        let pooled = pool.borrow_mut().obtain::<G>(WidgetKind::GridView);
        let mut grid = match pooled {
            Some(mut grid) => {
                grid.set_placeholder(placeholder);
                grid.reset(iter);
                grid
            }
            None => G::new(iter, placeholder, &context),
        };
        grid.set_actions(connect_actions(adapter.as_ref()));
        debug!(route = %adapter.route(), "Created grid page");

        Self {
            adapter,
            pool,
            provider,
            context,
            grid,
            grid_state: None,
            sort_order,
            filter,
            search_text: String::new(),
        }
    }

    /// Page title.
    #[must_use]
    pub fn title(&self) -> String {
        self.adapter.title()
    }

    /// Route of the page.
    #[must_use]
    pub fn route(&self) -> Route {
        self.adapter.route()
    }

    /// The sort selector, for sortable pages.
    #[must_use]
    pub fn sort_order(&self) -> Option<&SortOrderSelect> {
        self.sort_order.as_ref()
    }

    /// The current filter; `None` for unfilterable pages, which get no filter button.
    #[must_use]
    pub fn filter(&self) -> Option<&AlbumFilter> {
        self.filter.as_ref()
    }

    /// Whether the filter button's genre section is disabled.
    #[must_use]
    pub fn genre_filter_disabled(&self) -> bool {
        self.adapter
            .filter()
            .is_some_and(|filter| !filter.genres.is_empty())
    }

    /// Genre names for the filter button.
    #[must_use]
    pub fn load_genres(&self) -> Vec<String> {
        load_genres(self.provider.as_ref(), self.adapter.filter().as_ref())
    }

    /// Current search query; empty while browsing.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Header action button, if the adapter has one.
    #[must_use]
    pub fn action_button(&self) -> Option<ActionButton> {
        self.adapter.action_button()
    }

    /// Resources the grid was built with.
    #[must_use]
    pub fn context(&self) -> &G::Context {
        &self.context
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// The grid, mutably.
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// Re-issues the active iterator (browsing or search) and resets the grid.
    pub fn reload(&mut self) {
        if self.search_text.is_empty() {
            let iter = self.browse_iter();
            self.grid.reset(iter);
        } else {
            let query = self.search_text.clone();
            self.do_search(&query);
        }
    }

    /// Handles a new search query.
    ///
    /// The browsing state is captured when a search starts and put back when
    /// the query is cleared.
    pub fn on_searched(&mut self, query: &str) {
        if query.is_empty() {
            if self.search_text.is_empty() {
                return;
            }
            self.set_sort_enabled(true);
            self.search_text.clear();
            match self.grid_state.take() {
                Some(state) => self.grid.reset_from_state(state),
                None => {
                    let iter = self.browse_iter();
                    self.grid.reset(iter);
                }
            }
        } else {
            self.set_sort_enabled(false);
            self.do_search(query);
            query.clone_into(&mut self.search_text);
        }
    }

    /// Persists and applies a new sort order.
    ///
    /// Ignored for unsortable pages and while the selector is disabled.
    pub fn on_sort_order_changed(&mut self, sort_order: &str) {
        let Some(select) = self.sort_order.as_mut() else {
            return;
        };
        if !select.enabled {
            debug!(sort_order, "Sort change ignored during search");
            return;
        }
        sort_order.clone_into(&mut select.selected);

        if let Some(sortable) = self.adapter.as_sortable() {
            sortable.save_sort_order(sort_order);
        }
        let iter = self.browse_iter();
        self.grid.reset(iter);
    }

    /// Applies an edited filter and reloads. Ignored for unfilterable pages.
    pub fn set_filter(&mut self, filter: AlbumFilter) {
        if self.filter.is_none() {
            debug!("Page is not filterable");
            return;
        }
        self.filter = Some(filter);
        self.reload();
    }

    /// Selects all loaded items.
    pub fn select_all(&mut self) {
        self.grid.select_all();
    }

    /// Detaches the page, giving the grid back to the pool.
    pub fn save(mut self) -> SavedGridViewPage<G> {
        let state = self.grid.save_to_state();
        let (grid_state, search_grid_state) = if self.search_text.is_empty() {
            (Some(state), None)
        } else {
            (self.grid_state.take(), Some(state))
        };

        self.grid.clear();
        self.pool
            .borrow_mut()
            .release(WidgetKind::GridView, self.grid);
        debug!(route = %self.adapter.route(), "Saved grid page");

        SavedGridViewPage {
            adapter: self.adapter,
            pool: self.pool,
            provider: self.provider,
            context: self.context,
            sort_order: self.sort_order.map(|s| s.selected),
            filter: self.filter,
            search_text: self.search_text,
            grid_state,
            search_grid_state,
        }
    }

    fn current_filter(&self) -> AlbumFilter {
        self.filter.clone().unwrap_or_default()
    }

    fn current_sort_order(&self) -> String {
        self.sort_order
            .as_ref()
            .map(|s| s.selected.clone())
            .unwrap_or_default()
    }

    fn browse_iter(&self) -> SharedIter {
        SharedIter::new(
            self.adapter
                .iter(&self.current_sort_order(), &self.current_filter()),
        )
    }

    fn do_search(&mut self, query: &str) {
        if self.search_text.is_empty() {
            self.grid_state = Some(self.grid.save_to_state());
        }
        let iter = SharedIter::new(self.adapter.search_iter(query, &self.current_filter()));
        self.grid.reset(iter);
    }

    fn set_sort_enabled(&mut self, enabled: bool) {
        if let Some(select) = self.sort_order.as_mut() {
            select.enabled = enabled;
        }
    }
}

fn connect_actions(adapter: &dyn GridViewPageAdapter) -> GridActions {
    let mut actions = GridActions::default();
    adapter.connect_grid_actions(&mut actions);
    actions
}

/// A grid page detached from the screen.
pub struct SavedGridViewPage<G: Grid> {
    adapter: Rc<dyn GridViewPageAdapter>,
    pool: Rc<RefCell<WidgetPool>>,
    provider: Arc<dyn MediaProvider>,
    context: G::Context,
    sort_order: Option<String>,
    filter: Option<AlbumFilter>,
    search_text: String,
    grid_state: Option<GridViewState>,
    search_grid_state: Option<GridViewState>,
}

impl<G: Grid> SavedGridViewPage<G> {
    /// Route of the detached page.
    #[must_use]
    pub fn route(&self) -> Route {
        self.adapter.route()
    }

    /// Browsing state carried by the saved page.
    #[must_use]
    pub fn grid_state(&self) -> Option<&GridViewState> {
        self.grid_state.as_ref()
    }

    /// Search state carried by the saved page.
    #[must_use]
    pub fn search_grid_state(&self) -> Option<&GridViewState> {
        self.search_grid_state.as_ref()
    }

    /// Search query active when the page was saved.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Rebuilds the live page from the saved state.
    ///
    /// If the active state is missing the grid is refilled from a fresh iterator.
    pub fn restore(self) -> GridViewPage<G> {
        let mut sort_order = SortOrderSelect::from_adapter(self.adapter.as_ref());
        if let (Some(select), Some(saved)) = (sort_order.as_mut(), self.sort_order) {
            select.selected = saved;
        }

        let searching = !self.search_text.is_empty();
        let (active, grid_state) = if searching {
            if let Some(select) = sort_order.as_mut() {
                select.enabled = false;
            }
            (self.search_grid_state, self.grid_state)
        } else {
            (self.grid_state, None)
        };

        let placeholder = self.adapter.placeholder_resource();
        let fresh_iter = || {
            let filter = self.filter.clone().unwrap_or_default();
            let iter = if searching {
                self.adapter.search_iter(&self.search_text, &filter)
            } else {
                let selected = sort_order
                    .as_ref()
                    .map(|s| s.selected.clone())
                    .unwrap_or_default();
                self.adapter.iter(&selected, &filter)
            };
            SharedIter::new(iter)
        };

        let pooled = self.pool.borrow_mut().obtain::<G>(WidgetKind::GridView);
        let mut grid = match (pooled, active) {
            (Some(mut grid), Some(state)) => {
                grid.set_placeholder(placeholder);
                grid.reset_from_state(state);
                grid
            }
            (Some(mut grid), None) => {
                debug!("No saved grid state, fetching again");
                grid.set_placeholder(placeholder);
                grid.reset(fresh_iter());
                grid
            }
            (None, Some(state)) => G::from_state(state, placeholder, &self.context),
            (None, None) => {
                debug!("No saved grid state, fetching again");
                G::new(fresh_iter(), placeholder, &self.context)
            }
        };
        grid.set_actions(connect_actions(self.adapter.as_ref()));
        debug!(route = %self.adapter.route(), "Restored grid page");

        GridViewPage {
            adapter: self.adapter,
            pool: self.pool,
            provider: self.provider,
            context: self.context,
            grid,
            grid_state,
            sort_order,
            filter: self.filter,
            search_text: self.search_text,
        }
    }
}

impl<G: Grid> Page for GridViewPage<G> {
    fn route(&self) -> Route {
        self.adapter.route()
    }

    fn save(self: Box<Self>) -> Box<dyn SavedPage> {
        Box::new(GridViewPage::save(*self))
    }

    fn reload(&mut self) {
        GridViewPage::reload(self);
    }

    fn select_all(&mut self) {
        GridViewPage::select_all(self);
    }
}

impl<G: Grid> SavedPage for SavedGridViewPage<G> {
    fn route(&self) -> Route {
        SavedGridViewPage::route(self)
    }

    fn restore(self: Box<Self>) -> Box<dyn Page> {
        Box::new(SavedGridViewPage::restore(*self))
    }
}
