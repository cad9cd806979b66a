//! Toolkit-independent grid model: items, paging iterator and saved state.
//!
//! A grid is fed by a [`GridViewIterator`] that yields items in batches. The
//! iterator is shared behind a lock so a [`GridViewState`] snapshot can keep
//! paging from where the live grid stopped once it is restored.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
    sync::Arc,
};

use {parking_lot::Mutex, tracing::debug};

/// Number of items fetched per page.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// One cell of a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridViewItemModel {
    /// Primary label.
    pub name: String,
    /// Identifier of the entity the cell shows.
    pub id: String,
    /// Identifier of the cover image.
    pub cover_art_id: String,
    /// Secondary label, e.g. the album artist.
    pub secondary: String,
    /// Identifier behind the secondary label; empty when it is not a link.
    pub secondary_id: String,
}

/// Lazy batch source for a grid.
pub trait GridViewIterator: Send {
    /// Returns up to `n` further items. Fewer than `n` means exhausted.
    fn next_n(&mut self, n: usize) -> Vec<GridViewItemModel>;
}

impl<I> GridViewIterator for I
where
    I: Iterator<Item = GridViewItemModel> + Send,
{
    fn next_n(&mut self, n: usize) -> Vec<GridViewItemModel> {
        self.by_ref().take(n).collect()
    }
}

/// Iterator shared between a live grid and the states saved from it.
#[derive(Clone)]
pub struct SharedIter(Arc<Mutex<Box<dyn GridViewIterator>>>);

impl SharedIter {
    /// Wraps an iterator for sharing.
    #[must_use]
    pub fn new(iter: Box<dyn GridViewIterator>) -> Self {
        Self(Arc::new(Mutex::new(iter)))
    }

    /// Pulls the next batch.
    pub fn next_n(&self, n: usize) -> Vec<GridViewItemModel> {
        self.0.lock().next_n(n)
    }

    /// Whether both handles refer to the same iterator.
    #[must_use]
    pub fn ptr_eq(&self, other: &SharedIter) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for SharedIter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("SharedIter").finish_non_exhaustive()
    }
}

/// Snapshot of a grid's loaded items and scroll position.
#[derive(Debug, Clone)]
pub struct GridViewState {
    /// Iterator to continue paging from.
    pub iter: SharedIter,
    /// Items loaded so far.
    pub items: Vec<GridViewItemModel>,
    /// Vertical scroll offset in pixels.
    pub scroll_offset: f64,
    /// Whether the iterator is exhausted.
    pub done: bool,
}

impl PartialEq for GridViewState {
    fn eq(&self, other: &Self) -> bool {
        self.iter.ptr_eq(&other.iter)
            && self.items == other.items
            && self.scroll_offset == other.scroll_offset
            && self.done == other.done
    }
}

/// Callback taking the id of the item acted upon.
pub type ItemCallback = Rc<dyn Fn(&str)>;

/// Handlers for the actions a grid item offers.
#[derive(Clone, Default)]
pub struct GridActions {
    /// Play the item.
    pub on_play: Option<ItemCallback>,
    /// Open the item's own page.
    pub on_show_item_page: Option<ItemCallback>,
    /// Open the page behind the secondary label.
    pub on_show_secondary_page: Option<ItemCallback>,
}

impl GridActions {
    /// Plays the item, if a handler is connected.
    pub fn play(&self, id: &str) {
        if let Some(on_play) = &self.on_play {
            on_play(id);
        }
    }

    /// Shows the item page, if a handler is connected.
    pub fn show_item_page(&self, id: &str) {
        if let Some(on_show) = &self.on_show_item_page {
            on_show(id);
        }
    }

    /// Shows the secondary page, if a handler is connected.
    pub fn show_secondary_page(&self, secondary_id: &str) {
        if let Some(on_show) = &self.on_show_secondary_page {
            on_show(secondary_id);
        }
    }
}

impl Debug for GridActions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GridActions")
            .field("on_play", &self.on_play.is_some())
            .field("on_show_item_page", &self.on_show_item_page.is_some())
            .field("on_show_secondary_page", &self.on_show_secondary_page.is_some())
            .finish()
    }
}

/// A paging grid a browsing page can drive.
///
/// Implemented by the headless [`GridViewModel`] and by the GTK grid widget.
pub trait Grid: 'static {
    /// Construction resources (image loading, runtime handle, ...).
    type Context: Clone + 'static;

    /// Creates a grid paging from `iter`.
    fn new(iter: SharedIter, placeholder: &str, context: &Self::Context) -> Self
    where
        Self: Sized;

    /// Creates a grid showing a saved state.
    fn from_state(state: GridViewState, placeholder: &str, context: &Self::Context) -> Self
    where
        Self: Sized;

    /// Drops the loaded items and starts paging from `iter`.
    fn reset(&mut self, iter: SharedIter);

    /// Replaces the contents with a saved state.
    fn reset_from_state(&mut self, state: GridViewState);

    /// Captures the current contents.
    fn save_to_state(&self) -> GridViewState;

    /// Releases the loaded items before the grid goes back to the pool.
    fn clear(&mut self);

    /// Connects the item actions.
    fn set_actions(&mut self, actions: GridActions);

    /// Sets the icon shown while a cover is missing.
    fn set_placeholder(&mut self, icon_name: &str);

    /// Selects every loaded item.
    fn select_all(&mut self) {}
}

/// Ticket for a batch fetch started with [`GridViewModel::begin_fetch`].
#[derive(Debug, Clone)]
pub struct FetchTicket {
    /// Iterator to pull from, off the UI thread if needed.
    pub iter: SharedIter,
    /// Number of items requested.
    pub batch_size: usize,
    generation: u64,
}

/// Headless grid: the loaded items of a paging iterator.
#[derive(Debug)]
pub struct GridViewModel {
    iter: SharedIter,
    items: Vec<GridViewItemModel>,
    scroll_offset: f64,
    done: bool,
    generation: u64,
    fetching: bool,
    placeholder: String,
    actions: GridActions,
    selected: Vec<usize>,
}

impl GridViewModel {
    /// Creates an empty model paging from `iter`.
    #[must_use]
    pub fn with_iter(iter: SharedIter, placeholder: &str) -> Self {
        Self {
            iter,
            items: Vec::new(),
            scroll_offset: 0.0,
            done: false,
            generation: 0,
            fetching: false,
            placeholder: placeholder.to_string(),
            actions: GridActions::default(),
            selected: Vec::new(),
        }
    }

    /// Creates a model showing a saved state.
    #[must_use]
    pub fn with_state(state: GridViewState, placeholder: &str) -> Self {
        let mut model = Self::with_iter(state.iter.clone(), placeholder);
        model.reset_from_state(state);
        model
    }

    /// Loaded items.
    #[must_use]
    pub fn items(&self) -> &[GridViewItemModel] {
        &self.items
    }

    /// Whether the iterator is exhausted.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Records the scroll offset.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    /// Placeholder icon name.
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Connected item actions.
    #[must_use]
    pub fn actions(&self) -> &GridActions {
        &self.actions
    }

    /// Indices of selected items.
    #[must_use]
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Looks up a loaded item.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&GridViewItemModel> {
        self.items.get(index)
    }

    /// Fetches and appends the next batch on the calling thread.
    ///
    /// # Returns
    ///
    /// The number of items appended.
    pub fn load_more(&mut self, batch_size: usize) -> usize {
        let Some(ticket) = self.begin_fetch(batch_size) else {
            return 0;
        };
        let batch = ticket.iter.next_n(ticket.batch_size);
        let count = batch.len();
        self.finish_fetch(&ticket, batch);
        count
    }

    /// Starts a batch fetch unless one is running or the iterator is exhausted.
    pub fn begin_fetch(&mut self, batch_size: usize) -> Option<FetchTicket> {
        if self.done || self.fetching {
            return None;
        }
        self.fetching = true;
        Some(FetchTicket {
            iter: self.iter.clone(),
            batch_size,
            generation: self.generation,
        })
    }

    /// Appends a fetched batch.
    ///
    /// # Returns
    ///
    /// `false` if the model was reset since the ticket was issued and the batch
    /// was dropped.
    pub fn finish_fetch(&mut self, ticket: &FetchTicket, batch: Vec<GridViewItemModel>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Dropping batch fetched for a previous iterator"
            );
            return false;
        }
        self.fetching = false;
        if batch.len() < ticket.batch_size {
            self.done = true;
        }
        self.items.extend(batch);
        true
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.fetching = false;
        self.selected.clear();
    }
}

impl Grid for GridViewModel {
    type Context = ();

    fn new(iter: SharedIter, placeholder: &str, _context: &()) -> Self {
        Self::with_iter(iter, placeholder)
    }

    fn from_state(state: GridViewState, placeholder: &str, _context: &()) -> Self {
        Self::with_state(state, placeholder)
    }

    fn reset(&mut self, iter: SharedIter) {
        self.bump_generation();
        self.iter = iter;
        self.items.clear();
        self.scroll_offset = 0.0;
        self.done = false;
    }

    fn reset_from_state(&mut self, state: GridViewState) {
        self.bump_generation();
        self.iter = state.iter;
        self.items = state.items;
        self.scroll_offset = state.scroll_offset;
        self.done = state.done;
    }

    fn save_to_state(&self) -> GridViewState {
        GridViewState {
            iter: self.iter.clone(),
            items: self.items.clone(),
            scroll_offset: self.scroll_offset,
            done: self.done,
        }
    }

    fn clear(&mut self) {
        self.bump_generation();
        self.items = Vec::new();
        self.scroll_offset = 0.0;
        self.done = true;
        self.actions = GridActions::default();
    }

    fn set_actions(&mut self, actions: GridActions) {
        self.actions = actions;
    }

    fn set_placeholder(&mut self, icon_name: &str) {
        icon_name.clone_into(&mut self.placeholder);
    }

    fn select_all(&mut self) {
        self.selected = (0..self.items.len()).collect();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::ui::views::grid_model::{
        Grid, GridActions, GridViewItemModel, GridViewModel, SharedIter,
    };

    fn items(prefix: &str, count: usize) -> SharedIter {
        let prefix = prefix.to_string();
        SharedIter::new(Box::new((0..count).map(move |i| GridViewItemModel {
            name: format!("{prefix} {i}"),
            id: format!("{prefix}-{i}"),
            ..GridViewItemModel::default()
        })))
    }

    #[test]
    fn test_load_more_pages_until_exhausted() {
        let mut grid = GridViewModel::with_iter(items("a", 5), "icon");
        assert_eq!(grid.load_more(2), 2);
        assert_eq!(grid.load_more(2), 2);
        assert!(!grid.is_done());
        assert_eq!(grid.load_more(2), 1);
        assert!(grid.is_done());
        assert_eq!(grid.load_more(2), 0);
        assert_eq!(grid.items().len(), 5);
    }

    #[test]
    fn test_stale_batch_is_dropped_after_reset() {
        let mut grid = GridViewModel::with_iter(items("old", 10), "icon");
        let ticket = grid.begin_fetch(3).unwrap();
        assert!(grid.begin_fetch(3).is_none());

        grid.reset(items("new", 10));
        let stale = ticket.iter.next_n(ticket.batch_size);
        assert!(!grid.finish_fetch(&ticket, stale));
        assert!(grid.items().is_empty());

        assert_eq!(grid.load_more(3), 3);
        assert_eq!(grid.items()[0].id, "new-0");
    }

    #[test]
    fn test_state_continues_paging_from_shared_iterator() {
        let mut grid = GridViewModel::with_iter(items("a", 6), "icon");
        grid.load_more(2);
        grid.set_scroll_offset(120.0);
        let state = grid.save_to_state();

        grid.reset(items("b", 3));
        grid.load_more(3);

        grid.reset_from_state(state.clone());
        assert_eq!(grid.save_to_state(), state);
        assert_eq!(grid.scroll_offset(), 120.0);

        grid.load_more(2);
        assert_eq!(grid.items()[2].id, "a-2");
    }

    #[test]
    fn test_state_equality_requires_same_iterator() {
        let grid_a = GridViewModel::with_iter(items("a", 1), "icon");
        let grid_b = GridViewModel::with_iter(items("a", 1), "icon");
        assert_eq!(grid_a.save_to_state(), grid_a.save_to_state());
        assert_ne!(grid_a.save_to_state(), grid_b.save_to_state());
    }

    #[test]
    fn test_clear_drops_items_and_actions() {
        let mut grid = GridViewModel::with_iter(items("a", 3), "icon");
        grid.set_actions(GridActions {
            on_play: Some(Rc::new(|_: &str| {})),
            ..GridActions::default()
        });
        grid.load_more(3);
        grid.clear();
        assert!(grid.items().is_empty());
        assert!(grid.actions().on_play.is_none());
    }

    #[test]
    fn test_actions_dispatch_ids() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let sink = played.clone();
        let actions = GridActions {
            on_play: Some(Rc::new(move |id: &str| sink.borrow_mut().push(id.to_string()))),
            ..GridActions::default()
        };

        actions.play("al-1");
        actions.show_item_page("al-1");
        assert_eq!(*played.borrow(), vec!["al-1".to_string()]);
    }

    #[test]
    fn test_select_all_covers_loaded_items() {
        let mut grid = GridViewModel::with_iter(items("a", 4), "icon");
        grid.load_more(3);
        grid.select_all();
        assert_eq!(grid.selected(), &[0, 1, 2]);
    }
}
