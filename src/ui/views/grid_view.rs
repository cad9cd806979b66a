//! Scrolling GTK grid paging items in from a shared iterator.
//!
//! Batches are pulled on a tokio blocking task and appended on the UI thread
//! when the user scrolls to the bottom. Cells are recycled across resets, and
//! each cell's cover is loaded with a cancellable handle so a recycled cell
//! never shows the cover of its previous item.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use {
    async_channel::bounded,
    libadwaita::{
        glib::{MainContext, idle_add_local_once},
        gtk::{
            AccessibleRole::Grid as GridRole,
            Align::Start,
            FlowBox, FlowBoxChild,
            PolicyType::{Automatic, Never},
            PositionType::Bottom,
            ScrolledWindow,
            SelectionMode::Multiple,
            Widget,
        },
        prelude::{AccessibleExt, AdjustmentExt, Cast},
    },
    tokio::runtime::Handle,
    tracing::{debug, warn},
};

use crate::{
    backend::ImageManager,
    error::ImageError,
    ui::{
        components::GridItem,
        views::grid_model::{
            DEFAULT_BATCH_SIZE, Grid, GridActions, GridViewItemModel, GridViewModel,
            GridViewState, SharedIter,
        },
    },
};

/// Resources a GTK grid needs beyond its iterator.
#[derive(Clone)]
pub struct GridViewContext {
    /// Cover loader.
    pub images: Arc<dyn ImageManager>,
    /// Runtime for blocking fetches.
    pub runtime: Handle,
}

struct GridViewInner {
    model: RefCell<GridViewModel>,
    cells: RefCell<Vec<GridItem>>,
    spare: RefCell<Vec<GridItem>>,
    actions: Rc<RefCell<GridActions>>,
    context: GridViewContext,
    scrolled_window: ScrolledWindow,
    flow_box: FlowBox,
}

/// Paging cover grid.
pub struct GridView {
    /// The underlying GTK widget (scrolled window).
    pub widget: Widget,
    /// The flow box holding the cells.
    pub flow_box: FlowBox,
    inner: Rc<GridViewInner>,
}

impl GridView {
    fn build(model: GridViewModel, context: &GridViewContext) -> Self {
        let flow_box = FlowBox::builder()
            .valign(Start)
            .homogeneous(true)
            .selection_mode(Multiple)
            .activate_on_single_click(false)
            .column_spacing(12)
            .row_spacing(12)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(12)
            .margin_end(12)
            .css_classes(["grid-view"])
            .build();
        flow_box.set_accessible_role(GridRole);

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(Never)
            .vscrollbar_policy(Automatic)
            .vexpand(true)
            .hexpand(true)
            .child(&flow_box)
            .build();

        let inner = Rc::new(GridViewInner {
            model: RefCell::new(model),
            cells: RefCell::new(Vec::new()),
            spare: RefCell::new(Vec::new()),
            actions: Rc::new(RefCell::new(GridActions::default())),
            context: context.clone(),
            scrolled_window: scrolled_window.clone(),
            flow_box: flow_box.clone(),
        });

        let weak = Rc::downgrade(&inner);
        scrolled_window.connect_edge_reached(move |_, position| {
            if position == Bottom
                && let Some(inner) = weak.upgrade()
            {
                GridViewInner::fetch_more(&inner);
            }
        });

        let weak = Rc::downgrade(&inner);
        scrolled_window
            .vadjustment()
            .connect_value_changed(move |adjustment| {
                if let Some(inner) = weak.upgrade() {
                    inner.model.borrow_mut().set_scroll_offset(adjustment.value());
                }
            });

        Self {
            widget: scrolled_window.upcast_ref::<Widget>().clone(),
            flow_box,
            inner,
        }
    }

    /// Number of cells currently shown.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.cells.borrow().len()
    }

    /// Whether no cell is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the iterator is exhausted.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.inner.model.borrow().is_done()
    }
}

impl GridViewInner {
    fn fetch_more(inner: &Rc<Self>) {
        let Some(ticket) = inner.model.borrow_mut().begin_fetch(DEFAULT_BATCH_SIZE) else {
            return;
        };

        let (tx, rx) = bounded(1);
        let request = ticket.clone();
        inner.context.runtime.spawn_blocking(move || {
            let batch = request.iter.next_n(request.batch_size);
            if tx.send_blocking(batch).is_err() {
                debug!("Grid dropped before batch arrived");
            }
        });

        let weak = Rc::downgrade(inner);
        MainContext::default().spawn_local(async move {
            let Ok(batch) = rx.recv().await else {
                return;
            };
            let Some(inner) = weak.upgrade() else {
                return;
            };

            let start = inner.model.borrow().items().len();
            if !inner.model.borrow_mut().finish_fetch(&ticket, batch) {
                return;
            }
            let items = inner.model.borrow().items()[start..].to_vec();
            for item in &items {
                inner.append_cell(item);
            }

            // Keep paging while the grid does not fill the viewport.
            let adjustment = inner.scrolled_window.vadjustment();
            if adjustment.upper() <= adjustment.page_size() {
                Self::fetch_more(&inner);
            }
        });
    }

    fn append_cell(&self, item: &GridViewItemModel) {
        let cell = {
            let mut spare = self.spare.borrow_mut();
            let same = spare
                .iter()
                .position(|cell| !cell.state.borrow().needs_update(item));
            match same {
                Some(index) => Some(spare.swap_remove(index)),
                None => spare.pop(),
            }
        }
        .unwrap_or_else(|| GridItem::new(self.model.borrow().placeholder(), self.actions.clone()));
        if cell.update(item) {
            self.load_cover(&cell);
        }
        self.flow_box.append(&cell.widget);
        self.cells.borrow_mut().push(cell);
    }

    fn load_cover(&self, cell: &GridItem) {
        let cover_id = cell.state.borrow().cover_art_id().to_string();
        if cover_id.is_empty() {
            return;
        }
        let handle = cell.state.borrow_mut().begin_image_load();
        let token = handle.token();

        let (tx, rx) = bounded(1);
        let images = self.context.images.clone();
        self.context.runtime.spawn_blocking(move || {
            let result = images.fetch_cover_thumbnail(&cover_id, &token);
            if tx.send_blocking(result).is_err() {
                debug!(%cover_id, "Cell dropped before cover arrived");
            }
        });

        let cell = cell.clone();
        MainContext::default().spawn_local(async move {
            match rx.recv().await {
                Ok(Ok(image)) => cell.set_image(&handle, image.as_ref()),
                Ok(Err(ImageError::Cancelled)) | Err(_) => {}
                Ok(Err(e)) => {
                    warn!(error = %e, "Failed to load cover");
                    cell.set_image(&handle, None);
                }
            }
        });
    }

    /// Moves all cells to the spare list, cancelling their cover loads.
    fn recycle_cells(&self) {
        let mut cells = self.cells.borrow_mut();
        for cell in cells.drain(..) {
            cell.suspend();
            if let Some(child) = cell.widget.downcast_ref::<FlowBoxChild>() {
                self.flow_box.unselect_child(child);
            }
            self.flow_box.remove(&cell.widget);
            self.spare.borrow_mut().push(cell);
        }
    }

    fn show_loaded_items(&self) {
        let items = self.model.borrow().items().to_vec();
        for item in &items {
            self.append_cell(item);
        }
    }

    fn restore_scroll(&self) {
        let offset = self.model.borrow().scroll_offset();
        let adjustment = self.scrolled_window.vadjustment();
        idle_add_local_once(move || adjustment.set_value(offset));
    }
}

impl Grid for GridView {
    type Context = GridViewContext;

    fn new(iter: SharedIter, placeholder: &str, context: &GridViewContext) -> Self {
        let grid = Self::build(GridViewModel::with_iter(iter, placeholder), context);
        GridViewInner::fetch_more(&grid.inner);
        grid
    }

    fn from_state(state: GridViewState, placeholder: &str, context: &GridViewContext) -> Self {
        let grid = Self::build(GridViewModel::with_state(state, placeholder), context);
        grid.inner.show_loaded_items();
        grid.inner.restore_scroll();
        if grid.inner.model.borrow().items().is_empty() {
            GridViewInner::fetch_more(&grid.inner);
        }
        grid
    }

    fn reset(&mut self, iter: SharedIter) {
        self.inner.recycle_cells();
        self.inner.model.borrow_mut().reset(iter);
        self.inner.scrolled_window.vadjustment().set_value(0.0);
        GridViewInner::fetch_more(&self.inner);
    }

    fn reset_from_state(&mut self, state: GridViewState) {
        self.inner.recycle_cells();
        self.inner.model.borrow_mut().reset_from_state(state);
        self.inner.show_loaded_items();
        self.inner.restore_scroll();
        if self.inner.model.borrow().items().is_empty() {
            GridViewInner::fetch_more(&self.inner);
        }
    }

    fn save_to_state(&self) -> GridViewState {
        let offset = self.inner.scrolled_window.vadjustment().value();
        let mut model = self.inner.model.borrow_mut();
        model.set_scroll_offset(offset);
        model.save_to_state()
    }

    fn clear(&mut self) {
        self.inner.recycle_cells();
        for cell in self.inner.spare.borrow().iter() {
            cell.clear();
        }
        self.inner.model.borrow_mut().clear();
        *self.inner.actions.borrow_mut() = GridActions::default();
    }

    fn set_actions(&mut self, actions: GridActions) {
        *self.inner.actions.borrow_mut() = actions.clone();
        self.inner.model.borrow_mut().set_actions(actions);
    }

    fn set_placeholder(&mut self, icon_name: &str) {
        self.inner.model.borrow_mut().set_placeholder(icon_name);
        for cell in self
            .inner
            .cells
            .borrow()
            .iter()
            .chain(self.inner.spare.borrow().iter())
        {
            cell.set_placeholder(icon_name);
        }
    }

    fn select_all(&mut self) {
        self.inner.model.borrow_mut().select_all();
        self.flow_box.select_all();
    }
}
