//! Per-content-type behavior of a grid page.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};

use crate::{
    backend::AlbumFilter,
    ui::{
        browsing::router::Route,
        views::grid_model::{GridActions, GridViewIterator},
    },
};

/// Button shown in a page header next to the sort selector.
#[derive(Clone)]
pub struct ActionButton {
    /// Button label.
    pub label: String,
    /// Symbolic icon name.
    pub icon_name: &'static str,
    /// Click handler, given the page's current filter.
    pub on_clicked: Rc<dyn Fn(&AlbumFilter)>,
}

impl Debug for ActionButton {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ActionButton")
            .field("label", &self.label)
            .field("icon_name", &self.icon_name)
            .finish_non_exhaustive()
    }
}

/// Page-specific behavior plugged into a grid page.
pub trait GridViewPageAdapter {
    /// Page title.
    fn title(&self) -> String;

    /// Base album filter of the page.
    ///
    /// A filterable page without base predicates returns
    /// `Some(AlbumFilter::default())`; `None` means the page cannot be filtered
    /// and gets no filter button.
    fn filter(&self) -> Option<AlbumFilter>;

    /// Icon shown for items without a cover.
    fn placeholder_resource(&self) -> &'static str;

    /// Route of the page.
    fn route(&self) -> Route;

    /// Header action button, if any.
    fn action_button(&self) -> Option<ActionButton> {
        None
    }

    /// Browsing iterator for a sort order and filter. Non-album pages ignore the filter.
    fn iter(&self, sort_order: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator>;

    /// Search iterator for a query and filter.
    fn search_iter(&self, query: &str, filter: &AlbumFilter) -> Box<dyn GridViewIterator>;

    /// Connects the grid item actions to their handlers.
    fn connect_grid_actions(&self, actions: &mut GridActions);

    /// The sort capability, for adapters that have one.
    fn as_sortable(&self) -> Option<&dyn SortableGridViewPageAdapter> {
        None
    }
}

/// Adapters whose pages offer a persisted sort order.
pub trait SortableGridViewPageAdapter {
    /// Available sort orders and the one initially selected.
    fn sort_orders(&self) -> (Vec<String>, String);

    /// Persists the chosen sort order.
    fn save_sort_order(&self, sort_order: &str);
}
