//! Browsing core: adapters, grid page lifecycle, widget pool and router.
//!
//! Nothing here touches a widget directly. Pages drive any [`Grid`]
//! implementation, so the lifecycle runs the same against the GTK grid and
//! against the headless model.
//!
//! [`Grid`]: crate::ui::views::grid_model::Grid

pub mod adapter;
pub mod adapters;
pub mod page;
pub mod pool;
pub mod router;

pub use {
    adapter::{ActionButton, GridViewPageAdapter, SortableGridViewPageAdapter},
    adapters::{AdapterContext, adapter_for_route},
    page::{GridViewPage, SavedGridViewPage, SortOrderSelect, load_genres},
    pool::{WidgetKind, WidgetPool},
    router::{NAVIGATION_ROUTES, Page, PageChanged, PageFactory, Route, Router, SavedPage},
};
