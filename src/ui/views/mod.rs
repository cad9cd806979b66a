//! Grid model and the GTK widgets showing it.
//!
//! `grid_model` is toolkit independent; `grid_view` renders it in a paging
//! flow box and `grid_page` adds the page header around a grid.


pub mod grid_model;
pub mod grid_page;
pub mod grid_view;

pub use {
    grid_model::{
        DEFAULT_BATCH_SIZE, Grid, GridActions, GridViewItemModel, GridViewIterator, GridViewModel,
        GridViewState, SharedIter,
    },
    grid_page::{GridPageView, SavedGridPageView},
    grid_view::{GridView, GridViewContext},
};
