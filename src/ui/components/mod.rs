//! Reusable widgets of the browsing grid.
//!
//! The cover image with its play button, the grid cell built around it and
//! the album filter button. Each keeps its decision logic in a plain state
//! type so it can be tested without a display.


pub mod cover_art;
pub mod filter_button;
pub mod grid_item;
pub mod play_overlay;

pub use {
    cover_art::CoverImage,
    filter_button::{FilterButton, FilterEditor},
    grid_item::{GridItem, GridItemState},
    play_overlay::{CoverAction, PlayButtonRegion, PlayOverlay},
};
