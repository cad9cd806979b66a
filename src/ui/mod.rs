//! GNOME HIG-compliant user interface built entirely with Libadwaita.
//!
//! `browsing` and `views::grid_model` hold the toolkit-independent browsing
//! core; the rest builds the GTK widgets and the main window around it.

#[cfg(test)]
mod tests;

pub mod application;
pub mod browsing;
pub mod components;
pub mod header_bar;
pub mod main_window;
pub mod preferences;
pub mod shortcuts;
pub mod tray;
pub mod views;

pub use {
    application::TonearmApplication,
    browsing::{Route, Router},
    header_bar::HeaderBar,
    main_window::{MainWindowController, WindowHost},
    views::{GridPageView, GridView, GridViewModel},
};
