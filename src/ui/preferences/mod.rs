//! Preferences dialog implementation following GNOME HIG guidelines.


pub mod dialog;
pub mod general_page;
pub mod utils;

pub use {
    dialog::PreferencesDialog,
    general_page::{GeneralPreferencesPage, apply_theme},
};
