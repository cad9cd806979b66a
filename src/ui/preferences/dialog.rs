//! Main preferences dialog implementation.

use std::sync::Arc;

use {
    libadwaita::{
        PreferencesDialog as LibadwaitaPreferencesDialog,
        gtk::Widget,
        prelude::{AdwDialogExt, IsA, PreferencesDialogExt},
    },
    tracing::debug,
};

use crate::{config::SettingsManager, ui::preferences::GeneralPreferencesPage};

/// Preferences dialog.
pub struct PreferencesDialog {
    /// The underlying Libadwaita preferences dialog widget.
    pub widget: LibadwaitaPreferencesDialog,
}

impl PreferencesDialog {
    /// Creates a new preferences dialog instance.
    ///
    /// # Arguments
    ///
    /// * `settings_manager` - Settings manager reference for persistence
    /// * `tray_available` - Whether tray preferences apply
    #[must_use]
    pub fn new(settings_manager: Arc<SettingsManager>, tray_available: bool) -> Self {
        let widget = LibadwaitaPreferencesDialog::builder().build();
        widget.set_content_width(640);
        widget.set_content_height(560);

        let general_page = GeneralPreferencesPage::new(settings_manager, tray_available);
        widget.add(&general_page.widget);

        debug!("PreferencesDialog: Created");

        Self { widget }
    }

    /// Shows the preferences dialog over a parent window.
    pub fn show(&self, parent: &impl IsA<Widget>) {
        debug!("PreferencesDialog: Showing dialog with parent");
        self.widget.present(Some(parent));
    }
}
