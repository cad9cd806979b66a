//! General preferences page: startup page, system tray and theme.

use std::sync::Arc;

use {
    libadwaita::{
        ColorScheme, PreferencesGroup, PreferencesPage, StyleManager,
        gtk::AccessibleRole::Group,
        prelude::{ComboRowExt, ObjectExt, PreferencesGroupExt, PreferencesPageExt},
    },
    tracing::debug,
};

use crate::{
    config::{SettingsManager, StartupPage},
    ui::preferences::utils::{create_combo_row_from_settings, create_switch_row_from_settings},
};

/// Theme choices as (label, stored value) pairs.
pub const THEMES: [(&str, &str); 3] = [("System", "system"), ("Light", "light"), ("Dark", "dark")];

/// Color scheme for a stored theme preference.
#[must_use]
pub fn color_scheme(theme_preference: &str) -> ColorScheme {
    match theme_preference {
        "light" => ColorScheme::ForceLight,
        "dark" => ColorScheme::ForceDark,
        _ => ColorScheme::Default,
    }
}

/// Applies a stored theme preference to the whole application.
pub fn apply_theme(theme_preference: &str) {
    StyleManager::default().set_color_scheme(color_scheme(theme_preference));
}

/// General preferences page.
pub struct GeneralPreferencesPage {
    /// The underlying Libadwaita preferences page widget.
    pub widget: PreferencesPage,
    /// System tray group, present only when a tray host exists.
    pub tray_group: Option<PreferencesGroup>,
    /// Settings manager reference for persistence.
    settings_manager: Arc<SettingsManager>,
}

impl GeneralPreferencesPage {
    /// Creates a new general preferences page instance.
    ///
    /// # Arguments
    ///
    /// * `settings_manager` - Settings manager reference for persistence
    /// * `tray_available` - Whether the desktop provides a system tray
    #[must_use]
    pub fn new(settings_manager: Arc<SettingsManager>, tray_available: bool) -> Self {
        let widget = PreferencesPage::builder()
            .title("General")
            .icon_name("preferences-system-symbolic")
            .accessible_role(Group)
            .build();

        let mut page = Self {
            widget,
            tray_group: None,
            settings_manager,
        };

        page.setup_startup_preference();
        if tray_available {
            page.tray_group = Some(page.setup_tray_preferences());
        }
        page.setup_theme_preference();

        debug!("GeneralPreferencesPage: Created");

        page
    }

    fn setup_startup_preference(&self) {
        let group = PreferencesGroup::builder().title("Startup").build();

        let combo_row = create_combo_row_from_settings(
            "Startup Page",
            Some("Page shown after connecting to a server"),
            StartupPage::ALL
                .iter()
                .map(|page| page.label().to_string())
                .collect(),
            |settings| settings.startup_page.label().to_string(),
            |settings, label| {
                if let Ok(page) = StartupPage::from_label(label) {
                    settings.startup_page = page;
                }
            },
            self.settings_manager.clone(),
        );

        group.add(&combo_row);
        self.widget.add(&group);
    }

    fn setup_tray_preferences(&self) -> PreferencesGroup {
        let group = PreferencesGroup::builder()
            .title("System Tray")
            .description("Takes effect after restarting the application")
            .build();

        let enable_row = create_switch_row_from_settings(
            "Show Tray Icon",
            "Control playback from the system tray",
            |settings| settings.enable_system_tray,
            |settings, active| settings.enable_system_tray = active,
            self.settings_manager.clone(),
        );
        let close_row = create_switch_row_from_settings(
            "Close to Tray",
            "Closing the window keeps the application running",
            |settings| settings.close_to_system_tray,
            |settings, active| settings.close_to_system_tray = active,
            self.settings_manager.clone(),
        );
        enable_row
            .bind_property("active", &close_row, "sensitive")
            .sync_create()
            .build();

        group.add(&enable_row);
        group.add(&close_row);
        self.widget.add(&group);
        group
    }

    fn setup_theme_preference(&self) {
        let group = PreferencesGroup::builder()
            .title("Appearance")
            .description("Customize the application's visual appearance")
            .build();

        let combo_row = create_combo_row_from_settings(
            "Theme",
            Some("Choose light or dark theme, or follow system preference"),
            THEMES.iter().map(|(label, _)| (*label).to_string()).collect(),
            |settings| {
                THEMES
                    .iter()
                    .find(|(_, value)| *value == settings.theme_preference)
                    .map_or(THEMES[0].0, |(label, _)| *label)
                    .to_string()
            },
            |settings, label| {
                if let Some((_, value)) = THEMES.iter().find(|(l, _)| *l == label) {
                    settings.theme_preference = (*value).to_string();
                }
            },
            self.settings_manager.clone(),
        );
        combo_row.connect_selected_notify(|row| {
            if let Some((_, value)) = usize::try_from(row.selected())
                .ok()
                .and_then(|index| THEMES.get(index))
            {
                apply_theme(value);
            }
        });

        group.add(&combo_row);
        self.widget.add(&group);
    }
}

#[cfg(test)]
mod tests {
    use libadwaita::ColorScheme;

    use crate::ui::preferences::general_page::color_scheme;

    #[test]
    fn test_color_scheme_mapping() {
        assert_eq!(color_scheme("light"), ColorScheme::ForceLight);
        assert_eq!(color_scheme("dark"), ColorScheme::ForceDark);
        assert_eq!(color_scheme("system"), ColorScheme::Default);
        assert_eq!(color_scheme("sepia"), ColorScheme::Default);
    }
}
