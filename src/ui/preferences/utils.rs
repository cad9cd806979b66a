//! Shared utility functions for preferences pages.

use std::sync::Arc;

use {
    libadwaita::{
        ComboRow, SwitchRow,
        gtk::StringList,
        prelude::ComboRowExt,
    },
    tracing::debug,
};

use crate::{
    config::{SettingsManager, UserSettings},
    error::ResultExt,
};

/// Creates a combo row from settings with automatic persistence.
///
/// # Arguments
///
/// * `title` - The title for the combo row
/// * `subtitle` - Optional subtitle for the combo row
/// * `options` - Labels to display
/// * `getter` - Reads the selected label from settings
/// * `setter` - Writes the chosen label into settings
/// * `settings_manager` - Settings manager reference for persistence
///
/// # Returns
///
/// A configured `ComboRow` ready to be added to a preferences group.
pub fn create_combo_row_from_settings<F, G>(
    title: &str,
    subtitle: Option<&str>,
    options: Vec<String>,
    getter: F,
    setter: G,
    settings_manager: Arc<SettingsManager>,
) -> ComboRow
where
    F: Fn(&UserSettings) -> String,
    G: Fn(&mut UserSettings, &str) + 'static,
{
    let combo_row = if let Some(sub) = subtitle {
        ComboRow::builder().title(title).subtitle(sub).build()
    } else {
        ComboRow::builder().title(title).build()
    };

    let string_refs: Vec<&str> = options.iter().map(String::as_str).collect();
    combo_row.set_model(Some(&StringList::new(&string_refs)));

    let current = getter(&settings_manager.get_settings());
    if let Some(index) = options
        .iter()
        .position(|option| *option == current)
        .and_then(|index| u32::try_from(index).ok())
    {
        combo_row.set_selected(index);
    }

    combo_row.connect_selected_notify(move |row| {
        let Some(value) = usize::try_from(row.selected())
            .ok()
            .and_then(|index| options.get(index))
        else {
            return;
        };
        debug!(%value, "Preference selected");
        settings_manager
            .update_with(|settings| setter(settings, value))
            .or_degrade("persist preference");
    });

    combo_row
}

/// Creates a switch row bound to a boolean setting.
///
/// # Arguments
///
/// * `title` - The title for the switch row
/// * `subtitle` - Explanation shown below the title
/// * `getter` - Reads the flag from settings
/// * `setter` - Writes the flag into settings
/// * `settings_manager` - Settings manager reference for persistence
pub fn create_switch_row_from_settings<F, G>(
    title: &str,
    subtitle: &str,
    getter: F,
    setter: G,
    settings_manager: Arc<SettingsManager>,
) -> SwitchRow
where
    F: Fn(&UserSettings) -> bool,
    G: Fn(&mut UserSettings, bool) + 'static,
{
    let switch_row = SwitchRow::builder()
        .title(title)
        .subtitle(subtitle)
        .active(getter(&settings_manager.get_settings()))
        .build();

    switch_row.connect_active_notify(move |row| {
        let active = row.is_active();
        settings_manager
            .update_with(|settings| setter(settings, active))
            .or_degrade("persist preference");
    });

    switch_row
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use {
        libadwaita::prelude::{ComboRowExt, PreferencesRowExt},
        tempfile::TempDir,
    };

    use crate::{config::SettingsManager, ui::preferences::utils::create_combo_row_from_settings};

    #[test]
    #[ignore = "Requires GTK display for UI testing"]
    fn test_create_combo_row_from_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings_manager = Arc::new(
            SettingsManager::with_config_path(temp_dir.path().join("settings.json")).unwrap(),
        );

        let options = vec!["light".to_string(), "dark".to_string(), "system".to_string()];
        let combo_row = create_combo_row_from_settings(
            "Theme",
            Some("Colors"),
            options,
            |settings| settings.theme_preference.clone(),
            |settings, value| settings.theme_preference = value.to_string(),
            settings_manager.clone(),
        );

        assert_eq!(combo_row.title(), "Theme");
        assert_eq!(combo_row.selected(), 2);

        combo_row.set_selected(1);
        assert_eq!(settings_manager.get_settings().theme_preference, "dark");
    }
}
