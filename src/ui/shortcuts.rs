//! Global keyboard shortcuts.
//!
//! Accelerators are registered as `win.*` actions on the main window. Escape
//! and space are handled from a key controller instead, since they must not
//! fire while a text entry has focus.

use std::rc::Rc;

use {
    libadwaita::{
        Application, ApplicationWindow,
        gio::SimpleAction,
        glib::Propagation,
        gtk::{
            EventControllerKey,
            PropagationPhase::Capture,
            Text,
            gdk::{Key, MODIFIER_MASK},
        },
        prelude::{ActionMapExt, Cast, GtkApplicationExt, GtkWindowExt, ObjectExt, WidgetExt},
    },
    tracing::debug,
};

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    /// Previous page in the history.
    GoBack,
    /// Next page in the history.
    GoForward,
    /// Open the preferences dialog.
    ShowSettings,
    /// Reload the current page.
    Reload,
    /// Focus the page's search box.
    FocusSearch,
    /// Select every item on the page.
    SelectAll,
    /// Hide the window to the tray; nothing without an enabled tray.
    CloseWindow,
    /// Activate the navigation button at this index. Indices past the last
    /// button are ignored.
    QuickNavigate(usize),
    /// Dismiss the open pop-up.
    DismissPopup,
    /// Toggle playback.
    PlayPause,
}

/// An accelerator bound to a window action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Action name without the `win.` prefix.
    pub name: String,
    /// GTK accelerator string.
    pub accelerator: String,
    /// What the shortcut does.
    pub action: ShortcutAction,
}

/// Number of quick-navigation accelerators, `<Control>1` onwards.
pub const QUICK_NAVIGATION_SHORTCUTS: usize = 7;

/// Handler receiving triggered shortcuts.
pub type ShortcutHandler = Rc<dyn Fn(ShortcutAction)>;

/// The accelerator table.
#[must_use]
pub fn shortcut_table() -> Vec<Shortcut> {
    let fixed = [
        ("go-back", "<Alt>Left", ShortcutAction::GoBack),
        ("go-forward", "<Alt>Right", ShortcutAction::GoForward),
        ("show-settings", "<Control>comma", ShortcutAction::ShowSettings),
        ("reload", "<Control>r", ShortcutAction::Reload),
        ("focus-search", "<Control>f", ShortcutAction::FocusSearch),
        ("select-all", "<Control>a", ShortcutAction::SelectAll),
        ("close-window", "<Control>w", ShortcutAction::CloseWindow),
    ];

    let mut table: Vec<Shortcut> = fixed
        .into_iter()
        .map(|(name, accelerator, action)| Shortcut {
            name: name.to_string(),
            accelerator: accelerator.to_string(),
            action,
        })
        .collect();
    table.extend((0..QUICK_NAVIGATION_SHORTCUTS).map(|index| Shortcut {
        name: format!("navigate-{}", index + 1),
        accelerator: format!("<Control>{}", index + 1),
        action: ShortcutAction::QuickNavigate(index),
    }));
    table
}

/// Maps an unmodified key press to its action.
///
/// # Arguments
///
/// * `key_name` - GDK key name, e.g. `"Escape"` or `"space"`
/// * `text_focused` - Whether a text entry has focus
#[must_use]
pub fn typed_key_action(key_name: &str, text_focused: bool) -> Option<ShortcutAction> {
    match key_name {
        "Escape" => Some(ShortcutAction::DismissPopup),
        "space" if !text_focused => Some(ShortcutAction::PlayPause),
        _ => None,
    }
}

/// Registers the accelerators and the typed-key controller on a window.
pub fn install(app: &Application, window: &ApplicationWindow, handler: &ShortcutHandler) {
    for shortcut in shortcut_table() {
        let action = SimpleAction::new(&shortcut.name, None);
        let (handler, kind) = (handler.clone(), shortcut.action);
        action.connect_activate(move |_, _| handler(kind));
        window.add_action(&action);
        app.set_accels_for_action(
            &format!("win.{}", shortcut.name),
            &[shortcut.accelerator.as_str()],
        );
    }

    let controller = EventControllerKey::builder()
        .propagation_phase(Capture)
        .build();
    let (handler, weak_window) = (handler.clone(), window.downgrade());
    controller.connect_key_pressed(move |_, key, _, modifiers| {
        if !(modifiers & MODIFIER_MASK).is_empty() {
            return Propagation::Proceed;
        }
        let text_focused = weak_window
            .upgrade()
            .and_then(|window| window.focus())
            .is_some_and(|widget| widget.downcast_ref::<Text>().is_some());
        let Some(action) = key
            .name()
            .and_then(|name| typed_key_action(name.as_str(), text_focused))
        else {
            return Propagation::Proceed;
        };
        debug!(?action, "Typed shortcut");
        handler(action);
        if action == ShortcutAction::PlayPause || key == Key::Escape {
            Propagation::Stop
        } else {
            Propagation::Proceed
        }
    });
    window.add_controller(controller);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::ui::shortcuts::{
        QUICK_NAVIGATION_SHORTCUTS, ShortcutAction, shortcut_table, typed_key_action,
    };

    #[test]
    fn test_table_has_unique_names_and_accelerators() {
        let table = shortcut_table();
        assert_eq!(table.len(), 7 + QUICK_NAVIGATION_SHORTCUTS);

        let names: HashSet<_> = table.iter().map(|s| s.name.as_str()).collect();
        let accelerators: HashSet<_> = table.iter().map(|s| s.accelerator.as_str()).collect();
        assert_eq!(names.len(), table.len());
        assert_eq!(accelerators.len(), table.len());
    }

    #[test]
    fn test_quick_navigation_accelerators() {
        let table = shortcut_table();
        let first = table
            .iter()
            .find(|s| s.action == ShortcutAction::QuickNavigate(0))
            .map(|s| s.accelerator.as_str());
        let last = table
            .iter()
            .find(|s| s.action == ShortcutAction::QuickNavigate(6))
            .map(|s| s.accelerator.as_str());
        assert_eq!(first, Some("<Control>1"));
        assert_eq!(last, Some("<Control>7"));
    }

    #[test]
    fn test_back_and_close_bindings() {
        let table = shortcut_table();
        let accel = |action| {
            table
                .iter()
                .find(|s| s.action == action)
                .map(|s| s.accelerator.clone())
        };
        assert_eq!(accel(ShortcutAction::GoBack).as_deref(), Some("<Alt>Left"));
        assert_eq!(accel(ShortcutAction::CloseWindow).as_deref(), Some("<Control>w"));
        assert_eq!(accel(ShortcutAction::ShowSettings).as_deref(), Some("<Control>comma"));
    }

    #[test]
    fn test_typed_keys() {
        assert_eq!(
            typed_key_action("Escape", true),
            Some(ShortcutAction::DismissPopup)
        );
        assert_eq!(
            typed_key_action("space", false),
            Some(ShortcutAction::PlayPause)
        );
        assert_eq!(typed_key_action("space", true), None);
        assert_eq!(typed_key_action("a", false), None);
    }
}
