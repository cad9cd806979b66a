//! System tray menu model.
//!
//! GTK 4 has no tray API of its own, so the tray is a capability a host may
//! provide. The window controller builds the menu from [`tray_menu`] and
//! routes the chosen [`TrayAction`] to playback and window visibility.

use std::rc::Rc;

use crate::backend::playback::{MAX_VOLUME, MIN_VOLUME};

/// Something the tray menu can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrayAction {
    /// Toggle playback.
    PlayPause,
    /// Previous track, or restart of the current one.
    Previous,
    /// Next track.
    Next,
    /// Raise the volume by a tenth.
    VolumeUp,
    /// Lower the volume by a tenth.
    VolumeDown,
    /// Show the main window.
    Show,
    /// Hide the main window.
    Hide,
}

/// One entry of the tray menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayMenuItem {
    /// A clickable entry.
    Action {
        /// Entry label.
        label: &'static str,
        /// What the entry does.
        action: TrayAction,
    },
    /// A separator line.
    Separator,
}

/// Callback receiving tray menu clicks.
pub type TrayActionHandler = Rc<dyn Fn(TrayAction)>;

/// Host-provided system tray.
pub trait SystemTray {
    /// Installs the menu.
    fn set_menu(&self, items: &[TrayMenuItem], on_action: TrayActionHandler);

    /// Sets the hover text, e.g. the playing track.
    fn set_tooltip(&self, text: &str);
}

/// The tray menu, top to bottom.
#[must_use]
pub fn tray_menu() -> Vec<TrayMenuItem> {
    use TrayAction::{Hide, Next, PlayPause, Previous, Show, VolumeDown, VolumeUp};

    let action = |label, action| TrayMenuItem::Action { label, action };
    vec![
        action("Play/Pause", PlayPause),
        action("Previous", Previous),
        action("Next", Next),
        TrayMenuItem::Separator,
        action("Volume +10%", VolumeUp),
        action("Volume -10%", VolumeDown),
        TrayMenuItem::Separator,
        action("Show", Show),
        action("Hide", Hide),
    ]
}

/// Volume after one nudge: `volume ± trunc(volume * 0.1)`, within the
/// playback manager's range.
///
/// At low volumes a tenth truncates to zero and the nudge does nothing.
#[must_use]
pub fn volume_nudge(volume: i32, up: bool) -> i32 {
    let step = volume / 10;
    let next = if up { volume + step } else { volume - step };
    next.clamp(MIN_VOLUME, MAX_VOLUME)
}
