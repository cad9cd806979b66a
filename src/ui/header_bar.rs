//! Header bar with history buttons, page navigation and the application menu.
//!
//! Menu entries activate `app.*` actions registered by the application; the
//! navigation buttons report their index so the router decides where to go.

use std::rc::Rc;

use libadwaita::{
    HeaderBar as LibadwaitaHeaderBar,
    gio::Menu,
    gtk::{Box, Button, MenuButton, Orientation::Horizontal, ToggleButton},
    prelude::{BoxExt, ButtonExt, ToggleButtonExt, WidgetExt},
};

use crate::ui::browsing::{NAVIGATION_ROUTES, Route};

/// Labels of the navigation buttons, in [`NAVIGATION_ROUTES`] order.
///
/// Quick-navigation shortcuts count from the first of these.
pub const NAVIGATION_LABELS: [&str; 5] = ["Favorites", "Albums", "Artists", "Genres", "Playlists"];

/// Application menu entries as (label, action) pairs.
pub const MENU_ENTRIES: [(&str, &str); 6] = [
    ("Log Out", "app.logout"),
    ("Switch Servers", "app.switch-servers"),
    ("Rescan Library", "app.rescan-library"),
    ("Check for Updates", "app.check-updates"),
    ("Settings...", "app.preferences"),
    ("About...", "app.about"),
];

/// Header bar of the main window.
pub struct HeaderBar {
    /// The underlying Libadwaita header bar widget.
    pub widget: LibadwaitaHeaderBar,
    /// History back button.
    pub back_button: Button,
    /// History forward button.
    pub forward_button: Button,
    /// One toggle per navigation route.
    pub navigation_buttons: Vec<ToggleButton>,
    /// Application menu button.
    pub menu_button: MenuButton,
}

impl Default for HeaderBar {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderBar {
    /// Creates the header bar with navigation disabled.
    #[must_use]
    pub fn new() -> Self {
        let widget = LibadwaitaHeaderBar::builder().build();

        let back_button = Button::builder()
            .icon_name("go-previous-symbolic")
            .tooltip_text("Back")
            .sensitive(false)
            .build();
        widget.pack_start(&back_button);

        let forward_button = Button::builder()
            .icon_name("go-next-symbolic")
            .tooltip_text("Forward")
            .sensitive(false)
            .build();
        widget.pack_start(&forward_button);

        let switcher = Box::builder()
            .orientation(Horizontal)
            .css_classes(["linked"])
            .build();
        let navigation_buttons: Vec<ToggleButton> = NAVIGATION_LABELS
            .iter()
            .map(|label| {
                let button = ToggleButton::builder()
                    .label(*label)
                    .sensitive(false)
                    .build();
                switcher.append(&button);
                button
            })
            .collect();
        widget.set_title_widget(Some(&switcher));

        let menu = Menu::new();
        for (label, action) in MENU_ENTRIES {
            menu.append(Some(label), Some(action));
        }
        let menu_button = MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .tooltip_text("Main Menu")
            .menu_model(&menu)
            .build();
        widget.pack_end(&menu_button);

        Self {
            widget,
            back_button,
            forward_button,
            navigation_buttons,
            menu_button,
        }
    }

    /// Reports clicks on the navigation buttons by index.
    ///
    /// The handler is expected to call [`Self::set_active_route`] afterwards,
    /// since a click toggles the button whether or not the page changes.
    pub fn connect_navigate(&self, on_navigate: Rc<dyn Fn(usize)>) {
        for (index, button) in self.navigation_buttons.iter().enumerate() {
            let on_navigate = on_navigate.clone();
            button.connect_clicked(move |_| on_navigate(index));
        }
    }

    /// Reports clicks on the back and forward buttons.
    pub fn connect_history(&self, on_back: Rc<dyn Fn()>, on_forward: Rc<dyn Fn()>) {
        self.back_button.connect_clicked(move |_| on_back());
        self.forward_button.connect_clicked(move |_| on_forward());
    }

    /// Enables or disables the navigation buttons.
    pub fn set_navigation_enabled(&self, enabled: bool) {
        for button in &self.navigation_buttons {
            button.set_sensitive(enabled);
        }
        if !enabled {
            self.set_history(false, false);
            self.set_active_route(None);
        }
    }

    /// Updates the history buttons.
    pub fn set_history(&self, can_go_back: bool, can_go_forward: bool) {
        self.back_button.set_sensitive(can_go_back);
        self.forward_button.set_sensitive(can_go_forward);
    }

    /// Highlights the button of the shown route, if it has one.
    pub fn set_active_route(&self, route: Option<&Route>) {
        let index = route.and_then(|route| NAVIGATION_ROUTES.iter().position(|r| r == route));
        for (i, button) in self.navigation_buttons.iter().enumerate() {
            button.set_active(Some(i) == index);
        }
    }
}
