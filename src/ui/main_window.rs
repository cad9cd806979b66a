//! Main window behavior: session flow, navigation, shortcuts, tray and updates.
//!
//! [`MainWindowController`] owns the decisions and talks to the actual window
//! through [`WindowHost`], which the GTK application implements. Everything
//! here runs on the UI thread; the update check is the only work sent to a
//! blocking task, and its result comes back over a channel before any dialog
//! is shown.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
    sync::Arc,
};

use {
    async_channel::bounded,
    libadwaita::glib::MainContext,
    tokio::{runtime::Handle, sync::broadcast::error::RecvError},
    tracing::{debug, info, warn},
};

use crate::{
    backend::{NowPlaying, PlaybackManager, ServerManager, UpdateChecker, UpdateOutcome},
    config::{SettingsManager, StartupPage},
    error::{ErrorReporter, ResultExt},
    state::{AppState, AppStateEvent, ConnectionEvent, ConnectionState},
    ui::{
        browsing::{Route, Router},
        shortcuts::ShortcutAction,
        tray::{SystemTray, TrayAction, tray_menu, volume_nudge},
    },
};

/// Window operations the controller needs.
pub trait WindowHost {
    /// Sets the window title.
    fn set_title(&self, title: &str);

    /// Shows and raises the window.
    fn present(&self);

    /// Hides the window, leaving the application running.
    fn hide(&self);

    /// Closes the window, ending the application.
    fn close(&self);

    /// Shows the login prompt.
    fn prompt_login(&self);

    /// Enables or disables the navigation buttons.
    fn set_navigation_enabled(&self, enabled: bool);

    /// Announces a new release; closing the dialog must call
    /// [`MainWindowController::on_version_dialog_closed`].
    fn show_new_version_dialog(&self, version_tag: &str, release_url: &str);

    /// Shows an informational message.
    fn show_info_dialog(&self, heading: &str, body: &str);

    /// Opens the preferences dialog.
    fn show_settings(&self);

    /// Opens the about dialog.
    fn show_about(&self);

    /// Closes an open pop-up. Returns `false` if none was open.
    fn dismiss_popup(&self) -> bool;
}

/// Collaborators of the main window.
pub struct MainWindowDeps {
    /// Window implementation.
    pub host: Rc<dyn WindowHost>,
    /// Browsing pane.
    pub router: Rc<RefCell<Router>>,
    /// Shared state hub.
    pub app_state: Arc<AppState>,
    /// Persisted settings.
    pub settings: Arc<SettingsManager>,
    /// Server session.
    pub server: Arc<dyn ServerManager>,
    /// Playback commands.
    pub playback: Arc<dyn PlaybackManager>,
    /// Release checks.
    pub updates: Arc<dyn UpdateChecker>,
    /// System tray, when the host has one.
    pub tray: Option<Rc<dyn SystemTray>>,
}

/// Route shown after connecting.
#[must_use]
pub fn startup_route(startup_page: StartupPage) -> Route {
    match startup_page {
        StartupPage::Albums => Route::Albums,
        StartupPage::Favorites => Route::Favorites,
        StartupPage::Playlists => Route::Playlists,
    }
}

/// Window title for the playing track.
#[must_use]
pub fn window_title(app_name: &str, now_playing: Option<&NowPlaying>) -> String {
    match now_playing {
        Some(now_playing) => format!(
            "{} – {} · {app_name}",
            now_playing.title, now_playing.artist
        ),
        None => app_name.to_string(),
    }
}

/// Drives the main window.
pub struct MainWindowController {
    app_name: String,
    running_version: String,
    host: Rc<dyn WindowHost>,
    router: Rc<RefCell<Router>>,
    app_state: Arc<AppState>,
    settings: Arc<SettingsManager>,
    server: Arc<dyn ServerManager>,
    playback: Arc<dyn PlaybackManager>,
    updates: Arc<dyn UpdateChecker>,
    tray: Option<Rc<dyn SystemTray>>,
}

impl MainWindowController {
    /// Creates the controller.
    ///
    /// # Arguments
    ///
    /// * `app_name` - Display name used in titles and dialogs
    /// * `running_version` - Release tag of the running build
    /// * `deps` - Window and backend collaborators
    #[must_use]
    pub fn new(app_name: &str, running_version: &str, deps: MainWindowDeps) -> Rc<Self> {
        Rc::new(Self {
            app_name: app_name.to_string(),
            running_version: running_version.to_string(),
            host: deps.host,
            router: deps.router,
            app_state: deps.app_state,
            settings: deps.settings,
            server: deps.server,
            playback: deps.playback,
            updates: deps.updates,
            tray: deps.tray,
        })
    }

    /// Installs the tray menu when a tray exists and is enabled.
    ///
    /// # Returns
    ///
    /// Whether a tray menu was installed.
    pub fn setup_tray(self: &Rc<Self>) -> bool {
        let Some(tray) = self.active_tray() else {
            debug!("System tray unavailable or disabled");
            return false;
        };
        let weak = Rc::downgrade(self);
        tray.set_menu(
            &tray_menu(),
            Rc::new(move |action| {
                if let Some(controller) = weak.upgrade() {
                    controller.handle_tray_action(action);
                }
            }),
        );
        tray.set_tooltip(&self.app_name);
        true
    }

    /// Follows now-playing changes on the UI thread.
    pub fn watch_app_state(self: &Rc<Self>) {
        let mut rx = self.app_state.subscribe();
        let weak: Weak<Self> = Rc::downgrade(self);
        MainContext::default().spawn_local(async move {
            loop {
                match rx.recv().await {
                    Ok(AppStateEvent::NowPlayingChanged(now_playing)) => {
                        let Some(controller) = weak.upgrade() else {
                            break;
                        };
                        controller.update_title(now_playing.as_ref());
                    }
                    Ok(AppStateEvent::ConnectionChanged(state)) => {
                        debug!(?state, "Connection state changed");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "App state receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// Connects to the server, prompting for login again on failure.
    ///
    /// # Returns
    ///
    /// Whether the session was established.
    pub fn connect(&self) -> bool {
        if !self
            .app_state
            .apply_connection_event(ConnectionEvent::ConnectRequested)
        {
            return false;
        }

        match self.server.connect().add_context("Failed to connect to server") {
            Ok(()) => {
                self.on_server_connected();
                true
            }
            Err(e) => {
                ErrorReporter::warn(&e, "connect");
                self.app_state
                    .apply_connection_event(ConnectionEvent::ConnectFailed);
                self.host.prompt_login();
                false
            }
        }
    }

    /// Enables browsing, shows the startup page and announces a pending release.
    pub fn on_server_connected(&self) {
        self.app_state
            .apply_connection_event(ConnectionEvent::Connected);
        self.router.borrow_mut().enable_navigation();
        self.host.set_navigation_enabled(true);

        let route = startup_route(self.settings.get_settings().startup_page);
        info!(%route, "Connected, showing startup page");
        if let Err(e) = self.router.borrow_mut().navigate_to(route) {
            warn!(error = %e, "Startup page unavailable");
        }

        self.announce_found_release();
    }

    /// Announces the release found by the startup check if a session is
    /// already up. Otherwise connecting announces it.
    pub fn on_startup_check_finished(&self) {
        if self.app_state.get_connection_state() == ConnectionState::Connected {
            self.announce_found_release();
        }
    }

    fn announce_found_release(&self) {
        let Some(found) = self.updates.version_tag_found() else {
            return;
        };
        let last_checked = self.settings.get_settings().last_checked_version.clone();
        if last_checked.as_deref() == Some(found.as_str()) {
            debug!(tag = %found, "Release already announced");
            return;
        }
        if found != self.running_version {
            self.host
                .show_new_version_dialog(&found, &self.updates.latest_release_url());
        }
        self.store_checked_version(&found);
    }

    /// Announces a release found by the periodic check.
    pub fn on_updated_version_found(&self, version_tag: &str) {
        if version_tag != self.running_version {
            self.host
                .show_new_version_dialog(version_tag, &self.updates.latest_release_url());
        }
        self.store_checked_version(version_tag);
    }

    /// Remembers the announced release so it is not announced again.
    pub fn on_version_dialog_closed(&self, version_tag: &str) {
        self.store_checked_version(version_tag);
    }

    /// Checks for a release on a blocking task and reports the result.
    pub fn check_for_updates(self: &Rc<Self>, runtime: &Handle) {
        let (tx, rx) = bounded(1);
        let updates = self.updates.clone();
        runtime.spawn_blocking(move || {
            let found = updates.check_latest_version_tag();
            if tx.send_blocking(found).is_err() {
                debug!("Update check result dropped");
            }
        });

        let weak = Rc::downgrade(self);
        MainContext::default().spawn_local(async move {
            let found = rx.recv().await.ok().flatten();
            if let Some(controller) = weak.upgrade() {
                controller.show_update_check_result(found.as_deref());
            }
        });
    }

    /// Reports the outcome of an on-demand update check.
    pub fn show_update_check_result(&self, found: Option<&str>) -> UpdateOutcome {
        let outcome = UpdateOutcome::from_check(found, &self.running_version);
        match &outcome {
            UpdateOutcome::NewVersion(tag) => self
                .host
                .show_new_version_dialog(tag, &self.updates.latest_release_url()),
            UpdateOutcome::UpToDate => self.host.show_info_dialog(
                "No new version found",
                &format!("You are running the latest version of {}", self.app_name),
            ),
        }
        outcome
    }

    /// Logs out and forgets the credentials.
    pub fn logout(&self) {
        self.server.logout(true);
        self.end_session();
    }

    /// Logs out, keeping the credentials, to pick another server.
    pub fn switch_servers(&self) {
        self.server.logout(false);
        self.end_session();
    }

    /// Asks the server to rescan and reloads the current page.
    pub fn rescan_library(&self) {
        match self
            .server
            .rescan_library()
            .add_context("Failed to rescan library")
        {
            Ok(()) => self.router.borrow_mut().reload(),
            Err(e) => {
                ErrorReporter::warn(&e, "rescan");
                self.host
                    .show_info_dialog("Rescan failed", &ErrorReporter::to_user_message(&e));
            }
        }
    }

    /// Sets the window title for the playing track.
    pub fn update_title(&self, now_playing: Option<&NowPlaying>) {
        let title = window_title(&self.app_name, now_playing);
        self.host.set_title(&title);
        if let Some(tray) = &self.tray {
            tray.set_tooltip(&title);
        }
    }

    /// Handles a close request from the window manager.
    ///
    /// # Returns
    ///
    /// `true` if the window was only hidden to the tray.
    pub fn close_window(&self) -> bool {
        if self.hide_to_tray() {
            return true;
        }
        self.host.close();
        false
    }

    /// Hides the window when closing to an enabled tray, otherwise does nothing.
    ///
    /// # Returns
    ///
    /// Whether the window was hidden.
    pub fn hide_to_tray(&self) -> bool {
        let hide = self.settings.get_settings().close_to_system_tray && self.active_tray().is_some();
        if hide {
            self.host.hide();
        }
        hide
    }

    /// Whether a tray host exists, regardless of settings.
    #[must_use]
    pub fn has_tray(&self) -> bool {
        self.tray.is_some()
    }

    /// Runs a keyboard shortcut.
    pub fn handle_shortcut(&self, action: ShortcutAction) {
        debug!(?action, "Shortcut");
        match action {
            ShortcutAction::GoBack => {
                self.router.borrow_mut().go_back();
            }
            ShortcutAction::GoForward => {
                self.router.borrow_mut().go_forward();
            }
            ShortcutAction::ShowSettings => self.host.show_settings(),
            ShortcutAction::Reload => self.router.borrow_mut().reload(),
            ShortcutAction::FocusSearch => {
                self.router.borrow().focus_search();
            }
            ShortcutAction::SelectAll => self.router.borrow_mut().select_all(),
            ShortcutAction::CloseWindow => {
                self.hide_to_tray();
            }
            ShortcutAction::QuickNavigate(index) => {
                self.router.borrow_mut().activate_navigation_button(index);
            }
            ShortcutAction::DismissPopup => {
                self.host.dismiss_popup();
            }
            ShortcutAction::PlayPause => self.playback.play_pause(),
        }
    }

    /// Runs a tray menu entry.
    pub fn handle_tray_action(&self, action: TrayAction) {
        match action {
            TrayAction::PlayPause => self.playback.play_pause(),
            TrayAction::Previous => self.playback.seek_back_or_previous(),
            TrayAction::Next => self.playback.seek_next(),
            TrayAction::VolumeUp => self
                .playback
                .set_volume(volume_nudge(self.playback.volume(), true)),
            TrayAction::VolumeDown => self
                .playback
                .set_volume(volume_nudge(self.playback.volume(), false)),
            TrayAction::Show => self.host.present(),
            TrayAction::Hide => self.host.hide(),
        }
    }

    fn active_tray(&self) -> Option<&Rc<dyn SystemTray>> {
        self.tray
            .as_ref()
            .filter(|_| self.settings.get_settings().enable_system_tray)
    }

    fn end_session(&self) {
        self.app_state
            .apply_connection_event(ConnectionEvent::LoggedOut);
        {
            let mut router = self.router.borrow_mut();
            router.disable_navigation();
            router.set_page(None);
            router.clear_history();
        }
        self.host.set_navigation_enabled(false);
        self.host.set_title(&self.app_name);
        self.host.prompt_login();
    }

    fn store_checked_version(&self, version_tag: &str) {
        self.settings
            .update_with(|settings| settings.last_checked_version = Some(version_tag.to_string()))
            .or_degrade("store last checked version");
    }
}
