//! Application composition root.
//!
//! Builds the backend collaborators, the browsing router and the main window,
//! and connects GTK signals to the [`MainWindowController`].

use std::{
    cell::{OnceCell, RefCell},
    rc::{Rc, Weak},
    sync::Arc,
    time::Duration,
};

use {
    anyhow::Result,
    async_channel::bounded,
    libadwaita::{
        AboutDialog, AlertDialog, Application, ApplicationWindow, Bin, ResponseAppearance,
        ToolbarView,
        gio::{Cancellable, SimpleAction},
        glib::{
            ControlFlow, ExitCode, MainContext, Propagation, idle_add_local_once,
            timeout_add_local,
        },
        gtk::{License, UriLauncher, Widget},
        prelude::{
            ActionMapExt, AdwApplicationWindowExt, AdwDialogExt, AlertDialogExt, AlertDialogExtManual, ApplicationExt,
            ApplicationExtManual, BinExt, GtkApplicationExt, GtkWindowExt, WidgetExt,
        },
    },
    tokio::runtime::Handle,
    tracing::{debug, info, warn},
};

use crate::{
    backend::{
        FileImageManager, LocalLibraryServer, LocalPlayback, MediaProvider, MemoryProvider,
        ReleaseFeedChecker, UpdateChecker, update::RUNNING_VERSION_TAG,
    },
    config::{SettingsManager, get_cache_dir, get_library_path},
    error::ResultExt,
    state::AppState,
    ui::{
        browsing::{
            AdapterContext, GridViewPage, Page, Route, Router, WidgetPool, adapter_for_route,
        },
        header_bar::HeaderBar,
        main_window::{MainWindowController, MainWindowDeps, WindowHost},
        preferences::{PreferencesDialog, apply_theme},
        shortcuts::{ShortcutHandler, install},
        views::{GridPageView, GridView, GridViewContext},
    },
};

/// Display name of the application.
pub const APP_NAME: &str = "Tonearm";

/// Application identifier registered with the session.
pub const APP_ID: &str = "io.github.tonearm.Tonearm";

/// Interval between background release checks.
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// The GTK application and its long-lived collaborators.
pub struct TonearmApplication {
    /// The main application instance.
    pub app: Application,
    /// Persisted settings.
    pub settings: Arc<SettingsManager>,
    /// Shared state hub.
    pub app_state: Arc<AppState>,
    provider: Arc<MemoryProvider>,
    images: Arc<FileImageManager>,
    playback: Arc<LocalPlayback>,
    server: Arc<LocalLibraryServer>,
    updates: Arc<ReleaseFeedChecker>,
    runtime: Handle,
}

impl TonearmApplication {
    /// Creates the application and its backend.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be loaded.
    pub fn new() -> Result<Self> {
        let settings = Arc::new(SettingsManager::new().add_context("Failed to initialize settings")?);
        let library_path = get_library_path(&settings.get_settings());
        info!(path = ?library_path, "Using library catalog");

        let app_state = Arc::new(AppState::new());
        let provider = Arc::new(MemoryProvider::new(Default::default()));
        let playback = Arc::new(LocalPlayback::new(provider.clone(), app_state.clone()));
        let server = Arc::new(LocalLibraryServer::new(library_path, provider.clone()));
        let images = Arc::new(FileImageManager::new(get_cache_dir().join("covers")));

        let app = Application::builder().application_id(APP_ID).build();

        Ok(Self {
            app,
            settings,
            app_state,
            provider,
            images,
            playback,
            server,
            updates: Arc::new(ReleaseFeedChecker::default()),
            runtime: Handle::current(),
        })
    }

    /// Runs the GTK main loop.
    pub fn run(&self) -> ExitCode {
        let this = self.clone_parts();
        self.app.connect_activate(move |app| {
            if let Some(window) = app.active_window() {
                window.present();
                return;
            }
            this.build_ui(app);
        });

        self.app.run()
    }

    fn clone_parts(&self) -> Parts {
        Parts {
            settings: self.settings.clone(),
            app_state: self.app_state.clone(),
            provider: self.provider.clone(),
            images: self.images.clone(),
            playback: self.playback.clone(),
            server: self.server.clone(),
            updates: self.updates.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

struct Parts {
    settings: Arc<SettingsManager>,
    app_state: Arc<AppState>,
    provider: Arc<MemoryProvider>,
    images: Arc<FileImageManager>,
    playback: Arc<LocalPlayback>,
    server: Arc<LocalLibraryServer>,
    updates: Arc<ReleaseFeedChecker>,
    runtime: Handle,
}

impl Parts {
    fn build_ui(&self, app: &Application) {
        apply_theme(&self.settings.get_settings().theme_preference);

        let (width, height) = {
            let settings = self.settings.get_settings();
            (settings.window_width, settings.window_height)
        };
        let window = ApplicationWindow::builder()
            .application(app)
            .title(APP_NAME)
            .default_width(width)
            .default_height(height)
            .build();

        let header = Rc::new(HeaderBar::new());
        let content = Bin::builder().hexpand(true).vexpand(true).build();
        let toolbar = ToolbarView::new();
        toolbar.add_top_bar(&header.widget);
        toolbar.set_content(Some(&content));
        window.set_content(Some(&toolbar));

        let router = self.build_router();
        let host = Rc::new(GtkWindowHost {
            app: app.clone(),
            window: window.clone(),
            header: header.clone(),
            settings: self.settings.clone(),
            controller: OnceCell::new(),
        });

        let controller = MainWindowController::new(
            APP_NAME,
            RUNNING_VERSION_TAG,
            MainWindowDeps {
                host: host.clone(),
                router: router.clone(),
                app_state: self.app_state.clone(),
                settings: self.settings.clone(),
                server: self.server.clone(),
                playback: self.playback.clone(),
                updates: self.updates.clone(),
                tray: None,
            },
        );
        if host.controller.set(Rc::downgrade(&controller)).is_err() {
            warn!("Window host already bound");
        }

        connect_router(&router, &content, &header);
        connect_header(&header, &router);
        connect_app_actions(app, &controller, &host, &self.runtime);

        let handler: ShortcutHandler = {
            let weak = Rc::downgrade(&controller);
            Rc::new(move |action| {
                if let Some(controller) = weak.upgrade() {
                    controller.handle_shortcut(action);
                }
            })
        };
        install(app, &window, &handler);

        {
            let (weak, settings) = (Rc::downgrade(&controller), self.settings.clone());
            window.connect_close_request(move |window| {
                let (width, height) = window.default_size();
                settings
                    .update_with(|s| {
                        s.window_width = width;
                        s.window_height = height;
                    })
                    .or_degrade("store window size");
                match weak.upgrade() {
                    Some(controller) if controller.close_window() => Propagation::Stop,
                    _ => Propagation::Proceed,
                }
            });
        }

        controller.setup_tray();
        controller.watch_app_state();
        self.start_update_checks(&controller);

        window.present();
        controller.connect();
    }

    fn build_router(&self) -> Rc<RefCell<Router>> {
        let router_cell: Rc<OnceCell<Weak<RefCell<Router>>>> = Rc::new(OnceCell::new());
        let navigate: Rc<dyn Fn(Route)> = {
            let router_cell = router_cell.clone();
            Rc::new(move |route: Route| {
                let router_cell = router_cell.clone();
                // Item actions fire inside widget handlers; navigate once they return.
                idle_add_local_once(move || {
                    let Some(router) = router_cell.get().and_then(Weak::upgrade) else {
                        return;
                    };
                    if let Err(e) = router.borrow_mut().navigate_to(route) {
                        debug!(error = %e, "Item navigation refused");
                    }
                });
            })
        };

        let provider: Arc<dyn MediaProvider> = self.provider.clone();
        let ctx = AdapterContext {
            provider: provider.clone(),
            playback: self.playback.clone(),
            settings: self.settings.clone(),
            navigate,
        };
        let grid_context = GridViewContext {
            images: self.images.clone(),
            runtime: self.runtime.clone(),
        };
        let pool = Rc::new(RefCell::new(WidgetPool::new()));

        let router = Rc::new(RefCell::new(Router::new(Box::new(move |route: &Route| {
            let adapter = adapter_for_route(route, &ctx)?;
            let page = GridViewPage::<GridView>::new(
                adapter,
                pool.clone(),
                provider.clone(),
                grid_context.clone(),
            );
            Some(Box::new(GridPageView::new(page)) as Box<dyn Page>)
        }))));
        if router_cell.set(Rc::downgrade(&router)).is_err() {
            warn!("Router already bound");
        }
        router
    }

    fn start_update_checks(&self, controller: &Rc<MainWindowController>) {
        let (tx, rx) = bounded(1);
        let updates = self.updates.clone();
        self.runtime.spawn_blocking(move || {
            if tx.send_blocking(updates.check_latest_version_tag()).is_err() {
                debug!("Startup update result dropped");
            }
        });
        let weak = Rc::downgrade(controller);
        MainContext::default().spawn_local(async move {
            if rx.recv().await.is_err() {
                return;
            }
            if let Some(controller) = weak.upgrade() {
                controller.on_startup_check_finished();
            }
        });

        let (weak, updates, runtime) = (
            Rc::downgrade(controller),
            self.updates.clone(),
            self.runtime.clone(),
        );
        timeout_add_local(UPDATE_CHECK_INTERVAL, move || {
            let Some(controller) = weak.upgrade() else {
                return ControlFlow::Break;
            };
            let (tx, rx) = bounded(1);
            let updates = updates.clone();
            runtime.spawn_blocking(move || {
                if tx.send_blocking(updates.check_latest_version_tag()).is_err() {
                    debug!("Periodic update result dropped");
                }
            });
            let weak = Rc::downgrade(&controller);
            MainContext::default().spawn_local(async move {
                let Ok(Some(tag)) = rx.recv().await else {
                    return;
                };
                if let Some(controller) = weak.upgrade() {
                    controller.on_updated_version_found(&tag);
                }
            });
            ControlFlow::Continue
        });
    }
}

fn connect_router(router: &Rc<RefCell<Router>>, content: &Bin, header: &Rc<HeaderBar>) {
    let (content, header_changed, weak_router) =
        (content.clone(), header.clone(), Rc::downgrade(router));
    router
        .borrow_mut()
        .connect_page_changed(Box::new(move |page: Option<&dyn Page>| {
            let widget: Option<Widget> = page.and_then(|page| page.widget());
            content.set_child(widget.as_ref());
            header_changed.set_active_route(page.map(|page| page.route()).as_ref());

            // The router is still borrowed while it notifies.
            let (header, weak_router) = (header_changed.clone(), weak_router.clone());
            idle_add_local_once(move || {
                if let Some(router) = weak_router.upgrade() {
                    let router = router.borrow();
                    header.set_history(router.can_go_back(), router.can_go_forward());
                }
            });
        }));
}

fn connect_header(header: &Rc<HeaderBar>, router: &Rc<RefCell<Router>>) {
    let (weak_router, weak_header) = (Rc::downgrade(router), Rc::downgrade(header));
    header.connect_navigate(Rc::new(move |index| {
        let Some(router) = weak_router.upgrade() else {
            return;
        };
        router.borrow_mut().activate_navigation_button(index);
        if let Some(header) = weak_header.upgrade() {
            header.set_active_route(router.borrow().current_route().as_ref());
        }
    }));

    let (back_router, forward_router) = (Rc::downgrade(router), Rc::downgrade(router));
    header.connect_history(
        Rc::new(move || {
            if let Some(router) = back_router.upgrade() {
                router.borrow_mut().go_back();
            }
        }),
        Rc::new(move || {
            if let Some(router) = forward_router.upgrade() {
                router.borrow_mut().go_forward();
            }
        }),
    );
}

fn connect_app_actions(
    app: &Application,
    controller: &Rc<MainWindowController>,
    host: &Rc<GtkWindowHost>,
    runtime: &Handle,
) {
    add_app_action(app, controller, "logout", |c| c.logout());
    add_app_action(app, controller, "switch-servers", |c| c.switch_servers());
    add_app_action(app, controller, "rescan-library", |c| c.rescan_library());

    let runtime = runtime.clone();
    add_app_action(app, controller, "check-updates", move |c| {
        c.check_for_updates(&runtime);
    });

    let weak_host = Rc::downgrade(host);
    add_app_action(app, controller, "preferences", move |_| {
        if let Some(host) = weak_host.upgrade() {
            host.show_settings();
        }
    });

    let weak_host = Rc::downgrade(host);
    add_app_action(app, controller, "about", move |_| {
        if let Some(host) = weak_host.upgrade() {
            host.show_about();
        }
    });
}

fn add_app_action(
    app: &Application,
    controller: &Rc<MainWindowController>,
    name: &str,
    on_activate: impl Fn(&Rc<MainWindowController>) + 'static,
) {
    let action = SimpleAction::new(name, None);
    let weak = Rc::downgrade(controller);
    action.connect_activate(move |_, _| {
        if let Some(controller) = weak.upgrade() {
            on_activate(&controller);
        }
    });
    app.add_action(&action);
}

/// [`WindowHost`] over the libadwaita main window.
struct GtkWindowHost {
    app: Application,
    window: ApplicationWindow,
    header: Rc<HeaderBar>,
    settings: Arc<SettingsManager>,
    controller: OnceCell<Weak<MainWindowController>>,
}

impl WindowHost for GtkWindowHost {
    fn set_title(&self, title: &str) {
        self.window.set_title(Some(title));
    }

    fn present(&self) {
        self.window.present();
    }

    fn hide(&self) {
        self.window.set_visible(false);
    }

    fn close(&self) {
        self.app.quit();
    }

    fn prompt_login(&self) {
        let library_path = get_library_path(&self.settings.get_settings());
        let dialog = AlertDialog::builder()
            .heading("Connect to Library")
            .body(format!(
                "Open the library catalog at {}",
                library_path.display()
            ))
            .can_close(false)
            .build();
        dialog.add_responses(&[("quit", "Quit"), ("connect", "Connect")]);
        dialog.set_response_appearance("connect", ResponseAppearance::Suggested);
        dialog.set_default_response(Some("connect"));

        let (weak, app) = (self.controller.get().cloned(), self.app.clone());
        dialog.connect_response(None, move |_, response| {
            if response != "connect" {
                app.quit();
                return;
            }
            let weak = weak.clone();
            idle_add_local_once(move || {
                if let Some(controller) = weak.as_ref().and_then(Weak::upgrade) {
                    controller.connect();
                }
            });
        });
        dialog.present(Some(&self.window));
    }

    fn set_navigation_enabled(&self, enabled: bool) {
        self.header.set_navigation_enabled(enabled);
    }

    fn show_new_version_dialog(&self, version_tag: &str, release_url: &str) {
        let dialog = AlertDialog::builder()
            .heading("A new version is available")
            .body(format!("{APP_NAME} {version_tag} is available for download."))
            .build();
        dialog.add_responses(&[("skip", "Skip this version"), ("open", "Go to release page")]);
        dialog.set_response_appearance("open", ResponseAppearance::Suggested);
        dialog.set_close_response("skip");

        let (weak, window, tag, url) = (
            self.controller.get().cloned(),
            self.window.clone(),
            version_tag.to_string(),
            release_url.to_string(),
        );
        dialog.connect_response(None, move |_, response| {
            if response == "open" {
                UriLauncher::new(&url).launch(Some(&window), Cancellable::NONE, |result| {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to open release page");
                    }
                });
            }
            if let Some(controller) = weak.as_ref().and_then(Weak::upgrade) {
                controller.on_version_dialog_closed(&tag);
            }
        });
        dialog.present(Some(&self.window));
    }

    fn show_info_dialog(&self, heading: &str, body: &str) {
        let dialog = AlertDialog::new(Some(heading), Some(body));
        dialog.add_response("ok", "OK");
        dialog.present(Some(&self.window));
    }

    fn show_settings(&self) {
        let tray_available = self
            .controller
            .get()
            .and_then(Weak::upgrade)
            .is_some_and(|controller| controller.has_tray());
        PreferencesDialog::new(self.settings.clone(), tray_available).show(&self.window);
    }

    fn show_about(&self) {
        let dialog = AboutDialog::builder()
            .application_name(APP_NAME)
            .application_icon(APP_ID)
            .version(RUNNING_VERSION_TAG)
            .license_type(License::Gpl30)
            .build();
        dialog.present(Some(&self.window));
    }

    fn dismiss_popup(&self) -> bool {
        self.window
            .visible_dialog()
            .is_some_and(|dialog| dialog.close())
    }
}

#[cfg(test)]
mod tests {
    use crate::ui::application::{APP_ID, UPDATE_CHECK_INTERVAL};

    #[test]
    fn test_application_id_is_reverse_dns() {
        assert_eq!(APP_ID.split('.').count(), 4);
        assert!(!APP_ID.contains(' '));
    }

    #[test]
    fn test_update_interval_is_daily() {
        assert_eq!(UPDATE_CHECK_INTERVAL.as_secs(), 86_400);
    }
}
