//! GTK chrome around a grid page: title, sort selector, filter, search.
//!
//! Widget signals forward to the page lifecycle in
//! [`GridViewPage`](crate::ui::browsing::GridViewPage); the header only mirrors
//! what the page decides (for example the sort selector goes insensitive while
//! a search is active).

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use {
    libadwaita::{
        ButtonContent,
        gtk::{
            Align::Center,
            Box, Button, DropDown, Label,
            Orientation::{Horizontal, Vertical},
            SearchEntry, Widget,
        },
        prelude::{BoxExt, ButtonExt, Cast, EditableExt, WidgetExt},
    },
    tracing::{debug, error},
};

use crate::{
    backend::AlbumFilter,
    ui::{
        browsing::{
            GridViewPage, SavedGridViewPage,
            router::{Page, Route, SavedPage},
        },
        components::FilterButton,
        views::grid_view::GridView,
    },
};

type SharedPage = Rc<RefCell<GridViewPage<GridView>>>;

/// Header widgets of a grid page.
pub struct GridPageHeader {
    /// The header container.
    pub widget: Box,
    /// Page title.
    pub title_label: Label,
    /// Sort selector, for sortable pages.
    pub sort_dropdown: Option<DropDown>,
    /// Filter button, for filterable pages.
    pub filter_button: Option<FilterButton>,
    /// Search box.
    pub search_entry: SearchEntry,
    /// Page action button, if the page has one.
    pub action_button: Option<Button>,
}

/// A grid page on screen.
pub struct GridPageView {
    /// The page container.
    pub widget: Box,
    /// Header widgets.
    pub header: GridPageHeader,
    page: SharedPage,
}

impl GridPageView {
    /// Wraps a live page in its chrome.
    #[must_use]
    pub fn new(page: GridViewPage<GridView>) -> Self {
        Self::from_shared(Rc::new(RefCell::new(page)))
    }

    fn from_shared(page: SharedPage) -> Self {
        let header = Self::build_header(&page);

        let widget = Box::builder()
            .orientation(Vertical)
            .spacing(6)
            .vexpand(true)
            .hexpand(true)
            .css_classes(["grid-page"])
            .build();
        widget.append(&header.widget);
        widget.append(&page.borrow().grid().widget);

        Self {
            widget,
            header,
            page,
        }
    }

    fn build_header(page: &SharedPage) -> GridPageHeader {
        let shared = page.borrow();
        let weak = Rc::downgrade(page);

        let title_label = Label::builder()
            .label(shared.title())
            .hexpand(true)
            .xalign(0.0)
            .css_classes(["title-1"])
            .build();

        let widget = Box::builder()
            .orientation(Horizontal)
            .spacing(6)
            .margin_top(12)
            .margin_start(12)
            .margin_end(12)
            .valign(Center)
            .build();
        widget.append(&title_label);

        let action_button = shared.action_button().map(|action| {
            let content = ButtonContent::builder()
                .icon_name(action.icon_name)
                .label(action.label.as_str())
                .build();
            let button = Button::builder()
                .child(&content)
                .css_classes(["flat"])
                .build();
            let weak = weak.clone();
            button.connect_clicked(move |_| {
                let Some(page) = weak.upgrade() else {
                    return;
                };
                let filter = page.borrow().filter().cloned().unwrap_or_default();
                (action.on_clicked)(&filter);
            });
            widget.append(&button);
            button
        });

        let sort_dropdown = shared.sort_order().map(|select| {
            let options: Vec<&str> = select.options.iter().map(String::as_str).collect();
            let dropdown = DropDown::from_strings(&options);
            if let Some(index) = select.options.iter().position(|o| *o == select.selected) {
                dropdown.set_selected(u32::try_from(index).unwrap_or_default());
            }
            dropdown.set_sensitive(select.enabled);

            let (weak, options) = (weak.clone(), select.options.clone());
            dropdown.connect_selected_notify(move |dropdown| {
                let Some(page) = weak.upgrade() else {
                    return;
                };
                let selected = usize::try_from(dropdown.selected())
                    .ok()
                    .and_then(|index| options.get(index));
                if let Some(sort_order) = selected {
                    debug!(%sort_order, "Sort order selected");
                    page.borrow_mut().on_sort_order_changed(sort_order);
                }
            });
            widget.append(&dropdown);
            dropdown
        });

        let filter_button = shared.filter().cloned().map(|filter| {
            let genre_page = weak.clone();
            let button = FilterButton::new(
                filter,
                shared.genre_filter_disabled(),
                Rc::new(move || {
                    genre_page
                        .upgrade()
                        .map(|page| page.borrow().load_genres())
                        .unwrap_or_default()
                }),
            );
            let weak = weak.clone();
            button.connect_changed(Rc::new(move |filter: &AlbumFilter| {
                if let Some(page) = weak.upgrade() {
                    page.borrow_mut().set_filter(filter.clone());
                }
            }));
            widget.append(&button.widget);
            button
        });

        let search_entry = SearchEntry::builder()
            .placeholder_text("Search")
            .text(shared.search_text())
            .build();
        {
            let (weak, dropdown) = (weak.clone(), sort_dropdown.clone());
            search_entry.connect_search_changed(move |entry| {
                Self::on_search_changed(&weak, dropdown.as_ref(), entry.text().as_str());
            });
        }
        widget.append(&search_entry);

        GridPageHeader {
            widget,
            title_label,
            sort_dropdown,
            filter_button,
            search_entry,
            action_button,
        }
    }

    fn on_search_changed(
        page: &Weak<RefCell<GridViewPage<GridView>>>,
        dropdown: Option<&DropDown>,
        query: &str,
    ) {
        let Some(page) = page.upgrade() else {
            return;
        };
        // Restoring a page sets the entry text, which must not search again.
        if page.borrow().search_text() == query {
            return;
        }

        page.borrow_mut().on_searched(query);
        if let (Some(dropdown), Some(select)) = (dropdown, page.borrow().sort_order()) {
            dropdown.set_sensitive(select.enabled);
        }
    }
}

impl Page for GridPageView {
    fn route(&self) -> Route {
        self.page.borrow().route()
    }

    fn save(self: std::boxed::Box<Self>) -> std::boxed::Box<dyn SavedPage> {
        let Self {
            widget,
            header,
            page,
        } = *self;
        widget.remove(&page.borrow().grid().widget);
        drop(header);

        match Rc::try_unwrap(page) {
            Ok(page) => std::boxed::Box::new(SavedGridPageView::Detached(page.into_inner().save())),
            Err(page) => {
                error!("Grid page still referenced while saving, keeping it live");
                std::boxed::Box::new(SavedGridPageView::Live(page))
            }
        }
    }

    fn reload(&mut self) {
        self.page.borrow_mut().reload();
    }

    fn focus_search(&self) -> bool {
        self.header.search_entry.grab_focus()
    }

    fn select_all(&mut self) {
        self.page.borrow_mut().select_all();
    }

    fn widget(&self) -> Option<Widget> {
        Some(self.widget.clone().upcast())
    }
}

/// A grid page kept in the navigation history.
pub enum SavedGridPageView {
    /// The page released its grid to the pool.
    Detached(SavedGridViewPage<GridView>),
    /// The page could not be detached and stays alive.
    Live(SharedPage),
}

impl SavedPage for SavedGridPageView {
    fn route(&self) -> Route {
        match self {
            Self::Detached(saved) => saved.route(),
            Self::Live(page) => page.borrow().route(),
        }
    }

    fn restore(self: std::boxed::Box<Self>) -> std::boxed::Box<dyn Page> {
        match *self {
            Self::Detached(saved) => std::boxed::Box::new(GridPageView::new(saved.restore())),
            Self::Live(page) => std::boxed::Box::new(GridPageView::from_shared(page)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    use {
        libadwaita::{init, prelude::{EditableExt, WidgetExt}},
        tempfile::TempDir,
        tokio::runtime::Runtime,
    };

    use crate::{
        backend::{AlbumFilter, FileImageManager, Library, MediaProvider, MemoryProvider},
        ui::{
            browsing::{
                GridViewPage, WidgetPool,
                adapter::GridViewPageAdapter,
                router::{Page, Route},
            },
            views::{
                grid_model::{GridActions, GridViewItemModel, GridViewIterator},
                grid_page::GridPageView,
                grid_view::{GridView, GridViewContext},
            },
        },
    };

    struct PlainAdapter;

    impl GridViewPageAdapter for PlainAdapter {
        fn title(&self) -> String {
            "Playlists".to_string()
        }

        fn filter(&self) -> Option<AlbumFilter> {
            None
        }

        fn placeholder_resource(&self) -> &'static str {
            "view-list-symbolic"
        }

        fn route(&self) -> Route {
            Route::Playlists
        }

        fn iter(
            &self,
            _sort_order: &str,
            _filter: &AlbumFilter,
        ) -> Box<dyn GridViewIterator> {
            Box::new(std::iter::once(GridViewItemModel {
                name: "Mix".to_string(),
                id: "pl-1".to_string(),
                ..GridViewItemModel::default()
            }))
        }

        fn search_iter(
            &self,
            _query: &str,
            _filter: &AlbumFilter,
        ) -> Box<dyn GridViewIterator> {
            Box::new(std::iter::empty())
        }

        fn connect_grid_actions(&self, _actions: &mut GridActions) {}
    }

    struct FilteredAdapter(AlbumFilter);

    impl GridViewPageAdapter for FilteredAdapter {
        fn title(&self) -> String {
            "Albums".to_string()
        }

        fn filter(&self) -> Option<AlbumFilter> {
            Some(self.0.clone())
        }

        fn placeholder_resource(&self) -> &'static str {
            "media-optical-symbolic"
        }

        fn route(&self) -> Route {
            Route::Albums
        }

        fn iter(&self, _sort_order: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
            Box::new(std::iter::empty())
        }

        fn search_iter(&self, _query: &str, _filter: &AlbumFilter) -> Box<dyn GridViewIterator> {
            Box::new(std::iter::empty())
        }

        fn connect_grid_actions(&self, _actions: &mut GridActions) {}
    }

    fn page_view(adapter: Rc<dyn GridViewPageAdapter>, runtime: &Runtime) -> GridPageView {
        let covers = TempDir::new().unwrap();
        let provider: Arc<dyn MediaProvider> =
            Arc::new(MemoryProvider::new(Library::default()));
        let context = GridViewContext {
            images: Arc::new(FileImageManager::new(covers.path().to_path_buf())),
            runtime: runtime.handle().clone(),
        };
        GridPageView::new(GridViewPage::<GridView>::new(
            adapter,
            Rc::new(RefCell::new(WidgetPool::new())),
            provider,
            context,
        ))
    }

    #[test]
    fn test_unfilterable_unsortable_page_has_plain_header() {
        if init().is_err() {
            return;
        }
        let Ok(runtime) = Runtime::new() else {
            return;
        };
        let view = page_view(Rc::new(PlainAdapter), &runtime);

        assert_eq!(view.header.title_label.label().as_str(), "Playlists");
        assert!(view.header.sort_dropdown.is_none());
        assert!(view.header.filter_button.is_none());
        assert!(view.header.action_button.is_none());
        assert!(view.header.search_entry.text().is_empty());
        assert_eq!(view.route(), Route::Playlists);
        assert!(view.widget().is_some_and(|w| w.is_visible()));
    }

    #[test]
    fn test_empty_filter_still_gets_filter_button() {
        if init().is_err() {
            return;
        }
        let Ok(runtime) = Runtime::new() else {
            return;
        };

        let view = page_view(Rc::new(FilteredAdapter(AlbumFilter::default())), &runtime);
        let button = view.header.filter_button.as_ref().unwrap();
        assert!(button.genre_section.is_sensitive());
        assert!(!button.editor.borrow().is_genre_disabled());

        let genre = AlbumFilter {
            genres: vec!["Trip-Hop".to_string()],
            ..AlbumFilter::default()
        };
        let view = page_view(Rc::new(FilteredAdapter(genre)), &runtime);
        let button = view.header.filter_button.as_ref().unwrap();
        assert!(!button.genre_section.is_sensitive());
        assert!(button.editor.borrow().is_genre_disabled());
    }
}
