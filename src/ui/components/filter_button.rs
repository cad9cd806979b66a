//! Album filter button with a popover editor.
//!
//! The popover edits a copy of the page's filter: favorites only, a release
//! year range and a genre selection. The genre list is fetched the first time
//! the popover opens. A page whose base filter already names genres gets the
//! genre section disabled and never fetches genres.

use std::{cell::RefCell, rc::Rc};

use libadwaita::{
    gtk::{
        Align::{End, Start},
        Box, CheckButton, Label, ListBox, MenuButton,
        Orientation::{Horizontal, Vertical},
        PolicyType::{Automatic, Never},
        Popover, ScrolledWindow, SelectionMode, SpinButton, Switch, Widget,
    },
    prelude::{BoxExt, CheckButtonExt, IsA, WidgetExt},
};

use tracing::debug;

use crate::backend::AlbumFilter;

/// Highest year the range editor accepts.
pub const MAX_FILTER_YEAR: u32 = 2100;

/// Callback receiving the edited filter.
pub type FilterChanged = Rc<dyn Fn(&AlbumFilter)>;

/// Source of the genre names offered in the popover.
pub type GenreSource = Rc<dyn Fn() -> Vec<String>>;

/// Toolkit-independent filter editing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEditor {
    filter: AlbumFilter,
    genre_disabled: bool,
    genres: Option<Vec<String>>,
}

impl FilterEditor {
    /// Creates an editor over a page filter.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter currently applied by the page
    /// * `genre_disabled` - Whether the genre selection is fixed by the page
    #[must_use]
    pub fn new(filter: AlbumFilter, genre_disabled: bool) -> Self {
        Self {
            filter,
            genre_disabled,
            genres: None,
        }
    }

    /// The edited filter.
    #[must_use]
    pub fn filter(&self) -> &AlbumFilter {
        &self.filter
    }

    /// Whether the genre selection is fixed.
    #[must_use]
    pub fn is_genre_disabled(&self) -> bool {
        self.genre_disabled
    }

    /// Genres offered so far, `None` before the first load.
    #[must_use]
    pub fn genres(&self) -> Option<&[String]> {
        self.genres.as_deref()
    }

    /// Loads the genre list once.
    ///
    /// # Returns
    ///
    /// `true` if `source` was called.
    pub fn ensure_genres(&mut self, source: impl FnOnce() -> Vec<String>) -> bool {
        if self.genre_disabled || self.genres.is_some() {
            return false;
        }
        self.genres = Some(source());
        true
    }

    /// Selects or deselects a genre. Ignored while the genre section is fixed.
    ///
    /// # Returns
    ///
    /// `true` if the filter changed.
    pub fn set_genre_selected(&mut self, genre: &str, selected: bool) -> bool {
        if self.genre_disabled {
            return false;
        }
        let position = self.filter.genres.iter().position(|g| g == genre);
        match (selected, position) {
            (true, None) => {
                self.filter.genres.push(genre.to_string());
                true
            }
            (false, Some(index)) => {
                self.filter.genres.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Sets the year bounds; `0` clears a bound. Reversed bounds are swapped.
    ///
    /// # Returns
    ///
    /// `true` if the filter changed.
    pub fn set_year_range(&mut self, min_year: u32, max_year: u32) -> bool {
        let bound = |year: u32| (year > 0).then_some(year.min(MAX_FILTER_YEAR));
        let (mut min_year, mut max_year) = (bound(min_year), bound(max_year));
        if let (Some(min), Some(max)) = (min_year, max_year)
            && min > max
        {
            (min_year, max_year) = (Some(max), Some(min));
        }

        let changed = self.filter.min_year != min_year || self.filter.max_year != max_year;
        self.filter.min_year = min_year;
        self.filter.max_year = max_year;
        changed
    }

    /// Sets the favorites predicate.
    ///
    /// # Returns
    ///
    /// `true` if the filter changed.
    pub fn set_favorites_only(&mut self, favorites_only: bool) -> bool {
        let changed = self.filter.favorites_only != favorites_only;
        self.filter.favorites_only = favorites_only;
        changed
    }
}

/// Menu button opening the filter popover.
#[derive(Clone)]
pub struct FilterButton {
    /// The underlying menu button.
    pub widget: MenuButton,
    /// Container of the genre check buttons.
    pub genre_list: ListBox,
    /// Genre heading and list, insensitive when the page fixes the genres.
    pub genre_section: Box,
    /// Favorites-only switch.
    pub favorites_switch: Switch,
    /// Editing state.
    pub editor: Rc<RefCell<FilterEditor>>,
    on_changed: Rc<RefCell<Option<FilterChanged>>>,
}

impl FilterButton {
    /// Creates a filter button.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter currently applied by the page
    /// * `genre_disabled` - Whether the page fixes the genre selection
    /// * `genre_source` - Called once, when the popover first opens
    #[must_use]
    pub fn new(filter: AlbumFilter, genre_disabled: bool, genre_source: GenreSource) -> Self {
        let editor = Rc::new(RefCell::new(FilterEditor::new(filter.clone(), genre_disabled)));
        let on_changed: Rc<RefCell<Option<FilterChanged>>> = Rc::new(RefCell::new(None));

        let favorites_switch = Switch::builder()
            .active(filter.favorites_only)
            .valign(Start)
            .build();
        let favorites_row = Self::row("Favorites only", &favorites_switch);

        let min_year = SpinButton::with_range(0.0, f64::from(MAX_FILTER_YEAR), 1.0);
        min_year.set_value(f64::from(filter.min_year.unwrap_or(0)));
        let max_year = SpinButton::with_range(0.0, f64::from(MAX_FILTER_YEAR), 1.0);
        max_year.set_value(f64::from(filter.max_year.unwrap_or(0)));
        let years = Box::builder().orientation(Horizontal).spacing(6).build();
        years.append(&min_year);
        years.append(&Label::new(Some("to")));
        years.append(&max_year);
        let years_row = Self::row("Years", &years);

        let genre_list = ListBox::builder()
            .selection_mode(SelectionMode::None)
            .css_classes(["boxed-list"])
            .build();
        let genre_scroll = ScrolledWindow::builder()
            .hscrollbar_policy(Never)
            .vscrollbar_policy(Automatic)
            .min_content_height(160)
            .child(&genre_list)
            .build();
        let genre_section = Box::builder()
            .orientation(Vertical)
            .spacing(6)
            .sensitive(!genre_disabled)
            .build();
        genre_section.append(
            &Label::builder()
                .label("Genres")
                .halign(Start)
                .css_classes(["heading"])
                .build(),
        );
        genre_section.append(&genre_scroll);

        let content = Box::builder()
            .orientation(Vertical)
            .spacing(12)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(12)
            .margin_end(12)
            .build();
        content.append(&favorites_row);
        content.append(&years_row);
        content.append(&genre_section);

        let popover = Popover::builder().child(&content).build();
        let widget = MenuButton::builder()
            .icon_name("funnel-symbolic")
            .tooltip_text("Filter")
            .popover(&popover)
            .build();

        let button = Self {
            widget,
            genre_list,
            genre_section,
            favorites_switch,
            editor,
            on_changed,
        };
        button.sync_active_style();

        let this = button.clone();
        popover.connect_show(move |_| this.populate_genres(&genre_source));

        let this = button.clone();
        button.favorites_switch.connect_active_notify(move |switch| {
            let changed = this.editor.borrow_mut().set_favorites_only(switch.is_active());
            if changed {
                this.emit_changed();
            }
        });

        for spin in [&min_year, &max_year] {
            let (this, min_year, max_year) = (button.clone(), min_year.clone(), max_year.clone());
            spin.connect_value_changed(move |_| {
                let (min, max) = (min_year.value_as_int(), max_year.value_as_int());
                let changed = this
                    .editor
                    .borrow_mut()
                    .set_year_range(min.max(0).unsigned_abs(), max.max(0).unsigned_abs());
                if changed {
                    this.emit_changed();
                }
            });
        }

        button
    }

    /// Registers the handler called after every edit.
    pub fn connect_changed(&self, handler: FilterChanged) {
        *self.on_changed.borrow_mut() = Some(handler);
    }

    fn row(title: &str, control: &impl IsA<Widget>) -> Box {
        let row = Box::builder().orientation(Horizontal).spacing(12).build();
        row.append(
            &Label::builder()
                .label(title)
                .halign(Start)
                .hexpand(true)
                .build(),
        );
        control.set_halign(End);
        row.append(control);
        row
    }

    fn populate_genres(&self, source: &GenreSource) {
        if !self.editor.borrow_mut().ensure_genres(|| source()) {
            return;
        }

        let (genres, selected) = {
            let editor = self.editor.borrow();
            (
                editor.genres().unwrap_or_default().to_vec(),
                editor.filter().genres.clone(),
            )
        };
        debug!(count = genres.len(), "Populating genre filter");

        for genre in genres {
            let check = CheckButton::builder()
                .label(genre.as_str())
                .active(selected.contains(&genre))
                .build();
            let this = self.clone();
            check.connect_toggled(move |check| {
                let changed = this
                    .editor
                    .borrow_mut()
                    .set_genre_selected(&genre, check.is_active());
                if changed {
                    this.emit_changed();
                }
            });
            self.genre_list.append(&check);
        }
    }

    fn sync_active_style(&self) {
        if self.editor.borrow().filter().is_empty() {
            self.widget.remove_css_class("accent");
        } else {
            self.widget.add_css_class("accent");
        }
    }

    fn emit_changed(&self) {
        self.sync_active_style();
        let filter = self.editor.borrow().filter().clone();
        let handler = self.on_changed.borrow().clone();
        if let Some(handler) = handler {
            handler(&filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use libadwaita::{init, prelude::WidgetExt};

    use crate::{
        backend::AlbumFilter,
        ui::components::filter_button::{FilterButton, FilterEditor, MAX_FILTER_YEAR},
    };

    #[test]
    fn test_genres_load_once() {
        let mut editor = FilterEditor::new(AlbumFilter::default(), false);
        let calls = RefCell::new(0);
        let source = || {
            *calls.borrow_mut() += 1;
            vec!["Jazz".to_string(), "Rock".to_string()]
        };

        assert!(editor.ensure_genres(source));
        assert!(!editor.ensure_genres(source));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(editor.genres().map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_disabled_genre_section_never_fetches() {
        let base = AlbumFilter {
            genres: vec!["Jazz".to_string()],
            ..AlbumFilter::default()
        };
        let mut editor = FilterEditor::new(base, true);

        assert!(!editor.ensure_genres(|| panic!("genres must not be fetched")));
        assert!(editor.genres().is_none());
        assert!(!editor.set_genre_selected("Rock", true));
        assert_eq!(editor.filter().genres, vec!["Jazz".to_string()]);
    }

    #[test]
    fn test_genre_selection_toggles() {
        let mut editor = FilterEditor::new(AlbumFilter::default(), false);
        assert!(editor.set_genre_selected("Jazz", true));
        assert!(!editor.set_genre_selected("Jazz", true));
        assert!(editor.set_genre_selected("Rock", true));
        assert!(editor.set_genre_selected("Jazz", false));
        assert_eq!(editor.filter().genres, vec!["Rock".to_string()]);
    }

    #[test]
    fn test_year_range_normalisation() {
        let mut editor = FilterEditor::new(AlbumFilter::default(), false);

        assert!(editor.set_year_range(1999, 1970));
        assert_eq!(editor.filter().min_year, Some(1970));
        assert_eq!(editor.filter().max_year, Some(1999));

        assert!(editor.set_year_range(0, 5000));
        assert_eq!(editor.filter().min_year, None);
        assert_eq!(editor.filter().max_year, Some(MAX_FILTER_YEAR));

        assert!(!editor.set_year_range(0, 5000));
        assert!(editor.set_year_range(0, 0));
        assert!(editor.filter().is_empty());
    }

    #[test]
    fn test_favorites_flag() {
        let mut editor = FilterEditor::new(AlbumFilter::default(), false);
        assert!(editor.set_favorites_only(true));
        assert!(!editor.set_favorites_only(true));
        assert!(!editor.filter().is_empty());
    }

    #[test]
    fn test_filter_button_reports_edits() {
        if init().is_err() {
            return;
        }

        let button = FilterButton::new(AlbumFilter::default(), false, Rc::new(Vec::<String>::new));
        assert!(!button.widget.has_css_class("accent"));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        button.connect_changed(Rc::new(move |filter: &AlbumFilter| {
            sink.borrow_mut().push(filter.clone());
        }));

        button.favorites_switch.set_active(true);
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].favorites_only);
        assert!(button.widget.has_css_class("accent"));
    }
}
