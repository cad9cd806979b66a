//! Grid cell showing one album, artist, genre or playlist.
//!
//! Cells are recycled while the grid scrolls, so an update only touches the
//! widget when the shown entity changed. A recycled cell cancels the cover load
//! it started for its previous entity before it starts a new one.

use std::{cell::RefCell, rc::Rc};

use libadwaita::{
    gio::{Menu, SimpleAction, SimpleActionGroup},
    gtk::{
        AccessibleRole::Group,
        Align::Start,
        Box, FlowBoxChild, GestureClick, Label,
        Orientation::Vertical,
        PopoverMenu, Widget,
        gdk::Rectangle,
        pango::EllipsizeMode::End as EllipsizeEnd,
    },
    prelude::{AccessibleExt, ActionMapExt, BoxExt, Cast, PopoverExt, WidgetExt},
};

use tracing::debug;

use crate::{
    backend::{CoverImage as CoverImageData, ImageLoadHandle},
    ui::{
        components::{
            cover_art::{COVER_SIZE, CoverImage},
            play_overlay::CoverAction,
        },
        views::grid_model::{GridActions, GridViewItemModel},
    },
};

/// Identity and image-load bookkeeping of a grid cell.
#[derive(Debug, Default)]
pub struct GridItemState {
    item_id: String,
    secondary_id: String,
    cover_art_id: String,
    img_load_cancel: Option<ImageLoadHandle>,
}

impl GridItemState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the shown entity.
    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Identifier behind the secondary label.
    #[must_use]
    pub fn secondary_id(&self) -> &str {
        &self.secondary_id
    }

    /// Cover identifier of the shown entity.
    #[must_use]
    pub fn cover_art_id(&self) -> &str {
        &self.cover_art_id
    }

    /// Whether applying `model` would change what the cell shows.
    ///
    /// Only the `(id, secondary_id)` pair is compared; a new secondary text
    /// for the same pair keeps the cell as it is.
    #[must_use]
    pub fn needs_update(&self, model: &GridViewItemModel) -> bool {
        self.item_id != model.id || self.secondary_id != model.secondary_id
    }

    /// Takes over the identity of `model` and cancels any pending cover load.
    ///
    /// # Returns
    ///
    /// `false` if the identity was unchanged and nothing happened.
    pub fn update(&mut self, model: &GridViewItemModel) -> bool {
        if !self.needs_update(model) {
            return false;
        }
        self.cancel_image_load();
        model.id.clone_into(&mut self.item_id);
        model.secondary_id.clone_into(&mut self.secondary_id);
        model.cover_art_id.clone_into(&mut self.cover_art_id);
        true
    }

    /// Registers a new cover load, cancelling the previous one.
    pub fn begin_image_load(&mut self) -> ImageLoadHandle {
        self.cancel_image_load();
        let handle = ImageLoadHandle::new();
        self.img_load_cancel = Some(handle.clone());
        handle
    }

    /// Marks the load behind `handle` as finished.
    ///
    /// # Returns
    ///
    /// `true` if the result is still wanted, i.e. the handle was neither
    /// cancelled nor superseded.
    pub fn finish_image_load(&mut self, handle: &ImageLoadHandle) -> bool {
        if handle.is_cancelled() {
            return false;
        }
        let current = self
            .img_load_cancel
            .as_ref()
            .is_some_and(|pending| pending.same_load(handle));
        if current {
            self.img_load_cancel = None;
        }
        current
    }

    /// Cancels the pending cover load, if any.
    pub fn cancel_image_load(&mut self) {
        if let Some(handle) = self.img_load_cancel.take() {
            handle.cancel();
        }
    }

    /// Prepares the cell for reuse within the same grid.
    ///
    /// A cell whose cover already arrived keeps its identity, so reusing it
    /// for the same entity skips the repaint. A cell still waiting for its
    /// cover is cleared, since the cancelled load would leave it blank.
    pub fn suspend(&mut self) {
        if self.img_load_cancel.is_some() {
            self.clear();
        }
    }

    /// Forgets the shown entity, e.g. when the cell goes back to the pool.
    pub fn clear(&mut self) {
        self.cancel_image_load();
        self.item_id.clear();
        self.secondary_id.clear();
        self.cover_art_id.clear();
    }
}

/// GTK grid cell: cover with play button, primary and secondary label.
#[derive(Clone)]
pub struct GridItem {
    /// The underlying FlowBoxChild widget.
    pub widget: Widget,
    /// Cover image with the play button.
    pub cover: CoverImage,
    /// Primary label.
    pub primary_label: Label,
    /// Secondary label, inactive when it does not link anywhere.
    pub secondary_label: Label,
    /// Identity and pending image load.
    pub state: Rc<RefCell<GridItemState>>,
    actions: Rc<RefCell<GridActions>>,
    secondary_action: SimpleAction,
}

impl GridItem {
    /// Creates an empty cell.
    ///
    /// # Arguments
    ///
    /// * `placeholder_icon` - Icon shown until a cover is loaded
    /// * `actions` - Action handlers shared by all cells of a grid
    #[must_use]
    pub fn new(placeholder_icon: &str, actions: Rc<RefCell<GridActions>>) -> Self {
        let cover = CoverImage::new(placeholder_icon);

        let primary_label = Label::builder()
            .halign(Start)
            .xalign(0.0)
            .ellipsize(EllipsizeEnd)
            .lines(1)
            .max_width_chars((COVER_SIZE - 16) / 10)
            .css_classes(["grid-item-primary", "heading"])
            .build();

        let secondary_label = Label::builder()
            .halign(Start)
            .xalign(0.0)
            .ellipsize(EllipsizeEnd)
            .lines(1)
            .max_width_chars((COVER_SIZE - 16) / 10)
            .css_classes(["grid-item-secondary", "dim-label"])
            .build();

        let tile = Box::builder()
            .orientation(Vertical)
            .halign(Start)
            .valign(Start)
            .spacing(2)
            .css_classes(["grid-item"])
            .build();
        tile.append(&cover.widget);
        tile.append(&primary_label);
        tile.append(&secondary_label);
        tile.set_accessible_role(Group);

        let child = FlowBoxChild::builder()
            .child(&tile)
            .focusable(true)
            .build();

        let item = Self {
            widget: child.upcast_ref::<Widget>().clone(),
            cover,
            primary_label,
            secondary_label,
            state: Rc::new(RefCell::new(GridItemState::new())),
            actions,
            secondary_action: SimpleAction::new("show-secondary", None),
        };
        item.connect_actions(&tile);
        item
    }

    /// Shows `model` unless the cell already shows the same entity.
    ///
    /// # Returns
    ///
    /// `true` if the cell changed and a new cover should be loaded.
    pub fn update(&self, model: &GridViewItemModel) -> bool {
        if !self.state.borrow_mut().update(model) {
            return false;
        }

        self.primary_label.set_label(&model.name);
        self.primary_label.set_tooltip_text(Some(&model.name));
        self.secondary_label.set_label(&model.secondary);
        self.secondary_label.set_tooltip_text(Some(&model.secondary));

        let has_link = !model.secondary_id.is_empty();
        self.secondary_label.set_sensitive(has_link);
        if has_link {
            self.secondary_label.add_css_class("link");
        } else {
            self.secondary_label.remove_css_class("link");
        }
        self.secondary_action.set_enabled(has_link);

        self.cover.set_texture(None);
        self.cover.reset_play_button();
        true
    }

    /// Shows a loaded cover if `handle` is still the cell's current load.
    pub fn set_image(&self, handle: &ImageLoadHandle, image: Option<&CoverImageData>) {
        if !self.state.borrow_mut().finish_image_load(handle) {
            debug!(item_id = %self.state.borrow().item_id(), "Discarding stale cover");
            return;
        }
        match image {
            Some(image) => self.cover.set_image(image),
            None => self.cover.set_texture(None),
        }
    }

    /// Sets the placeholder icon.
    pub fn set_placeholder(&self, icon_name: &str) {
        self.cover.set_placeholder_icon(icon_name);
    }

    /// Detaches the cell from the grid, keeping a loaded cover.
    pub fn suspend(&self) {
        let cleared = {
            let mut state = self.state.borrow_mut();
            state.suspend();
            state.item_id().is_empty()
        };
        if cleared {
            self.clear();
        } else {
            self.cover.reset_play_button();
        }
    }

    /// Empties the cell and cancels its cover load.
    pub fn clear(&self) {
        self.state.borrow_mut().clear();
        self.primary_label.set_label("");
        self.secondary_label.set_label("");
        self.cover.set_texture(None);
        self.cover.reset_play_button();
    }

    fn connect_actions(&self, tile: &Box) {
        let group = SimpleActionGroup::new();

        let play = SimpleAction::new("play", None);
        let (state, actions) = (self.state.clone(), self.actions.clone());
        play.connect_activate(move |_, _| {
            let id = state.borrow().item_id().to_string();
            actions.borrow().play(&id);
        });
        group.add_action(&play);

        let open = SimpleAction::new("open", None);
        let (state, actions) = (self.state.clone(), self.actions.clone());
        open.connect_activate(move |_, _| {
            let id = state.borrow().item_id().to_string();
            actions.borrow().show_item_page(&id);
        });
        group.add_action(&open);

        let (state, actions) = (self.state.clone(), self.actions.clone());
        self.secondary_action.connect_activate(move |_, _| {
            let id = state.borrow().secondary_id().to_string();
            actions.borrow().show_secondary_page(&id);
        });
        group.add_action(&self.secondary_action);
        self.widget.insert_action_group("item", Some(&group));

        let menu = Menu::new();
        menu.append(Some("Play"), Some("item.play"));
        menu.append(Some("Open"), Some("item.open"));
        menu.append(Some("Go to Artist"), Some("item.show-secondary"));
        let popover = PopoverMenu::builder()
            .menu_model(&menu)
            .has_arrow(false)
            .halign(Start)
            .build();
        popover.set_parent(tile);

        let (state, actions) = (self.state.clone(), self.actions.clone());
        self.cover.connect_action(Rc::new(move |action, x, y| {
            let id = state.borrow().item_id().to_string();
            match action {
                CoverAction::Play => actions.borrow().play(&id),
                CoverAction::ShowPage => actions.borrow().show_item_page(&id),
                CoverAction::ContextMenu => {
                    popover.set_pointing_to(Some(&Rectangle::new(x as i32, y as i32, 1, 1)));
                    popover.popup();
                }
            }
        }));

        let primary_click = GestureClick::new();
        let (state, actions) = (self.state.clone(), self.actions.clone());
        primary_click.connect_released(move |_, _, _, _| {
            let id = state.borrow().item_id().to_string();
            actions.borrow().show_item_page(&id);
        });
        self.primary_label.add_controller(primary_click);

        let secondary_click = GestureClick::new();
        let (state, actions) = (self.state.clone(), self.actions.clone());
        secondary_click.connect_released(move |_, _, _, _| {
            let id = state.borrow().secondary_id().to_string();
            if !id.is_empty() {
                actions.borrow().show_secondary_page(&id);
            }
        });
        self.secondary_label.add_controller(secondary_click);
    }
}
