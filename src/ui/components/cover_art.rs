//! Cover image cell with a play button overlay.
//!
//! This module implements the `CoverImage` component: a square picture with a
//! placeholder icon shown until the texture arrives, and the play button whose
//! circular hit region decides what a click does.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use libadwaita::{
    glib::Bytes,
    gtk::{
        AccessibleRole::Img, Align::Center, ContentFit::Cover, EventControllerMotion,
        GestureClick, Image, Overlay, Picture, PolicyType::Never, ScrolledWindow, Widget,
        gdk::Texture,
    },
    prelude::{AccessibleExt, Cast, GestureSingleExt, ObjectExt, WidgetExt},
};

use tracing::debug;

use crate::{
    backend::CoverImage as CoverImageData,
    ui::components::play_overlay::{CoverAction, PlayButtonRegion, PlayOverlay},
};

/// Edge length of a grid cover in pixels.
pub const COVER_SIZE: i32 = 200;

/// Handler for a classified click, with the click position.
pub type CoverActionHandler = Rc<dyn Fn(CoverAction, f64, f64)>;

/// Square cover picture with placeholder and play button.
#[derive(Clone)]
pub struct CoverImage {
    /// The underlying GTK widget container.
    pub widget: Widget,
    /// The picture showing the cover texture.
    pub picture: Picture,
    /// Icon shown while no texture is set.
    pub placeholder: Image,
    /// The play button overlay.
    pub play_overlay: PlayOverlay,
    region: Rc<Cell<PlayButtonRegion>>,
    on_action: Rc<RefCell<Option<CoverActionHandler>>>,
}

impl CoverImage {
    /// Creates an empty cover.
    ///
    /// # Arguments
    ///
    /// * `placeholder_icon` - Icon name shown until a texture is set
    #[must_use]
    pub fn new(placeholder_icon: &str) -> Self {
        let picture = Picture::builder()
            .content_fit(Cover)
            .css_classes(["cover-art-picture"])
            .build();
        picture.set_accessible_role(Img);

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(Never)
            .vscrollbar_policy(Never)
            .width_request(COVER_SIZE)
            .height_request(COVER_SIZE)
            .propagate_natural_width(false)
            .propagate_natural_height(false)
            .has_frame(false)
            .child(&picture)
            .build();

        let placeholder = Image::builder()
            .icon_name(placeholder_icon)
            .pixel_size(COVER_SIZE / 3)
            .halign(Center)
            .valign(Center)
            .can_target(false)
            .css_classes(["dim-label"])
            .build();

        let play_overlay = PlayOverlay::new();

        let overlay = Overlay::builder()
            .child(&scrolled_window)
            .halign(Center)
            .valign(Center)
            .width_request(COVER_SIZE)
            .height_request(COVER_SIZE)
            .css_classes(["cover-art-container", "card"])
            .build();
        overlay.add_overlay(&placeholder);
        overlay.add_overlay(&play_overlay.widget);

        let cover = Self {
            widget: overlay.upcast_ref::<Widget>().clone(),
            picture,
            placeholder,
            play_overlay,
            region: Rc::new(Cell::new(PlayButtonRegion::new(
                f64::from(COVER_SIZE),
                f64::from(COVER_SIZE),
            ))),
            on_action: Rc::new(RefCell::new(None)),
        };
        cover.connect_pointer();
        cover
    }

    /// Registers the click handler.
    pub fn connect_action(&self, handler: CoverActionHandler) {
        *self.on_action.borrow_mut() = Some(handler);
    }

    /// Shows a decoded texture, or the placeholder for `None`.
    pub fn set_texture(&self, texture: Option<&Texture>) {
        self.picture.set_paintable(texture);
        self.placeholder.set_visible(texture.is_none());
    }

    /// Decodes and shows fetched cover bytes. Undecodable data shows the placeholder.
    pub fn set_image(&self, image: &CoverImageData) {
        match Texture::from_bytes(&Bytes::from_owned(image.bytes.clone())) {
            Ok(texture) => self.set_texture(Some(&texture)),
            Err(e) => {
                debug!(cover_id = %image.cover_id, error = %e, "Failed to decode cover");
                self.set_texture(None);
            }
        }
    }

    /// Sets the placeholder icon.
    pub fn set_placeholder_icon(&self, icon_name: &str) {
        self.placeholder.set_icon_name(Some(icon_name));
    }

    /// Hides the play button and returns it to its resting size.
    pub fn reset_play_button(&self) {
        let mut region = self.region.get();
        region.reset();
        self.region.set(region);
        self.play_overlay.apply(&region);
    }

    fn sync_region_size(widget: &Widget, region: &mut PlayButtonRegion) {
        let (width, height) = (widget.width(), widget.height());
        if width > 0 && height > 0 {
            region.set_size(f64::from(width), f64::from(height));
        }
    }

    fn connect_pointer(&self) {
        let motion = EventControllerMotion::new();

        let (region, overlay) = (self.region.clone(), self.play_overlay.clone());
        let widget = self.widget.downgrade();
        motion.connect_enter(move |_, x, y| {
            let mut state = region.get();
            if let Some(widget) = widget.upgrade() {
                Self::sync_region_size(&widget, &mut state);
            }
            state.pointer_entered();
            state.pointer_moved(x, y);
            region.set(state);
            overlay.apply(&state);
        });

        let (region, overlay) = (self.region.clone(), self.play_overlay.clone());
        motion.connect_motion(move |_, x, y| {
            let mut state = region.get();
            if state.pointer_moved(x, y) {
                overlay.apply(&state);
            }
            region.set(state);
        });

        let (region, overlay) = (self.region.clone(), self.play_overlay.clone());
        motion.connect_leave(move |_| {
            let mut state = region.get();
            state.pointer_left();
            region.set(state);
            overlay.apply(&state);
        });
        self.widget.add_controller(motion);

        // Button 0 listens to every mouse button.
        let click = GestureClick::builder().button(0).build();
        let (region, on_action) = (self.region.clone(), self.on_action.clone());
        let widget = self.widget.downgrade();
        click.connect_released(move |gesture, _, x, y| {
            let mut state = region.get();
            if let Some(widget) = widget.upgrade() {
                Self::sync_region_size(&widget, &mut state);
            }
            region.set(state);

            let action = state.classify_click(x, y, gesture.current_button());
            let handler = on_action.borrow().clone();
            if let Some(handler) = handler {
                handler(action, x, y);
            }
        });
        self.widget.add_controller(click);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    use libadwaita::{init, prelude::WidgetExt};

    use crate::{backend::CoverImage as CoverImageData, ui::components::cover_art::CoverImage};

    #[test]
    fn test_cover_image_starts_with_placeholder() {
        if init().is_err() {
            return;
        }

        let cover = CoverImage::new("media-optical-symbolic");
        assert!(cover.placeholder.is_visible());
        assert!(cover.picture.paintable().is_none());
        assert!(!cover.play_overlay.image.is_visible());
    }

    #[test]
    fn test_undecodable_image_keeps_placeholder() {
        if init().is_err() {
            return;
        }

        let cover = CoverImage::new("media-optical-symbolic");
        cover.set_image(&CoverImageData {
            cover_id: "broken".to_string(),
            bytes: Arc::from(&b"not an image"[..]),
        });
        assert!(cover.placeholder.is_visible());
        assert!(cover.picture.paintable().is_none());
    }

    #[test]
    fn test_connect_action_replaces_handler() {
        if init().is_err() {
            return;
        }

        let cover = CoverImage::new("media-optical-symbolic");
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        cover.connect_action(Rc::new(move |_, _, _| *sink.borrow_mut() += 1));
        cover.reset_play_button();
        assert_eq!(*calls.borrow(), 0);
    }
}
