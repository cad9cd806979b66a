//! Play button drawn over a cover, with a circular hit region.
//!
//! One pointer surface offers three outcomes: a primary click inside the
//! button circle plays, a primary click elsewhere opens the item page, and a
//! secondary click opens the context menu. The circle grows while the pointer
//! is inside it, and the grown radius is the one hit-tested, so the region is
//! re-evaluated on every motion event.

use libadwaita::{
    gtk::{Align::Center, Image, Widget},
    prelude::{Cast, WidgetExt},
};

/// Button diameter at rest.
pub const PLAY_BUTTON_SIZE: f64 = 60.0;
/// Button diameter while hovered.
pub const PLAY_BUTTON_HOVERED_SIZE: f64 = 65.0;

/// Mouse button number GTK reports for secondary clicks.
pub const SECONDARY_BUTTON: u32 = 3;

/// What a click on the cover does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverAction {
    /// Start playback of the item.
    Play,
    /// Open the item's page.
    ShowPage,
    /// Open the context menu.
    ContextMenu,
}

/// Whether `point` lies within `radius` of `origin`, boundary included.
#[must_use]
pub fn is_inside(origin: (f64, f64), radius: f64, point: (f64, f64)) -> bool {
    let (dx, dy) = (point.0 - origin.0, point.1 - origin.1);
    dx * dx + dy * dy <= radius * radius
}

/// Hover and hit-test state of a cover's play button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayButtonRegion {
    width: f64,
    height: f64,
    hovered: bool,
    visible: bool,
}

impl PlayButtonRegion {
    /// Creates a region for a cover of the given size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            hovered: false,
            visible: false,
        }
    }

    /// Updates the cover size.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Centre of the cover.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Current button diameter.
    #[must_use]
    pub fn button_size(&self) -> f64 {
        if self.hovered {
            PLAY_BUTTON_HOVERED_SIZE
        } else {
            PLAY_BUTTON_SIZE
        }
    }

    /// Current hit radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.button_size() / 2.0
    }

    /// Whether the pointer is over the button.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Whether the button is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The pointer entered the cover.
    pub fn pointer_entered(&mut self) {
        self.visible = true;
    }

    /// The pointer moved over the cover.
    ///
    /// # Returns
    ///
    /// `true` if the button size changed.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> bool {
        let inside = is_inside(self.center(), self.radius(), (x, y));
        let changed = inside != self.hovered;
        self.hovered = inside;
        changed
    }

    /// The pointer left the cover.
    pub fn pointer_left(&mut self) {
        self.hovered = false;
        self.visible = false;
    }

    /// Returns to the resting state, e.g. when the cell is reused.
    pub fn reset(&mut self) {
        self.hovered = false;
        self.visible = false;
    }

    /// Classifies a click.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Click position relative to the cover
    /// * `button` - Mouse button number as reported by GTK
    #[must_use]
    pub fn classify_click(&self, x: f64, y: f64, button: u32) -> CoverAction {
        if button == SECONDARY_BUTTON {
            CoverAction::ContextMenu
        } else if is_inside(self.center(), self.radius(), (x, y)) {
            CoverAction::Play
        } else {
            CoverAction::ShowPage
        }
    }
}

/// The play button image layered over a cover.
#[derive(Clone)]
pub struct PlayOverlay {
    /// The underlying GTK widget.
    pub widget: Widget,
    /// The button image.
    pub image: Image,
}

impl PlayOverlay {
    /// Creates a hidden play button.
    #[must_use]
    pub fn new() -> Self {
        let image = Image::builder()
            .icon_name("media-playback-start-symbolic")
            .pixel_size(PLAY_BUTTON_SIZE as i32)
            .halign(Center)
            .valign(Center)
            .can_target(false)
            .visible(false)
            .css_classes(["play-overlay", "osd"])
            .build();

        Self {
            widget: image.clone().upcast::<Widget>(),
            image,
        }
    }

    /// Mirrors the region's visibility and size.
    pub fn apply(&self, region: &PlayButtonRegion) {
        self.image.set_visible(region.is_visible());
        self.image.set_pixel_size(region.button_size() as i32);
    }
}

impl Default for PlayOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use libadwaita::prelude::WidgetExt;

    use crate::ui::components::play_overlay::{
        CoverAction, PlayButtonRegion, PlayOverlay, SECONDARY_BUTTON, is_inside,
    };

    #[test]
    fn test_boundary_is_inside() {
        assert!(is_inside((100.0, 100.0), 30.0, (130.0, 100.0)));
        assert!(is_inside((100.0, 100.0), 30.0, (100.0, 70.0)));
        assert!(!is_inside((100.0, 100.0), 30.0, (130.5, 100.0)));
    }

    #[test]
    fn test_click_classification() {
        let region = PlayButtonRegion::new(200.0, 200.0);
        assert_eq!(region.classify_click(100.0, 100.0, 1), CoverAction::Play);
        assert_eq!(region.classify_click(130.0, 100.0, 1), CoverAction::Play);
        assert_eq!(region.classify_click(10.0, 10.0, 1), CoverAction::ShowPage);
        assert_eq!(
            region.classify_click(100.0, 100.0, SECONDARY_BUTTON),
            CoverAction::ContextMenu
        );
    }

    #[test]
    fn test_hover_growth_changes_hit_region() {
        let mut region = PlayButtonRegion::new(200.0, 200.0);
        region.pointer_entered();

        // 31.5 px from the centre: outside the resting 30 px radius.
        assert_eq!(region.classify_click(131.5, 100.0, 1), CoverAction::ShowPage);

        assert!(region.pointer_moved(125.0, 100.0));
        assert_eq!(region.radius(), 32.5);
        assert_eq!(region.classify_click(131.5, 100.0, 1), CoverAction::Play);

        // Still inside the grown radius, so the button stays large.
        assert!(!region.pointer_moved(131.5, 100.0));
        assert!(region.is_hovered());

        assert!(region.pointer_moved(140.0, 100.0));
        assert_eq!(region.radius(), 30.0);
    }

    #[test]
    fn test_leave_and_reset_restore_resting_state() {
        let mut region = PlayButtonRegion::new(200.0, 200.0);
        region.pointer_entered();
        region.pointer_moved(100.0, 100.0);
        assert!(region.is_visible());

        region.pointer_left();
        assert!(!region.is_visible());
        assert_eq!(region.button_size(), 60.0);

        region.pointer_entered();
        region.pointer_moved(100.0, 100.0);
        region.reset();
        assert!(!region.is_hovered());
        assert!(!region.is_visible());
    }

    #[test]
    #[ignore = "Requires GTK display for UI testing"]
    fn test_play_overlay_follows_region() {
        let overlay = PlayOverlay::new();
        assert!(!overlay.image.is_visible());

        let mut region = PlayButtonRegion::new(200.0, 200.0);
        region.pointer_entered();
        region.pointer_moved(100.0, 100.0);
        overlay.apply(&region);
        assert!(overlay.image.is_visible());
        assert_eq!(overlay.image.pixel_size(), 65);
    }
}
