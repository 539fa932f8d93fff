//! Scroll-to-top / scroll-to-bottom buttons.

use crate::navigator::{ScrollBehavior, Viewport};

/// Distance from either end before the matching button shows up
pub const EDGE_THRESHOLD: f32 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollControls {
    pub visible: bool,
    pub can_scroll_up: bool,
    pub can_scroll_down: bool,
}

impl ScrollControls {
    pub fn from_metrics(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            visible: scroll_height > client_height,
            can_scroll_up: scroll_top > EDGE_THRESHOLD,
            can_scroll_down: scroll_top < scroll_height - client_height - EDGE_THRESHOLD,
        }
    }

    pub fn from_viewport(viewport: &dyn Viewport) -> Self {
        Self::from_metrics(
            viewport.scroll_top(),
            viewport.scroll_height(),
            viewport.client_height(),
        )
    }

    pub fn show_top_button(&self) -> bool {
        self.visible && self.can_scroll_up
    }

    pub fn show_bottom_button(&self) -> bool {
        self.visible && self.can_scroll_down
    }
}

pub fn scroll_to_top(viewport: &mut dyn Viewport) {
    viewport.scroll_to(0.0, ScrollBehavior::Smooth);
}

pub fn scroll_to_bottom(viewport: &mut dyn Viewport) {
    let bottom = viewport.scroll_height();
    viewport.scroll_to(bottom, ScrollBehavior::Smooth);
}
