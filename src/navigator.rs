//! Outline panel state and heading navigation.

use std::collections::HashSet;

/// Space kept above a heading after navigating to it
pub const NAVIGATION_MARGIN: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// The scrollable area that displays the rendered document
pub trait Viewport {
    /// Current scroll position from the top of the content
    fn scroll_top(&self) -> f32;
    /// Total height of the content
    fn scroll_height(&self) -> f32;
    /// Height of the visible area
    fn client_height(&self) -> f32;
    /// Top of the element carrying `anchor`, relative to the viewport's top edge.
    /// Returns None if nothing rendered carries that anchor.
    fn anchor_offset(&self, anchor: &str) -> Option<f32>;
    /// Scroll relative to the current position
    fn scroll_by(&mut self, delta: f32, behavior: ScrollBehavior);
    /// Scroll to an absolute position
    fn scroll_to(&mut self, top: f32, behavior: ScrollBehavior);
}

#[derive(Debug, Default)]
pub struct OutlineNavigator {
    expanded: HashSet<String>,
    panel_open: bool,
}

impl OutlineNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_expand(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn is_open(&self) -> bool {
        self.panel_open
    }

    pub fn open_panel(&mut self) {
        self.panel_open = true;
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    /// Forget expand state, used when the outline is rebuilt for another document
    pub fn reset(&mut self) {
        self.expanded.clear();
    }

    /// Smooth-scroll the viewport so the heading `id` sits just below its top edge.
    ///
    /// A missing viewport or a heading that was never rendered is a no-op. The
    /// outline panel closes either way. Returns whether a scroll was issued.
    pub fn navigate_to(&mut self, id: &str, viewport: Option<&mut dyn Viewport>) -> bool {
        self.close_panel();

        let Some(viewport) = viewport else {
            log::debug!("No viewport to navigate in for heading '{}'", id);
            return false;
        };
        let Some(offset) = viewport.anchor_offset(id) else {
            log::debug!("Heading '{}' not found in rendered output", id);
            return false;
        };

        viewport.scroll_by(offset - NAVIGATION_MARGIN, ScrollBehavior::Smooth);
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Viewport backed by absolute anchor positions within the content
    #[derive(Default)]
    pub(crate) struct FakeViewport {
        pub top: f32,
        pub height: f32,
        pub client: f32,
        pub anchors: HashMap<String, f32>,
        pub scrolls: Vec<(f32, ScrollBehavior)>,
    }

    impl Viewport for FakeViewport {
        fn scroll_top(&self) -> f32 {
            self.top
        }

        fn scroll_height(&self) -> f32 {
            self.height
        }

        fn client_height(&self) -> f32 {
            self.client
        }

        fn anchor_offset(&self, anchor: &str) -> Option<f32> {
            self.anchors.get(anchor).map(|y| y - self.top)
        }

        fn scroll_by(&mut self, delta: f32, behavior: ScrollBehavior) {
            self.scrolls.push((delta, behavior));
            self.top += delta;
        }

        fn scroll_to(&mut self, top: f32, behavior: ScrollBehavior) {
            self.scrolls.push((top - self.top, behavior));
            self.top = top;
        }
    }

    #[test]
    fn test_toggle_expand() {
        let mut nav = OutlineNavigator::new();
        assert!(!nav.is_expanded("setup"));

        nav.toggle_expand("setup");
        assert!(nav.is_expanded("setup"));
        assert!(!nav.is_expanded("usage"));

        nav.toggle_expand("setup");
        assert!(!nav.is_expanded("setup"));
    }

    #[test]
    fn test_toggle_expand_does_not_scroll_or_close() {
        let mut nav = OutlineNavigator::new();
        nav.open_panel();
        nav.toggle_expand("setup");
        assert!(nav.is_open());
    }

    #[test]
    fn test_navigate_scrolls_relative_with_margin() {
        let mut nav = OutlineNavigator::new();
        nav.open_panel();
        let mut viewport = FakeViewport {
            top: 100.0,
            height: 2000.0,
            client: 500.0,
            anchors: HashMap::from([("usage".to_string(), 700.0)]),
            ..Default::default()
        };

        assert!(nav.navigate_to("usage", Some(&mut viewport)));
        assert_eq!(viewport.scrolls, vec![(580.0, ScrollBehavior::Smooth)]);
        assert_eq!(viewport.top, 680.0);
        assert!(!nav.is_open());
    }

    #[test]
    fn test_navigate_upwards_gives_negative_delta() {
        let mut nav = OutlineNavigator::new();
        let mut viewport = FakeViewport {
            top: 900.0,
            anchors: HashMap::from([("intro".to_string(), 40.0)]),
            ..Default::default()
        };

        nav.navigate_to("intro", Some(&mut viewport));
        assert_eq!(viewport.top, 20.0);
    }

    #[test]
    fn test_navigate_missing_anchor_is_noop_and_closes() {
        let mut nav = OutlineNavigator::new();
        nav.open_panel();
        let mut viewport = FakeViewport {
            top: 250.0,
            ..Default::default()
        };

        assert!(!nav.navigate_to("missing", Some(&mut viewport)));
        assert_eq!(viewport.top, 250.0);
        assert!(viewport.scrolls.is_empty());
        assert!(!nav.is_open());
    }

    #[test]
    fn test_navigate_without_viewport_closes_panel() {
        let mut nav = OutlineNavigator::new();
        nav.open_panel();
        assert!(!nav.navigate_to("usage", None));
        assert!(!nav.is_open());
    }

    #[test]
    fn test_reset_collapses_everything() {
        let mut nav = OutlineNavigator::new();
        nav.toggle_expand("a");
        nav.toggle_expand("b");
        nav.reset();
        assert!(!nav.is_expanded("a"));
        assert!(!nav.is_expanded("b"));
    }
}
