//! The content scroll area as seen by the navigator.
//!
//! egui applies scrolling while the scroll area is being shown, so requests
//! made between frames are queued and picked up on the next render.

use egui_commonmark::CommonMarkCache;
use pulldown_cmark::{Event, Options, Parser};

use crate::headings::Heading;
use crate::navigator::{ScrollBehavior, Viewport};

/// Scroll area measurements from the last rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
    /// Width the content was laid out at
    pub content_width: f32,
}

impl ViewportMetrics {
    /// Whether laying the content out at `width` moves headings away from
    /// the positions recorded at this frame's width
    pub fn relayout_needed(&self, width: f32) -> bool {
        (self.content_width - width).abs() >= 0.5
    }
}

/// Offset to hand the renderer before drawing content whose first line sits
/// at screen y `content_top`.
///
/// The renderer records `offset + cursor_y` with `cursor_y` in screen space.
/// Content starts at `content_top`, so this offset makes recorded positions
/// relative to the top of the content.
pub fn heading_origin(content_top: f32) -> f32 {
    -content_top
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollTarget {
    By(f32),
    To(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub target: ScrollTarget,
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    /// Distance to scroll from `scroll_top`
    pub fn delta_from(&self, scroll_top: f32) -> f32 {
        match self.target {
            ScrollTarget::By(delta) => delta,
            ScrollTarget::To(top) => top - scroll_top,
        }
    }

    /// Absolute position this request ends up at
    pub fn offset_from(&self, scroll_top: f32) -> f32 {
        (scroll_top + self.delta_from(scroll_top)).max(0.0)
    }
}

/// Content-relative y positions of rendered headings, looked up by heading text
pub trait HeadingPositions {
    fn heading_position(&self, text: &str) -> Option<f32>;
}

impl HeadingPositions for CommonMarkCache {
    fn heading_position(&self, text: &str) -> Option<f32> {
        self.get_header_position(text)
    }
}

/// Heading text as the renderer displays it: inline markup and escapes
/// resolved, closing `#` runs dropped.
pub fn rendered_heading_text(text: &str) -> String {
    let line = format!("# {text}");
    let mut rendered = String::new();
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    for event in Parser::new_ext(&line, options) {
        match event {
            Event::Text(t) | Event::Code(t) => rendered.push_str(&t),
            Event::SoftBreak | Event::HardBreak => rendered.push(' '),
            _ => {}
        }
    }
    rendered
}

/// Renderer positions are keyed by normalized rendered text and only the
/// first heading with a given key is recorded.
fn position_key(text: &str) -> String {
    rendered_heading_text(text).trim().to_lowercase()
}

pub struct ContentViewport<'a> {
    pub metrics: ViewportMetrics,
    pub positions: &'a dyn HeadingPositions,
    pub headings: &'a [Heading],
    pub pending: &'a mut Option<ScrollRequest>,
}

impl Viewport for ContentViewport<'_> {
    fn scroll_top(&self) -> f32 {
        self.metrics.scroll_top
    }

    fn scroll_height(&self) -> f32 {
        self.metrics.scroll_height
    }

    fn client_height(&self) -> f32 {
        self.metrics.client_height
    }

    fn anchor_offset(&self, anchor: &str) -> Option<f32> {
        let index = self.headings.iter().position(|h| h.id == anchor)?;
        let key = position_key(&self.headings[index].text);
        if self.headings[..index]
            .iter()
            .any(|h| position_key(&h.text) == key)
        {
            // Shares its text with an earlier heading, which owns the recorded position
            return None;
        }
        let y = self.positions.heading_position(&key)?;
        Some(y - self.metrics.scroll_top)
    }

    fn scroll_by(&mut self, delta: f32, behavior: ScrollBehavior) {
        *self.pending = Some(ScrollRequest {
            target: ScrollTarget::By(delta),
            behavior,
        });
    }

    fn scroll_to(&mut self, top: f32, behavior: ScrollBehavior) {
        *self.pending = Some(ScrollRequest {
            target: ScrollTarget::To(top),
            behavior,
        });
    }
}
