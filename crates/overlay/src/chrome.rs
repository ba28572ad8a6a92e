//! A headless [`BoxRenderer`] with content-measured sizing.
//!
//! Hosts that draw their own chrome (an immediate-mode UI, a canvas layer)
//! only need box sizes from the engine; [`NullBox`] provides those from a
//! fixed-pitch text metric and otherwise ignores every hook.

use glam::Vec2;
use modelmark_core::BoxRenderer;

// Approximate advance width of a fixed-pitch glyph, as a fraction of the
// font size.
const CHAR_WIDTH_FACTOR: f32 = 0.6;
const MIN_CONTENT_WIDTH: f32 = 90.0;
const PADDING: f32 = 10.0;
const LINE_SPACING: f32 = 4.0;

/// Box renderer that tracks size only and presents nothing.
pub struct NullBox {
    font_size: f32,
    max_width: f32,
    size: Vec2,
}

impl NullBox {
    /// Create a headless box sized for `font_size` text, never wider than
    /// `max_width`.
    pub fn new(font_size: f32, max_width: f32) -> Self {
        let mut chrome = Self {
            font_size,
            max_width,
            size: Vec2::ZERO,
        };
        chrome.measure("");
        chrome
    }

    fn measure(&mut self, text: &str) {
        let char_width = self.font_size * CHAR_WIDTH_FACTOR;
        let line_height = self.font_size + LINE_SPACING;

        let mut lines = 0usize;
        let mut widest = 0.0f32;
        for line in text.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count() as f32 * char_width);
        }
        lines = lines.max(1);

        let content_width = widest.max(MIN_CONTENT_WIDTH);
        self.size = Vec2::new(
            (content_width + PADDING).min(self.max_width),
            lines as f32 * line_height,
        );
    }
}

impl BoxRenderer for NullBox {
    fn set_text(&mut self, text: &str) {
        self.measure(text);
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn place(&mut self, _top_left: Vec2) {}

    fn set_visible(&mut self, _visible: bool) {}

    fn set_selected(&mut self, _selected: bool, _editable: bool) {}

    fn detach(&mut self) {}
}
