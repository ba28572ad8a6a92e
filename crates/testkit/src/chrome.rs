//! A box renderer that records every call it receives.

use glam::Vec2;
use modelmark_core::{BoxRenderer, ScreenRect};
use std::cell::RefCell;
use std::rc::Rc;

/// Everything a [`RecordingBox`] has been told, in call order.
#[derive(Debug, Default)]
pub struct BoxLog {
    /// Top-left positions from `place`.
    pub placements: Vec<Vec2>,
    /// Texts from `set_text`.
    pub texts: Vec<String>,
    /// Flags from `set_visible`.
    pub visibility: Vec<bool>,
    /// `(selected, editable)` pairs from `set_selected`.
    pub selection: Vec<(bool, bool)>,
    /// Number of `detach` calls.
    pub detached: u32,
}

/// Fixed-size box renderer whose call log outlives the markup that owns it.
pub struct RecordingBox {
    size: Vec2,
    title_rect: Option<ScreenRect>,
    log: Rc<RefCell<BoxLog>>,
}

impl RecordingBox {
    /// Recording box with a fixed `size`.
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            title_rect: None,
            log: Rc::default(),
        }
    }

    /// Add a title region, relative to the box's top-left corner.
    pub fn with_title_rect(mut self, rect: ScreenRect) -> Self {
        self.title_rect = Some(rect);
        self
    }

    /// Shared handle to the call log. Clone it before handing the box to a
    /// markup.
    pub fn log(&self) -> Rc<RefCell<BoxLog>> {
        Rc::clone(&self.log)
    }
}

impl BoxRenderer for RecordingBox {
    fn set_text(&mut self, text: &str) {
        self.log.borrow_mut().texts.push(text.to_string());
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn title_rect(&self) -> Option<ScreenRect> {
        self.title_rect
    }

    fn place(&mut self, top_left: Vec2) {
        self.log.borrow_mut().placements.push(top_left);
    }

    fn set_visible(&mut self, visible: bool) {
        self.log.borrow_mut().visibility.push(visible);
    }

    fn set_selected(&mut self, selected: bool, editable: bool) {
        self.log.borrow_mut().selection.push((selected, editable));
    }

    fn detach(&mut self) {
        self.log.borrow_mut().detached += 1;
    }
}
