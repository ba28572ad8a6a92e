//! The pluggable box-renderer capability.
//!
//! A markup's text box is presented by the host (DOM, egui, native widget —
//! the engine does not care). Instead of subclassing the markup per rendering
//! style, the host hands each markup a [`BoxRenderer`] and the engine drives
//! it through lifecycle hooks. The engine only ever reads the box's current
//! size and optional title region back; everything else flows one way.

use crate::geometry::ScreenRect;
use glam::Vec2;

/// Presentation hooks for one markup's text box.
pub trait BoxRenderer {
    /// Replace the displayed text, resizing the box to its content.
    fn set_text(&mut self, text: &str);

    /// Current box size in pixels.
    fn size(&self) -> Vec2;

    /// Optional auxiliary title region, as a rect relative to the box's
    /// top-left corner. Participates in hit testing.
    fn title_rect(&self) -> Option<ScreenRect> {
        None
    }

    /// Move the box so its top-left corner sits at `top_left` (screen px).
    fn place(&mut self, top_left: Vec2);

    /// Show or hide the box.
    fn set_visible(&mut self, visible: bool);

    /// Toggle the edit affordance. `editable` is false for read-only
    /// markups, which get the selected outline but no text input.
    fn set_selected(&mut self, selected: bool, editable: bool);

    /// Tear down any host-side resources. Called exactly once, on destroy.
    fn detach(&mut self);
}
