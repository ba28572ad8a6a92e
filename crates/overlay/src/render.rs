//! Declarative per-redraw output.
//!
//! A markup never touches UI widgets. Each redraw produces a [`DrawFrame`]
//! describing the leader line, the anchor dot, and where the text box goes;
//! the presentation layer consumes those however it renders.

use glam::Vec2;
use modelmark_core::Color;

/// The filled circle drawn at the projected anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorDot {
    /// Screen-space center.
    pub center: Vec2,
    /// Radius in pixels.
    pub radius: f32,
    /// Fill color.
    pub color: Color,
}

/// One markup's draw output for a redraw cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawFrame {
    /// Whether the markup draws at all this cycle.
    pub visible: bool,
    /// Leader polyline from the anchor screen point to the box attachment
    /// point. `None` when hidden or the leader line is disabled.
    pub leader_line: Option<[Vec2; 2]>,
    /// Anchor dot, present exactly when the leader line is.
    pub anchor_dot: Option<AnchorDot>,
    /// Screen-space top-left corner for the text box.
    pub box_top_left: Vec2,
}

impl DrawFrame {
    /// Frame for a markup that is hidden this cycle.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            leader_line: None,
            anchor_dot: None,
            box_top_left: Vec2::ZERO,
        }
    }
}

/// Pick the leader line's endpoint on the box boundary.
///
/// Per axis: an anchor outside the box span attaches at the near edge; an
/// anchor inside attaches at the center when strictly within a quarter of
/// the span, otherwise at whichever edge it is nearer to. This is a stable,
/// cheap approximation rather than a true nearest point on the rectangle;
/// the exact comparisons matter for visual parity.
pub fn leader_attachment(anchor: Vec2, box_top_left: Vec2, box_size: Vec2) -> Vec2 {
    Vec2::new(
        attach_axis(anchor.x, box_top_left.x, box_size.x),
        attach_axis(anchor.y, box_top_left.y, box_size.y),
    )
}

fn attach_axis(p1: f32, p2: f32, extent: f32) -> f32 {
    if p1 <= p2 {
        p2
    } else if p1 >= p2 + extent {
        p2 + extent
    } else {
        let center = p2 + extent / 2.0;
        if (p1 - center).abs() < extent / 4.0 {
            center
        } else if p1 > center {
            p2 + extent
        } else {
            p2
        }
    }
}
