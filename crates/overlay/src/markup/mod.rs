//! A single annotation: anchor point, box point, pin, visibility, text.

pub mod record;

use crate::render::{leader_attachment, AnchorDot, DrawFrame};
use glam::{Vec2, Vec3};
use modelmark_core::{
    AdapterError, BoxRenderer, Color, GeometryAdapter, PinColors, PinHandles, ScreenRect,
};

pub use record::{MarkupRecord, RecordError};

/// Unique markup identifier, stable across serialization.
pub type MarkupId = uuid::Uuid;

/// Opaque handle assigned by a host rendering subsystem on registration.
pub type RenderHandle = u64;

/// Half extent of the square hit region around the projected anchor point.
const ANCHOR_HANDLE_HALF_SIZE: f32 = 7.0;

/// Presentational attributes carried through to the renderer and records.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupStyle {
    /// Font family for the box text.
    pub font: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Box background color.
    pub background_color: Color,
    /// Anchor dot fill color.
    pub circle_color: Color,
    /// Anchor dot radius in pixels.
    pub circle_radius: f32,
    /// Maximum box width in pixels.
    pub max_width: f32,
}

impl Default for MarkupStyle {
    fn default() -> Self {
        Self {
            font: "monospace".to_string(),
            font_size: 12.0,
            background_color: Color::new(238, 243, 249),
            circle_color: Color::new(128, 128, 255),
            circle_radius: 4.0,
            max_width: 300.0,
        }
    }
}

/// Construction options for a [`Markup`]. Every field has a usable default;
/// `id`, `box_point_relative` and the permission flags are overridden by the
/// deserialization path.
pub struct MarkupConfig {
    /// Identifier to reuse; a fresh v4 uuid is generated when `None`.
    pub id: Option<MarkupId>,
    /// Initial box point; defaults to the anchor point.
    pub box_point: Option<Vec3>,
    /// Viewport-relative box position; recomputed by projection when `None`.
    pub box_point_relative: Option<Vec2>,
    /// Initial note text.
    pub text: String,
    /// Presentational attributes.
    pub style: MarkupStyle,
    /// Whether the box follows a viewport-relative fraction.
    pub fixed: bool,
    /// Whether the markup hides when its anchor fails the visibility test.
    pub check_visibility: bool,
    /// Whether a leader line is drawn.
    pub show_leader_line: bool,
    /// Whether a physical pin marker accompanies the anchor.
    pub has_pin: bool,
    /// Whether the anchor point may be dragged.
    pub allow_anchor_move: bool,
    /// Whether the box point may be dragged.
    pub allow_box_move: bool,
    /// Opaque pass-through payload.
    pub user_data: Option<serde_json::Value>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            id: None,
            box_point: None,
            box_point_relative: None,
            text: String::new(),
            style: MarkupStyle::default(),
            fixed: false,
            check_visibility: false,
            show_leader_line: true,
            has_pin: false,
            allow_anchor_move: true,
            allow_box_move: true,
            user_data: None,
        }
    }
}

/// One annotation anchored to a 3D point, with a leader line to a text box.
///
/// Exactly one of the box representations is authoritative at a time: the 3D
/// `box_point` while unfixed, the viewport-relative `box_point_relative`
/// while fixed. The setters keep the other representation fresh so toggling
/// `fixed` always has a sane continuation point.
pub struct Markup {
    id: MarkupId,
    anchor_point: Vec3,
    box_point: Vec3,
    box_point_relative: Vec2,
    text: String,
    style: MarkupStyle,
    fixed: bool,
    check_visibility: bool,
    hidden: bool,
    selected: bool,
    allow_editing: bool,
    allow_anchor_move: bool,
    allow_box_move: bool,
    has_pin: bool,
    pin: Option<PinHandles>,
    show_leader_line: bool,
    user_data: Option<serde_json::Value>,
    render_handle: Option<RenderHandle>,
    renderer: Box<dyn BoxRenderer>,
    // Screen-space top-left from the last draw; hit tests run against it.
    box_screen: Vec2,
    // Whether the last successful hit landed on the box (true) or on the
    // anchor handle (false). Decides the drag mode on pointer-down.
    last_hit_was_box: bool,
}

impl Markup {
    /// Create a markup at `anchor_point`. A newly placed markup starts
    /// selected, with its text focused for editing.
    pub fn new(
        anchor_point: Vec3,
        config: MarkupConfig,
        renderer: Box<dyn BoxRenderer>,
        adapter: &dyn GeometryAdapter,
    ) -> Self {
        let mut markup = Self {
            id: config.id.unwrap_or_else(MarkupId::new_v4),
            anchor_point,
            box_point: Vec3::ZERO,
            box_point_relative: Vec2::ZERO,
            text: String::new(),
            style: config.style,
            fixed: config.fixed,
            check_visibility: config.check_visibility,
            hidden: false,
            selected: false,
            allow_editing: true,
            allow_anchor_move: config.allow_anchor_move,
            allow_box_move: config.allow_box_move,
            has_pin: config.has_pin,
            pin: None,
            show_leader_line: config.show_leader_line,
            user_data: config.user_data,
            render_handle: None,
            renderer,
            box_screen: Vec2::ZERO,
            last_hit_was_box: true,
        };

        let box_point = config.box_point.unwrap_or(anchor_point);
        markup.set_box_point(box_point, adapter);
        if let Some(relative) = config.box_point_relative {
            markup.box_point_relative = relative;
        }

        markup.set_text(config.text);
        markup.select();
        markup
    }

    /// The markup's unique id.
    pub fn id(&self) -> MarkupId {
        self.id
    }

    /// The 3D anchor point on the model.
    pub fn anchor_point(&self) -> Vec3 {
        self.anchor_point
    }

    /// The 3D box point. Stale while `fixed` is set; call
    /// [`Markup::unproject_box_anchor`] to rebuild it.
    pub fn box_point(&self) -> Vec3 {
        self.box_point
    }

    /// The viewport-relative box position, in [0,1] x [0,1].
    pub fn box_point_relative(&self) -> Vec2 {
        self.box_point_relative
    }

    /// The note text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Presentational attributes.
    pub fn style(&self) -> &MarkupStyle {
        &self.style
    }

    /// Whether the box follows a viewport-relative fraction.
    pub fn fixed(&self) -> bool {
        self.fixed
    }

    /// Whether the markup participates in visibility testing.
    pub fn check_visibility(&self) -> bool {
        self.check_visibility
    }

    /// Whether the markup is currently not drawn.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the box is in edit mode.
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Whether text editing is allowed.
    pub fn allow_editing(&self) -> bool {
        self.allow_editing
    }

    /// Set whether text editing is allowed.
    pub fn set_allow_editing(&mut self, allow: bool) {
        self.allow_editing = allow;
    }

    /// Whether the anchor point may be dragged.
    pub fn allow_anchor_move(&self) -> bool {
        self.allow_anchor_move
    }

    /// Whether the box point may be dragged.
    pub fn allow_box_move(&self) -> bool {
        self.allow_box_move
    }

    /// Whether this markup is configured to carry a pin marker.
    pub fn has_pin(&self) -> bool {
        self.has_pin
    }

    /// The live pin marker handles, if the pin has been set up.
    pub fn pin_handles(&self) -> Option<PinHandles> {
        self.pin
    }

    /// Whether a leader line is drawn.
    pub fn show_leader_line(&self) -> bool {
        self.show_leader_line
    }

    /// Set whether a leader line is drawn.
    pub fn set_show_leader_line(&mut self, show: bool) {
        self.show_leader_line = show;
    }

    /// The opaque user payload.
    pub fn user_data(&self) -> Option<&serde_json::Value> {
        self.user_data.as_ref()
    }

    /// The host render handle, if one was assigned on registration.
    pub fn render_handle(&self) -> Option<RenderHandle> {
        self.render_handle
    }

    /// Store the host render handle.
    pub fn set_render_handle(&mut self, handle: Option<RenderHandle>) {
        self.render_handle = handle;
    }

    /// Whether the last hit landed on the box rather than the anchor handle.
    pub fn last_hit_was_box(&self) -> bool {
        self.last_hit_was_box
    }

    /// Replace the note text and resize the box to its content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.renderer.set_text(&self.text);
    }

    /// Replace the box background color.
    pub fn set_background_color(&mut self, color: Color) {
        self.style.background_color = color;
    }

    /// Replace the anchor dot color.
    pub fn set_circle_color(&mut self, color: Color) {
        self.style.circle_color = color;
    }

    /// Replace the anchor point. Collection wrappers fire the update hook
    /// and rebuild the visibility list around this.
    pub fn set_anchor_point(&mut self, point: Vec3) {
        self.anchor_point = point;
    }

    /// Replace the box point, refreshing the cached viewport-relative
    /// position. Called even while `fixed`, so toggling fixed off always
    /// continues from a sane 3D point.
    pub fn set_box_point(&mut self, point: Vec3, adapter: &dyn GeometryAdapter) {
        self.box_point = point;
        let projected = adapter.project(point);
        self.box_point_relative = projected / adapter.viewport().as_vec2();
    }

    /// Toggle fixed mode. Returns whether the flag changed.
    ///
    /// Leaving fixed mode re-anchors the 3D box point to the anchor point:
    /// the stored 3D point went stale while the relative position was
    /// authoritative, and the anchor is the one point guaranteed sensible.
    pub fn set_fixed(&mut self, fixed: bool, adapter: &dyn GeometryAdapter) -> bool {
        if fixed == self.fixed {
            return false;
        }
        if self.fixed {
            let anchor = self.anchor_point;
            self.set_box_point(anchor, adapter);
        }
        self.fixed = fixed;
        true
    }

    /// Set whether this markup participates in visibility testing. The
    /// collection rebuilds its test subset around this.
    pub fn set_check_visibility(&mut self, check: bool) {
        self.check_visibility = check;
    }

    /// Rebuild the 3D box point from the viewport-relative position, at a
    /// mid-range depth. Used when a drag starts on a fixed box so the drag
    /// has a valid 3D reference.
    pub fn unproject_box_anchor(&mut self, adapter: &dyn GeometryAdapter) {
        let screen = self.box_point_relative * adapter.viewport().as_vec2();
        self.box_point = adapter.unproject(screen, 0.5);
    }

    /// Create the pin markers (stem + sphere) on the picked surface and
    /// slave the anchor to them.
    ///
    /// The marker's bounding center, not the raw pick position, becomes the
    /// anchor and initial box point: the marker has thickness and the note
    /// should point at its visual center. Anchor dragging is disabled while
    /// the anchor is slaved to the marker.
    pub fn setup_pin(
        &mut self,
        position: Vec3,
        normal: Vec3,
        adapter: &mut dyn GeometryAdapter,
    ) -> Result<(), AdapterError> {
        if !self.has_pin {
            return Ok(());
        }

        let handles = adapter.create_pin_marker(position, normal, &PinColors::default())?;
        let anchor = adapter
            .marker_bounding_center(handles.sphere)
            .unwrap_or(position);
        self.pin = Some(handles);
        self.anchor_point = anchor;
        self.set_box_point(anchor, adapter);
        self.allow_anchor_move = false;
        Ok(())
    }

    /// Show the markup if hidden.
    pub fn show(&mut self) {
        if self.hidden {
            self.hidden = false;
            self.renderer.set_visible(true);
        }
    }

    /// Hide the markup if visible.
    pub fn hide(&mut self) {
        if !self.hidden {
            self.hidden = true;
            self.renderer.set_visible(false);
        }
    }

    /// Enter edit mode. Idempotent. Read-only markups get the selection
    /// outline but no editing affordance.
    pub fn select(&mut self) {
        self.selected = true;
        self.renderer.set_selected(true, self.allow_editing);
    }

    /// Leave edit mode. Idempotent.
    pub fn deselect(&mut self) {
        self.selected = false;
        self.renderer.set_selected(false, self.allow_editing);
    }

    /// Produce this markup's draw output for the current camera/viewport.
    pub fn draw(&mut self, adapter: &dyn GeometryAdapter) -> DrawFrame {
        if self.hidden {
            self.renderer.set_visible(false);
            return DrawFrame::hidden();
        }

        // A movable pin may have been relocated by the host; re-adopt its
        // live bounding center as the anchor.
        if self.has_pin && !self.fixed {
            if let Some(pin) = self.pin {
                if let Some(center) = adapter.marker_bounding_center(pin.sphere) {
                    self.anchor_point = center;
                    if !self.allow_box_move {
                        self.set_box_point(center, adapter);
                    }
                }
            }
        }

        let p1 = adapter.project(self.anchor_point);
        let viewport = adapter.viewport().as_vec2();

        let p2 = if self.fixed {
            self.box_point_relative * viewport
        } else {
            let projected = adapter.project(self.box_point);
            // Fresh baseline so a later fixed toggle starts from here.
            self.box_point_relative = projected / viewport;
            projected
        };

        let attachment = leader_attachment(p1, p2, self.renderer.size());
        let leader_line = self.show_leader_line.then_some([p1, attachment]);
        let anchor_dot = self.show_leader_line.then_some(AnchorDot {
            center: p1,
            radius: self.style.circle_radius,
            color: self.style.circle_color,
        });

        self.box_screen = p2;
        self.renderer.place(p2);
        self.renderer.set_visible(true);

        DrawFrame {
            visible: true,
            leader_line,
            anchor_dot,
            box_top_left: p2,
        }
    }

    /// Screen-space hit test.
    ///
    /// The box interior is tested before the anchor handle, so a box
    /// overlapping its own anchor still drags as a box. A miss deselects.
    pub fn hit(&mut self, point: Vec2, adapter: &dyn GeometryAdapter) -> bool {
        if self.hidden {
            return false;
        }

        let box_rect = ScreenRect::new(self.box_screen, self.renderer.size());
        if box_rect.contains(point) {
            self.last_hit_was_box = true;
            return true;
        }

        if let Some(title) = self.renderer.title_rect() {
            if title.translated(self.box_screen).contains(point) {
                self.last_hit_was_box = true;
                return true;
            }
        }

        let p1 = adapter.project(self.anchor_point);
        let handle_rect =
            ScreenRect::from_center_half_size(p1, Vec2::splat(ANCHOR_HANDLE_HALF_SIZE));
        if handle_rect.contains(point) {
            self.last_hit_was_box = false;
            return true;
        }

        self.deselect();
        false
    }

    /// Tear down the renderer and release any pin markers. After this the
    /// markup owns zero external handles.
    pub fn destroy(&mut self, adapter: &mut dyn GeometryAdapter) {
        self.renderer.detach();
        if let Some(pin) = self.pin.take() {
            adapter.destroy_marker(pin.stem);
            adapter.destroy_marker(pin.sphere);
        }
    }
}
