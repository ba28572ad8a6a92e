//! Pointer-driven markup placement and dragging.
//!
//! The controller owns no markups; it translates pointer events into
//! operations on a [`MarkupCollection`] through a [`GeometryAdapter`]. The
//! host feeds it raw pointer downs/moves/ups and redraws when told to.

use crate::collection::MarkupCollection;
use crate::markup::{Markup, MarkupId};
use glam::{Vec2, Vec3};
use modelmark_core::{GeometryAdapter, Plane, SurfacePick};
use thiserror::Error;
use tracing::{debug, warn};

/// Interaction configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The numeric creation mode was not 0, 1 or 2.
    #[error("invalid creation mode {0}, expected 0..=2")]
    InvalidCreationMode(u8),
}

/// What a pointer-down on empty model surface does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationMode {
    /// Surface clicks never create markups.
    Disabled,
    /// The next surface click creates one markup, then creation disables
    /// itself.
    SingleShot,
    /// Every surface click creates a markup.
    Continuous,
}

impl TryFrom<u8> for CreationMode {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, ConfigError> {
        match value {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::SingleShot),
            2 => Ok(Self::Continuous),
            other => Err(ConfigError::InvalidCreationMode(other)),
        }
    }
}

/// Pointer button for a down/up event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Primary (usually left) button.
    Primary,
    /// Secondary (usually right) button.
    Secondary,
    /// Middle button or wheel press.
    Middle,
}

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt/option held.
    pub alt: bool,
}

impl Modifiers {
    /// Whether no modifier is held.
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// One pointer event in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Screen position, origin top-left.
    pub position: Vec2,
    /// Button involved. Moves report the held button.
    pub button: PointerButton,
    /// Modifier state.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Unmodified primary-button event at `position`.
    pub fn primary(position: Vec2) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
        }
    }
}

/// Result of feeding one pointer event to the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerOutcome {
    /// Whether the controller consumed the event. When false the host should
    /// route it to its own camera controls.
    pub handled: bool,
    /// Whether the host should redraw the overlay.
    pub needs_redraw: bool,
}

impl PointerOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled(needs_redraw: bool) -> Self {
        Self {
            handled: true,
            needs_redraw,
        }
    }
}

/// Identifies one drag gesture, for correlating late pick results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragToken {
    markup: MarkupId,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Box,
    Anchor,
}

struct ActiveDrag {
    markup: MarkupId,
    mode: DragMode,
    // 3D offset from the dragged point to where the pointer ray met the
    // drag plane on pointer-down, so the grabbed spot stays under the
    // cursor.
    offset: Vec3,
    token: DragToken,
}

/// Builds a markup (and its box renderer) for a fresh surface pick.
pub type MarkupFactory = Box<dyn FnMut(&SurfacePick, &dyn GeometryAdapter) -> Markup>;

/// Predicate deciding which pointer events the controller responds to.
pub type ActivationPredicate = Box<dyn Fn(&PointerEvent) -> bool>;

/// Translates pointer gestures into markup creation, selection and drags.
pub struct InteractionController {
    creation_mode: CreationMode,
    factory: MarkupFactory,
    activation: ActivationPredicate,
    drag: Option<ActiveDrag>,
    // Armed on pointer-down over a markup; a move disarms it, so pointer-up
    // can tell a click from a drag's end.
    pending_click: Option<MarkupId>,
    next_seq: u64,
}

impl InteractionController {
    /// Create a controller. `factory` is called once per created markup.
    ///
    /// The default activation predicate accepts unmodified primary-button
    /// events, leaving modified and secondary input to the host's camera.
    pub fn new(creation_mode: CreationMode, factory: MarkupFactory) -> Self {
        Self {
            creation_mode,
            factory,
            activation: Box::new(|event| {
                event.button == PointerButton::Primary && event.modifiers.is_empty()
            }),
            drag: None,
            pending_click: None,
            next_seq: 0,
        }
    }

    /// Replace the activation predicate.
    pub fn set_activation(&mut self, predicate: ActivationPredicate) {
        self.activation = predicate;
    }

    /// Current creation mode.
    pub fn creation_mode(&self) -> CreationMode {
        self.creation_mode
    }

    /// Change the creation mode.
    pub fn set_creation_mode(&mut self, mode: CreationMode) {
        self.creation_mode = mode;
    }

    /// Token for the drag in progress, if any. Hand it back through
    /// [`InteractionController::apply_resolved_pick`] with a late pick
    /// result.
    pub fn drag_token(&self) -> Option<DragToken> {
        self.drag.as_ref().map(|d| d.token)
    }

    /// Feed a pointer-down event.
    pub fn on_pointer_down(
        &mut self,
        event: PointerEvent,
        collection: &mut MarkupCollection,
        adapter: &mut dyn GeometryAdapter,
    ) -> PointerOutcome {
        if !(self.activation)(&event) {
            return PointerOutcome::ignored();
        }

        // An existing markup under the pointer wins over everything; misses
        // along the way deselect.
        if let Some(id) = collection.pick(event.position, adapter) {
            self.begin_markup_drag(id, event.position, collection, adapter);
            self.pending_click = Some(id);
            return PointerOutcome::handled(true);
        }

        let Some(pick) = adapter.pick_surface(event.position) else {
            return PointerOutcome::ignored();
        };

        // Clicking a markup's own pin geometry selects that markup instead
        // of creating a new one on top of it.
        if let Some(owner) = collection.is_pin_geometry(pick.node) {
            collection.select(owner);
            self.pending_click = Some(owner);
            return PointerOutcome::handled(true);
        }

        if self.creation_mode == CreationMode::Disabled {
            return PointerOutcome::ignored();
        }

        let mut markup = (self.factory)(&pick, adapter);
        if let Err(error) = markup.setup_pin(pick.position, pick.normal, adapter) {
            warn!(%error, "pin marker creation failed, markup discarded");
            markup.destroy(adapter);
            return PointerOutcome::handled(false);
        }
        let id = collection.add(markup, adapter);
        debug!(markup = %id, "markup created from surface pick");

        // The fresh markup immediately drags as a box so the user can slide
        // the note away from the pick point in one gesture.
        self.drag = Some(ActiveDrag {
            markup: id,
            mode: DragMode::Box,
            offset: Vec3::ZERO,
            token: self.new_token(id),
        });
        self.pending_click = None;

        if self.creation_mode == CreationMode::SingleShot {
            self.creation_mode = CreationMode::Disabled;
        }
        PointerOutcome::handled(true)
    }

    /// Feed a pointer-move event.
    pub fn on_pointer_move(
        &mut self,
        event: PointerEvent,
        collection: &mut MarkupCollection,
        adapter: &mut dyn GeometryAdapter,
    ) -> PointerOutcome {
        let Some(drag) = &self.drag else {
            return PointerOutcome::ignored();
        };
        let (id, mode, offset) = (drag.markup, drag.mode, drag.offset);
        self.pending_click = None;

        let Some(markup) = collection.get(id) else {
            self.drag = None;
            return PointerOutcome::ignored();
        };

        match mode {
            DragMode::Anchor => {
                if !markup.allow_anchor_move() {
                    return PointerOutcome::handled(false);
                }
                // Snap to the model surface when the pointer is over it;
                // otherwise slide on a camera-facing plane through the box
                // point so the anchor never jumps to infinity.
                if let Some(pick) = adapter.pick_surface(event.position) {
                    collection.set_anchor_point(id, pick.position, adapter);
                } else if let Some(point) =
                    drag_plane_hit(markup.box_point(), event.position, adapter)
                {
                    collection.set_anchor_point(id, point, adapter);
                } else {
                    return PointerOutcome::handled(false);
                }
            }
            DragMode::Box => {
                if !markup.allow_box_move() {
                    return PointerOutcome::handled(false);
                }
                let Some(point) = drag_plane_hit(markup.box_point(), event.position, adapter)
                else {
                    return PointerOutcome::handled(false);
                };
                collection.set_box_point(id, point - offset, adapter);
            }
        }
        PointerOutcome::handled(true)
    }

    /// Feed a pointer-up event.
    pub fn on_pointer_up(
        &mut self,
        _event: PointerEvent,
        collection: &mut MarkupCollection,
    ) -> PointerOutcome {
        let had_drag = self.drag.take().is_some();

        // A down-up pair with no move in between is a click: select.
        if let Some(id) = self.pending_click.take() {
            collection.select(id);
            return PointerOutcome::handled(true);
        }
        if had_drag {
            return PointerOutcome::handled(false);
        }
        PointerOutcome::ignored()
    }

    /// Apply a surface pick that resolved after the pointer event that
    /// requested it, e.g. from a host whose picking is asynchronous.
    ///
    /// The result is applied only if the identified drag is still the one in
    /// progress; results for finished or superseded drags are discarded.
    /// Returns whether the pick was applied.
    pub fn apply_resolved_pick(
        &mut self,
        token: DragToken,
        pick: Option<SurfacePick>,
        collection: &mut MarkupCollection,
        adapter: &mut dyn GeometryAdapter,
    ) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        if drag.token != token || drag.mode != DragMode::Anchor {
            return false;
        }
        let Some(pick) = pick else {
            return false;
        };
        let id = drag.markup;
        if collection
            .get(id)
            .is_none_or(|markup| !markup.allow_anchor_move())
        {
            return false;
        }
        collection.set_anchor_point(id, pick.position, adapter);
        true
    }

    fn begin_markup_drag(
        &mut self,
        id: MarkupId,
        position: Vec2,
        collection: &mut MarkupCollection,
        adapter: &dyn GeometryAdapter,
    ) {
        let Some(markup) = collection.get_mut(id) else {
            return;
        };

        // A fixed box has no trustworthy 3D point; rebuild one at mid-depth
        // so the drag plane exists.
        if markup.fixed() {
            markup.unproject_box_anchor(adapter);
        }

        let mode = if markup.last_hit_was_box() {
            DragMode::Box
        } else {
            DragMode::Anchor
        };
        let offset = match mode {
            DragMode::Box => drag_plane_hit(markup.box_point(), position, adapter)
                .map(|hit| hit - markup.box_point())
                .unwrap_or(Vec3::ZERO),
            DragMode::Anchor => Vec3::ZERO,
        };

        debug!(markup = %id, ?mode, "drag started");
        self.drag = Some(ActiveDrag {
            markup: id,
            mode,
            offset,
            token: self.new_token(id),
        });
    }

    fn new_token(&mut self, markup: MarkupId) -> DragToken {
        self.next_seq += 1;
        DragToken {
            markup,
            seq: self.next_seq,
        }
    }
}

/// Intersect the pointer ray with a camera-facing plane through `point`.
fn drag_plane_hit(point: Vec3, screen: Vec2, adapter: &dyn GeometryAdapter) -> Option<Vec3> {
    let camera = adapter.camera();
    let plane = Plane::camera_facing(point, camera.position, camera.target);
    let ray = adapter.ray_from_screen(screen);
    plane.intersect_ray(&ray)
}
