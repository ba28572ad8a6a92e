//! The contract a host viewer implements for the overlay engine.

use crate::color::Color;
use crate::geometry::{Ray, ViewportSize};
use glam::{Vec2, Vec3};
use thiserror::Error;

/// Opaque identifier of a scene node owned by the host viewer.
pub type NodeId = u64;

/// Opaque handle to marker geometry created through the adapter.
pub type MarkerHandle = u64;

/// Result of a successful surface pick under a screen position.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePick {
    /// The scene node that was hit.
    pub node: NodeId,
    /// World-space position of the hit.
    pub position: Vec3,
    /// Surface normal at the hit.
    pub normal: Vec3,
}

/// The two marker handles owned by a pinned markup for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinHandles {
    /// The stem line marker.
    pub stem: MarkerHandle,
    /// The sphere head marker.
    pub sphere: MarkerHandle,
}

impl PinHandles {
    /// Whether `handle` is one of this pin's markers.
    pub fn owns(&self, handle: MarkerHandle) -> bool {
        handle == self.stem || handle == self.sphere
    }
}

/// Colors used when creating pin marker geometry.
#[derive(Debug, Clone, Copy)]
pub struct PinColors {
    /// Stem line color.
    pub stem: Color,
    /// Sphere head color.
    pub sphere: Color,
}

impl Default for PinColors {
    fn default() -> Self {
        Self {
            stem: Color::BLACK,
            sphere: Color::WHITE,
        }
    }
}

/// Camera position and look-at target, as reported by the host.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// Camera look-at target in world space.
    pub target: Vec3,
}

/// Errors surfaced by adapter operations that are not expected misses.
///
/// Pick misses and unknown-handle queries are `Option`s, not errors; this
/// type covers failures the host cannot recover from silently.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The host failed to create marker geometry.
    #[error("marker creation failed: {0}")]
    MarkerCreation(String),
}

/// Everything the overlay engine needs from the host viewer.
///
/// Read-only queries take `&self`; operations that mutate the host scene
/// (visibility queries, marker lifecycle) take `&mut self`. The engine never
/// stores an adapter — callers pass one into each operation, so ownership of
/// the viewer stays with the host.
pub trait GeometryAdapter {
    /// Current viewport dimensions in pixels.
    fn viewport(&self) -> ViewportSize;

    /// Project a world-space point to screen space.
    fn project(&self, point: Vec3) -> Vec2;

    /// Unproject a screen-space point at the given normalized depth.
    fn unproject(&self, point: Vec2, depth: f32) -> Vec3;

    /// Cast a world-space ray through a screen position.
    fn ray_from_screen(&self, point: Vec2) -> Ray;

    /// Current camera pose.
    fn camera(&self) -> CameraPose;

    /// Pick the model surface under a screen position.
    ///
    /// `None` is the expected, frequent miss: empty space, model gaps, or an
    /// ambiguous overlay result.
    fn pick_surface(&self, point: Vec2) -> Option<SurfacePick>;

    /// Replace the batch of points subject to per-frame visibility testing.
    ///
    /// Results are delivered later as indices into exactly this list, so the
    /// caller must keep its own bookkeeping in lock-step.
    fn set_visibility_test_points(&mut self, points: &[Vec3]);

    /// Create pin marker geometry (stem + sphere) at a surface position.
    fn create_pin_marker(
        &mut self,
        position: Vec3,
        normal: Vec3,
        colors: &PinColors,
    ) -> Result<PinHandles, AdapterError>;

    /// The live world-space bounding center of a marker, or `None` for an
    /// unknown handle. The center accounts for marker thickness, so it is not
    /// the raw pick position the marker was created at.
    fn marker_bounding_center(&self, handle: MarkerHandle) -> Option<Vec3>;

    /// Destroy a marker. Unknown handles are a no-op.
    fn destroy_marker(&mut self, handle: MarkerHandle);
}
