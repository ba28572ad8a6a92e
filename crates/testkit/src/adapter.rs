//! A scripted [`GeometryAdapter`] with hand-checkable math.
//!
//! The fake uses an orthographic identity projection: world x/y map straight
//! to screen pixels and z is depth. The camera sits at z = 10 looking at the
//! origin, so screen rays travel along -Z and camera-facing drag planes are
//! z = const. Every expected value in a test can be read off the inputs.

use glam::{Vec2, Vec3};
use modelmark_core::{
    AdapterError, CameraPose, GeometryAdapter, MarkerHandle, NodeId, PinColors, PinHandles, Ray,
    SurfacePick, ViewportSize,
};
use std::collections::BTreeMap;

const VIEWPORT: ViewportSize = ViewportSize {
    width: 1000.0,
    height: 800.0,
};

/// Scripted in-memory stand-in for a host viewer.
pub struct FakeGeometryAdapter {
    // Flat pickable surface: every pick hits it at (x, y, z) with a +Z
    // normal. `None` means every pick misses.
    surface: Option<(NodeId, f32)>,
    visibility_points: Vec<Vec3>,
    markers: BTreeMap<MarkerHandle, Vec3>,
    next_handle: MarkerHandle,
    fail_marker_creation: bool,
}

impl Default for FakeGeometryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGeometryAdapter {
    /// Adapter with no pickable surface.
    pub fn new() -> Self {
        Self {
            surface: None,
            visibility_points: Vec::new(),
            markers: BTreeMap::new(),
            next_handle: 1,
            fail_marker_creation: false,
        }
    }

    /// Make every surface pick hit a flat plane at depth `z`, owned by
    /// scene node `node`.
    pub fn set_flat_surface(&mut self, node: NodeId, z: f32) {
        self.surface = Some((node, z));
    }

    /// Make every surface pick miss.
    pub fn clear_surface(&mut self) {
        self.surface = None;
    }

    /// Make the next marker creations fail.
    pub fn fail_marker_creation(&mut self, fail: bool) {
        self.fail_marker_creation = fail;
    }

    /// The last visibility-test point batch handed over.
    pub fn visibility_points(&self) -> &[Vec3] {
        &self.visibility_points
    }

    /// Number of markers created and not yet destroyed.
    pub fn live_marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Relocate a marker, as a host would when the user drags pin geometry.
    /// The new position becomes the marker's bounding center verbatim.
    pub fn move_marker(&mut self, handle: MarkerHandle, position: Vec3) {
        if let Some(center) = self.markers.get_mut(&handle) {
            *center = position;
        }
    }

    fn allocate_marker(&mut self, center: Vec3) -> MarkerHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.markers.insert(handle, center);
        handle
    }
}

impl GeometryAdapter for FakeGeometryAdapter {
    fn viewport(&self) -> ViewportSize {
        VIEWPORT
    }

    fn project(&self, point: Vec3) -> Vec2 {
        Vec2::new(point.x, point.y)
    }

    fn unproject(&self, point: Vec2, depth: f32) -> Vec3 {
        Vec3::new(point.x, point.y, depth)
    }

    fn ray_from_screen(&self, point: Vec2) -> Ray {
        Ray::new(Vec3::new(point.x, point.y, 10.0), Vec3::NEG_Z)
    }

    fn camera(&self) -> CameraPose {
        CameraPose {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
        }
    }

    fn pick_surface(&self, point: Vec2) -> Option<SurfacePick> {
        let (node, z) = self.surface?;
        Some(SurfacePick {
            node,
            position: Vec3::new(point.x, point.y, z),
            normal: Vec3::Z,
        })
    }

    fn set_visibility_test_points(&mut self, points: &[Vec3]) {
        self.visibility_points = points.to_vec();
    }

    fn create_pin_marker(
        &mut self,
        position: Vec3,
        normal: Vec3,
        _colors: &PinColors,
    ) -> Result<PinHandles, AdapterError> {
        if self.fail_marker_creation {
            return Err(AdapterError::MarkerCreation(
                "scripted marker creation failure".to_string(),
            ));
        }
        let stem = self.allocate_marker(position);
        // Offset models the sphere head sitting half a unit off the surface.
        let sphere = self.allocate_marker(position + normal * 0.5);
        Ok(PinHandles { stem, sphere })
    }

    fn marker_bounding_center(&self, handle: MarkerHandle) -> Option<Vec3> {
        self.markers.get(&handle).copied()
    }

    fn destroy_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }
}
