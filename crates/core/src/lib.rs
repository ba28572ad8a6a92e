#![warn(missing_docs)]
//! Geometry primitives and the host-viewer contract shared across the workspace.
//!
//! The overlay engine never talks to a concrete viewer SDK. Everything it needs
//! from the host — 3D/2D projection, ray casting, surface picking, batch
//! visibility queries, pin marker lifecycle — goes through the
//! [`GeometryAdapter`] trait defined here.

pub mod adapter;
pub mod color;
pub mod geometry;
pub mod renderer;

pub use adapter::{
    AdapterError, CameraPose, GeometryAdapter, MarkerHandle, NodeId, PinColors, PinHandles,
    SurfacePick,
};
pub use color::Color;
pub use geometry::{surface_basis, Plane, Ray, ScreenRect, ViewportSize};
pub use renderer::BoxRenderer;
