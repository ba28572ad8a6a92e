#![warn(missing_docs)]
//! Annotation overlay engine for a 3D model viewer.
//!
//! A [`Markup`] pairs a 3D anchor point on the model with a screen-space
//! text box, joined by a leader line. The [`MarkupCollection`] owns the set,
//! drives visibility testing and serialization, and the
//! [`InteractionController`] turns pointer gestures into placement,
//! selection and drags. All viewer-specific geometry goes through the
//! [`GeometryAdapter`] contract from `modelmark-core`.

pub mod chrome;
pub mod collection;
pub mod interaction;
pub mod markup;
pub mod render;

pub use chrome::NullBox;
pub use collection::{MarkupCollection, MarkupUpdatedHook, RegisterHook, UnregisterHook};
pub use interaction::{
    ConfigError, CreationMode, DragToken, InteractionController, Modifiers, PointerButton,
    PointerEvent, PointerOutcome,
};
pub use markup::{
    Markup, MarkupConfig, MarkupId, MarkupRecord, MarkupStyle, RecordError, RenderHandle,
};
pub use render::{leader_attachment, AnchorDot, DrawFrame};

pub use modelmark_core::GeometryAdapter;
