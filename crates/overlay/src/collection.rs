//! Owns the set of markups: identity, visibility testing, serialization,
//! update notifications.

use crate::markup::{Markup, MarkupId, MarkupRecord, RecordError, RenderHandle};
use crate::render::DrawFrame;
use glam::{Vec2, Vec3};
use modelmark_core::{BoxRenderer, GeometryAdapter, MarkerHandle};
use tracing::{debug, trace, warn};

/// Hook invoked on any markup mutation routed through the collection.
/// The flag is true when the markup is about to be deleted.
pub type MarkupUpdatedHook = Box<dyn FnMut(&Markup, bool)>;

/// Hook invoked when a markup is added, returning an opaque render handle
/// from the host rendering subsystem.
pub type RegisterHook = Box<dyn FnMut(&Markup) -> Option<RenderHandle>>;

/// Hook invoked to release a previously assigned render handle.
pub type UnregisterHook = Box<dyn FnMut(RenderHandle)>;

/// The ordered set of markups for one viewer session.
///
/// Order is insertion order and carries no semantic weight; lookups are
/// linear scans. The collection exclusively owns its markups — a markup
/// never outlives its removal.
#[derive(Default)]
pub struct MarkupCollection {
    markups: Vec<Markup>,
    // Ids of the markups in the last-issued visibility query, in query
    // order. Visibility results index into this list, so it is rebuilt in
    // full on every mutation that could perturb it.
    visibility_targets: Vec<MarkupId>,
    visibility_generation: u64,
    updated_hook: Option<MarkupUpdatedHook>,
    register_hook: Option<RegisterHook>,
    unregister_hook: Option<UnregisterHook>,
}

impl MarkupCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the markup-updated notification hook.
    pub fn set_markup_updated_hook(&mut self, hook: MarkupUpdatedHook) {
        self.updated_hook = Some(hook);
    }

    /// Install host render registration hooks.
    pub fn set_render_hooks(&mut self, register: RegisterHook, unregister: UnregisterHook) {
        self.register_hook = Some(register);
        self.unregister_hook = Some(unregister);
    }

    /// Number of markups.
    pub fn len(&self) -> usize {
        self.markups.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.markups.is_empty()
    }

    /// Iterate the markups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Markup> {
        self.markups.iter()
    }

    /// Add a markup, register it with the host renderer, and rebuild the
    /// visibility-test subset. Returns the markup's id.
    pub fn add(&mut self, mut markup: Markup, adapter: &mut dyn GeometryAdapter) -> MarkupId {
        let id = markup.id();
        if let Some(register) = &mut self.register_hook {
            markup.set_render_handle(register(&markup));
        }
        debug!(markup = %id, "markup added");
        self.markups.push(markup);
        self.update_visibility_list(adapter);
        id
    }

    /// Look up a markup by id.
    pub fn get(&self, id: MarkupId) -> Option<&Markup> {
        self.markups.iter().find(|m| m.id() == id)
    }

    /// Look up a markup by id, mutably.
    pub fn get_mut(&mut self, id: MarkupId) -> Option<&mut Markup> {
        self.markups.iter_mut().find(|m| m.id() == id)
    }

    /// The first selected markup, if any. The interaction layer keeps at
    /// most one markup selected by convention; the data model does not
    /// enforce exclusivity.
    pub fn selected(&self) -> Option<&Markup> {
        self.markups.iter().find(|m| m.selected())
    }

    /// Delete a markup by id. Unknown ids are a silent no-op.
    ///
    /// The update hook fires with the delete flag *before* removal, so the
    /// host still sees the full markup state.
    pub fn delete(&mut self, id: MarkupId, adapter: &mut dyn GeometryAdapter) -> bool {
        let Some(index) = self.markups.iter().position(|m| m.id() == id) else {
            trace!(markup = %id, "delete of unknown markup ignored");
            return false;
        };

        if let Some(hook) = &mut self.updated_hook {
            hook(&self.markups[index], true);
        }

        let mut markup = self.markups.remove(index);
        if let (Some(unregister), Some(handle)) =
            (&mut self.unregister_hook, markup.render_handle())
        {
            unregister(handle);
        }
        markup.destroy(adapter);
        debug!(markup = %id, "markup deleted");
        self.update_visibility_list(adapter);
        true
    }

    /// Delete every markup, with the same per-item cleanup as [`delete`].
    ///
    /// [`delete`]: MarkupCollection::delete
    pub fn delete_all(&mut self, adapter: &mut dyn GeometryAdapter) {
        for mut markup in self.markups.drain(..) {
            if let Some(hook) = &mut self.updated_hook {
                hook(&markup, true);
            }
            if let (Some(unregister), Some(handle)) =
                (&mut self.unregister_hook, markup.render_handle())
            {
                unregister(handle);
            }
            markup.destroy(adapter);
        }
        self.update_visibility_list(adapter);
    }

    /// Move a markup's anchor point. Rebuilds the visibility subset, since
    /// the anchor feeds the visibility test.
    pub fn set_anchor_point(
        &mut self,
        id: MarkupId,
        point: Vec3,
        adapter: &mut dyn GeometryAdapter,
    ) {
        let Some(index) = self.markups.iter().position(|m| m.id() == id) else {
            return;
        };
        self.markups[index].set_anchor_point(point);
        self.notify_updated(index);
        self.update_visibility_list(adapter);
    }

    /// Move a markup's box point.
    pub fn set_box_point(&mut self, id: MarkupId, point: Vec3, adapter: &dyn GeometryAdapter) {
        let Some(index) = self.markups.iter().position(|m| m.id() == id) else {
            return;
        };
        self.markups[index].set_box_point(point, adapter);
        self.notify_updated(index);
    }

    /// Toggle a markup's fixed mode.
    pub fn set_fixed(&mut self, id: MarkupId, fixed: bool, adapter: &dyn GeometryAdapter) {
        let Some(index) = self.markups.iter().position(|m| m.id() == id) else {
            return;
        };
        if self.markups[index].set_fixed(fixed, adapter) {
            self.notify_updated(index);
        }
    }

    /// Toggle a markup's visibility-test participation and rebuild the
    /// test subset.
    pub fn set_check_visibility(
        &mut self,
        id: MarkupId,
        check: bool,
        adapter: &mut dyn GeometryAdapter,
    ) {
        let Some(index) = self.markups.iter().position(|m| m.id() == id) else {
            return;
        };
        self.markups[index].set_check_visibility(check);
        self.update_visibility_list(adapter);
        self.notify_updated(index);
    }

    /// Select a markup, deselecting every other one. Unknown ids are a
    /// no-op.
    pub fn select(&mut self, id: MarkupId) {
        if self.get(id).is_none() {
            return;
        }
        for markup in &mut self.markups {
            if markup.id() == id {
                markup.select();
            } else if markup.selected() {
                markup.deselect();
            }
        }
    }

    /// Replace a markup's text.
    pub fn set_text(&mut self, id: MarkupId, text: impl Into<String>) {
        let Some(index) = self.markups.iter().position(|m| m.id() == id) else {
            return;
        };
        self.markups[index].set_text(text);
        self.notify_updated(index);
    }

    /// Rebuild, from scratch, the ordered subset of markups subject to
    /// visibility testing and hand their anchor points to the adapter.
    ///
    /// The host's visibility results index into this exact list, so any
    /// mutation of the set or of a member's anchor/flag must come through
    /// here before the next result is consumed. Returns the new generation.
    pub fn update_visibility_list(&mut self, adapter: &mut dyn GeometryAdapter) -> u64 {
        self.visibility_targets.clear();
        let mut points = Vec::new();
        for markup in &self.markups {
            if markup.check_visibility() {
                self.visibility_targets.push(markup.id());
                points.push(markup.anchor_point());
            }
        }
        adapter.set_visibility_test_points(&points);
        self.visibility_generation += 1;
        self.visibility_generation
    }

    /// Generation of the last-issued visibility query.
    pub fn visibility_generation(&self) -> u64 {
        self.visibility_generation
    }

    /// Ids in the last-issued visibility query, in query order.
    pub fn visibility_targets(&self) -> &[MarkupId] {
        &self.visibility_targets
    }

    /// Consume one frame's visibility results: `visible` holds indices into
    /// the last-issued query that are unoccluded. Every tested markup is
    /// hidden first, then the reported ones are shown.
    ///
    /// Results from a superseded query (stale generation) and out-of-range
    /// indices are discarded rather than misattributed. Returns whether any
    /// markup changed visibility, i.e. whether a redraw is warranted.
    pub fn apply_visibility_results(&mut self, generation: u64, visible: &[usize]) -> bool {
        if generation != self.visibility_generation {
            warn!(
                got = generation,
                current = self.visibility_generation,
                "discarding visibility results from a superseded query"
            );
            return false;
        }

        let mut changed = false;
        for markup in &mut self.markups {
            if markup.check_visibility() && !markup.hidden() {
                markup.hide();
                changed = true;
            }
        }

        for &index in visible {
            let Some(&id) = self.visibility_targets.get(index) else {
                warn!(index, "visibility result index out of range, skipped");
                continue;
            };
            if let Some(markup) = self.get_mut(id) {
                if markup.check_visibility() && markup.hidden() {
                    markup.show();
                    changed = true;
                }
            }
        }
        changed
    }

    /// Redraw every markup. Idempotent; safe to call more often than
    /// strictly necessary.
    pub fn redraw(&mut self, adapter: &dyn GeometryAdapter) -> Vec<(MarkupId, DrawFrame)> {
        self.markups
            .iter_mut()
            .map(|m| (m.id(), m.draw(adapter)))
            .collect()
    }

    /// Hit-test the markups in insertion order, returning the first hit.
    pub fn pick(&mut self, point: Vec2, adapter: &dyn GeometryAdapter) -> Option<MarkupId> {
        for markup in &mut self.markups {
            if markup.hit(point, adapter) {
                return Some(markup.id());
            }
        }
        None
    }

    /// Resolve a picked geometry handle back to the markup owning it as a
    /// pin marker, if any.
    pub fn is_pin_geometry(&self, handle: MarkerHandle) -> Option<MarkupId> {
        self.markups
            .iter()
            .find(|m| m.pin_handles().is_some_and(|pin| pin.owns(handle)))
            .map(|m| m.id())
    }

    /// Export every markup as a record, in current insertion order.
    pub fn export(&self) -> Vec<MarkupRecord> {
        self.markups.iter().map(|m| m.to_record()).collect()
    }

    /// Recreate markups from persisted records. Loaded markups are forced
    /// read-only. Returns the ids in load order.
    pub fn load_records(
        &mut self,
        records: &[MarkupRecord],
        renderer_factory: &mut dyn FnMut(&MarkupRecord) -> Box<dyn BoxRenderer>,
        adapter: &mut dyn GeometryAdapter,
    ) -> Result<Vec<MarkupId>, RecordError> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let mut markup = Markup::from_record(record, renderer_factory(record), adapter)?;
            markup.set_allow_editing(false);
            ids.push(self.add(markup, adapter));
        }
        Ok(ids)
    }

    fn notify_updated(&mut self, index: usize) {
        if let Some(hook) = &mut self.updated_hook {
            hook(&self.markups[index], false);
        }
    }
}
