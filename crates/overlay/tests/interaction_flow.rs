//! End-to-end pointer gesture tests: creation, selection, box and anchor
//! drags, and late pick resolution.
//!
//! The fake adapter projects world x/y straight to screen pixels with the
//! camera on +Z, so drag planes are z = const and every expected point can
//! be read off the event coordinates.

use glam::{Vec2, Vec3};
use modelmark_overlay::{
    CreationMode, GeometryAdapter, InteractionController, Markup, MarkupCollection, MarkupConfig,
    PointerEvent,
};
use modelmark_testkit::{FakeGeometryAdapter, RecordingBox};

const BOX_SIZE: Vec2 = Vec2::new(100.0, 30.0);

fn controller(mode: CreationMode, has_pin: bool) -> InteractionController {
    InteractionController::new(
        mode,
        Box::new(move |pick, adapter| {
            Markup::new(
                pick.position,
                MarkupConfig {
                    has_pin,
                    ..MarkupConfig::default()
                },
                Box::new(RecordingBox::new(BOX_SIZE)),
                adapter,
            )
        }),
    )
}

fn add_markup(
    collection: &mut MarkupCollection,
    adapter: &mut FakeGeometryAdapter,
    anchor: Vec3,
    config: MarkupConfig,
) -> modelmark_overlay::MarkupId {
    let markup = Markup::new(
        anchor,
        config,
        Box::new(RecordingBox::new(BOX_SIZE)),
        &*adapter,
    );
    collection.add(markup, adapter)
}

#[test]
fn single_shot_creates_one_markup_then_disables() {
    let mut adapter = FakeGeometryAdapter::new();
    adapter.set_flat_surface(1, 0.0);
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::SingleShot, false);

    let outcome = controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(400.0, 300.0)),
        &mut collection,
        &mut adapter,
    );
    assert!(outcome.handled);
    assert_eq!(collection.len(), 1);
    assert_eq!(controller.creation_mode(), CreationMode::Disabled);
    controller.on_pointer_up(PointerEvent::primary(Vec2::new(400.0, 300.0)), &mut collection);

    // The second click lands on empty surface and creates nothing.
    let outcome = controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(700.0, 600.0)),
        &mut collection,
        &mut adapter,
    );
    assert!(!outcome.handled);
    assert_eq!(collection.len(), 1);
}

#[test]
fn continuous_mode_creates_per_click() {
    let mut adapter = FakeGeometryAdapter::new();
    adapter.set_flat_surface(1, 0.0);
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Continuous, false);

    for position in [Vec2::new(200.0, 500.0), Vec2::new(700.0, 500.0)] {
        controller.on_pointer_down(PointerEvent::primary(position), &mut collection, &mut adapter);
        controller.on_pointer_up(PointerEvent::primary(position), &mut collection);
    }
    assert_eq!(collection.len(), 2);
    assert_eq!(controller.creation_mode(), CreationMode::Continuous);
}

#[test]
fn disabled_mode_ignores_surface_clicks() {
    let mut adapter = FakeGeometryAdapter::new();
    adapter.set_flat_surface(1, 0.0);
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);

    let outcome = controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(400.0, 300.0)),
        &mut collection,
        &mut adapter,
    );
    assert!(!outcome.handled);
    assert!(collection.is_empty());
}

#[test]
fn failed_pin_creation_discards_the_markup() {
    let mut adapter = FakeGeometryAdapter::new();
    adapter.set_flat_surface(1, 0.0);
    adapter.fail_marker_creation(true);
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Continuous, true);

    let outcome = controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(400.0, 300.0)),
        &mut collection,
        &mut adapter,
    );
    assert!(outcome.handled);
    assert!(collection.is_empty());
    assert_eq!(adapter.live_marker_count(), 0);
}

#[test]
fn created_markup_carries_pin_geometry() {
    let mut adapter = FakeGeometryAdapter::new();
    adapter.set_flat_surface(1, 0.0);
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::SingleShot, true);

    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(400.0, 300.0)),
        &mut collection,
        &mut adapter,
    );

    assert_eq!(adapter.live_marker_count(), 2);
    let markup = collection.iter().next().unwrap();
    // The anchor adopts the sphere's bounding center, half a unit off the
    // surface, and the anchor handle locks.
    assert_eq!(markup.anchor_point(), Vec3::new(400.0, 300.0, 0.5));
    assert!(!markup.allow_anchor_move());
}

#[test]
fn box_drag_keeps_the_grab_offset() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);
    let id = add_markup(
        &mut collection,
        &mut adapter,
        Vec3::new(200.0, 200.0, 0.0),
        MarkupConfig::default(),
    );
    collection.redraw(&adapter);

    // Grab the box 20px right and 10px below its corner.
    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(220.0, 210.0)),
        &mut collection,
        &mut adapter,
    );
    let outcome = controller.on_pointer_move(
        PointerEvent::primary(Vec2::new(400.0, 400.0)),
        &mut collection,
        &mut adapter,
    );
    assert!(outcome.needs_redraw);
    assert_eq!(
        collection.get(id).unwrap().box_point(),
        Vec3::new(380.0, 390.0, 0.0)
    );

    controller.on_pointer_up(PointerEvent::primary(Vec2::new(400.0, 400.0)), &mut collection);
    assert!(controller.drag_token().is_none());
}

#[test]
fn box_drag_is_gated_by_allow_box_move() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);
    let id = add_markup(
        &mut collection,
        &mut adapter,
        Vec3::new(200.0, 200.0, 0.0),
        MarkupConfig {
            allow_box_move: false,
            ..MarkupConfig::default()
        },
    );
    collection.redraw(&adapter);

    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(220.0, 210.0)),
        &mut collection,
        &mut adapter,
    );
    let outcome = controller.on_pointer_move(
        PointerEvent::primary(Vec2::new(400.0, 400.0)),
        &mut collection,
        &mut adapter,
    );
    assert!(outcome.handled);
    assert!(!outcome.needs_redraw);
    assert_eq!(
        collection.get(id).unwrap().box_point(),
        Vec3::new(200.0, 200.0, 0.0)
    );
}

#[test]
fn anchor_drag_snaps_to_surface_and_falls_back_to_plane() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);
    let id = add_markup(
        &mut collection,
        &mut adapter,
        Vec3::new(400.0, 400.0, 0.0),
        MarkupConfig {
            box_point: Some(Vec3::new(100.0, 100.0, 0.0)),
            ..MarkupConfig::default()
        },
    );
    collection.redraw(&adapter);

    // Grab the anchor handle, away from the box.
    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(403.0, 398.0)),
        &mut collection,
        &mut adapter,
    );

    adapter.set_flat_surface(9, 2.0);
    controller.on_pointer_move(
        PointerEvent::primary(Vec2::new(500.0, 500.0)),
        &mut collection,
        &mut adapter,
    );
    assert_eq!(
        collection.get(id).unwrap().anchor_point(),
        Vec3::new(500.0, 500.0, 2.0)
    );

    // Off the model the anchor slides on the camera-facing plane through
    // the box point (z = 0) instead of vanishing.
    adapter.clear_surface();
    controller.on_pointer_move(
        PointerEvent::primary(Vec2::new(600.0, 600.0)),
        &mut collection,
        &mut adapter,
    );
    assert_eq!(
        collection.get(id).unwrap().anchor_point(),
        Vec3::new(600.0, 600.0, 0.0)
    );
}

#[test]
fn click_without_move_selects_the_markup() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);
    let id = add_markup(
        &mut collection,
        &mut adapter,
        Vec3::new(200.0, 200.0, 0.0),
        MarkupConfig::default(),
    );
    collection.get_mut(id).unwrap().deselect();
    collection.redraw(&adapter);

    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(220.0, 210.0)),
        &mut collection,
        &mut adapter,
    );
    let outcome =
        controller.on_pointer_up(PointerEvent::primary(Vec2::new(220.0, 210.0)), &mut collection);
    assert!(outcome.needs_redraw);
    assert!(collection.get(id).unwrap().selected());
}

#[test]
fn drag_end_is_not_a_click() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);
    let id = add_markup(
        &mut collection,
        &mut adapter,
        Vec3::new(200.0, 200.0, 0.0),
        MarkupConfig::default(),
    );
    collection.get_mut(id).unwrap().deselect();
    collection.redraw(&adapter);

    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(220.0, 210.0)),
        &mut collection,
        &mut adapter,
    );
    controller.on_pointer_move(
        PointerEvent::primary(Vec2::new(300.0, 300.0)),
        &mut collection,
        &mut adapter,
    );
    controller.on_pointer_up(PointerEvent::primary(Vec2::new(300.0, 300.0)), &mut collection);

    assert!(!collection.get(id).unwrap().selected());
}

#[test]
fn fixed_box_drag_rebuilds_a_world_point_first() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);
    let id = add_markup(
        &mut collection,
        &mut adapter,
        Vec3::new(50.0, 50.0, 0.0),
        MarkupConfig {
            fixed: true,
            box_point_relative: Some(Vec2::new(0.25, 0.5)),
            ..MarkupConfig::default()
        },
    );
    // Fixed box draws at 25% x 50% of the 1000x800 viewport.
    collection.redraw(&adapter);

    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(260.0, 410.0)),
        &mut collection,
        &mut adapter,
    );
    controller.on_pointer_move(
        PointerEvent::primary(Vec2::new(300.0, 300.0)),
        &mut collection,
        &mut adapter,
    );

    let markup = collection.get(id).unwrap();
    // The down rebuilt a mid-depth world point at the on-screen corner, so
    // the move lands 10px up-left of the pointer, preserving the grab.
    assert_eq!(markup.box_point(), Vec3::new(290.0, 290.0, 0.5));
    assert_eq!(markup.box_point_relative(), Vec2::new(0.29, 0.3625));
}

#[test]
fn clicking_pin_geometry_selects_its_owner() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Continuous, false);

    let mut markup = Markup::new(
        Vec3::new(800.0, 700.0, 0.0),
        MarkupConfig {
            has_pin: true,
            ..MarkupConfig::default()
        },
        Box::new(RecordingBox::new(BOX_SIZE)),
        &adapter,
    );
    markup
        .setup_pin(Vec3::new(800.0, 700.0, 0.0), Vec3::Z, &mut adapter)
        .unwrap();
    let sphere = markup.pin_handles().unwrap().sphere;
    let id = collection.add(markup, &mut adapter);
    collection.get_mut(id).unwrap().deselect();
    collection.redraw(&adapter);

    // The pick reports the sphere marker as the hit node.
    adapter.set_flat_surface(sphere, 0.0);
    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(100.0, 100.0)),
        &mut collection,
        &mut adapter,
    );

    assert_eq!(collection.len(), 1);
    assert!(collection.get(id).unwrap().selected());
}

#[test]
fn late_pick_applies_only_to_the_live_drag() {
    let mut adapter = FakeGeometryAdapter::new();
    let mut collection = MarkupCollection::new();
    let mut controller = controller(CreationMode::Disabled, false);
    let id = add_markup(
        &mut collection,
        &mut adapter,
        Vec3::new(400.0, 400.0, 0.0),
        MarkupConfig {
            box_point: Some(Vec3::new(100.0, 100.0, 0.0)),
            ..MarkupConfig::default()
        },
    );
    collection.redraw(&adapter);

    // Start an anchor drag and capture its token.
    controller.on_pointer_down(
        PointerEvent::primary(Vec2::new(403.0, 398.0)),
        &mut collection,
        &mut adapter,
    );
    let token = controller.drag_token().unwrap();

    adapter.set_flat_surface(9, 3.0);
    let pick = adapter.pick_surface(Vec2::new(450.0, 450.0));
    assert!(controller.apply_resolved_pick(token, pick, &mut collection, &mut adapter));
    assert_eq!(
        collection.get(id).unwrap().anchor_point(),
        Vec3::new(450.0, 450.0, 3.0)
    );

    // After the drag ends the same token is stale and the result is dropped.
    controller.on_pointer_up(PointerEvent::primary(Vec2::new(450.0, 450.0)), &mut collection);
    let late = adapter.pick_surface(Vec2::new(900.0, 100.0));
    assert!(!controller.apply_resolved_pick(token, late, &mut collection, &mut adapter));
    assert_eq!(
        collection.get(id).unwrap().anchor_point(),
        Vec3::new(450.0, 450.0, 3.0)
    );
}
