use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::FRAC_PI_4;

use scroll_viewer::catalog::{AssetCatalog, AssetDescriptor, AssetScale};
use scroll_viewer::controls::{ControlEvent, ControlKey, ControlValue};
use scroll_viewer::input::ViewerInput;
use scroll_viewer::lifecycle::{LifecycleStatus, LoadOutcome};
use scroll_viewer::loaders::decode_request;
use scroll_viewer::playback::GateTransition;
use scroll_viewer::session::{ViewerSession, VIEWER_GROUP};
use scroll_viewer::traits::SceneGraph;

const ANIMATED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/animated_lid.gltf");
const STATIC: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/static_cube.gltf");
const VIEWPORT: f32 = 600.0;
const EPS: f32 = 1e-4;

fn catalog() -> AssetCatalog {
    AssetCatalog::new(vec![
        AssetDescriptor::new("Phoenix", ANIMATED, AssetScale::Uniform(1.0), [0.0; 3]),
        AssetDescriptor::new("Box", STATIC, AssetScale::Uniform(1.0), [0.0, 0.5, 0.0]),
        AssetDescriptor::new("Broken", "tests/fixtures/missing.gltf", AssetScale::Uniform(1.0), [0.0; 3]),
    ])
    .unwrap()
}

fn loaded(id: &str) -> ViewerSession {
    let mut session = ViewerSession::new(catalog(), VIEWPORT, 4.0);
    let request = session.select_model(id).unwrap();
    let outcome = session.on_load_complete(decode_request(&request));
    assert!(matches!(outcome, LoadOutcome::Attached { .. }), "{:?}", outcome);
    session
}

fn target_rotation_x(session: &ViewerSession) -> f32 {
    let handle = session.lifecycle().current().unwrap().target_mesh.unwrap();
    let node = session.scene().node(handle).unwrap();
    node.local.rotation.to_euler(EulerRot::XYZ).0
}

#[test]
fn test_animated_model_attaches_with_clip_and_target() {
    let mut session = ViewerSession::new(catalog(), VIEWPORT, 4.0);
    let request = session.select_model("Phoenix").unwrap();
    assert_eq!(session.status(), LifecycleStatus::Loading { id: "Phoenix".into() });

    let outcome = session.on_load_complete(decode_request(&request));
    assert!(matches!(
        outcome,
        LoadOutcome::Attached {
            has_clip: true,
            has_target_mesh: true,
            ..
        }
    ));

    let model = session.lifecycle().current().unwrap();
    assert_eq!(model.clip().unwrap().name, "Take 001");
    assert_eq!(model.clip_duration(), Some(4.0));
    assert_eq!(session.status(), LifecycleStatus::Ready { id: "Phoenix".into() });
}

#[test]
fn test_half_scroll_poses_clip_and_rotation() {
    let mut session = loaded("Phoenix");
    assert_eq!(session.set_playback_enabled(true), GateTransition::Enabled);

    session.scroll_to(session.scroll().max_extent() / 2.0);

    assert!((session.animation_time() - 2.0).abs() < EPS);
    assert!((session.mesh_rotation_x() + FRAC_PI_4).abs() < EPS);
    assert!((target_rotation_x(&session) + FRAC_PI_4).abs() < 1e-3);

    let lid = session.lifecycle().current().unwrap().nodes[0];
    let lid_rotation = session.scene().node(lid).unwrap().local.rotation;
    assert!(lid_rotation.angle_between(Quat::from_rotation_y(FRAC_PI_4)) < 1e-3);
}

#[test]
fn test_disabling_rewinds_time_and_rotation() {
    let mut session = loaded("Phoenix");
    session.set_playback_enabled(true);
    session.scroll_to(session.scroll().max_extent());
    assert!((session.animation_time() - 4.0).abs() < EPS);

    assert_eq!(session.set_playback_enabled(false), GateTransition::Disabled);
    assert_eq!(session.animation_time(), 0.0);
    assert_eq!(session.mesh_rotation_x(), 0.0);
    assert!(target_rotation_x(&session).abs() < EPS);
    assert_eq!(session.gate().time_fraction(), 0.0);
}

#[test]
fn test_scroll_ignored_while_disabled() {
    let mut session = loaded("Phoenix");

    for offset in [100.0, 900.0, 1800.0, 0.0, 1200.0] {
        session.scroll_to(offset);
        assert_eq!(session.animation_time(), 0.0);
        assert_eq!(session.mesh_rotation_x(), 0.0);
    }
    assert!(target_rotation_x(&session).abs() < EPS);
    // the mapper still tracks progress for the overlay
    assert!((session.scroll_outputs().fraction - 1200.0 / 1800.0).abs() < EPS);
}

#[test]
fn test_enabling_applies_current_scroll() {
    let mut session = loaded("Phoenix");
    session.scroll_to(session.scroll().max_extent() / 4.0);
    assert_eq!(session.animation_time(), 0.0);

    session.set_playback_enabled(true);
    assert!((session.animation_time() - 1.0).abs() < EPS);
    assert_eq!(session.set_playback_enabled(true), GateTransition::Unchanged);
}

#[test]
fn test_model_without_clip_is_inert() {
    let mut session = loaded("Box");
    assert!(session.lifecycle().current().unwrap().clip().is_none());

    session.set_playback_enabled(true);
    session.scroll_to(session.scroll().max_extent());
    assert_eq!(session.animation_time(), 0.0);
    assert_eq!(session.mesh_rotation_x(), 0.0);
}

#[test]
fn test_switch_mid_load_keeps_one_model() {
    let mut session = ViewerSession::new(catalog(), VIEWPORT, 4.0);
    let phoenix = session.select_model("Phoenix").unwrap();
    let cube = session.select_model("Box").unwrap();
    assert!(cube.generation > phoenix.generation);

    let late = session.on_load_complete(decode_request(&phoenix));
    assert!(matches!(late, LoadOutcome::Stale { .. }));
    assert_eq!(session.scene().attached_roots(), 0);

    let outcome = session.on_load_complete(decode_request(&cube));
    assert!(matches!(outcome, LoadOutcome::Attached { .. }));
    assert_eq!(session.scene().attached_roots(), 1);
    assert_eq!(session.status(), LifecycleStatus::Ready { id: "Box".into() });
}

#[test]
fn test_switch_after_load_detaches_previous() {
    let mut session = loaded("Phoenix");
    session.set_playback_enabled(true);
    session.scroll_to(900.0);

    let request = session.select_model("Box").unwrap();
    assert_eq!(session.scene().attached_roots(), 0);
    assert!(!session.gate().is_enabled());
    assert_eq!(session.animation_time(), 0.0);
    assert!(session.panel().group("Phoenix").is_none());

    session.on_load_complete(decode_request(&request));
    assert_eq!(session.scene().attached_roots(), 1);
    assert!(session.panel().group("Box").is_some());
}

#[test]
fn test_unknown_model_is_a_no_op() {
    let mut session = loaded("Phoenix");
    let generation = session.lifecycle().generation();

    assert!(session.select_model("Dragon").is_err());
    assert_eq!(session.lifecycle().generation(), generation);
    assert_eq!(session.scene().attached_roots(), 1);
    assert_eq!(session.status(), LifecycleStatus::Ready { id: "Phoenix".into() });
}

#[test]
fn test_failed_load_reports_status() {
    let mut session = ViewerSession::new(catalog(), VIEWPORT, 4.0);
    let request = session.select_model("Broken").unwrap();
    let outcome = session.on_load_complete(decode_request(&request));

    assert!(matches!(outcome, LoadOutcome::Failed { .. }));
    assert_eq!(session.scene().attached_roots(), 0);
    assert!(matches!(session.status(), LifecycleStatus::Failed { id, .. } if id == "Broken"));
}

#[test]
fn test_panel_groups_follow_model() {
    let session = loaded("Phoenix");

    let viewer = session.panel().group(VIEWER_GROUP).unwrap();
    match &viewer.get(ControlKey::Model).unwrap().value {
        ControlValue::Choice { selected, options } => {
            assert_eq!(selected, "Phoenix");
            assert_eq!(options.len(), 3);
        }
        other => panic!("unexpected control {:?}", other),
    }

    let group = session.panel().group("Phoenix").unwrap();
    assert_eq!(
        group.get(ControlKey::ScrollPlayback).unwrap().value,
        ControlValue::Toggle(false)
    );
    assert!(group.get(ControlKey::Scale).is_some());
}

#[test]
fn test_control_events_route_to_session() {
    let mut session = loaded("Phoenix");

    assert!(session
        .handle_control(ControlEvent::Toggled(ControlKey::ScrollPlayback, true))
        .is_none());
    assert!(session.gate().is_enabled());

    session.handle_control(ControlEvent::Slid(ControlKey::Scale, 2.0));
    assert_eq!(session.scale_factor(), 2.0);
    let root = session.lifecycle().current().unwrap().root;
    assert_eq!(session.scene().node(root).unwrap().local.scale, Vec3::splat(2.0));

    let request = session.handle_control(ControlEvent::Chose(ControlKey::Model, "Box".into()));
    assert_eq!(request.unwrap().descriptor.id, "Box");
    assert!(session
        .handle_control(ControlEvent::Chose(ControlKey::Model, "Dragon".into()))
        .is_none());
}

#[test]
fn test_keyboard_navigation_drives_playback() {
    let mut session = loaded("Phoenix");
    session.set_playback_enabled(true);

    session.apply_input(ViewerInput::ScrollToEnd);
    assert!((session.animation_time() - 4.0).abs() < EPS);

    session.apply_input(ViewerInput::ScrollPages(-1.0));
    assert!((session.scroll().offset() - 1200.0).abs() < EPS);

    session.apply_input(ViewerInput::ScrollToStart);
    assert_eq!(session.animation_time(), 0.0);
}

#[test]
fn test_resize_that_clamps_offset_reapplies() {
    let mut session = loaded("Phoenix");
    session.set_playback_enabled(true);
    session.scroll_to(session.scroll().max_extent());

    session.on_resize(300.0);
    assert_eq!(session.scroll().max_extent(), 900.0);
    assert_eq!(session.scroll().offset(), 900.0);
    assert!((session.animation_time() - 4.0).abs() < EPS);

    session.set_page_length(1.0);
    session.on_frame(1.0 / 60.0);
    assert_eq!(session.scroll().max_extent(), 0.0);
    assert_eq!(session.scroll_outputs().fraction, 0.0);
    assert_eq!(session.animation_time(), 0.0);
    assert_eq!(session.mesh_rotation_x(), 0.0);
}

#[test]
fn test_shorter_page_reposes_clip() {
    let mut session = loaded("Phoenix");
    session.set_playback_enabled(true);
    session.scroll_to(session.scroll().max_extent());
    assert!((session.animation_time() - 4.0).abs() < EPS);

    // 4 pages -> 2 pages: extent 1800 -> 600, offset clamps to the new end
    session.set_page_length(2.0);
    assert_eq!(session.scroll().offset(), 600.0);
    assert!((session.animation_time() - 4.0).abs() < EPS);

    session.set_page_length(1.0);
    assert_eq!(session.animation_time(), 0.0);
    assert_eq!(session.mesh_rotation_x(), 0.0);
    assert!(target_rotation_x(&session).abs() < EPS);
}

#[test]
fn test_minimised_window_keeps_scroll_position() {
    let mut session = loaded("Phoenix");
    session.set_playback_enabled(true);
    session.scroll_to(session.scroll().max_extent() / 2.0);
    let offset = session.scroll().offset();

    session.on_resize(0.0);
    assert_eq!(session.scroll().offset(), offset);
    assert!((session.animation_time() - 2.0).abs() < EPS);

    session.on_resize(VIEWPORT);
    assert_eq!(session.scroll().offset(), offset);
    assert!((session.animation_time() - 2.0).abs() < EPS);
    assert!((session.mesh_rotation_x() + FRAC_PI_4).abs() < EPS);
}

#[test]
fn test_playback_key_toggles_gate() {
    let mut session = ViewerSession::new(catalog(), VIEWPORT, 4.0);
    session.apply_input(ViewerInput::TogglePlayback);
    assert!(!session.gate().is_enabled());

    let mut session = loaded("Phoenix");
    session.scroll_to(session.scroll().max_extent() / 2.0);
    assert_eq!(session.animation_time(), 0.0);

    session.apply_input(ViewerInput::TogglePlayback);
    assert!(session.gate().is_enabled());
    assert!((session.animation_time() - 2.0).abs() < EPS);
    assert_eq!(
        session.panel().find(ControlKey::ScrollPlayback).unwrap().value,
        ControlValue::Toggle(true)
    );

    session.apply_input(ViewerInput::TogglePlayback);
    assert!(!session.gate().is_enabled());
    assert_eq!(session.animation_time(), 0.0);
}

#[test]
fn test_reselecting_failed_model_retries() {
    let mut session = ViewerSession::new(catalog(), VIEWPORT, 4.0);
    let request = session.select_model("Broken").unwrap();
    session.on_load_complete(decode_request(&request));
    assert!(matches!(session.status(), LifecycleStatus::Failed { .. }));

    let retry = session.handle_control(ControlEvent::Chose(ControlKey::Model, "Broken".into()));
    assert_eq!(retry.unwrap().descriptor.id, "Broken");
    assert_eq!(session.status(), LifecycleStatus::Loading { id: "Broken".into() });
}

#[test]
fn test_reselecting_shown_model_is_ignored() {
    let mut session = loaded("Phoenix");
    let generation = session.lifecycle().generation();

    assert!(session
        .handle_control(ControlEvent::Chose(ControlKey::Model, "Phoenix".into()))
        .is_none());
    assert_eq!(session.lifecycle().generation(), generation);
    assert_eq!(session.status(), LifecycleStatus::Ready { id: "Phoenix".into() });

    session.select_model("Box").unwrap();
    assert!(session
        .handle_control(ControlEvent::Chose(ControlKey::Model, "Box".into()))
        .is_none());
}
