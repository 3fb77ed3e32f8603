use super::*;
use std::sync::Arc;
use glam::{UVec2, Vec3, Vec4};
use crate::device::mock_device::MockDevice;
use crate::device::{ObjectKind, ParamValue};
use crate::error::Error;
use crate::geometry::{Geometry, ModelBuilder, Sphere};
use crate::log::{DefaultLogger, LogSeverity};
use crate::object::OrthographicCamera;
use crate::object::ProductionRenderer;

fn logger() -> SharedLogger {
    Arc::new(DefaultLogger::with_min_severity(LogSeverity::Error))
}

fn config() -> EngineConfig {
    EngineConfig {
        frame_size: UVec2::new(200, 100),
        max_accumulation_frames: 3,
        ..EngineConfig::default()
    }
}

fn session() -> Session {
    Session::new(&config(), logger()).unwrap()
}

fn add_sphere(session: &mut Session) -> u32 {
    let model = ModelBuilder::new("spheres")
        .geometry(Geometry::spheres(vec![Sphere { center: Vec3::ZERO, radius: 1.0 }]))
        .build();
    session.scene_mut().models_mut().add(model).unwrap().id()
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_new_applies_config() {
    let session = session();
    assert_eq!(session.frame_handler().frame_size(), UVec2::new(200, 100));
    assert_eq!(session.parameters().application().frame_size(), UVec2::new(200, 100));
    assert_eq!(session.camera().aspect_ratio(), 2.0);
    assert_eq!(session.renderer().backend_subtype(), "scivis");
    assert_eq!(session.max_accumulation_frames(), 3);
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = EngineConfig { frame_size: UVec2::new(10, 10), ..EngineConfig::default() };
    assert!(matches!(Session::new(&config, logger()), Err(Error::InvalidArgument(_))));
}

fn progressive_config(max_accumulation_frames: u32) -> EngineConfig {
    EngineConfig {
        frame_size: UVec2::new(256, 256),
        progressive: true,
        progressive_scale: 2,
        max_accumulation_frames,
        ..EngineConfig::default()
    }
}

fn render_all(session: &mut Session, device: &mut MockDevice) -> usize {
    while session.render(device).unwrap().is_some() {}
    device.renders.len()
}

#[test]
fn test_new_progressive_uses_preview_pass() {
    let mut device = MockDevice::new();
    let mut session = Session::new(&progressive_config(3), logger()).unwrap();
    session.commit(&mut device).unwrap();

    let framebuffer = session.frame_handler().handle().unwrap();
    let desc = &device.framebuffer(framebuffer).unwrap().desc;
    assert_eq!((desc.width, desc.height), (128, 128));
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn test_first_commit_creates_pipeline_objects() {
    let mut device = MockDevice::new();
    let mut session = session();
    add_sphere(&mut session);

    assert!(session.commit(&mut device).unwrap());
    assert_eq!(device.count(ObjectKind::World), 1);
    assert_eq!(device.count(ObjectKind::Camera), 1);
    assert_eq!(device.count(ObjectKind::Renderer), 1);
    assert_eq!(device.count(ObjectKind::Framebuffer), 1);
    assert!(!session.parameters().is_modified());
}

#[test]
fn test_commit_without_changes_keeps_accumulation() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.commit(&mut device).unwrap();
    session.render(&mut device).unwrap();

    assert!(!session.commit(&mut device).unwrap());
    assert_eq!(session.frame_handler().accum_frame_count(), 1);
}

#[test]
fn test_camera_change_restarts_accumulation() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.commit(&mut device).unwrap();
    session.render(&mut device).unwrap();
    session.render(&mut device).unwrap();
    let framebuffer = session.frame_handler().handle().unwrap();
    let resets = device.framebuffer(framebuffer).unwrap().resets;

    let mut view = *session.camera().view();
    view.position = Vec3::new(0.0, 0.0, 5.0);
    session.camera_mut().set_view(view);

    assert!(session.commit(&mut device).unwrap());
    assert_eq!(session.frame_handler().accum_frame_count(), 0);
    assert_eq!(session.frame_handler().handle(), Some(framebuffer));
    assert_eq!(device.framebuffer(framebuffer).unwrap().resets, resets + 1);
}

#[test]
fn test_frame_size_parameter_resizes_framebuffer() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.commit(&mut device).unwrap();
    let old = session.frame_handler().handle().unwrap();

    session.parameters_mut().application_mut().set_frame_size(UVec2::new(300, 300)).unwrap();
    assert!(session.commit(&mut device).unwrap());

    let new = session.frame_handler().handle().unwrap();
    assert_ne!(old, new);
    assert!(device.released.contains(&old));
    assert_eq!(device.framebuffer(new).unwrap().desc.width, 300);
    assert_eq!(session.camera().aspect_ratio(), 1.0);
    let camera = session.camera().handle().unwrap();
    assert_eq!(device.param(camera, "aspect"), Some(&ParamValue::Float(1.0)));
}

#[test]
fn test_model_change_restarts_accumulation() {
    let mut device = MockDevice::new();
    let mut session = session();
    let id = add_sphere(&mut session);
    session.commit(&mut device).unwrap();
    session.render(&mut device).unwrap();

    session.scene_mut().models_mut().get_model_instance_mut(id).unwrap().set_visible(false);
    assert!(session.commit(&mut device).unwrap());
    assert_eq!(session.frame_handler().accum_frame_count(), 0);
}

#[test]
fn test_set_renderer_releases_previous() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.commit(&mut device).unwrap();
    let previous = session.renderer().handle().unwrap();

    let mut renderer = ProductionRenderer::default();
    renderer.set_background_color(Vec4::ONE);
    session.set_renderer(Box::new(renderer));
    assert!(session.commit(&mut device).unwrap());

    assert!(device.released.contains(&previous));
    assert_eq!(device.count(ObjectKind::Renderer), 1);
    let handle = session.renderer().handle().unwrap();
    assert_eq!(device.object(handle).unwrap().subtype, "pathtracer");
}

#[test]
fn test_set_camera_before_first_commit() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.set_camera(Box::new(OrthographicCamera::default()));
    session.commit(&mut device).unwrap();
    assert_eq!(device.count(ObjectKind::Camera), 1);
    assert_eq!(session.camera().backend_subtype(), "orthographic");
}

// ============================================================================
// Render
// ============================================================================

#[test]
fn test_render_before_commit_fails() {
    let mut device = MockDevice::new();
    let mut session = session();
    assert!(matches!(session.render(&mut device), Err(Error::BackendError(_))));
    assert!(device.renders.is_empty());
}

#[test]
fn test_render_stops_at_max_accumulation() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.commit(&mut device).unwrap();

    for _ in 0..3 {
        assert!(session.render(&mut device).unwrap().is_some());
    }
    assert!(!session.needs_render());
    assert!(session.render(&mut device).unwrap().is_none());
    assert_eq!(device.renders.len(), 3);
    assert_eq!(session.frame_handler().accum_frame_count(), 3);
}

#[test]
fn test_progressive_single_frame_reaches_full_resolution() {
    let mut device = MockDevice::new();
    let mut session = Session::new(&progressive_config(1), logger()).unwrap();
    session.commit(&mut device).unwrap();

    // Preview, then one full-resolution pass
    assert_eq!(render_all(&mut session, &mut device), 2);
    assert_ne!(device.renders[0].framebuffer, device.renders[1].framebuffer);
    assert!(!session.frame_handler().is_showing_preview());

    let image = session.image(&mut device).unwrap();
    assert_eq!((image.width(), image.height()), (256, 256));
}

#[test]
fn test_progressive_limit_counts_full_resolution_passes() {
    let mut device = MockDevice::new();
    let mut session = Session::new(&progressive_config(3), logger()).unwrap();
    session.commit(&mut device).unwrap();

    assert_eq!(render_all(&mut session, &mut device), 4);
    assert_eq!(session.frame_handler().accum_frame_count(), 3);
    let full = session.frame_handler().handle();
    assert!(device.renders[1..].iter().all(|request| Some(request.framebuffer) == full));

    // A change restarts the cycle with a new preview
    session.camera_mut().set_aspect_ratio(1.5).unwrap();
    session.commit(&mut device).unwrap();
    assert!(session.frame_handler().is_showing_preview());
    assert_eq!(render_all(&mut session, &mut device), 8);
}

#[test]
fn test_set_max_accumulation_frames_rejects_zero() {
    let mut session = session();
    assert!(matches!(session.set_max_accumulation_frames(0), Err(Error::InvalidArgument(_))));
    assert_eq!(session.max_accumulation_frames(), 3);
    session.set_max_accumulation_frames(5).unwrap();
    assert_eq!(session.max_accumulation_frames(), 5);
}

#[test]
fn test_new_rejects_zero_max_accumulation_frames() {
    let config = EngineConfig { max_accumulation_frames: 0, ..config() };
    assert!(matches!(Session::new(&config, logger()), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_render_without_accumulation_never_stops() {
    let config = EngineConfig { accumulation: false, ..config() };
    let mut device = MockDevice::new();
    let mut session = Session::new(&config, logger()).unwrap();
    session.commit(&mut device).unwrap();

    for _ in 0..5 {
        assert!(session.render(&mut device).unwrap().is_some());
    }
    assert_eq!(device.renders.len(), 5);
}

#[test]
fn test_render_request_targets_session_objects() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.commit(&mut device).unwrap();
    session.render(&mut device).unwrap();

    let request = device.renders[0];
    assert_eq!(Some(request.framebuffer), session.frame_handler().handle());
    assert_eq!(Some(request.camera), session.camera().handle());
    assert_eq!(Some(request.renderer), session.renderer().handle());
    assert_eq!(Some(request.world), session.scene().world());
}

#[test]
fn test_image_has_frame_size() {
    let mut device = MockDevice::new();
    let mut session = session();
    session.commit(&mut device).unwrap();
    session.render(&mut device).unwrap();

    let image = session.image(&mut device).unwrap();
    assert_eq!((image.width(), image.height()), (200, 100));
    // Mock rows are bottom-up: top row holds the last row index
    assert_eq!(image.row(0)[0], 99);
}

// ============================================================================
// Release
// ============================================================================

#[test]
fn test_release_frees_every_backend_object() {
    let mut device = MockDevice::new();
    let mut session = session();
    add_sphere(&mut session);
    session.commit(&mut device).unwrap();
    assert!(device.live_object_count() > 0);

    session.release(&mut device).unwrap();
    assert_eq!(device.live_object_count(), 0);
}
