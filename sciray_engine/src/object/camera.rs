/// Cameras - perspective and orthographic projection of the scene
///
/// Every camera shares a `CameraView` (position, target, up) and an aspect
/// ratio kept in sync with the frame size by the session.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::device::{Device, ObjectHandle, ObjectKind, ParamValue};
use crate::engine_err;
use crate::error::Result;
use crate::modified::ApproxEq;
use crate::object::engine_object::{EngineObject, ObjectState};
use crate::object::schema;

// ===== VIEW =====

/// Camera placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraView {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl CameraView {
    /// Normalized viewing direction
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    fn schema() -> Value {
        schema::nested("Camera placement", vec![
            ("position", schema::vector("Camera position", 3)),
            ("target", schema::vector("Point looked at", 3)),
            ("up", schema::vector("Up vector", 3)),
        ])
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl ApproxEq for CameraView {
    fn approx_eq(&self, other: &Self) -> bool {
        self.position.approx_eq(&other.position)
            && self.target.approx_eq(&other.target)
            && self.up.approx_eq(&other.up)
    }
}

// ===== CAMERA TRAIT =====

pub trait Camera: EngineObject {
    fn view(&self) -> &CameraView;

    fn set_view(&mut self, view: CameraView);

    fn aspect_ratio(&self) -> f32;

    /// Fails with InvalidArgument unless `ratio > 0`
    fn set_aspect_ratio(&mut self, ratio: f32) -> Result<()>;
}

fn check_aspect_ratio(ratio: f32) -> Result<()> {
    if ratio <= 0.0 || !ratio.is_finite() {
        return Err(engine_err!("sciray::Camera", InvalidArgument =>
            "Aspect ratio must be positive, got {}", ratio));
    }
    Ok(())
}

fn push_view(device: &mut dyn Device, handle: ObjectHandle, view: &CameraView, aspect_ratio: f32) -> Result<()> {
    device.set_param(handle, "position", ParamValue::Vec3(view.position))?;
    device.set_param(handle, "direction", ParamValue::Vec3(view.direction()))?;
    device.set_param(handle, "up", ParamValue::Vec3(view.up))?;
    device.set_param(handle, "aspect", ParamValue::Float(aspect_ratio))?;
    Ok(())
}

macro_rules! impl_camera {
    ($camera:ty) => {
        impl Camera for $camera {
            fn view(&self) -> &CameraView {
                &self.view
            }

            fn set_view(&mut self, view: CameraView) {
                self.state.flag().update(&mut self.view, view);
            }

            fn aspect_ratio(&self) -> f32 {
                self.aspect_ratio
            }

            fn set_aspect_ratio(&mut self, ratio: f32) -> Result<()> {
                check_aspect_ratio(ratio)?;
                self.state.flag().update(&mut self.aspect_ratio, ratio);
                Ok(())
            }
        }
    };
}

// ===== PERSPECTIVE =====

/// Pinhole camera with optional depth of field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveCamera {
    view: CameraView,
    aspect_ratio: f32,
    /// Vertical field of view in degrees
    fovy: f32,
    aperture_radius: f32,
    focus_distance: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl PerspectiveCamera {
    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    /// Fails with InvalidArgument outside ]0, 180[
    pub fn set_fovy(&mut self, fovy: f32) -> Result<()> {
        if fovy <= 0.0 || fovy >= 180.0 {
            return Err(engine_err!("sciray::PerspectiveCamera", InvalidArgument =>
                "Field of view must be in ]0, 180[, got {}", fovy));
        }
        self.state.flag().update(&mut self.fovy, fovy);
        Ok(())
    }

    pub fn aperture_radius(&self) -> f32 {
        self.aperture_radius
    }

    pub fn set_aperture_radius(&mut self, radius: f32) {
        self.state.flag().update(&mut self.aperture_radius, radius.max(0.0));
    }

    pub fn focus_distance(&self) -> f32 {
        self.focus_distance
    }

    pub fn set_focus_distance(&mut self, distance: f32) {
        self.state.flag().update(&mut self.focus_distance, distance);
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            view: CameraView::default(),
            aspect_ratio: 1.0,
            fovy: 45.0,
            aperture_radius: 0.0,
            focus_distance: 1.0,
            state: ObjectState::new(),
        }
    }
}

impl EngineObject for PerspectiveCamera {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Camera
    }

    fn backend_subtype(&self) -> &'static str {
        "perspective"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        push_view(device, handle, &self.view, self.aspect_ratio)?;
        device.set_param(handle, "fovy", ParamValue::Float(self.fovy))?;
        device.set_param(handle, "apertureRadius", ParamValue::Float(self.aperture_radius))?;
        device.set_param(handle, "focusDistance", ParamValue::Float(self.focus_distance))?;
        Ok(())
    }

    fn schema(&self) -> Value {
        schema::object("perspective", "Perspective camera", vec![
            ("view", CameraView::schema()),
            ("aspect_ratio", schema::number_above("Width / height", 0.0)),
            ("fovy", schema::number_above("Vertical field of view in degrees", 0.0)),
            ("aperture_radius", schema::number_min("Lens aperture radius", 0.0)),
            ("focus_distance", schema::number("Distance of the focal plane")),
        ])
    }
}

impl_camera!(PerspectiveCamera);

// ===== ORTHOGRAPHIC =====

/// Parallel projection camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrthographicCamera {
    view: CameraView,
    aspect_ratio: f32,
    /// Height of the viewing volume in world units
    height: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl OrthographicCamera {
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Fails with InvalidArgument unless `height > 0`
    pub fn set_height(&mut self, height: f32) -> Result<()> {
        if height <= 0.0 {
            return Err(engine_err!("sciray::OrthographicCamera", InvalidArgument =>
                "Height must be positive, got {}", height));
        }
        self.state.flag().update(&mut self.height, height);
        Ok(())
    }
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            view: CameraView::default(),
            aspect_ratio: 1.0,
            height: 1.0,
            state: ObjectState::new(),
        }
    }
}

impl EngineObject for OrthographicCamera {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Camera
    }

    fn backend_subtype(&self) -> &'static str {
        "orthographic"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        push_view(device, handle, &self.view, self.aspect_ratio)?;
        device.set_param(handle, "height", ParamValue::Float(self.height))?;
        Ok(())
    }

    fn schema(&self) -> Value {
        schema::object("orthographic", "Orthographic camera", vec![
            ("view", CameraView::schema()),
            ("aspect_ratio", schema::number_above("Width / height", 0.0)),
            ("height", schema::number_above("Height of the viewing volume", 0.0)),
        ])
    }
}

impl_camera!(OrthographicCamera);
