/// Session - the per-frame commit/render pipeline
///
/// A session owns everything needed to produce an image: parameters, scene,
/// camera, renderer and frame handler. One frame is:
///
/// 1. mutate parameters / models / engine objects
/// 2. `commit()`: parameters, model updates, scene, camera, renderer,
///    framebuffer; accumulation restarts if anything changed
/// 3. `render()`: one pass into the current framebuffer
/// 4. `image()`: readback
///
/// Reading back before a completed render gives stale pixels; nothing
/// checks it.

use crate::config::{check_max_accumulation_frames, EngineConfig};
use crate::device::{Device, RenderRequest, RenderTask};
use crate::engine_err;
use crate::engine_trace;
use crate::error::Result;
use crate::framebuffer::{FrameHandler, Image, ProgressiveFrameHandler, StaticFrameHandler};
use crate::log::SharedLogger;
use crate::modified::BaseObject;
use crate::object::{Camera, EngineObject, InteractiveRenderer, PerspectiveCamera, Renderer};
use crate::parameters::ParametersManager;
use crate::scene::Scene;

pub struct Session {
    parameters: ParametersManager,
    scene: Scene,
    camera: Box<dyn Camera>,
    renderer: Box<dyn Renderer>,
    frame_handler: Box<dyn FrameHandler>,
    /// Replaced objects waiting for release at the next commit
    retired_cameras: Vec<Box<dyn Camera>>,
    retired_renderers: Vec<Box<dyn Renderer>>,
    max_accumulation_frames: u32,
    logger: SharedLogger,
}

impl Session {
    /// Build a session from a validated config
    pub fn new(config: &EngineConfig, logger: SharedLogger) -> Result<Self> {
        config.validate()?;

        let mut frame_handler: Box<dyn FrameHandler> = if config.progressive {
            Box::new(ProgressiveFrameHandler::with_scale(config.progressive_scale, logger.clone())?)
        } else {
            Box::new(StaticFrameHandler::new(logger.clone()))
        };
        frame_handler.set_frame_size(config.frame_size)?;
        frame_handler.set_format(config.pixel_format);
        frame_handler.set_accumulation(config.accumulation);

        let mut parameters = ParametersManager::new();
        parameters.application_mut().set_frame_size(config.frame_size)?;

        let mut camera = PerspectiveCamera::default();
        camera.set_aspect_ratio(config.frame_size.x as f32 / config.frame_size.y as f32)?;

        Ok(Self {
            parameters,
            scene: Scene::new(logger.clone()),
            camera: Box::new(camera),
            renderer: Box::new(InteractiveRenderer::default()),
            frame_handler,
            retired_cameras: Vec::new(),
            retired_renderers: Vec::new(),
            max_accumulation_frames: config.max_accumulation_frames,
            logger,
        })
    }

    // ===== ACCESSORS =====

    pub fn parameters(&self) -> &ParametersManager {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParametersManager {
        &mut self.parameters
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &dyn Camera {
        &*self.camera
    }

    pub fn camera_mut(&mut self) -> &mut dyn Camera {
        &mut *self.camera
    }

    /// Replace the camera. The previous backend object is released at the
    /// next commit.
    pub fn set_camera(&mut self, camera: Box<dyn Camera>) {
        let previous = std::mem::replace(&mut self.camera, camera);
        self.retired_cameras.push(previous);
    }

    pub fn renderer(&self) -> &dyn Renderer {
        &*self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        &mut *self.renderer
    }

    /// Replace the renderer. The previous backend object is released at the
    /// next commit.
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        let previous = std::mem::replace(&mut self.renderer, renderer);
        self.retired_renderers.push(previous);
    }

    pub fn frame_handler(&self) -> &dyn FrameHandler {
        &*self.frame_handler
    }

    pub fn frame_handler_mut(&mut self) -> &mut dyn FrameHandler {
        &mut *self.frame_handler
    }

    pub fn max_accumulation_frames(&self) -> u32 {
        self.max_accumulation_frames
    }

    /// Fails with InvalidArgument for 0
    pub fn set_max_accumulation_frames(&mut self, frames: u32) -> Result<()> {
        check_max_accumulation_frames(frames)?;
        self.max_accumulation_frames = frames;
        Ok(())
    }

    // ===== PIPELINE =====

    /// Synchronize every pending change with the backend.
    ///
    /// # Returns
    ///
    /// true if anything affecting the image changed (accumulation was
    /// restarted)
    pub fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        let mut changed = self.parameters.is_modified();

        if self.parameters.application().is_modified() {
            let size = self.parameters.application().frame_size();
            self.frame_handler.set_frame_size(size)?;
            self.camera.set_aspect_ratio(size.x as f32 / size.y as f32)?;
        }
        self.scene.update(&self.parameters)?;
        self.parameters.reset_modified();

        changed |= self.scene.commit(device)?;

        changed |= self.release_retired(device);
        changed |= self.camera.commit(device)?;
        changed |= self.renderer.commit(device)?;

        // A recreated framebuffer starts with no accumulated pass
        let recreated = self.frame_handler.commit(device)?;
        if changed && !recreated {
            self.frame_handler.clear(device)?;
        }
        changed |= recreated;

        if changed {
            engine_trace!(self.logger, "sciray::Session", "Accumulation restarted");
        }
        Ok(changed)
    }

    /// Whether another pass would still refine the image.
    ///
    /// Only full-resolution passes count towards `max_accumulation_frames`:
    /// a progressive preview is always followed by at least one full pass.
    pub fn needs_render(&self) -> bool {
        !self.frame_handler.is_accumulating()
            || self.frame_handler.is_showing_preview()
            || self.frame_handler.accum_frame_count() < self.max_accumulation_frames
    }

    /// Render one pass into the current framebuffer.
    ///
    /// Returns None without rendering once `max_accumulation_frames`
    /// full-resolution passes were accumulated. Fails if the session was never committed.
    pub fn render(&mut self, device: &mut dyn Device) -> Result<Option<RenderTask>> {
        if !self.needs_render() {
            return Ok(None);
        }

        let request = RenderRequest {
            framebuffer: self.frame_handler.handle()
                .ok_or_else(|| engine_err!("sciray::Session", "Render before commit: no framebuffer"))?,
            renderer: self.renderer.handle()
                .ok_or_else(|| engine_err!("sciray::Session", "Render before commit: no renderer"))?,
            camera: self.camera.handle()
                .ok_or_else(|| engine_err!("sciray::Session", "Render before commit: no camera"))?,
            world: self.scene.world()
                .ok_or_else(|| engine_err!("sciray::Session", "Render before commit: no world"))?,
        };

        let task = device.render(&request)?;
        self.frame_handler.increment_accum_frames();
        Ok(Some(task))
    }

    /// Read back the current image
    pub fn image(&mut self, device: &mut dyn Device) -> Result<Image> {
        self.frame_handler.image(device)
    }

    /// Release every backend object owned by the session
    pub fn release(&mut self, device: &mut dyn Device) -> Result<()> {
        self.scene.release(device)?;
        self.release_retired(device);
        self.camera.release(device);
        self.renderer.release(device);
        self.frame_handler.release(device);
        Ok(())
    }
}

impl Session {
    fn release_retired(&mut self, device: &mut dyn Device) -> bool {
        let released = !self.retired_cameras.is_empty() || !self.retired_renderers.is_empty();
        for mut camera in self.retired_cameras.drain(..) {
            camera.release(device);
        }
        for mut renderer in self.retired_renderers.drain(..) {
            renderer.release(device);
        }
        released
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instances", &self.scene.models().instance_count())
            .field("camera", &self.camera.backend_subtype())
            .field("renderer", &self.renderer.backend_subtype())
            .field("frame_size", &self.frame_handler.frame_size())
            .field("accum_frames", &self.frame_handler.accum_frame_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
