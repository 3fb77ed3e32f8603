/// CpuDevice - `Device` implementation running on the CPU
///
/// Every object keeps two parameter tables: `pending` receives `set_param`
/// and `remove_param`, `committed` is what rendering reads. `commit()`
/// copies the former into the latter.

use std::time::Instant;
use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use sciray_engine::sciray::device::{
    Device, FramebufferChannels, FramebufferDesc, ObjectHandle, ObjectKind, ParamValue,
    RenderRequest, RenderTask,
};
use sciray_engine::sciray::Result;
use sciray_engine::{engine_bail, engine_debug, engine_err, engine_info};

use crate::cpu_framebuffer::CpuFramebuffer;
use crate::raytracer::{halton, CameraRig, Primitive, Projection, RenderScene, Shape};

// ===== OBJECTS =====

struct CpuObject {
    kind: ObjectKind,
    subtype: String,
    pending: FxHashMap<String, ParamValue>,
    committed: FxHashMap<String, ParamValue>,
}

impl CpuObject {
    fn param(&self, name: &str) -> Option<&ParamValue> {
        self.committed.get(name)
    }

    fn float(&self, name: &str, default: f32) -> f32 {
        match self.param(name) {
            Some(ParamValue::Float(value)) => *value,
            _ => default,
        }
    }

    fn vec3(&self, name: &str, default: Vec3) -> Vec3 {
        match self.param(name) {
            Some(ParamValue::Vec3(value)) => *value,
            _ => default,
        }
    }

    fn handles(&self, name: &str) -> Vec<ObjectHandle> {
        match self.param(name) {
            Some(ParamValue::ObjectList(handles)) => handles.clone(),
            Some(ParamValue::Object(handle)) => vec![*handle],
            _ => Vec::new(),
        }
    }
}

/// Object and work counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Live objects, framebuffers included
    pub objects: usize,
    pub framebuffers: usize,
    /// Render passes since creation
    pub renders: u64,
}

// ===== DEVICE =====

#[derive(Default)]
pub struct CpuDevice {
    objects: SlotMap<ObjectHandle, CpuObject>,
    framebuffers: FxHashMap<ObjectHandle, CpuFramebuffer>,
    renders: u64,
}

impl CpuDevice {
    pub fn new() -> Self {
        engine_info!("sciray::cpu", "CPU device created");
        Self::default()
    }

    pub fn stats(&self) -> DeviceStats {
        DeviceStats {
            objects: self.objects.len(),
            framebuffers: self.framebuffers.len(),
            renders: self.renders,
        }
    }

    /// Accumulated passes of a framebuffer
    pub fn accumulated_frames(&self, framebuffer: ObjectHandle) -> Option<u32> {
        self.framebuffers.get(&framebuffer).map(CpuFramebuffer::frames)
    }

    /// Size of a framebuffer
    pub fn framebuffer_size(&self, framebuffer: ObjectHandle) -> Option<UVec2> {
        self.framebuffers.get(&framebuffer)
            .map(|framebuffer| UVec2::new(framebuffer.desc().width, framebuffer.desc().height))
    }

    fn object(&self, handle: ObjectHandle) -> Result<&CpuObject> {
        self.objects.get(handle)
            .ok_or_else(|| engine_err!("sciray::cpu", NotFound => "Unknown object handle {:?}", handle))
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Result<&mut CpuObject> {
        self.objects.get_mut(handle)
            .ok_or_else(|| engine_err!("sciray::cpu", NotFound => "Unknown object handle {:?}", handle))
    }

    fn object_of_kind(&self, handle: ObjectHandle, kind: ObjectKind) -> Result<&CpuObject> {
        let object = self.object(handle)?;
        if object.kind != kind {
            engine_bail!("sciray::cpu", InvalidArgument => "Object {:?} is a {:?}, expected a {:?}", handle, object.kind, kind);
        }
        Ok(object)
    }

    fn framebuffer_mut(&mut self, handle: ObjectHandle) -> Result<&mut CpuFramebuffer> {
        self.framebuffers.get_mut(&handle)
            .ok_or_else(|| engine_err!("sciray::cpu", NotFound => "Unknown framebuffer handle {:?}", handle))
    }

    // ===== SCENE SNAPSHOT =====

    fn camera_rig(&self, handle: ObjectHandle) -> Result<CameraRig> {
        let camera = self.object_of_kind(handle, ObjectKind::Camera)?;
        let projection = match camera.subtype.as_str() {
            "perspective" => Projection::Perspective { fovy: camera.float("fovy", 60.0) },
            "orthographic" => Projection::Orthographic { height: camera.float("height", 1.0) },
            other => engine_bail!("sciray::cpu", "Unsupported camera type '{}'", other),
        };
        Ok(CameraRig {
            position: camera.vec3("position", Vec3::ZERO),
            direction: camera.vec3("direction", Vec3::NEG_Z),
            up: camera.vec3("up", Vec3::Y),
            aspect: camera.float("aspect", 1.0),
            projection,
        })
    }

    fn snapshot(&self, request: &RenderRequest) -> Result<RenderScene> {
        let camera = self.camera_rig(request.camera)?;
        let renderer = self.object_of_kind(request.renderer, ObjectKind::Renderer)?;
        let background = match renderer.param("backgroundColor") {
            Some(ParamValue::Vec4(color)) => *color,
            _ => Vec4::ZERO,
        };

        let world = self.object_of_kind(request.world, ObjectKind::World)?;
        let mut primitives = Vec::new();
        for instance in world.handles("instance") {
            let instance = self.object_of_kind(instance, ObjectKind::Instance)?;
            let transform = match instance.param("transform") {
                Some(ParamValue::Mat4(matrix)) => *matrix,
                _ => Mat4::IDENTITY,
            };
            for group in instance.handles("group") {
                let group = self.object_of_kind(group, ObjectKind::Group)?;
                for model in group.handles("geometry") {
                    self.collect_model(model, &transform, &mut primitives)?;
                }
            }
        }

        Ok(RenderScene { camera, background, primitives })
    }

    fn collect_model(&self, handle: ObjectHandle, transform: &Mat4, primitives: &mut Vec<Primitive>) -> Result<()> {
        let model = self.object_of_kind(handle, ObjectKind::GeometricModel)?;
        let Some(geometry) = model.handles("geometry").first().copied() else {
            return Ok(());
        };
        let geometry = self.object_of_kind(geometry, ObjectKind::Geometry)?;

        for (index, shape) in local_shapes(geometry) {
            let color = match model.param("color") {
                Some(ParamValue::Vec4(color)) => *color,
                Some(ParamValue::Vec4Array(colors)) => colors.get(index).copied().unwrap_or(Vec4::ONE),
                _ => Vec4::ONE,
            };
            primitives.push(Primitive { shape: shape.transformed(transform), color });
        }
        Ok(())
    }
}

/// Shapes of a geometry in its local space, with their primitive index.
///
/// Empty for untraced types; triangles with out-of-range indices are skipped.
fn local_shapes(geometry: &CpuObject) -> Vec<(usize, Shape)> {
    match geometry.subtype.as_str() {
        "sphere" => match (geometry.param("sphere.position"), geometry.param("sphere.radius")) {
            (Some(ParamValue::Vec3Array(centers)), Some(ParamValue::FloatArray(radii))) => centers.iter()
                .zip(radii)
                .map(|(center, radius)| Shape::Sphere { center: *center, radius: *radius })
                .enumerate()
                .collect(),
            _ => Vec::new(),
        },
        "box" => match geometry.param("box") {
            Some(ParamValue::Vec3Array(corners)) => corners.chunks_exact(2)
                .map(|corners| Shape::Box { min: corners[0], max: corners[1] })
                .enumerate()
                .collect(),
            _ => Vec::new(),
        },
        "mesh" => match (geometry.param("vertex.position"), geometry.param("index")) {
            (Some(ParamValue::Vec3Array(positions)), Some(ParamValue::UIntArray(indices))) => indices.chunks_exact(3)
                .enumerate()
                .filter_map(|(index, triangle)| Some((index, Shape::Triangle {
                    a: *positions.get(triangle[0] as usize)?,
                    b: *positions.get(triangle[1] as usize)?,
                    c: *positions.get(triangle[2] as usize)?,
                })))
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

impl Device for CpuDevice {
    fn create_object(&mut self, kind: ObjectKind, subtype: &str) -> Result<ObjectHandle> {
        Ok(self.objects.insert(CpuObject {
            kind,
            subtype: subtype.to_string(),
            pending: FxHashMap::default(),
            committed: FxHashMap::default(),
        }))
    }

    fn set_param(&mut self, handle: ObjectHandle, name: &str, value: ParamValue) -> Result<()> {
        self.object_mut(handle)?.pending.insert(name.to_string(), value);
        Ok(())
    }

    fn remove_param(&mut self, handle: ObjectHandle, name: &str) -> Result<()> {
        self.object_mut(handle)?.pending.remove(name);
        Ok(())
    }

    fn commit(&mut self, handle: ObjectHandle) -> Result<()> {
        let object = self.object_mut(handle)?;
        object.committed = object.pending.clone();
        Ok(())
    }

    fn release(&mut self, handle: ObjectHandle) {
        if self.objects.remove(handle).is_some() {
            self.framebuffers.remove(&handle);
        }
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<ObjectHandle> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("sciray::cpu", InvalidArgument => "Empty framebuffer {}x{}", desc.width, desc.height);
        }
        let mut tone_mapping = false;
        for operation in &desc.operations {
            let operation = self.object_of_kind(*operation, ObjectKind::ImageOperation)?;
            match operation.subtype.as_str() {
                "tonemapper" => tone_mapping = true,
                other => engine_bail!("sciray::cpu", "Unsupported image operation '{}'", other),
            }
        }

        let handle = self.create_object(ObjectKind::Framebuffer, "framebuffer")?;
        self.framebuffers.insert(handle, CpuFramebuffer::new(desc.clone(), tone_mapping));
        engine_debug!("sciray::cpu", "Framebuffer {}x{} {:?} created", desc.width, desc.height, desc.format);
        Ok(handle)
    }

    fn reset_accumulation(&mut self, framebuffer: ObjectHandle) -> Result<()> {
        self.framebuffer_mut(framebuffer)?.reset();
        Ok(())
    }

    fn render(&mut self, request: &RenderRequest) -> Result<RenderTask> {
        let start = Instant::now();
        let scene = self.snapshot(request)?;
        let framebuffer = self.framebuffer_mut(request.framebuffer)?;
        if framebuffer.mapped {
            engine_bail!("sciray::cpu", "Cannot render into a mapped framebuffer");
        }

        let width = framebuffer.desc().width;
        let height = framebuffer.desc().height;
        let pass = framebuffer.frames() + 1;
        let jitter = Vec2::new(halton(pass, 2), halton(pass, 3));

        let pixels = width as usize * height as usize;
        let mut colors = Vec::with_capacity(pixels);
        let mut depth = Vec::with_capacity(pixels);
        for y in 0..height {
            for x in 0..width {
                let uv = (Vec2::new(x as f32, y as f32) + jitter) / Vec2::new(width as f32, height as f32);
                let sample = scene.trace(uv);
                colors.push(sample.color);
                depth.push(sample.depth);
            }
        }
        framebuffer.add_pass(&colors, &depth);
        self.renders += 1;

        Ok(RenderTask::new(start.elapsed(), 1.0))
    }

    fn map(&mut self, framebuffer: ObjectHandle, channel: FramebufferChannels) -> Result<Vec<u8>> {
        let framebuffer = self.framebuffer_mut(framebuffer)?;
        if framebuffer.mapped {
            engine_bail!("sciray::cpu", "Framebuffer already mapped");
        }

        let data = if channel == FramebufferChannels::COLOR {
            framebuffer.color_bytes()
        } else if channel == FramebufferChannels::DEPTH {
            framebuffer.depth_bytes()
                .ok_or_else(|| engine_err!("sciray::cpu", InvalidArgument => "Framebuffer has no depth channel"))?
        } else {
            engine_bail!("sciray::cpu", InvalidArgument => "Cannot map channel {:?}", channel);
        };
        framebuffer.mapped = true;
        Ok(data)
    }

    fn unmap(&mut self, framebuffer: ObjectHandle) -> Result<()> {
        self.framebuffer_mut(framebuffer)?.mapped = false;
        Ok(())
    }

    fn load_module(&mut self, name: &str) -> Result<()> {
        Err(engine_err!("sciray::cpu", NotFound => "Module '{}' is not available on the CPU device", name))
    }
}

#[cfg(test)]
#[path = "cpu_device_tests.rs"]
mod tests;
