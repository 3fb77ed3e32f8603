/// Mock Device for unit tests (no backend required)
///
/// Records every object, parameter, commit and render so that tests can
/// check which backend work the core actually performed.

use std::time::Duration;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::device::{
    Device, FramebufferChannels, FramebufferDesc, ObjectHandle, ObjectKind, ParamValue,
    RenderRequest, RenderTask,
};
use crate::error::Result;
use crate::engine_bail;

// ============================================================================
// Mock objects
// ============================================================================

#[derive(Debug)]
pub struct MockObject {
    pub kind: ObjectKind,
    pub subtype: String,
    pub params: FxHashMap<String, ParamValue>,
    pub commit_count: u32,
}

#[derive(Debug)]
pub struct MockFramebuffer {
    pub desc: FramebufferDesc,
    pub frames: u32,
    pub resets: u32,
    pub mapped: bool,
}

// ============================================================================
// Mock Device
// ============================================================================

#[derive(Debug, Default)]
pub struct MockDevice {
    objects: SlotMap<ObjectHandle, MockObject>,
    framebuffers: FxHashMap<ObjectHandle, MockFramebuffer>,
    pub released: Vec<ObjectHandle>,
    pub renders: Vec<RenderRequest>,
    pub loaded_modules: Vec<String>,
    /// Module names `load_module()` accepts
    pub available_modules: Vec<String>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&MockObject> {
        self.objects.get(handle)
    }

    pub fn param(&self, handle: ObjectHandle, name: &str) -> Option<&ParamValue> {
        self.objects.get(handle).and_then(|object| object.params.get(name))
    }

    pub fn commit_count(&self, handle: ObjectHandle) -> u32 {
        self.objects.get(handle).map_or(0, |object| object.commit_count)
    }

    /// Number of live objects of a kind
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.values().filter(|object| object.kind == kind).count()
    }

    pub fn live_object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn framebuffer(&self, handle: ObjectHandle) -> Option<&MockFramebuffer> {
        self.framebuffers.get(&handle)
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Result<&mut MockObject> {
        match self.objects.get_mut(handle) {
            Some(object) => Ok(object),
            None => engine_bail!("sciray::mock", "Unknown object handle {:?}", handle),
        }
    }

    fn framebuffer_mut(&mut self, handle: ObjectHandle) -> Result<&mut MockFramebuffer> {
        match self.framebuffers.get_mut(&handle) {
            Some(framebuffer) => Ok(framebuffer),
            None => engine_bail!("sciray::mock", "Unknown framebuffer handle {:?}", handle),
        }
    }
}

impl Device for MockDevice {
    fn create_object(&mut self, kind: ObjectKind, subtype: &str) -> Result<ObjectHandle> {
        Ok(self.objects.insert(MockObject {
            kind,
            subtype: subtype.to_string(),
            params: FxHashMap::default(),
            commit_count: 0,
        }))
    }

    fn set_param(&mut self, handle: ObjectHandle, name: &str, value: ParamValue) -> Result<()> {
        self.object_mut(handle)?.params.insert(name.to_string(), value);
        Ok(())
    }

    fn remove_param(&mut self, handle: ObjectHandle, name: &str) -> Result<()> {
        self.object_mut(handle)?.params.remove(name);
        Ok(())
    }

    fn commit(&mut self, handle: ObjectHandle) -> Result<()> {
        self.object_mut(handle)?.commit_count += 1;
        Ok(())
    }

    fn release(&mut self, handle: ObjectHandle) {
        if self.objects.remove(handle).is_some() {
            self.framebuffers.remove(&handle);
            self.released.push(handle);
        }
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<ObjectHandle> {
        let handle = self.create_object(ObjectKind::Framebuffer, "framebuffer")?;
        self.framebuffers.insert(handle, MockFramebuffer {
            desc: desc.clone(),
            frames: 0,
            resets: 0,
            mapped: false,
        });
        Ok(handle)
    }

    fn reset_accumulation(&mut self, framebuffer: ObjectHandle) -> Result<()> {
        let framebuffer = self.framebuffer_mut(framebuffer)?;
        framebuffer.frames = 0;
        framebuffer.resets += 1;
        Ok(())
    }

    fn render(&mut self, request: &RenderRequest) -> Result<RenderTask> {
        self.framebuffer_mut(request.framebuffer)?.frames += 1;
        self.renders.push(*request);
        Ok(RenderTask::new(Duration::from_millis(1), 1.0))
    }

    /// Returns a buffer whose every byte of row `y` equals `y` (bottom-up rows)
    fn map(&mut self, framebuffer: ObjectHandle, channel: FramebufferChannels) -> Result<Vec<u8>> {
        if channel != FramebufferChannels::COLOR {
            engine_bail!("sciray::mock", "Only the color channel can be mapped");
        }
        let framebuffer = self.framebuffer_mut(framebuffer)?;
        if framebuffer.mapped {
            engine_bail!("sciray::mock", "Framebuffer already mapped");
        }
        framebuffer.mapped = true;

        let row_size = framebuffer.desc.width as usize * framebuffer.desc.format.pixel_size();
        let mut data = Vec::with_capacity(row_size * framebuffer.desc.height as usize);
        for y in 0..framebuffer.desc.height {
            data.extend(std::iter::repeat((y % 256) as u8).take(row_size));
        }
        Ok(data)
    }

    fn unmap(&mut self, framebuffer: ObjectHandle) -> Result<()> {
        self.framebuffer_mut(framebuffer)?.mapped = false;
        Ok(())
    }

    fn load_module(&mut self, name: &str) -> Result<()> {
        if !self.available_modules.iter().any(|module| module == name) {
            engine_bail!("sciray::mock", "Module '{}' not available", name);
        }
        self.loaded_modules.push(name.to_string());
        Ok(())
    }
}
