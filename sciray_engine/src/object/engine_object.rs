/// EngineObject - uniform contract of cameras, lights, materials and renderers
///
/// An engine object is a thin CPU-side description of one backend object.
/// Setters go through the object's `ModifiedFlag`; `commit()` creates the
/// backend object on first use, pushes every parameter when dirty, then
/// commits it.

use serde_json::Value;
use crate::device::{Device, ObjectHandle, ObjectKind};
use crate::error::Result;
use crate::model::AsAny;
use crate::modified::ModifiedFlag;

// ===== OBJECT STATE =====

/// Backend handle and dirty bit of an engine object.
///
/// Cloning gives a state without handle, in the modified state: the copy
/// gets its own backend object at its first commit.
#[derive(Debug, Default)]
pub struct ObjectState {
    handle: Option<ObjectHandle>,
    flag: ModifiedFlag,
}

impl ObjectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Option<ObjectHandle> {
        self.handle
    }

    pub fn flag(&self) -> &ModifiedFlag {
        &self.flag
    }
}

impl Clone for ObjectState {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Implements `state()` / `state_mut()` for a struct holding an
/// `ObjectState` in a field named `state`.
#[doc(hidden)]
#[macro_export]
macro_rules! object_state_accessors {
    () => {
        fn state(&self) -> &$crate::sciray::object::ObjectState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut $crate::sciray::object::ObjectState {
            &mut self.state
        }
    };
}

// ===== ENGINE OBJECT =====

pub trait EngineObject: AsAny + Send + Sync {
    /// Backend object category
    fn kind(&self) -> ObjectKind;

    /// Backend type name within the category ("perspective", "matte"...)
    fn backend_subtype(&self) -> &'static str;

    fn state(&self) -> &ObjectState;

    fn state_mut(&mut self) -> &mut ObjectState;

    /// Send every parameter to the backend object
    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()>;

    /// JSON schema of the serialized parameters
    fn schema(&self) -> Value;

    fn handle(&self) -> Option<ObjectHandle> {
        self.state().handle
    }

    fn is_modified(&self) -> bool {
        self.state().flag.is_modified()
    }

    fn mark_modified(&self) {
        self.state().flag.mark_modified();
    }

    /// Synchronize with the backend.
    ///
    /// Returns false (and does nothing) if the object is committed and
    /// unchanged.
    fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        if self.state().handle.is_some() && !self.is_modified() {
            return Ok(false);
        }

        let handle = match self.state().handle {
            Some(handle) => handle,
            None => {
                let handle = device.create_object(self.kind(), self.backend_subtype())?;
                self.state_mut().handle = Some(handle);
                handle
            }
        };

        self.push_params(device, handle)?;
        device.commit(handle)?;
        self.state().flag.reset_modified();
        Ok(true)
    }

    /// Release the backend object. The next commit creates a new one.
    fn release(&mut self, device: &mut dyn Device) {
        if let Some(handle) = self.state_mut().handle.take() {
            device.release(handle);
        }
        self.mark_modified();
    }
}
