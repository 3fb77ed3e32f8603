/*!
# Sciray Engine

Core of a scientific-visualization ray-tracing server.

Scientific data (spheres, capsules, meshes, per-frame reports...) is held in
entity-component `Model`s, instanced into a `Scene`, and synchronized each
frame with an opaque ray-tracing backend through the `Device` trait. Backend
implementations (e.g. `sciray_device_cpu`) live in their own crates.

## Architecture

- **Model / Components / Systems**: data of a model and the behavior attached to it
- **ModelManager / SceneClipManager**: id-indexed instances of shared models
- **Engine objects**: cameras, lights, materials and renderers, built by name through factories
- **FrameHandler**: static or progressive framebuffers with accumulation
- **Session**: the per-frame commit / render / readback pipeline
- **Engine**: process-wide device, config and logger
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod modified;
pub mod utils;
pub mod device;
pub mod math;
pub mod model;
pub mod object;
pub mod framebuffer;
pub mod geometry;
pub mod parameters;
pub mod scene;
pub mod session;
pub mod loader;

// Main sciray namespace module
pub mod sciray {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton and its configuration
    pub use crate::engine::Engine;
    pub use crate::config::EngineConfig;

    // Dirty tracking
    pub use crate::modified::{ApproxEq, BaseObject, ModifiedFlag};

    // Per-frame pipeline
    pub use crate::scene::Scene;
    pub use crate::session::Session;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{emit, DefaultLogger, LogEntry, LogSeverity, Logger, SharedLogger};
    }

    // Backend boundary
    pub mod device {
        pub use crate::device::*;
    }

    pub mod math {
        pub use crate::math::*;
    }

    // Models, components and systems
    pub mod model {
        pub use crate::model::*;
    }

    // Cameras, lights, materials, renderers and factories
    pub mod object {
        pub use crate::object::*;
    }

    pub mod framebuffer {
        pub use crate::framebuffer::*;
    }

    // Stock geometry components and systems
    pub mod geometry {
        pub use crate::geometry::*;
    }

    pub mod parameters {
        pub use crate::parameters::*;
    }

    pub mod loader {
        pub use crate::loader::*;
    }

    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
