/*!
# Sciray Engine - CPU Device Backend

Reference implementation of the `Device` trait of `sciray_engine`, running
entirely on the CPU.

Objects and their parameters are stored in a slot map; parameters only take
effect at commit, like on a real backend. Rendering is a small ray caster
(spheres, boxes and triangle meshes, headlight shading) accumulating one
jittered sample per pixel and per pass, which is enough to drive the whole
commit / render / readback pipeline with real pixels.
*/

mod cpu_device;
mod cpu_framebuffer;
mod raytracer;

pub use cpu_device::{CpuDevice, DeviceStats};
