pub mod frame_handler;
pub mod static_frame_handler;
pub mod progressive_frame_handler;
pub mod image;

pub use frame_handler::{FrameHandler, MIN_FRAME_SIZE, check_frame_size};
pub use static_frame_handler::StaticFrameHandler;
pub use progressive_frame_handler::{ProgressiveFrameHandler, DEFAULT_PROGRESSIVE_SCALE};
pub use image::Image;
