mod image_sequence;

pub use image_sequence::{list_images, ImageSequenceCapture};

use anyhow::Result;
use image::RgbImage;

/// Trait for frame sources
pub trait CaptureSource {
    /// Capture the next frame, or `None` once the source is exhausted
    fn capture_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);
}
