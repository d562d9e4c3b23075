mod looping;
mod still;

pub use looping::LoopingBackground;
pub use still::StillBackground;

use image::RgbImage;
use std::path::Path;

/// Trait for replacement backgrounds
///
/// Sources never fail: when nothing can be decoded they hand out black frames.
pub trait BackgroundSource {
    /// Produce the background for the next frame at the given size
    fn next_frame(&mut self, width: u32, height: u32) -> RgbImage;
}

/// All-black background
pub struct BlackBackground;

impl BackgroundSource for BlackBackground {
    fn next_frame(&mut self, width: u32, height: u32) -> RgbImage {
        RgbImage::new(width, height)
    }
}

/// Open a background: a directory loops as a sequence, a file is a still,
/// no path (or an unreadable still) gives black
pub fn open_background(path: Option<&Path>) -> Box<dyn BackgroundSource> {
    let Some(path) = path else {
        tracing::info!("No background given, using black");
        return Box::new(BlackBackground);
    };

    if path.is_dir() {
        return Box::new(LoopingBackground::new(path));
    }

    match StillBackground::new(path) {
        Ok(still) => Box::new(still),
        Err(e) => {
            tracing::warn!("Could not load background image: {:#}. Using black background.", e);
            Box::new(BlackBackground)
        }
    }
}

/// Resize `image` to `width` x `height` unless it already matches
fn fit(image: RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        image
    } else {
        image::imageops::resize(
            &image,
            width,
            height,
            image::imageops::FilterType::Lanczos3,
        )
    }
}
