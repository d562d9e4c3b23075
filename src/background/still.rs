use super::{fit, BackgroundSource};
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;

/// Still image background, resized once per output size
pub struct StillBackground {
    original: RgbImage,
    resized: Option<RgbImage>,
}

impl StillBackground {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading background image {}", path.display());

        let original = image::open(path)
            .with_context(|| format!("Failed to load background from {}", path.display()))?
            .to_rgb8();

        Ok(Self::from_image(original))
    }

    pub fn from_image(original: RgbImage) -> Self {
        Self {
            original,
            resized: None,
        }
    }
}

impl BackgroundSource for StillBackground {
    fn next_frame(&mut self, width: u32, height: u32) -> RgbImage {
        match &self.resized {
            Some(resized) if resized.dimensions() == (width, height) => resized.clone(),
            _ => {
                tracing::debug!("Resizing background to {}x{}", width, height);
                let resized = fit(self.original.clone(), width, height);
                self.resized = Some(resized.clone());
                resized
            }
        }
    }
}
