use super::CaptureSource;
use anyhow::{bail, Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// List image files in `dir`, sorted by file name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_image {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

/// Frame source reading a single image or a directory of numbered images
pub struct ImageSequenceCapture {
    frames: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
}

impl ImageSequenceCapture {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Opening frame source {}", path.display());

        let frames = if path.is_dir() {
            list_images(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let Some(first) = frames.first() else {
            bail!("No images found in {}", path.display());
        };

        // Resolution of the whole sequence is fixed by its first frame
        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("Failed to read {}", first.display()))?;

        tracing::info!(
            "Frame source ready: {} frame(s) at {}x{}",
            frames.len(),
            width,
            height
        );

        Ok(Self {
            frames,
            next: 0,
            width,
            height,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl CaptureSource for ImageSequenceCapture {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.frames.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let frame = image::open(path)
            .with_context(|| format!("Failed to decode frame {}", path.display()))?
            .to_rgb8();

        let frame = if frame.dimensions() != (self.width, self.height) {
            tracing::debug!(
                "Resizing {} from {:?} to {}x{}",
                path.display(),
                frame.dimensions(),
                self.width,
                self.height
            );
            image::imageops::resize(
                &frame,
                self.width,
                self.height,
                image::imageops::FilterType::Lanczos3,
            )
        } else {
            frame
        };

        Ok(Some(frame))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
