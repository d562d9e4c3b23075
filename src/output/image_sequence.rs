use super::OutputSink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Writes composited frames as numbered PNG files
pub struct ImageSequenceOutput {
    dir: PathBuf,
    written: u64,
    width: u32,
    height: u32,
}

impl ImageSequenceOutput {
    pub fn new<P: AsRef<Path>>(dir: P, width: u32, height: u32) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        tracing::info!("Writing frames to {}", dir.display());

        Ok(Self {
            dir,
            written: 0,
            width,
            height,
        })
    }

    /// Path of the n-th frame, counting from 1
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", index))
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }
}

impl OutputSink for ImageSequenceOutput {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self.frame_path(self.written + 1);
        frame
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
