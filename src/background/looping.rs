use super::{fit, BackgroundSource};
use crate::capture::list_images;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Image-sequence background that restarts from the first frame when exhausted
///
/// A frame that cannot be decoded triggers a rewind; if the first frame also
/// fails, a black frame is returned for that call.
pub struct LoopingBackground {
    frames: Vec<PathBuf>,
    next: usize,
}

impl LoopingBackground {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let frames = match list_images(dir) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!("Could not list background frames: {:#}", e);
                Vec::new()
            }
        };

        tracing::info!(
            "Looping background {} with {} frame(s)",
            dir.display(),
            frames.len()
        );

        Self { frames, next: 0 }
    }

    fn read_next(&mut self) -> Option<RgbImage> {
        let path = self.frames.get(self.next)?;
        self.next += 1;

        match image::open(path) {
            Ok(image) => Some(image.to_rgb8()),
            Err(e) => {
                tracing::debug!("Failed to decode {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl BackgroundSource for LoopingBackground {
    fn next_frame(&mut self, width: u32, height: u32) -> RgbImage {
        let frame = self.read_next().or_else(|| {
            self.next = 0;
            self.read_next()
        });

        match frame {
            Some(frame) => fit(frame, width, height),
            None => {
                tracing::warn!("Could not read background video frame. Using black background.");
                RgbImage::new(width, height)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn first_pixel(background: &mut LoopingBackground) -> [u8; 3] {
        background.next_frame(2, 2).get_pixel(0, 0).0
    }

    #[test]
    fn test_loops_on_exhaustion() {
        let dir = fresh_dir("greenkey_test_looping");
        RgbImage::from_pixel(2, 2, Rgb([1, 0, 0])).save(dir.join("0001.png")).unwrap();
        RgbImage::from_pixel(2, 2, Rgb([2, 0, 0])).save(dir.join("0002.png")).unwrap();

        let mut background = LoopingBackground::new(&dir);
        assert_eq!(first_pixel(&mut background), [1, 0, 0]);
        assert_eq!(first_pixel(&mut background), [2, 0, 0]);
        assert_eq!(first_pixel(&mut background), [1, 0, 0]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unreadable_frame_rewinds() {
        let dir = fresh_dir("greenkey_test_looping_corrupt");
        RgbImage::from_pixel(2, 2, Rgb([7, 0, 0])).save(dir.join("a.png")).unwrap();
        std::fs::write(dir.join("b.png"), b"not a png").unwrap();

        let mut background = LoopingBackground::new(&dir);
        assert_eq!(first_pixel(&mut background), [7, 0, 0]);
        assert_eq!(first_pixel(&mut background), [7, 0, 0]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_total_failure_gives_black() {
        let dir = fresh_dir("greenkey_test_looping_broken");
        std::fs::write(dir.join("a.png"), b"garbage").unwrap();

        let mut background = LoopingBackground::new(&dir);
        let frame = background.next_frame(3, 2);
        assert_eq!(frame, RgbImage::new(3, 2));

        let empty = fresh_dir("greenkey_test_looping_empty");
        let mut background = LoopingBackground::new(&empty);
        assert_eq!(background.next_frame(1, 1), RgbImage::new(1, 1));

        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::remove_dir_all(&empty).unwrap();
    }
}
