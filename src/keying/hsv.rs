use image::RgbImage;
use ndarray::Array3;

use super::types::{Frame, Mask};

/// Largest hue value in the 8-bit convention (degrees / 2)
pub const MAX_HUE: u8 = 179;

/// HSV sample: hue 0..=179, saturation and value 0..=255
pub type Hsv = [u8; 3];

/// Convert one 8-bit RGB sample to HSV
///
/// Value is the channel maximum, saturation is `255 * (max - min) / max`
/// and hue is the angle on the color wheel halved to fit in a byte.
/// Achromatic pixels get hue 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let saturation = if max == 0 {
        0.0
    } else {
        255.0 * delta / max as f32
    };

    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let mut hue = if max == min {
        0.0
    } else if max == r {
        60.0 * (gf - bf) / delta
    } else if max == g {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    // 359.x degrees rounds to 180, which is hue 0 again
    let hue = (hue / 2.0).round() as u32 % (MAX_HUE as u32 + 1);

    [hue as u8, saturation.round() as u8, max]
}

/// Convert a frame to an HSV array shaped (height, width, 3)
pub fn frame_to_hsv(frame: &Frame) -> Array3<u8> {
    let _span = tracing::debug_span!("rgb_to_hsv").entered();

    let (width, height) = frame.dimensions();
    let mut hsv = Array3::<u8>::zeros((height as usize, width as usize, 3));

    for (x, y, pixel) in frame.enumerate_pixels() {
        let sample = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
        for (c, value) in sample.iter().enumerate() {
            hsv[[y as usize, x as usize, c]] = *value;
        }
    }

    hsv
}

/// Convert a mask to a grayscale RGB image for visualization
/// Background renders white, foreground black
pub fn mask_to_rgb(mask: &Mask) -> RgbImage {
    let (height, width) = mask.dim();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let value = (mask[[y as usize, x as usize]] * 255.0).clamp(0.0, 255.0) as u8;
        image::Rgb([value, value, value])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
    }

    #[test]
    fn test_achromatic() {
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(128, 128, 128), [0, 0, 128]);
        assert_eq!(rgb_to_hsv(255, 255, 255), [0, 0, 255]);
    }

    #[test]
    fn test_mixed_colors() {
        // Yellow: 60 degrees
        assert_eq!(rgb_to_hsv(255, 255, 0), [30, 255, 255]);
        // Dull green: half saturation
        assert_eq!(rgb_to_hsv(100, 200, 100), [60, 128, 200]);
        // Near-red magenta side wraps to 0 instead of 180
        assert_eq!(rgb_to_hsv(255, 0, 1)[0], 0);
    }

    #[test]
    fn test_hue_stays_in_range() {
        for r in (0..=255).step_by(15) {
            for g in (0..=255).step_by(15) {
                for b in (0..=255).step_by(15) {
                    let hsv = rgb_to_hsv(r as u8, g as u8, b as u8);
                    assert!(hsv[0] <= MAX_HUE, "hue {} for ({}, {}, {})", hsv[0], r, g, b);
                }
            }
        }
    }

    #[test]
    fn test_frame_to_hsv_layout() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        let hsv = frame_to_hsv(&frame);
        assert_eq!(hsv.dim(), (1, 2, 3));
        assert_eq!(hsv[[0, 0, 2]], 0);
        assert_eq!(hsv[[0, 1, 0]], 60);
    }

    #[test]
    fn test_mask_to_rgb() {
        let mut mask = Array2::<f32>::zeros((2, 3));
        mask[[1, 2]] = 1.0;
        let image = mask_to_rgb(&mask);
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
