use image::RgbImage;
use ndarray::Array3;

use super::types::{Frame, KeyError, KeyResult, Mask};

/// Mask level below which a pixel is left untouched by spill suppression
pub const SPILL_MASK_THRESHOLD: f32 = 0.05;

fn ensure_mask_fits(frame: &Frame, mask: &Mask) -> KeyResult<()> {
    let (width, height) = frame.dimensions();
    if mask.dim() != (height as usize, width as usize) {
        return Err(KeyError::invalid_input(format!(
            "mask is {}x{} but frame is {}x{}",
            mask.ncols(),
            mask.nrows(),
            width,
            height
        )));
    }
    Ok(())
}

/// Pull green spill toward the red/blue average
///
/// Only pixels where green exceeds the red/blue average and the mask is above
/// [`SPILL_MASK_THRESHOLD`] are changed:
/// `green = avg_rb * strength + green * (1 - strength)`.
///
/// Returns the frame as `f32` samples shaped (height, width, 3), R, G, B.
pub fn suppress_spill(frame: &Frame, mask: &Mask, strength: f32) -> KeyResult<Array3<f32>> {
    let _span = tracing::debug_span!("spill", strength).entered();
    ensure_mask_fits(frame, mask)?;

    let (width, height) = frame.dimensions();
    let mut output = Array3::<f32>::zeros((height as usize, width as usize, 3));

    for (x, y, pixel) in frame.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let red = pixel[0] as f32;
        let mut green = pixel[1] as f32;
        let blue = pixel[2] as f32;

        let red_blue = (red + blue) / 2.0;
        if green > red_blue && mask[[y, x]] > SPILL_MASK_THRESHOLD {
            green = red_blue * strength + green * (1.0 - strength);
        }

        output[[y, x, 0]] = red;
        output[[y, x, 1]] = green;
        output[[y, x, 2]] = blue;
    }

    Ok(output)
}

/// Alpha-blend a decontaminated frame over a background
///
/// `out = foreground * (1 - mask) + background * mask`, rounded to the
/// nearest 8-bit value.
pub fn blend(foreground: &Array3<f32>, background: &RgbImage, mask: &Mask) -> KeyResult<RgbImage> {
    let _span = tracing::debug_span!("blend").entered();
    ensure_mask_fits(background, mask)?;

    let (height, width, _) = foreground.dim();
    if mask.dim() != (height, width) {
        return Err(KeyError::invalid_input(format!(
            "foreground is {}x{} but mask is {}x{}",
            width,
            height,
            mask.ncols(),
            mask.nrows()
        )));
    }

    Ok(RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (xi, yi) = (x as usize, y as usize);
        let alpha = mask[[yi, xi]];
        let bg = background.get_pixel(x, y);

        let mut out = [0u8; 3];
        for (c, sample) in out.iter_mut().enumerate() {
            let value = foreground[[yi, xi, c]] * (1.0 - alpha) + bg[c] as f32 * alpha;
            *sample = value.round().clamp(0.0, 255.0) as u8;
        }
        image::Rgb(out)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn single_pixel(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(1, 1, image::Rgb(rgb))
    }

    #[test]
    fn test_spill_applies_blend_formula() {
        let frame = single_pixel([100, 200, 60]);
        let mask = Array2::from_elem((1, 1), 0.5);
        let out = suppress_spill(&frame, &mask, 0.7).unwrap();

        // avg_rb = 80, 80 * 0.7 + 200 * 0.3 = 116
        assert!((out[[0, 0, 1]] - 116.0).abs() < 1e-4);
        assert_eq!(out[[0, 0, 0]], 100.0);
        assert_eq!(out[[0, 0, 2]], 60.0);
    }

    #[test]
    fn test_spill_skips_low_mask() {
        let frame = single_pixel([100, 200, 60]);
        let mask = Array2::from_elem((1, 1), SPILL_MASK_THRESHOLD);
        let out = suppress_spill(&frame, &mask, 1.0).unwrap();
        assert_eq!(out[[0, 0, 1]], 200.0);
    }

    #[test]
    fn test_spill_skips_pixels_without_green_excess() {
        let frame = single_pixel([200, 150, 100]);
        let mask = Array2::from_elem((1, 1), 1.0);
        let out = suppress_spill(&frame, &mask, 1.0).unwrap();
        assert_eq!(out[[0, 0, 1]], 150.0);
    }

    #[test]
    fn test_spill_rejects_mismatched_mask() {
        let frame = RgbImage::new(2, 2);
        let mask = Array2::zeros((2, 3));
        assert!(suppress_spill(&frame, &mask, 0.5).is_err());
    }

    #[test]
    fn test_blend_endpoints_and_midpoint() {
        let foreground = Array3::from_shape_vec((1, 3, 3), vec![
            10.0, 20.0, 30.0, //
            10.0, 20.0, 30.0, //
            0.0, 0.0, 0.0,
        ])
        .unwrap();
        let background = RgbImage::from_fn(3, 1, |x, _| {
            if x == 2 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([110, 120, 130])
            }
        });
        let mask = Array2::from_shape_vec((1, 3), vec![0.0, 1.0, 0.5]).unwrap();

        let out = blend(&foreground, &background, &mask).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(out.get_pixel(1, 0).0, [110, 120, 130]);
        assert_eq!(out.get_pixel(2, 0).0, [128, 128, 128]);
    }
}
