use ndarray::{s, Array2, Array3};

use super::types::Mask;

/// Erosion passes in the cleanup step
pub const EROSION_PASSES: usize = 1;

/// Dilation passes in the cleanup step; one more than erosion for a net one-pixel growth
pub const DILATION_PASSES: usize = EROSION_PASSES + 1;

/// Mark pixels whose HSV components all fall inside `[lower, upper]`
///
/// Returns 255 for pixels inside the window and 0 otherwise.
pub fn threshold(hsv: &Array3<u8>, lower: &[u8; 3], upper: &[u8; 3]) -> Array2<u8> {
    let (height, width, _) = hsv.dim();
    Array2::from_shape_fn((height, width), |(y, x)| {
        let inside = (0..3).all(|c| {
            let value = hsv[[y, x, c]];
            value >= lower[c] && value <= upper[c]
        });
        if inside {
            255
        } else {
            0
        }
    })
}

/// Rescale a 0/255 binary mask into [0, 1]
pub fn normalize(binary: &Array2<u8>) -> Mask {
    binary.mapv(|v| v as f32 / 255.0)
}

/// Binomial taps used for small kernels instead of sampling the Gaussian
const SMALL_KERNELS: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Normalized 1D Gaussian kernel of odd `size`
///
/// Sizes up to 7 use fixed binomial taps. Larger sizes sample a Gaussian with
/// sigma `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize) -> Vec<f64> {
    if let Some(taps) = SMALL_KERNELS.get(size / 2).filter(|taps| taps.len() == size) {
        return taps.to_vec();
    }

    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f64;

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();

    weights.into_iter().map(|w| w / sum).collect()
}

/// Mirror an out-of-range index back into `0..len` without repeating the edge sample
fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let i = index.rem_euclid(period);
    if i < len as isize {
        i as usize
    } else {
        (period - i) as usize
    }
}

/// Soften mask edges with a separable Gaussian blur of kernel `size`
///
/// Borders are mirrored. The result is clamped to [0, 1].
pub fn feather(mask: &Mask, size: u32) -> Mask {
    let _span = tracing::debug_span!("feather", size).entered();

    let kernel = gaussian_kernel(size as usize);
    let radius = (kernel.len() / 2) as isize;
    let (height, width) = mask.dim();

    let horizontal = Array2::from_shape_fn((height, width), |(y, x)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let sx = reflect_101(x as isize + k as isize - radius, width);
                w * mask[[y, sx]] as f64
            })
            .sum::<f64>()
    });

    Array2::from_shape_fn((height, width), |(y, x)| {
        let value = kernel
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let sy = reflect_101(y as isize + k as isize - radius, height);
                w * horizontal[[sy, x]]
            })
            .sum::<f64>();
        (value as f32).clamp(0.0, 1.0)
    })
}

/// Apply a 3x3 neighborhood reduction; pixels outside the mask are ignored
fn morph_3x3(mask: &Mask, init: f32, pick: fn(f32, f32) -> f32) -> Mask {
    let (height, width) = mask.dim();
    Array2::from_shape_fn((height, width), |(y, x)| {
        let rows = y.saturating_sub(1)..(y + 2).min(height);
        let cols = x.saturating_sub(1)..(x + 2).min(width);
        mask.slice(s![rows, cols])
            .fold(init, |acc, &value| pick(acc, value))
    })
}

/// 3x3 erosion: each pixel becomes its neighborhood minimum
pub fn erode(mask: &Mask) -> Mask {
    morph_3x3(mask, f32::INFINITY, f32::min)
}

/// 3x3 dilation: each pixel becomes its neighborhood maximum
pub fn dilate(mask: &Mask) -> Mask {
    morph_3x3(mask, f32::NEG_INFINITY, f32::max)
}

/// Erode then dilate, removing speckles and growing the background by one pixel
pub fn clean_up(mask: &Mask) -> Mask {
    let _span = tracing::debug_span!("morphology").entered();

    let mut cleaned = mask.clone();
    for _ in 0..EROSION_PASSES {
        cleaned = erode(&cleaned);
    }
    for _ in 0..DILATION_PASSES {
        cleaned = dilate(&cleaned);
    }
    cleaned
}
