use image::RgbImage;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::hsv::MAX_HUE;

/// 8-bit color frame, channels stored as R, G, B
pub type Frame = RgbImage;

/// Background mask: 1.0 = fully background, 0.0 = fully foreground
/// Shape is (height, width) of the frame it was computed from
pub type Mask = Array2<f32>;

/// Errors raised by the keying core
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl KeyError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}

pub type KeyResult<T> = Result<T, KeyError>;

/// Largest accepted feather kernel size
pub const MAX_FEATHER_RADIUS: u32 = 255;

/// Chroma key configuration
///
/// Bounds are inclusive HSV triples. Hue is linear on 0..=179 (degrees / 2),
/// saturation and value span 0..=255. Hue wraparound is not handled, so a key
/// color straddling red cannot be expressed as a single window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyParameters {
    pub lower_bound: [u8; 3],
    pub upper_bound: [u8; 3],
    /// Gaussian kernel size used to feather the mask (positive, odd, at most
    /// [`MAX_FEATHER_RADIUS`])
    pub feather_radius: u32,
    /// Green decontamination strength in [0, 1]
    pub spill_suppression: f32,
}

impl Default for KeyParameters {
    fn default() -> Self {
        Self {
            lower_bound: [40, 100, 50],
            upper_bound: [80, 255, 255],
            feather_radius: 15,
            spill_suppression: 0.7,
        }
    }
}

impl KeyParameters {
    pub fn validate(&self) -> KeyResult<()> {
        if self.feather_radius == 0 || self.feather_radius % 2 == 0 {
            return Err(KeyError::invalid_input(format!(
                "feather radius must be a positive odd integer, got {}",
                self.feather_radius
            )));
        }

        if self.feather_radius > MAX_FEATHER_RADIUS {
            return Err(KeyError::invalid_input(format!(
                "feather radius {} exceeds {}",
                self.feather_radius, MAX_FEATHER_RADIUS
            )));
        }

        if !self.spill_suppression.is_finite() || !(0.0..=1.0).contains(&self.spill_suppression) {
            return Err(KeyError::invalid_input(format!(
                "spill suppression must lie in [0, 1], got {}",
                self.spill_suppression
            )));
        }

        for (channel, (lower, upper)) in ["hue", "saturation", "value"]
            .iter()
            .zip(self.lower_bound.iter().zip(self.upper_bound.iter()))
        {
            if lower > upper {
                return Err(KeyError::invalid_input(format!(
                    "{} lower bound {} exceeds upper bound {}",
                    channel, lower, upper
                )));
            }
        }

        if self.upper_bound[0] > MAX_HUE {
            return Err(KeyError::invalid_input(format!(
                "hue upper bound {} exceeds {}",
                self.upper_bound[0], MAX_HUE
            )));
        }

        Ok(())
    }
}

/// Trait for mask producers
/// Keeps the compositing loop independent of how the background is detected
pub trait MaskGenerator {
    /// Compute a background mask for a frame
    ///
    /// # Returns
    /// * Mask with values 0.0-1.0, shaped (height, width)
    fn mask(&self, frame: &Frame) -> KeyResult<Mask>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(KeyParameters::default().validate().is_ok());
    }

    #[test]
    fn test_even_feather_radius_rejected() {
        let params = KeyParameters {
            feather_radius: 4,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(KeyError::InvalidInput { .. })
        ));

        let params = KeyParameters {
            feather_radius: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_oversized_feather_radius_rejected() {
        let params = KeyParameters {
            feather_radius: MAX_FEATHER_RADIUS,
            ..Default::default()
        };
        assert!(params.validate().is_ok());

        for feather_radius in [MAX_FEATHER_RADIUS + 2, u32::MAX] {
            let params = KeyParameters {
                feather_radius,
                ..Default::default()
            };
            let err = params.validate().unwrap_err();
            assert!(matches!(err, KeyError::InvalidInput { .. }));
            assert!(err.to_string().contains("exceeds"));
        }
    }

    #[test]
    fn test_spill_out_of_range_rejected() {
        for spill in [-0.1, 1.5, f32::NAN] {
            let params = KeyParameters {
                spill_suppression: spill,
                ..Default::default()
            };
            assert!(params.validate().is_err(), "spill {} accepted", spill);
        }
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let params = KeyParameters {
            lower_bound: [40, 200, 50],
            upper_bound: [80, 100, 255],
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("saturation"));
    }

    #[test]
    fn test_hue_beyond_range_rejected() {
        let params = KeyParameters {
            upper_bound: [200, 255, 255],
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: KeyParameters =
            serde_json::from_str(r#"{"feather_radius": 5}"#).unwrap();
        assert_eq!(params.feather_radius, 5);
        assert_eq!(params.lower_bound, [40, 100, 50]);
        assert!((params.spill_suppression - 0.7).abs() < 1e-6);
    }
}
