mod chroma;
pub mod hsv;
pub mod mask;
pub mod spill;
pub mod types;

pub use chroma::{composite, key_mask, ChromaKeyer};
pub use hsv::{mask_to_rgb, rgb_to_hsv, Hsv};
pub use types::{Frame, KeyError, KeyParameters, KeyResult, Mask, MaskGenerator};

