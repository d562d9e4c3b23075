use super::hsv::frame_to_hsv;
use super::mask::{clean_up, feather, normalize, threshold};
use super::spill::{blend, suppress_spill};
use super::types::{Frame, KeyError, KeyParameters, KeyResult, Mask, MaskGenerator};

/// Classical green-screen keyer
///
/// Holds a validated, immutable parameter set. Every call is independent of
/// the previous one, so a single keyer can serve any number of frames.
#[derive(Debug, Clone)]
pub struct ChromaKeyer {
    params: KeyParameters,
}

impl ChromaKeyer {
    /// Create a keyer, rejecting malformed parameters up front
    pub fn new(params: KeyParameters) -> KeyResult<Self> {
        params.validate()?;

        tracing::debug!(
            "Chroma keyer: lower={:?}, upper={:?}, feather={}, spill={}",
            params.lower_bound,
            params.upper_bound,
            params.feather_radius,
            params.spill_suppression
        );

        Ok(Self { params })
    }

    pub fn params(&self) -> &KeyParameters {
        &self.params
    }

    /// Replace the keyed region of `frame` with `background`
    pub fn composite(&self, frame: &Frame, background: &Frame) -> KeyResult<Frame> {
        ensure_same_size(frame, background)?;

        let mask = self.mask(frame)?;
        let decontaminated = suppress_spill(frame, &mask, self.params.spill_suppression)?;
        blend(&decontaminated, background, &mask)
    }
}

impl MaskGenerator for ChromaKeyer {
    fn mask(&self, frame: &Frame) -> KeyResult<Mask> {
        Ok(build_mask(frame, &self.params))
    }
}

fn ensure_same_size(frame: &Frame, background: &Frame) -> KeyResult<()> {
    if frame.dimensions() != background.dimensions() {
        let (fw, fh) = frame.dimensions();
        let (bw, bh) = background.dimensions();
        return Err(KeyError::invalid_input(format!(
            "background is {}x{} but frame is {}x{}; resize the background first",
            bw, bh, fw, fh
        )));
    }
    Ok(())
}

/// Mask stages: HSV threshold, normalize, feather, morphological cleanup
fn build_mask(frame: &Frame, params: &KeyParameters) -> Mask {
    let _span = tracing::debug_span!("key_mask").entered();

    let hsv = frame_to_hsv(frame);
    let binary = threshold(&hsv, &params.lower_bound, &params.upper_bound);
    let soft = feather(&normalize(&binary), params.feather_radius);
    clean_up(&soft)
}

/// Compute the background mask of `frame`
pub fn key_mask(frame: &Frame, params: &KeyParameters) -> KeyResult<Mask> {
    params.validate()?;
    Ok(build_mask(frame, params))
}

/// Composite `frame` over `background`, replacing the keyed color
///
/// Both frames must have the same dimensions. Inputs are not modified and the
/// output is bit-identical for identical inputs.
pub fn composite(frame: &Frame, background: &Frame, params: &KeyParameters) -> KeyResult<Frame> {
    ChromaKeyer::new(*params)?.composite(frame, background)
}
