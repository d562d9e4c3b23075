//! Key parameter loading: JSON files plus command-line overrides.

use crate::keying::KeyParameters;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load key parameters from a JSON file; missing fields take their defaults
pub fn load_parameters(path: impl AsRef<Path>) -> Result<KeyParameters, ConfigError> {
    let path = path.as_ref();

    let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse an `H,S,V` triple such as `40,100,50`
pub fn parse_hsv(value: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected H,S,V but got '{}'", value));
    }

    let mut hsv = [0u8; 3];
    for (slot, part) in hsv.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid component '{}': {}", part, e))?;
    }
    Ok(hsv)
}

/// Per-field overrides applied on top of a base parameter set
#[derive(Debug, Default, Clone, Copy)]
pub struct ParameterOverrides {
    pub lower_bound: Option<[u8; 3]>,
    pub upper_bound: Option<[u8; 3]>,
    pub feather_radius: Option<u32>,
    pub spill_suppression: Option<f32>,
}

impl ParameterOverrides {
    pub fn apply(&self, base: KeyParameters) -> KeyParameters {
        KeyParameters {
            lower_bound: self.lower_bound.unwrap_or(base.lower_bound),
            upper_bound: self.upper_bound.unwrap_or(base.upper_bound),
            feather_radius: self.feather_radius.unwrap_or(base.feather_radius),
            spill_suppression: self.spill_suppression.unwrap_or(base.spill_suppression),
        }
    }
}
