//! Classical green-screen keying.
//!
//! [`keying::composite`] is the whole per-frame transform. The `capture`,
//! `background` and `output` modules supply and consume frames for the
//! `greenkey` binary.

pub mod background;
pub mod capture;
pub mod config;
pub mod keying;
pub mod output;

pub use keying::{composite, ChromaKeyer, Frame, KeyError, KeyParameters, Mask};
