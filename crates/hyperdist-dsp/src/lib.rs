//! Hyperbolic Distortion DSP library — tanh waveshaper with a dry-path clip.
//!
//! Pure DSP math with no audio framework dependencies.

// Parameter layout and lock-free storage
pub mod params;

// Per-sample transfer function
pub mod shaper;

// Real-time block entry point
pub mod block;

pub use block::{process_block, process_channel};
pub use params::{LAYOUT, ParamError, ParamId, ParamSnapshot, ParamSpec, ParameterSet, ParameterSource};
pub use shaper::{ShaperGains, process_sample};
