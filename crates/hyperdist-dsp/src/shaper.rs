//! Hyperbolic distortion transfer function.
//!
//! Signal flow for one sample:
//!   input -> drive gain -> tanh                        (wet path)
//!   input -> symmetric hard clip at +/-threshold       (dry path)
//!   dry * clipped + wet * distorted -> output gain -> sample
//!
//! The hard clip sits on the dry path only. The wet path is bounded by tanh
//! and never sees the threshold, so lowering the threshold changes the
//! character of the blend rather than limiting the overall output.
//!
//! Everything here is a pure function of the input sample and a set of
//! linear gains. No state survives between samples.

use crate::params::ParamSnapshot;

/// Linear amplitude for a level in dB: `10^(dB/20)`.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Inverse of [`db_to_gain`]. Silence maps to -inf.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.log10()
}

/// Wet path: drive-scaled tanh saturation, bounded to (-1, 1).
#[inline]
pub fn saturate(input: f32, drive: f32) -> f32 {
    (input * drive).tanh()
}

/// Dry path: symmetric hard clip. Values exactly at the ceiling pass through.
#[inline]
pub fn clip_to_threshold(input: f32, threshold: f32) -> f32 {
    if input > threshold {
        threshold
    } else if input < -threshold {
        -threshold
    } else {
        input
    }
}

/// The five parameters converted to the multipliers the transfer function uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaperGains {
    pub drive: f32,
    pub output: f32,
    /// Wet share as a fraction, 0..1.
    pub wet: f32,
    /// Dry share as a fraction, 0..1.
    pub dry: f32,
    /// Linear clip ceiling for the dry path.
    pub threshold: f32,
}

impl ShaperGains {
    #[inline]
    pub fn from_snapshot(snapshot: &ParamSnapshot) -> Self {
        Self {
            drive: db_to_gain(snapshot.drive_db),
            output: db_to_gain(snapshot.output_db),
            wet: snapshot.wet_pct / 100.0,
            dry: snapshot.dry_pct / 100.0,
            threshold: db_to_gain(snapshot.threshold_db),
        }
    }
}

impl From<ParamSnapshot> for ShaperGains {
    fn from(snapshot: ParamSnapshot) -> Self {
        Self::from_snapshot(&snapshot)
    }
}

/// Map one input amplitude to one output amplitude.
#[inline]
pub fn process_sample(input: f32, gains: &ShaperGains) -> f32 {
    let distorted = saturate(input, gains.drive);
    let clipped = clip_to_threshold(input, gains.threshold);
    (gains.dry * clipped + gains.wet * distorted) * gains.output
}
