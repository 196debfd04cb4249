//! Block processing: the real-time entry point.
//!
//! Channels are independent. Within a channel, samples are visited in index
//! order and the parameter source is read once per sample, so automation
//! written mid-block takes effect at the next sample.

use crate::params::{ParamSnapshot, ParameterSource};
use crate::shaper::{ShaperGains, process_sample};

/// Process one channel in place.
#[inline]
pub fn process_channel<P: ParameterSource + ?Sized>(samples: &mut [f32], source: &P) {
    for s in samples.iter_mut() {
        let gains = ShaperGains::from_snapshot(&ParamSnapshot::read(source));
        *s = process_sample(*s, &gains);
    }
}

/// Process every channel of a block in place. Each sample is written exactly once.
pub fn process_block<P: ParameterSource + ?Sized>(channels: &mut [&mut [f32]], source: &P) {
    for channel in channels.iter_mut() {
        process_channel(channel, source);
    }
}

/// Process a channel with parameters held fixed for the whole block.
///
/// For offline rendering, where nothing writes parameters concurrently and
/// re-reading per sample buys nothing.
pub fn process_channel_fixed(samples: &mut [f32], gains: &ShaperGains) {
    for s in samples.iter_mut() {
        *s = process_sample(*s, gains);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamId, ParameterSet};
    use std::cell::Cell;

    /// Source that bumps drive by 1 dB every time drive is read.
    struct RampingDrive {
        drive_db: Cell<f32>,
    }

    impl ParameterSource for RampingDrive {
        fn value(&self, id: ParamId) -> f32 {
            match id {
                ParamId::Drive => {
                    let v = self.drive_db.get();
                    self.drive_db.set(v + 1.0);
                    v
                }
                ParamId::Wet => 100.0,
                ParamId::Dry => 0.0,
                other => other.spec().default,
            }
        }
    }

    #[test]
    fn test_block_matches_sample_transform() {
        let params = ParameterSet::new();
        params.set(ParamId::Drive, 12.0);
        params.set(ParamId::Threshold, -6.0);
        let gains = ShaperGains::from(params.snapshot());

        let left_in: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
        let right_in: Vec<f32> = (0..64).map(|i| (i as f32 * 0.07).cos() * 0.8).collect();
        let mut left = left_in.clone();
        let mut right = right_in.clone();

        process_block(&mut [&mut left[..], &mut right[..]], &params);

        for (x, y) in left_in.iter().zip(&left) {
            assert_eq!(*y, process_sample(*x, &gains));
        }
        for (x, y) in right_in.iter().zip(&right) {
            assert_eq!(*y, process_sample(*x, &gains));
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let params = ParameterSet::new();
        params.set(ParamId::Drive, 18.0);

        let signal: Vec<f32> = (0..32).map(|i| (i as f32 * 0.3).sin() * 0.9).collect();
        let mut alone = signal.clone();
        process_block(&mut [&mut alone[..]], &params);

        let mut first = signal.clone();
        let mut second = vec![0.25f32; 32];
        process_block(&mut [&mut second[..], &mut first[..]], &params);

        assert_eq!(alone, first);
    }

    #[test]
    fn test_parameters_read_per_sample() {
        let source = RampingDrive {
            drive_db: Cell::new(0.0),
        };
        let mut samples = [0.1f32; 8];
        process_channel(&mut samples, &source);

        for (i, y) in samples.iter().enumerate() {
            let expected = (0.1 * crate::shaper::db_to_gain(i as f32)).tanh();
            assert!((y - expected).abs() < 1e-6, "sample {i}: {y} vs {expected}");
        }
        assert!(samples.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_fixed_matches_live_when_static() {
        let params = ParameterSet::new();
        params.set(ParamId::Wet, 80.0);
        params.set(ParamId::OutputLevel, -3.0);

        let input: Vec<f32> = (0..48).map(|i| (i as f32 / 48.0) * 2.0 - 1.0).collect();
        let mut live = input.clone();
        let mut fixed = input;
        process_channel(&mut live, &params);
        process_channel_fixed(&mut fixed, &ShaperGains::from(params.snapshot()));
        assert_eq!(live, fixed);
    }

    #[test]
    fn test_empty_block() {
        let params = ParameterSet::new();
        let mut empty: [&mut [f32]; 0] = [];
        process_block(&mut empty, &params);

        let mut zero_len: [f32; 0] = [];
        process_block(&mut [&mut zero_len[..]], &params);
    }
}
