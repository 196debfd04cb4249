//! Property-based tests for the distortion transfer function.
//!
//! Uses proptest to check the invariants that must hold for every input
//! amplitude and every in-range parameter combination.

use hyperdist_dsp::shaper::{clip_to_threshold, db_to_gain, saturate};
use hyperdist_dsp::{LAYOUT, ParamId, ParamSnapshot, ParameterSet, ShaperGains, process_block, process_sample};
use proptest::prelude::*;

/// Any in-range parameter snapshot.
fn any_snapshot() -> impl Strategy<Value = ParamSnapshot> {
    let range = |id: ParamId| {
        let spec = id.spec();
        spec.min..=spec.max
    };
    (
        range(ParamId::Drive),
        range(ParamId::OutputLevel),
        range(ParamId::Wet),
        range(ParamId::Dry),
        range(ParamId::Threshold),
    )
        .prop_map(|(drive_db, output_db, wet_pct, dry_pct, threshold_db)| ParamSnapshot {
            drive_db,
            output_db,
            wet_pct,
            dry_pct,
            threshold_db,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Finite input and in-range parameters never produce NaN or Inf.
    #[test]
    fn output_is_finite(input in -4.0f32..=4.0f32, snapshot in any_snapshot()) {
        let out = process_sample(input, &ShaperGains::from(snapshot));
        prop_assert!(out.is_finite(), "input {} with {:?} gave {}", input, snapshot, out);
    }

    /// Output magnitude is bounded by (dry * threshold + wet) * output gain.
    #[test]
    fn output_is_bounded(input in -4.0f32..=4.0f32, snapshot in any_snapshot()) {
        let g = ShaperGains::from(snapshot);
        let out = process_sample(input, &g);
        let bound = (g.dry * g.threshold.min(input.abs()) + g.wet) * g.output;
        prop_assert!(out.abs() <= bound * (1.0 + 1e-5) + 1e-7, "{} exceeds {}", out, bound);
    }

    /// Clipping an already-clipped value changes nothing.
    #[test]
    fn clip_is_idempotent(input in -4.0f32..=4.0f32, threshold_db in -20.0f32..=3.0f32) {
        let t = db_to_gain(threshold_db);
        let once = clip_to_threshold(input, t);
        prop_assert_eq!(clip_to_threshold(once, t), once);
        prop_assert!(once.abs() <= t);
    }

    /// More drive means more saturation for any non-zero input.
    #[test]
    fn drive_is_monotonic(
        input in 0.01f32..=0.5f32,
        negative in any::<bool>(),
        low_db in 0.0f32..=9.0f32,
        step_db in 1.0f32..=6.0f32,
    ) {
        let x = if negative { -input } else { input };
        let low = saturate(x, db_to_gain(low_db)).abs();
        let high = saturate(x, db_to_gain(low_db + step_db)).abs();
        prop_assert!(high > low, "drive {} dB -> {}, {} dB -> {}", low_db, low, low_db + step_db, high);
    }

    /// Full dry reproduces the clipped input scaled by the output gain.
    #[test]
    fn full_dry_is_clipped_input(input in -4.0f32..=4.0f32, snapshot in any_snapshot()) {
        let snapshot = ParamSnapshot { wet_pct: 0.0, dry_pct: 100.0, ..snapshot };
        let g = ShaperGains::from(snapshot);
        let expected = clip_to_threshold(input, g.threshold) * g.output;
        prop_assert!((process_sample(input, &g) - expected).abs() <= 1e-6 * expected.abs().max(1.0));
    }

    /// Full wet reproduces the saturated input scaled by the output gain.
    #[test]
    fn full_wet_is_saturated_input(input in -4.0f32..=4.0f32, snapshot in any_snapshot()) {
        let snapshot = ParamSnapshot { wet_pct: 100.0, dry_pct: 0.0, ..snapshot };
        let g = ShaperGains::from(snapshot);
        let expected = saturate(input, g.drive) * g.output;
        prop_assert!((process_sample(input, &g) - expected).abs() <= 1e-6 * expected.abs().max(1.0));
    }

    /// A whole block through a `ParameterSet` matches the per-sample transform.
    #[test]
    fn block_matches_per_sample(
        left in prop::collection::vec(-1.5f32..=1.5f32, 0..128),
        right in prop::collection::vec(-1.5f32..=1.5f32, 0..128),
        snapshot in any_snapshot(),
    ) {
        let params = ParameterSet::new();
        for spec in &LAYOUT {
            params.set(spec.id, hyperdist_dsp::ParameterSource::value(&snapshot, spec.id));
        }
        let g = ShaperGains::from(snapshot);

        let mut l = left.clone();
        let mut r = right.clone();
        process_block(&mut [&mut l[..], &mut r[..]], &params);

        for (x, y) in left.iter().zip(&l) {
            prop_assert_eq!(*y, process_sample(*x, &g));
        }
        for (x, y) in right.iter().zip(&r) {
            prop_assert_eq!(*y, process_sample(*x, &g));
        }
    }
}

#[test]
fn layout_defaults_in_range() {
    for spec in &LAYOUT {
        assert!(spec.contains(spec.default), "{} default out of range", spec.key);
    }
    assert_eq!(ParamSnapshot::defaults().threshold_db, 1.0);
}
