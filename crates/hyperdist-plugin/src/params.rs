use hyperdist_dsp::{ParamId, ParamSpec, ParameterSource};
use nih_plug::prelude::*;

/// Threshold knob travel puts -5 dB at mid-rotation. The skew lives in the
/// host range, so normalized automation values follow it too.
const THRESHOLD_MIDPOINT_DB: f32 = -5.0;

#[derive(Params)]
pub struct HyperDistParams {
    /// Pre-saturation gain feeding the tanh stage.
    #[id = "drive"]
    pub drive: FloatParam,

    /// Post-blend output gain.
    #[id = "outputLvl"]
    pub output_level: FloatParam,

    /// Saturated signal share.
    #[id = "wet"]
    pub wet: FloatParam,

    /// Clipped dry signal share.
    #[id = "dry"]
    pub dry: FloatParam,

    /// Dry-path clip ceiling.
    #[id = "threshold"]
    pub threshold: FloatParam,
}

/// Skew factor that maps `midpoint` to the centre of the knob's travel.
fn skew_factor_from_midpoint(min: f32, max: f32, midpoint: f32) -> f32 {
    0.5f32.ln() / ((midpoint - min) / (max - min)).ln()
}

/// Unsmoothed: the audio thread reads the raw value once per sample.
fn float_param(spec: &ParamSpec, range: FloatRange, decimals: usize) -> FloatParam {
    FloatParam::new(spec.name, spec.default, range)
        .with_unit(spec.unit)
        .with_step_size(spec.step)
        .with_value_to_string(formatters::v2s_f32_rounded(decimals))
}

fn linear(spec: &ParamSpec) -> FloatRange {
    FloatRange::Linear {
        min: spec.min,
        max: spec.max,
    }
}

impl Default for HyperDistParams {
    fn default() -> Self {
        let drive = ParamId::Drive.spec();
        let output_level = ParamId::OutputLevel.spec();
        let wet = ParamId::Wet.spec();
        let dry = ParamId::Dry.spec();
        let threshold = ParamId::Threshold.spec();

        Self {
            drive: float_param(drive, linear(drive), 1),
            output_level: float_param(output_level, linear(output_level), 1),
            wet: float_param(wet, linear(wet), 0),
            dry: float_param(dry, linear(dry), 0),
            threshold: float_param(
                threshold,
                FloatRange::Skewed {
                    min: threshold.min,
                    max: threshold.max,
                    factor: skew_factor_from_midpoint(
                        threshold.min,
                        threshold.max,
                        THRESHOLD_MIDPOINT_DB,
                    ),
                },
                1,
            ),
        }
    }
}

impl ParameterSource for HyperDistParams {
    #[inline]
    fn value(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Drive => self.drive.value(),
            ParamId::OutputLevel => self.output_level.value(),
            ParamId::Wet => self.wet.value(),
            ParamId::Dry => self.dry.value(),
            ParamId::Threshold => self.threshold.value(),
        }
    }
}
