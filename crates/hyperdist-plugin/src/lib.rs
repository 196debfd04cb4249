// Hyperbolic Distortion — tanh distortion effect plugin (CLAP + VST3).

use hyperdist_dsp::process_block;
use nih_plug::prelude::*;
use std::num::NonZeroU32;
use std::sync::Arc;

mod params;
pub use params::HyperDistParams;

// ── Plugin ──────────────────────────────────────────────────────────────────

/// Stateless apart from its parameters: every sample is a pure function of
/// the input and the current knob positions.
pub struct HyperDist {
    params: Arc<HyperDistParams>,
}

impl Default for HyperDist {
    fn default() -> Self {
        Self {
            params: Arc::new(HyperDistParams::default()),
        }
    }
}

impl Plugin for HyperDist {
    const NAME: &'static str = "Hyperbolic Distortion";
    const VENDOR: &'static str = "HyperDist";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Input and output channel counts must match: stereo first, mono fallback.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    // Split the buffer at automation events so the per-sample reads in
    // `process_block` see mid-block changes.
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let inputs = audio_io_layout.main_input_channels.map_or(0, NonZeroU32::get);
        let outputs = audio_io_layout.main_output_channels.map_or(0, NonZeroU32::get);
        if inputs != outputs {
            nih_error!("unsupported layout: {inputs} in, {outputs} out");
            return false;
        }

        nih_log!(
            "initialized: {outputs} ch, {} Hz, max block {}",
            buffer_config.sample_rate,
            buffer_config.max_buffer_size
        );
        true
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // In-place: nih-plug hands us the input already copied into the
        // output channels, with flush-to-zero enabled for the callback.
        process_block(buffer.as_slice(), &*self.params);

        ProcessStatus::Normal
    }
}

impl ClapPlugin for HyperDist {
    const CLAP_ID: &'static str = "com.hyperdist.hyperbolic-distortion";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("tanh distortion with dry-path threshold clip and wet/dry blend");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Distortion,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for HyperDist {
    const VST3_CLASS_ID: [u8; 16] = *b"HyperbolicDistFx";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Distortion];
}

nih_export_clap!(HyperDist);
nih_export_vst3!(HyperDist);
