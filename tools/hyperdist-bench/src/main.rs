//! HyperDist Bench — offline validation CLI for the Hyperbolic Distortion DSP.
//!
//! Usage:
//!   hyperdist-bench params
//!   hyperdist-bench curve [--range R] [--points N] [--csv FILE] [PARAMS]
//!   hyperdist-bench harmonics [--freq F] [--amplitude A] [PARAMS]
//!   hyperdist-bench render [--input FILE] [--output FILE] [--sweep-drive-to DB] [PARAMS]
//!
//! PARAMS: --drive DB --output-level DB --wet PCT --dry PCT --threshold DB,
//! each also settable through HYPERDIST_* environment variables.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use hyperdist_dsp::block::process_channel_fixed;
use hyperdist_dsp::shaper::gain_to_db;
use hyperdist_dsp::{LAYOUT, ParamId, ParameterSet, ShaperGains, process_block, process_sample};
use log::{debug, info, warn};

const DEFAULT_SR: u32 = 48_000;
/// Longest signal `harmonics` will synthesize.
const MAX_ANALYSIS_SECONDS: f64 = 60.0;

#[derive(Parser)]
#[command(name = "hyperdist-bench", version, about = "Hyperbolic Distortion DSP validation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the parameter layout
    Params,
    /// Static transfer curve (input amplitude -> output amplitude)
    Curve(CurveArgs),
    /// Harmonic distortion of a sine (H1..H5, THD)
    Harmonics(HarmonicsArgs),
    /// Process a WAV file (or a generated sine) and write the result
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct ParamArgs {
    /// Drive in dB [0, 30]
    #[arg(long, env = "HYPERDIST_DRIVE", allow_negative_numbers = true)]
    drive: Option<f32>,
    /// Output level in dB [-12, 12]
    #[arg(long, env = "HYPERDIST_OUTPUT_LEVEL", allow_negative_numbers = true)]
    output_level: Option<f32>,
    /// Wet mix in percent [0, 100]
    #[arg(long, env = "HYPERDIST_WET", allow_negative_numbers = true)]
    wet: Option<f32>,
    /// Dry mix in percent [0, 100]
    #[arg(long, env = "HYPERDIST_DRY", allow_negative_numbers = true)]
    dry: Option<f32>,
    /// Dry-path clip threshold in dB [-20, 3]
    #[arg(long, env = "HYPERDIST_THRESHOLD", allow_negative_numbers = true)]
    threshold: Option<f32>,
}

impl ParamArgs {
    fn overrides(&self) -> [(ParamId, Option<f32>); 5] {
        [
            (ParamId::Drive, self.drive),
            (ParamId::OutputLevel, self.output_level),
            (ParamId::Wet, self.wet),
            (ParamId::Dry, self.dry),
            (ParamId::Threshold, self.threshold),
        ]
    }

    /// Build a parameter set from layout defaults plus any overrides,
    /// clamping to range the way a host would.
    fn build(&self) -> ParameterSet {
        let params = ParameterSet::new();
        for (id, value) in self.overrides() {
            let Some(value) = value else { continue };
            let spec = id.spec();
            let clamped = spec.clamp(value);
            if clamped != value {
                warn!(
                    "{} = {value} outside [{}, {}], clamped to {clamped}",
                    spec.key, spec.min, spec.max
                );
            }
            params.set(id, clamped);
        }
        debug!("parameters: {params:?}");
        params
    }
}

#[derive(Args)]
struct CurveArgs {
    /// Sweep input from -RANGE to +RANGE
    #[arg(long, default_value_t = 2.0)]
    range: f32,
    /// Number of points in the sweep
    #[arg(long, default_value_t = 41)]
    points: usize,
    /// Also write the curve as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Args)]
struct HarmonicsArgs {
    #[arg(long, default_value_t = 440.0)]
    freq: f64,
    #[arg(long, default_value_t = 0.5)]
    amplitude: f64,
    #[arg(long, default_value_t = DEFAULT_SR)]
    sample_rate: u32,
    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Args)]
struct RenderArgs {
    /// Input WAV; a sine is generated when omitted
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Output WAV (32-bit float)
    #[arg(long, short, default_value = "hyperdist_render.wav")]
    output: PathBuf,
    /// Generated sine frequency
    #[arg(long, default_value_t = 110.0)]
    freq: f64,
    /// Generated sine amplitude
    #[arg(long, default_value_t = 0.8)]
    amplitude: f64,
    /// Generated sine duration in seconds
    #[arg(long, default_value_t = 2.0)]
    duration: f64,
    /// Generated sine sample rate
    #[arg(long, default_value_t = DEFAULT_SR)]
    sample_rate: u32,
    /// Host block size used while processing
    #[arg(long, default_value_t = 512)]
    block_size: usize,
    /// Ramp drive linearly to this value (dB) over the render, once per block
    #[arg(long, allow_negative_numbers = true)]
    sweep_drive_to: Option<f32>,
    #[command(flatten)]
    params: ParamArgs,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Params => cmd_params(),
        Command::Curve(args) => cmd_curve(&args),
        Command::Harmonics(args) => cmd_harmonics(&args),
        Command::Render(args) => cmd_render(&args),
    }
}

// ─── Parameter layout ───────────────────────────────────────────────────────

fn cmd_params() -> Result<()> {
    println!(
        "{:<10}  {:<13}  {:>7}  {:>7}  {:>7}  {:<4}",
        "Key", "Name", "Min", "Max", "Default", "Unit"
    );
    println!("{:-<10}  {:-<13}  {:->7}  {:->7}  {:->7}  {:-<4}", "", "", "", "", "", "");
    for spec in &LAYOUT {
        println!(
            "{:<10}  {:<13}  {:>7.1}  {:>7.1}  {:>7.1}  {:<4}",
            spec.key,
            spec.name,
            spec.min,
            spec.max,
            spec.default,
            spec.unit.trim()
        );
    }
    Ok(())
}

// ─── Transfer curve ─────────────────────────────────────────────────────────

fn cmd_curve(args: &CurveArgs) -> Result<()> {
    if args.points < 2 {
        bail!("--points must be at least 2, got {}", args.points);
    }
    if !(args.range.is_finite() && args.range > 0.0) {
        bail!("--range must be a positive number, got {}", args.range);
    }

    let params = args.params.build();
    let gains = ShaperGains::from(params.snapshot());

    let mut csv_lines = Vec::with_capacity(args.points + 1);
    csv_lines.push("input,output".to_string());

    println!(
        "Transfer curve (drive {:.1} dB, threshold {:.1} dB, wet {:.0}%, dry {:.0}%, output {:.1} dB)",
        params.get(ParamId::Drive),
        params.get(ParamId::Threshold),
        params.get(ParamId::Wet),
        params.get(ParamId::Dry),
        params.get(ParamId::OutputLevel),
    );
    println!("{:>10}  {:>10}", "Input", "Output");
    println!("{:-<10}  {:-<10}", "", "");

    for i in 0..args.points {
        let frac = i as f32 / (args.points - 1) as f32;
        let x = -args.range + frac * 2.0 * args.range;
        let y = process_sample(x, &gains);
        println!("{x:>10.4}  {y:>10.6}");
        csv_lines.push(format!("{x:.6},{y:.6}"));
    }

    if let Some(path) = &args.csv {
        write_csv(path, &csv_lines)?;
    }
    Ok(())
}

fn write_csv(path: &Path, lines: &[String]) -> Result<()> {
    std::fs::write(path, lines.join("\n") + "\n")
        .with_context(|| format!("failed to write CSV {}", path.display()))?;
    info!("CSV written to {}", path.display());
    Ok(())
}

// ─── Harmonic analysis ──────────────────────────────────────────────────────

fn cmd_harmonics(args: &HarmonicsArgs) -> Result<()> {
    if !(args.freq > 0.0 && args.freq < args.sample_rate as f64 / 2.0) {
        bail!("--freq must lie in (0, Nyquist), got {}", args.freq);
    }
    if !args.amplitude.is_finite() {
        bail!("--amplitude must be finite, got {}", args.amplitude);
    }

    let params = args.params.build();
    let sr = args.sample_rate as f64;

    // Whole cycles only, so the DFT bins land on the harmonics.
    let cycles = (args.freq * 0.5).ceil().max(1.0);
    let len = (cycles * sr / args.freq).round();
    if len > MAX_ANALYSIS_SECONDS * sr {
        bail!(
            "--freq {} Hz needs {:.0} s of signal for whole cycles (max {MAX_ANALYSIS_SECONDS} s)",
            args.freq,
            len / sr
        );
    }
    let n = len as usize;
    let mut signal = sine(args.freq, args.amplitude, sr, n);
    process_channel_fixed(&mut signal, &ShaperGains::from(params.snapshot()));

    let harmonics: Vec<f64> = (1..=5)
        .map(|k| dft_magnitude(&signal, k as f64 * args.freq, sr))
        .collect();
    let h1 = harmonics[0];
    let thd = if h1 > 1e-15 {
        harmonics[1..].iter().map(|h| h * h).sum::<f64>().sqrt() / h1 * 100.0
    } else {
        0.0
    };

    println!("Harmonic analysis");
    println!("  Frequency:   {:.0} Hz", args.freq);
    println!("  Amplitude:   {:.4}", args.amplitude);
    println!("  Drive:       {:.1} dB", params.get(ParamId::Drive));
    println!("  Threshold:   {:.1} dB", params.get(ParamId::Threshold));
    println!();
    println!("  H1 (fund):   {h1:.6}");
    for (k, h) in harmonics.iter().enumerate().skip(1) {
        let rel = if h1 > 1e-15 && *h > 1e-15 {
            20.0 * (h / h1).log10()
        } else {
            f64::NEG_INFINITY
        };
        println!("  H{}:          {h:.6}  ({rel:.1} dB rel)", k + 1);
    }
    println!();
    println!("  THD:         {thd:.4}%");
    Ok(())
}

// ─── Render (WAV -> distortion -> WAV) ──────────────────────────────────────

fn cmd_render(args: &RenderArgs) -> Result<()> {
    if args.block_size == 0 {
        bail!("--block-size must be non-zero");
    }

    let (sample_rate, mut channels) = match &args.input {
        Some(path) => read_wav(path)?,
        None => {
            let n = (args.duration * args.sample_rate as f64).round() as usize;
            info!("generating {:.1} Hz sine, {n} samples", args.freq);
            (
                args.sample_rate,
                vec![sine(args.freq, args.amplitude, args.sample_rate as f64, n)],
            )
        }
    };

    let n_samples = channels.first().map_or(0, Vec::len);
    let input_peak = peak(&channels);

    let params = args.params.build();
    let drive_start = params.get(ParamId::Drive);
    let n_blocks = n_samples.div_ceil(args.block_size).max(1);

    for (b, start) in (0..n_samples).step_by(args.block_size).enumerate() {
        if let Some(target) = args.sweep_drive_to {
            let frac = b as f32 / (n_blocks - 1).max(1) as f32;
            let drive = drive_start + (target - drive_start) * frac;
            params.set(ParamId::Drive, ParamId::Drive.spec().clamp(drive));
        }
        let end = (start + args.block_size).min(n_samples);
        let mut block: Vec<&mut [f32]> = channels.iter_mut().map(|c| &mut c[start..end]).collect();
        process_block(&mut block, &params);
    }

    let output_peak = peak(&channels);
    write_wav(&args.output, sample_rate, &channels)?;

    println!("Render complete");
    println!("  Channels:    {}", channels.len());
    println!("  Samples:     {n_samples}");
    println!("  Sample rate: {sample_rate} Hz");
    println!("  Input peak:  {:.1} dBFS", peak_dbfs(input_peak));
    println!("  Output peak: {:.1} dBFS", peak_dbfs(output_peak));
    println!("  Output:      {}", args.output.display());
    Ok(())
}

/// Read a WAV file into per-channel `f32` buffers in [-1, 1].
fn read_wav(path: &Path) -> Result<(u32, Vec<Vec<f32>>)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open WAV {}", path.display()))?;
    let spec = reader.spec();
    info!(
        "reading {}: {} ch, {} Hz, {}-bit {:?}",
        path.display(),
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to decode float samples")?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!("unsupported bit depth: {}", spec.bits_per_sample);
            }
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .context("failed to decode integer samples")?
        }
    };

    let n_ch = spec.channels.max(1) as usize;
    let mut channels = vec![Vec::with_capacity(interleaved.len() / n_ch); n_ch];
    for frame in interleaved.chunks_exact(n_ch) {
        for (ch, &s) in channels.iter_mut().zip(frame) {
            ch.push(s);
        }
    }
    Ok((spec.sample_rate, channels))
}

fn write_wav(path: &Path, sample_rate: u32, channels: &[Vec<f32>]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV {}", path.display()))?;

    let n_samples = channels.first().map_or(0, Vec::len);
    for i in 0..n_samples {
        for ch in channels {
            writer.write_sample(ch[i])?;
        }
    }
    writer.finalize().context("failed to finalize WAV")?;
    Ok(())
}

// ─── Signal helpers ─────────────────────────────────────────────────────────

fn sine(freq: f64, amplitude: f64, sr: f64, n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (amplitude * (2.0 * PI * freq * i as f64 / sr).sin()) as f32)
        .collect()
}

fn peak(channels: &[Vec<f32>]) -> f32 {
    channels
        .iter()
        .flatten()
        .fold(0.0f32, |acc, s| acc.max(s.abs()))
}

fn peak_dbfs(peak: f32) -> f32 {
    if peak > 0.0 { gain_to_db(peak) } else { -120.0 }
}

fn dft_magnitude(signal: &[f32], freq: f64, sr: f64) -> f64 {
    let n = signal.len() as f64;
    let mut re = 0.0;
    let mut im = 0.0;
    for (i, &s) in signal.iter().enumerate() {
        let phase = 2.0 * PI * freq * i as f64 / sr;
        re += s as f64 * phase.cos();
        im -= s as f64 * phase.sin();
    }
    2.0 * ((re / n).powi(2) + (im / n).powi(2)).sqrt()
}
