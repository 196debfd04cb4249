//! Parameter layout and lock-free parameter storage.
//!
//! The five controls are fixed at compile time. `LAYOUT` is the single
//! source of truth for keys, ranges and defaults; the plugin registers its
//! host-visible parameters from it and the bench CLI builds its flags on it.
//!
//! `ParameterSet` holds one atomic `f32` per parameter. The UI/automation
//! thread writes, the audio thread reads, and neither ever waits on the
//! other. Reads are per-parameter atomic; nothing ties the five values
//! together, so a block may observe drive from one automation step and
//! threshold from the next.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;
use thiserror::Error;

/// Number of parameters in the layout.
pub const PARAM_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Pre-saturation gain in dB.
    Drive,
    /// Post-blend output gain in dB.
    OutputLevel,
    /// Saturated signal share, 0..100 %.
    Wet,
    /// Clipped dry signal share, 0..100 %.
    Dry,
    /// Dry-path clip ceiling in dB.
    Threshold,
}

impl ParamId {
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::Drive,
        ParamId::OutputLevel,
        ParamId::Wet,
        ParamId::Dry,
        ParamId::Threshold,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn spec(self) -> &'static ParamSpec {
        &LAYOUT[self.index()]
    }

    /// Stable automation/persistence key.
    pub fn key(self) -> &'static str {
        self.spec().key
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("unknown parameter `{0}` (expected one of: drive, outputLvl, wet, dry, threshold)")]
    UnknownParameter(String),
}

impl FromStr for ParamId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .into_iter()
            .find(|id| id.key() == s)
            .ok_or_else(|| ParamError::UnknownParameter(s.to_string()))
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub id: ParamId,
    pub key: &'static str,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Display suffix, including any leading space.
    pub unit: &'static str,
    /// UI step size.
    pub step: f32,
}

impl ParamSpec {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// The five controls, indexed by `ParamId::index()`.
pub static LAYOUT: [ParamSpec; PARAM_COUNT] = [
    ParamSpec {
        id: ParamId::Drive,
        key: "drive",
        name: "Drive",
        min: 0.0,
        max: 30.0,
        default: 0.0,
        unit: " dB",
        step: 0.1,
    },
    ParamSpec {
        id: ParamId::OutputLevel,
        key: "outputLvl",
        name: "Output Level",
        min: -12.0,
        max: 12.0,
        default: 0.0,
        unit: " dB",
        step: 0.1,
    },
    ParamSpec {
        id: ParamId::Wet,
        key: "wet",
        name: "Wet Mix",
        min: 0.0,
        max: 100.0,
        default: 50.0,
        unit: "%",
        step: 1.0,
    },
    ParamSpec {
        id: ParamId::Dry,
        key: "dry",
        name: "Dry Mix",
        min: 0.0,
        max: 100.0,
        default: 50.0,
        unit: "%",
        step: 1.0,
    },
    ParamSpec {
        id: ParamId::Threshold,
        key: "threshold",
        name: "Threshold",
        min: -20.0,
        max: 3.0,
        default: 1.0,
        unit: " dB",
        step: 0.1,
    },
];

/// Anything the audio thread can ask for a current parameter value.
///
/// Implementations must not block, allocate or panic.
pub trait ParameterSource {
    fn value(&self, id: ParamId) -> f32;
}

/// One reading of all five parameters, in their user-facing units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub drive_db: f32,
    pub output_db: f32,
    pub wet_pct: f32,
    pub dry_pct: f32,
    pub threshold_db: f32,
}

impl ParamSnapshot {
    /// Reads each parameter once, independently.
    #[inline]
    pub fn read<P: ParameterSource + ?Sized>(source: &P) -> Self {
        Self {
            drive_db: source.value(ParamId::Drive),
            output_db: source.value(ParamId::OutputLevel),
            wet_pct: source.value(ParamId::Wet),
            dry_pct: source.value(ParamId::Dry),
            threshold_db: source.value(ParamId::Threshold),
        }
    }

    pub fn defaults() -> Self {
        Self {
            drive_db: ParamId::Drive.spec().default,
            output_db: ParamId::OutputLevel.spec().default,
            wet_pct: ParamId::Wet.spec().default,
            dry_pct: ParamId::Dry.spec().default,
            threshold_db: ParamId::Threshold.spec().default,
        }
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ParameterSource for ParamSnapshot {
    fn value(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Drive => self.drive_db,
            ParamId::OutputLevel => self.output_db,
            ParamId::Wet => self.wet_pct,
            ParamId::Dry => self.dry_pct,
            ParamId::Threshold => self.threshold_db,
        }
    }
}

/// Framework-agnostic parameter storage: one atomic cell per parameter.
///
/// Share it behind an `Arc` between the writer and the audio thread.
pub struct ParameterSet {
    values: [AtomicF32; PARAM_COUNT],
}

impl ParameterSet {
    pub fn new() -> Self {
        Self {
            values: LAYOUT.map(|spec| AtomicF32::new(spec.default)),
        }
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()].load(Ordering::Relaxed)
    }

    /// Stores `value` as given. Clamping is the writer's job.
    #[inline]
    pub fn set(&self, id: ParamId, value: f32) {
        self.values[id.index()].store(value, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot::read(self)
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSource for ParameterSet {
    #[inline]
    fn value(&self, id: ParamId) -> f32 {
        self.get(id)
    }
}

impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for id in ParamId::ALL {
            map.entry(&id.key(), &self.get(id));
        }
        map.finish()
    }
}
