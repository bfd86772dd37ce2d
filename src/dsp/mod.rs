//! DSP kernels
//!
//! The synthesis, filtering and measurement primitives the session
//! engine consumes. The engine calls these only through the signatures
//! exposed here; no registry or session state leaks into this layer.

pub mod filter;
pub mod level;
pub mod resample;
pub mod synth;

pub use filter::{apply_pink_tilt, band_pass_filter, phase_shift};
pub use level::{db_to_linear, linear_to_db, rms};
pub use resample::{resample_kernel, ResampleMethod, SmoothingWindow};
pub use synth::{
    binaural_tone, broadband_noise, complex_tone, gate, gate_wave, huggins_pitch,
    iterated_rippled_noise, itd_to_ipd, silence, simple_dichotic, steep_noise,
    DichoticDifference, Ear, EarRef, HarmPhase, HarmonicEar, PhaseRelationship,
    SimpleDichoticSpec,
};

/// Level in dB SPL produced by the output chain for a full-scale
/// sinusoid of amplitude 1. Synthesis levels are referenced to this.
pub const DEFAULT_MAX_LEVEL: f64 = 100.0;
