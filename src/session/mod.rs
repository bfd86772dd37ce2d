//! Session Module
//!
//! The in-memory model of one working session: the sound registry and
//! the stimulus generator that populates it.

pub mod registry;
pub mod sound;
pub mod stimulus;

pub use registry::SoundRegistry;
pub use sound::{ChannelRole, Sound, SoundInfo};
pub use stimulus::{
    generate_harmonic_complex, generate_noise, generate_sinusoid, HarmType,
    HarmonicComplexParams, MaskingBand, MaskingNoiseParams, NoiseColoration, NoiseParams,
    ToneParams,
};
