//! Engine Module
//!
//! The sound-processing core:
//! - Stereo buffer type and channel composition
//! - The transform pipeline (cut, concatenate, resample, scale, levels)
//! - WAV file I/O

pub mod buffer;
pub mod compose;
pub mod io;
pub mod transform;

pub use buffer::StereoBuffer;
pub use compose::{compose_stereo, resolve_mono, MonoResolution};
pub use io::{load_into_registry, load_wav, save_mono, save_stereo, LoadedWav};
pub use transform::{
    concatenate, concatenate_sounds, cut, cut_in_place, level_difference_db, resample,
    resample_in_place, scale_db, scale_in_place, ConcatOrder, DelayMode,
};
