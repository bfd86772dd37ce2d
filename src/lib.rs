//! Soundlab - Sound Session Engine
//!
//! Soundlab keeps a session of short digitized sound buffers and lets
//! the caller transform, combine and extend them:
//! - A registry of single-channel sounds under unique generated ids
//! - A transform pipeline: cut, concatenate, resample, scale, levels
//! - A channel compositor merging sounds into synchronized stereo
//! - A stimulus generator for noises, tones and harmonic complexes
//!
//! # Architecture
//!
//! The engine is single-threaded and synchronous: every operation runs
//! to completion on the caller's thread, and every failure is returned
//! as a typed [`SoundlabError`] value. Validation always precedes
//! mutation, so the registry is never left half-updated.

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod session;

pub use error::{Result, SoundlabError};
