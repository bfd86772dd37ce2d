//! CLI Module
//!
//! Command-line front-end for the Soundlab session engine. View
//! plumbing only: argument parsing and printing live here, every
//! invariant lives in the engine.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dsp::synth::{Ear, EarRef, HarmonicEar};
use crate::session::stimulus::{HarmType, NoiseColoration};

/// Soundlab - sound session engine
#[derive(Parser, Debug)]
#[command(name = "soundlab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a broadband noise and save it as a stereo WAV
    #[command(name = "gen-noise")]
    GenNoise {
        /// Output WAV path
        out: PathBuf,

        /// Intensity spectrum level in dB SPL
        #[arg(long, default_value_t = 40.0)]
        spectrum_level: f64,

        /// Duration excluding ramps, in milliseconds
        #[arg(long, default_value_t = 180.0)]
        duration: f64,

        /// Onset/offset ramp duration in milliseconds
        #[arg(long, default_value_t = 10.0)]
        ramps: f64,

        /// Ear(s) to generate in
        #[arg(long, value_enum, default_value = "both")]
        ear: EarArg,

        /// Apply a pink spectral tilt
        #[arg(long)]
        pink: bool,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 48000)]
        rate: u32,

        /// Output bit depth: 16, 24 or 32
        #[arg(long, default_value_t = 32)]
        bits: u16,
    },

    /// Generate a pure tone (optionally binaural) and save it
    #[command(name = "gen-tone")]
    GenTone {
        /// Output WAV path
        out: PathBuf,

        /// Tone frequency in Hz
        #[arg(long, default_value_t = 440.0)]
        frequency: f64,

        /// Tone level in dB SPL
        #[arg(long, default_value_t = 65.0)]
        level: f64,

        /// Duration excluding ramps, in milliseconds
        #[arg(long, default_value_t = 180.0)]
        duration: f64,

        /// Onset/offset ramp duration in milliseconds
        #[arg(long, default_value_t = 10.0)]
        ramps: f64,

        /// Ear(s) to generate in
        #[arg(long, value_enum, default_value = "both")]
        ear: EarArg,

        /// Interaural time difference in microseconds (ear = both)
        #[arg(long, default_value_t = 0.0)]
        itd: f64,

        /// Reference ear for the ITD
        #[arg(long, value_enum)]
        itd_ref: Option<EarRefArg>,

        /// Interaural level difference in dB (ear = both)
        #[arg(long, default_value_t = 0.0)]
        ild: f64,

        /// Reference ear for the ILD
        #[arg(long, value_enum)]
        ild_ref: Option<EarRefArg>,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 48000)]
        rate: u32,

        /// Output bit depth: 16, 24 or 32
        #[arg(long, default_value_t = 32)]
        bits: u16,
    },

    /// Generate a harmonic complex and save it
    #[command(name = "gen-harm")]
    GenHarm {
        /// Output WAV path
        out: PathBuf,

        /// Synthesis family
        #[arg(long, value_enum, default_value = "sinusoid")]
        harm_type: HarmTypeArg,

        /// Fundamental frequency in Hz
        #[arg(long, default_value_t = 440.0)]
        f0: f64,

        /// Lowest harmonic number
        #[arg(long, default_value_t = 1)]
        low_harm: u32,

        /// Highest harmonic number
        #[arg(long, default_value_t = 10)]
        high_harm: u32,

        /// Level in dB SPL
        #[arg(long, default_value_t = 55.0)]
        level: f64,

        /// Duration excluding ramps, in milliseconds
        #[arg(long, default_value_t = 180.0)]
        duration: f64,

        /// Onset/offset ramp duration in milliseconds
        #[arg(long, default_value_t = 10.0)]
        ramps: f64,

        /// Ear selection (odd-left/odd-right route alternating harmonics)
        #[arg(long, value_enum, default_value = "both")]
        ear: HarmonicEarArg,

        /// Shaping-filter pass band low edge in Hz
        #[arg(long)]
        filter_low: Option<f64>,

        /// Shaping-filter pass band high edge in Hz
        #[arg(long)]
        filter_high: Option<f64>,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 48000)]
        rate: u32,

        /// Output bit depth: 16, 24 or 32
        #[arg(long, default_value_t = 32)]
        bits: u16,
    },

    /// Print metadata of a WAV file as JSON
    #[command(name = "info")]
    Info {
        /// Input WAV path
        file: PathBuf,
    },

    /// Excise a sample range from a sound file
    #[command(name = "cut")]
    Cut {
        /// Input WAV path
        input: PathBuf,

        /// Output WAV path
        out: PathBuf,

        /// First sample of the region to remove
        #[arg(long)]
        from: usize,

        /// One past the last sample of the region to remove
        #[arg(long)]
        to: usize,

        /// Output bit depth: 16, 24 or 32
        #[arg(long, default_value_t = 32)]
        bits: u16,
    },

    /// Resample a sound file to a new rate
    #[command(name = "resample")]
    Resample {
        /// Input WAV path
        input: PathBuf,

        /// Output WAV path
        out: PathBuf,

        /// New sample rate in Hz
        #[arg(long)]
        rate: u32,

        /// Smoothing window: none, hamming, hanning, blackman, bartlett
        #[arg(long, default_value = "none")]
        window: String,

        /// Output bit depth: 16, 24 or 32
        #[arg(long, default_value_t = 32)]
        bits: u16,
    },

    /// Scale a sound file by a number of decibels
    #[command(name = "scale")]
    Scale {
        /// Input WAV path
        input: PathBuf,

        /// Output WAV path
        out: PathBuf,

        /// Gain in dB (negative attenuates)
        #[arg(long)]
        db: f64,

        /// Output bit depth: 16, 24 or 32
        #[arg(long, default_value_t = 32)]
        bits: u16,
    },

    /// Print the level difference in dB between two sound files
    #[command(name = "compare")]
    Compare {
        /// First WAV file (positive result means this one is louder)
        a: PathBuf,

        /// Second WAV file (the reference)
        b: PathBuf,
    },

    /// Mix several sound files into one stereo WAV
    #[command(name = "mix")]
    Mix {
        /// Input WAV paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output WAV path
        #[arg(long)]
        out: PathBuf,

        /// Output bit depth: 16, 24 or 32
        #[arg(long, default_value_t = 32)]
        bits: u16,
    },
}

/// Ear selection argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EarArg {
    Left,
    Right,
    Both,
}

impl From<EarArg> for Ear {
    fn from(arg: EarArg) -> Self {
        match arg {
            EarArg::Left => Ear::Left,
            EarArg::Right => Ear::Right,
            EarArg::Both => Ear::Both,
        }
    }
}

/// Reference-ear argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EarRefArg {
    Left,
    Right,
}

impl From<EarRefArg> for EarRef {
    fn from(arg: EarRefArg) -> Self {
        match arg {
            EarRefArg::Left => EarRef::Left,
            EarRefArg::Right => EarRef::Right,
        }
    }
}

/// Harmonic-complex ear argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum HarmonicEarArg {
    Left,
    Right,
    Both,
    OddLeft,
    OddRight,
}

impl From<HarmonicEarArg> for HarmonicEar {
    fn from(arg: HarmonicEarArg) -> Self {
        match arg {
            HarmonicEarArg::Left => HarmonicEar::Left,
            HarmonicEarArg::Right => HarmonicEar::Right,
            HarmonicEarArg::Both => HarmonicEar::Both,
            HarmonicEarArg::OddLeft => HarmonicEar::OddLeft,
            HarmonicEarArg::OddRight => HarmonicEar::OddRight,
        }
    }
}

/// Harmonic-complex family argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum HarmTypeArg {
    Sinusoid,
    NarrowbandNoise,
    Irn,
    Huggins,
    SimpleDichotic,
    Narrowband2,
}

impl From<HarmTypeArg> for HarmType {
    fn from(arg: HarmTypeArg) -> Self {
        match arg {
            HarmTypeArg::Sinusoid => HarmType::Sinusoid,
            HarmTypeArg::NarrowbandNoise => HarmType::NarrowbandNoise,
            HarmTypeArg::Irn => HarmType::Irn,
            HarmTypeArg::Huggins => HarmType::Huggins,
            HarmTypeArg::SimpleDichotic => HarmType::SimpleDichotic,
            HarmTypeArg::Narrowband2 => HarmType::Narrowband2,
        }
    }
}

/// Noise coloration helper used by gen-noise's `--pink` flag
pub fn coloration(pink: bool) -> NoiseColoration {
    if pink {
        NoiseColoration::Pink
    } else {
        NoiseColoration::White
    }
}
