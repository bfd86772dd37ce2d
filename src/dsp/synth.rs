//! Stimulus synthesis kernels
//!
//! Broadband noise, pure/binaural tones, harmonic complexes and the
//! dichotic-pitch family. Every kernel returns a two-column
//! [`StereoBuffer`]; the channel(s) actually carrying signal are
//! selected by an [`Ear`] (or [`HarmonicEar`]) argument, the other
//! column stays silent.
//!
//! Durations and ramps are given in milliseconds; the total length of a
//! generated sound is `duration + 2 * ramp`. Levels are dB SPL
//! referenced to `max_level`, the SPL produced by a full-scale
//! sinusoid of amplitude 1.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dsp::filter::{apply_pink_tilt, phase_shift};
use crate::dsp::level::{db_to_linear, rms};
use crate::engine::buffer::StereoBuffer;

// ============================================================================
// Channel selection
// ============================================================================

/// Ear(s) a stimulus is generated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ear {
    Left,
    Right,
    Both,
}

/// Reference ear for an interaural difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarRef {
    Left,
    Right,
}

/// Ear selection for harmonic complexes
///
/// `OddLeft` routes odd-numbered harmonics to the left ear and even
/// ones to the right; `OddRight` is the mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmonicEar {
    Left,
    Right,
    Both,
    OddLeft,
    OddRight,
}

/// Phase relationship between the partials of a complex tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmPhase {
    Sine,
    Cosine,
    Alternating,
    Schroeder,
    Random,
}

/// Which frequency regions of a dichotic stimulus get the interaural
/// manipulation: the harmonic bands themselves (`NoSpi`) or the regions
/// between them (`NpiSo`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseRelationship {
    NoSpi,
    NpiSo,
}

/// Interaural manipulation applied to the harmonic bands of a
/// simple-dichotic stimulus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DichoticDifference {
    Ipd,
    Itd,
    Level,
}

// ============================================================================
// Small helpers
// ============================================================================

/// Milliseconds to a whole number of samples at `fs`
#[inline]
fn ms_to_samples(ms: f64, fs: u32) -> usize {
    (ms / 1000.0 * fs as f64).round() as usize
}

/// Convert an interaural time difference (seconds) to the equivalent
/// interaural phase difference (radians) at `freq`
#[inline]
pub fn itd_to_ipd(itd_secs: f64, freq: f64) -> f64 {
    itd_secs * freq * 2.0 * PI
}

/// Generate a stereo silence of the given duration
pub fn silence(duration_ms: f64, fs: u32) -> StereoBuffer {
    StereoBuffer::new(ms_to_samples(duration_ms, fs), fs)
}

/// Impose raised-cosine onset and offset ramps on a waveform in place
///
/// # Arguments
/// * `ramp_ms` - Ramp duration in milliseconds
/// * `wave` - The samples to gate
/// * `fs` - Sample rate of `wave`
pub fn gate_wave(ramp_ms: f64, wave: &mut [f64], fs: u32) {
    let n_ramp = ms_to_samples(ramp_ms, fs);
    if n_ramp == 0 || wave.len() < 2 * n_ramp {
        return;
    }
    let n_tot = wave.len();
    for t in 0..n_ramp {
        let env = (1.0 - (PI * t as f64 / n_ramp as f64).cos()) / 2.0;
        wave[t] *= env;
        let env = (1.0 + (PI * t as f64 / n_ramp as f64).cos()) / 2.0;
        wave[n_tot - n_ramp + t] *= env;
    }
}

/// Impose raised-cosine onset and offset ramps on both columns
pub fn gate(ramp_ms: f64, sig: &mut StereoBuffer, fs: u32) {
    gate_wave(ramp_ms, &mut sig.left, fs);
    gate_wave(ramp_ms, &mut sig.right, fs);
}

/// Route a gated mono waveform into the column(s) selected by `ear`
fn place(mono: Vec<f64>, ear: Ear, fs: u32) -> StereoBuffer {
    let mut snd = StereoBuffer::new(mono.len(), fs);
    match ear {
        Ear::Left => snd.left = mono,
        Ear::Right => snd.right = mono,
        Ear::Both => {
            snd.right = mono.clone();
            snd.left = mono;
        }
    }
    snd
}

// ============================================================================
// Noise
// ============================================================================

/// Synthesize a broadband noise
///
/// The amplitude is set so that the intensity spectrum level of the
/// noise is `spectrum_level` dB SPL: RMS = 10^(SL/20) * sqrt(fs/2),
/// the band being the full Nyquist range.
///
/// # Arguments
/// * `spectrum_level` - Intensity spectrum level in dB SPL
/// * `duration_ms` - Duration excluding ramps, in milliseconds
/// * `ramp_ms` - Onset/offset ramp duration in milliseconds
/// * `ear` - Ear(s) to generate the noise in
/// * `fs` - Sample rate in Hz
/// * `max_level` - dB SPL of a full-scale amplitude-1 sinusoid
pub fn broadband_noise(
    spectrum_level: f64,
    duration_ms: f64,
    ramp_ms: f64,
    ear: Ear,
    fs: u32,
    max_level: f64,
) -> StereoBuffer {
    let amp = (fs as f64 / 2.0).sqrt() * db_to_linear(spectrum_level - max_level);
    let n_tot = ms_to_samples(duration_ms, fs) + 2 * ms_to_samples(ramp_ms, fs);

    let mut rng = rand::thread_rng();
    let mut noise: Vec<f64> = (0..n_tot)
        .map(|_| {
            (rng.gen::<f64>() + rng.gen::<f64>()) - (rng.gen::<f64>() + rng.gen::<f64>())
        })
        .collect();

    // Scale so the peak amplitude is nominally ±1 (A = RMS * sqrt(2)),
    // then to the requested spectrum level.
    let noise_rms = rms(&noise);
    if noise_rms > 0.0 {
        let k = amp / (noise_rms * 2.0_f64.sqrt());
        for s in noise.iter_mut() {
            *s *= k;
        }
    }

    gate_wave(ramp_ms, &mut noise, fs);
    place(noise, ear, fs)
}

/// Iterated rippled noise
///
/// Starts from a broadband noise and applies `iterations` rounds of
/// delay-and-add with delay `1/f0`, producing a noise with a pitch at
/// `f0`. The result is rescaled to the RMS the underlying noise had
/// before iteration so `spectrum_level` keeps its meaning.
///
/// # Arguments
/// * `spectrum_level` - Spectrum level of the base noise in dB SPL
/// * `f0` - Pitch frequency in Hz; the delay is `fs / f0` samples
/// * `iterations` - Number of delay-and-add rounds
/// * `gain` - Gain applied to the delayed copy at each round
/// * `duration_ms` / `ramp_ms` / `ear` / `fs` / `max_level` - As for
///   [`broadband_noise`]
pub fn iterated_rippled_noise(
    spectrum_level: f64,
    f0: f64,
    iterations: u32,
    gain: f64,
    duration_ms: f64,
    ramp_ms: f64,
    ear: Ear,
    fs: u32,
    max_level: f64,
) -> StereoBuffer {
    let amp = (fs as f64 / 2.0).sqrt() * db_to_linear(spectrum_level - max_level);
    let n_tot = ms_to_samples(duration_ms, fs) + 2 * ms_to_samples(ramp_ms, fs);
    let delay = (fs as f64 / f0).round() as usize;

    let mut rng = rand::thread_rng();
    let mut noise: Vec<f64> = (0..n_tot)
        .map(|_| {
            (rng.gen::<f64>() + rng.gen::<f64>()) - (rng.gen::<f64>() + rng.gen::<f64>())
        })
        .collect();

    for _ in 0..iterations {
        let prev = noise.clone();
        for i in delay..n_tot {
            noise[i] += gain * prev[i - delay];
        }
    }

    let noise_rms = rms(&noise);
    if noise_rms > 0.0 {
        let target_rms = amp / 2.0_f64.sqrt();
        let k = target_rms / noise_rms;
        for s in noise.iter_mut() {
            *s *= k;
        }
    }

    gate_wave(ramp_ms, &mut noise, fs);
    place(noise, ear, fs)
}

/// Band-limited noise from a sum of random-phase sinusoids
///
/// Components are spaced by `1 / total_duration` Hz between
/// `frequency1` and `frequency2`, giving the noise steep spectral
/// edges. `level` is the spectrum level of the noise.
pub fn steep_noise(
    frequency1: f64,
    frequency2: f64,
    level: f64,
    duration_ms: f64,
    ramp_ms: f64,
    ear: Ear,
    fs: u32,
    max_level: f64,
) -> StereoBuffer {
    let tot_dur_secs = (duration_ms + 2.0 * ramp_ms) / 1000.0;
    let n_tot = ms_to_samples(duration_ms, fs) + 2 * ms_to_samples(ramp_ms, fs);

    let spacing = 1.0 / tot_dur_secs;
    let components = 1.0 + ((frequency2 - frequency1) / spacing).floor();
    // RMS = 10^(SL/20) * sqrt(NHz), NHz being the component spacing
    let amp = db_to_linear(level - max_level) * ((frequency2 - frequency1) / components).sqrt();

    let mut rng = rand::thread_rng();
    let mut noise = vec![0.0; n_tot];
    let mut f = frequency1;
    while f <= frequency2 + spacing / 2.0 {
        let phase = rng.gen::<f64>() * 2.0 * PI;
        let rad_freq = 2.0 * PI * f;
        for (i, s) in noise.iter_mut().enumerate() {
            *s += (phase + rad_freq * i as f64 / fs as f64).sin();
        }
        f += spacing;
    }

    for s in noise.iter_mut() {
        *s *= amp;
    }
    gate_wave(ramp_ms, &mut noise, fs);
    place(noise, ear, fs)
}

// ============================================================================
// Tones
// ============================================================================

/// Synthesize a pure tone with optional interaural time and level
/// differences
///
/// `level` is the tone level in the reference channel; when `ild_db` is
/// non-zero the other channel is raised or lowered by `ild_db`. The
/// `itd_us` is realized as a phase offset at the tone frequency.
/// Interaural differences require `ear == Both` and a reference ear; a
/// missing reference is logged and the difference is not applied.
///
/// # Arguments
/// * `frequency` - Tone frequency in Hz
/// * `phase` - Starting phase in radians
/// * `level` - Tone level in dB SPL
/// * `duration_ms` - Duration excluding ramps, in milliseconds
/// * `ramp_ms` - Onset/offset ramp duration in milliseconds
/// * `ear` - Ear(s) to generate the tone in
/// * `itd_us` - Interaural time difference in microseconds
/// * `itd_ref` - Reference ear for the ITD
/// * `ild_db` - Interaural level difference in dB
/// * `ild_ref` - Reference ear for the ILD
/// * `fs` - Sample rate in Hz
/// * `max_level` - dB SPL of a full-scale amplitude-1 sinusoid
#[allow(clippy::too_many_arguments)]
pub fn binaural_tone(
    frequency: f64,
    phase: f64,
    level: f64,
    duration_ms: f64,
    ramp_ms: f64,
    ear: Ear,
    itd_us: f64,
    itd_ref: Option<EarRef>,
    ild_db: f64,
    ild_ref: Option<EarRef>,
    fs: u32,
    max_level: f64,
) -> StereoBuffer {
    if itd_us != 0.0 && itd_ref.is_none() {
        warn!("itd requested without a reference ear; no itd will be applied");
    }
    if ild_db != 0.0 && ild_ref.is_none() {
        warn!("ild requested without a reference ear; no ild will be applied");
    }

    let n_tot = ms_to_samples(duration_ms, fs) + 2 * ms_to_samples(ramp_ms, fs);
    let omega = 2.0 * PI * frequency;

    let mut snd = match ear {
        Ear::Both => {
            let ipd = itd_to_ipd(itd_us / 1.0e6, frequency);
            let (amp_left, amp_right) = match ild_ref {
                Some(EarRef::Right) => (
                    db_to_linear(level + ild_db - max_level),
                    db_to_linear(level - max_level),
                ),
                Some(EarRef::Left) => (
                    db_to_linear(level - max_level),
                    db_to_linear(level + ild_db - max_level),
                ),
                None => {
                    let amp = db_to_linear(level - max_level);
                    (amp, amp)
                }
            };
            let (phase_left, phase_right) = match itd_ref {
                Some(EarRef::Right) => (phase + ipd, phase),
                Some(EarRef::Left) => (phase, phase + ipd),
                None => (phase, phase),
            };

            let mut snd = StereoBuffer::new(n_tot, fs);
            for i in 0..n_tot {
                let t = i as f64 / fs as f64;
                snd.left[i] = amp_left * (omega * t + phase_left).sin();
                snd.right[i] = amp_right * (omega * t + phase_right).sin();
            }
            snd
        }
        single => {
            let amp = db_to_linear(level - max_level);
            let tone: Vec<f64> = (0..n_tot)
                .map(|i| amp * (omega * i as f64 / fs as f64 + phase).sin())
                .collect();
            place(tone, single, fs)
        }
    };

    gate(ramp_ms, &mut snd, fs);
    snd
}

/// Synthesize a harmonic complex tone
///
/// Harmonics `low_harm..=high_harm` of `f0` are summed with the phase
/// relationship given by `harm_phase`. `stretch_pct` shifts every
/// harmonic by a fixed `f0 * stretch_pct / 100` Hz, making the complex
/// inharmonic when non-zero. `level` is the level of each partial.
#[allow(clippy::too_many_arguments)]
pub fn complex_tone(
    f0: f64,
    harm_phase: HarmPhase,
    low_harm: u32,
    high_harm: u32,
    stretch_pct: f64,
    level: f64,
    duration_ms: f64,
    ramp_ms: f64,
    ear: HarmonicEar,
    fs: u32,
    max_level: f64,
) -> StereoBuffer {
    let amp = db_to_linear(level - max_level);
    let stretch_hz = f0 * stretch_pct / 100.0;
    let n_tot = ms_to_samples(duration_ms, fs) + 2 * ms_to_samples(ramp_ms, fs);

    let mut rng = rand::thread_rng();
    let mut tone_odd = vec![0.0; n_tot];
    let mut tone_even = vec![0.0; n_tot];

    // Odd/even split is only consumed by the Odd* ears; for the plain
    // ears the two halves are summed back together below.
    for h in low_harm..=high_harm {
        let freq = f0 * h as f64 + stretch_hz;
        let omega = 2.0 * PI * freq;
        let (phase, use_cos) = match harm_phase {
            HarmPhase::Sine => (0.0, false),
            HarmPhase::Cosine => (0.0, true),
            HarmPhase::Alternating => (0.0, h % 2 == 1),
            HarmPhase::Schroeder => {
                (-PI * h as f64 * (h as f64 - 1.0) / high_harm as f64, false)
            }
            HarmPhase::Random => (rng.gen::<f64>() * 2.0 * PI, false),
        };
        let target = if h % 2 == 1 {
            &mut tone_odd
        } else {
            &mut tone_even
        };
        for (i, s) in target.iter_mut().enumerate() {
            let arg = omega * i as f64 / fs as f64 + phase;
            *s += if use_cos { arg.cos() } else { arg.sin() };
        }
    }

    let mut snd = StereoBuffer::new(n_tot, fs);
    match ear {
        HarmonicEar::Left | HarmonicEar::Right | HarmonicEar::Both => {
            let tone: Vec<f64> = tone_odd
                .iter()
                .zip(tone_even.iter())
                .map(|(o, e)| amp * (o + e))
                .collect();
            match ear {
                HarmonicEar::Left => snd.left = tone,
                HarmonicEar::Right => snd.right = tone,
                _ => {
                    snd.right = tone.clone();
                    snd.left = tone;
                }
            }
        }
        HarmonicEar::OddLeft => {
            snd.left = tone_odd.iter().map(|s| amp * s).collect();
            snd.right = tone_even.iter().map(|s| amp * s).collect();
        }
        HarmonicEar::OddRight => {
            snd.right = tone_odd.iter().map(|s| amp * s).collect();
            snd.left = tone_even.iter().map(|s| amp * s).collect();
        }
    }

    gate(ramp_ms, &mut snd, fs);
    snd
}

// ============================================================================
// Dichotic pitches
// ============================================================================

/// Synthesize a Huggins pitch
///
/// A diotic broadband noise (optionally pink-tilted) whose phase is
/// shifted by pi in one ear within narrow bands around the harmonics of
/// `f0`, producing a dichotic pitch at `f0`.
///
/// With `PhaseRelationship::NoSpi` the bands themselves are shifted;
/// with `NpiSo` the regions between the bands are shifted instead.
#[allow(clippy::too_many_arguments)]
pub fn huggins_pitch(
    f0: f64,
    low_harm: u32,
    high_harm: u32,
    spectrum_level: f64,
    bandwidth_hz: f64,
    phase_relationship: PhaseRelationship,
    pink: bool,
    duration_ms: f64,
    ramp_ms: f64,
    fs: u32,
    max_level: f64,
) -> StereoBuffer {
    // Ungated noise covering the full stimulus length; the ramps are
    // imposed after the phase manipulation.
    let mut tone = broadband_noise(
        spectrum_level,
        duration_ms + 2.0 * ramp_ms,
        0.0,
        Ear::Both,
        fs,
        max_level,
    );
    if pink {
        apply_pink_tilt(&mut tone, 1000.0);
    }

    for h in low_harm..=high_harm {
        let center = f0 * h as f64;
        match phase_relationship {
            PhaseRelationship::NoSpi => {
                tone = phase_shift(
                    &tone,
                    center - bandwidth_hz / 2.0,
                    center + bandwidth_hz / 2.0,
                    PI,
                    Ear::Left,
                );
            }
            PhaseRelationship::NpiSo => {
                let lo = if h == low_harm {
                    10.0
                } else {
                    f0 * (h as f64 - 1.0) + bandwidth_hz / 2.0
                };
                tone = phase_shift(&tone, lo, center - bandwidth_hz / 2.0, PI, Ear::Left);
            }
        }
    }

    gate(ramp_ms, &mut tone, fs);
    tone
}

/// Parameters for [`simple_dichotic`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleDichoticSpec {
    /// Centre frequency of the fundamental in Hz
    pub f0: f64,
    /// Lowest harmonic component number
    pub low_harm: u32,
    /// Highest harmonic component number
    pub high_harm: u32,
    /// Level of each sinusoidal component of the background noise
    pub cmp_level: f64,
    /// Lowest noise component frequency in Hz
    pub low_freq: f64,
    /// Highest noise component frequency in Hz
    pub high_freq: f64,
    /// Spacing between noise components in cents
    pub spacing_cents: f64,
    /// Width of each harmonic band in cents
    pub sig_bandwidth_cents: f64,
    /// Shift the harmonic bands or the regions between them
    pub phase_relationship: PhaseRelationship,
    /// Interaural manipulation applied to the selected bands
    pub dichotic_difference: DichoticDifference,
    /// Interaural time difference in microseconds (for `Itd`)
    pub itd_us: f64,
    /// Interaural phase difference in radians (for `Ipd`)
    pub ipd_rad: f64,
    /// Component level inside the bands (for `Level`)
    pub narrow_band_cmp_level: f64,
    /// Duration excluding ramps, in milliseconds
    pub duration_ms: f64,
    /// Onset/offset ramp duration in milliseconds
    pub ramp_ms: f64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// dB SPL of a full-scale amplitude-1 sinusoid
    pub max_level: f64,
}

/// Generate harmonically related dichotic pitches, or narrowband tones
/// in noise
///
/// Builds a pink-ish noise from a cloud of log-spaced random-phase
/// sinusoids, then applies an IPD, an ITD or a level increase to the
/// components falling in harmonically related narrow bands. IPD/ITD
/// give a dichotic pitch; a level increase gives a pitch that is also
/// audible monaurally.
pub fn simple_dichotic(spec: &SimpleDichoticSpec) -> StereoBuffer {
    let fs = spec.sample_rate;
    let n_tot = ms_to_samples(spec.duration_ms, fs) + 2 * ms_to_samples(spec.ramp_ms, fs);

    let noise_bandwidth_cents = 1200.0 * (spec.high_freq / spec.low_freq).log2();
    let n_components = (noise_bandwidth_cents / spec.spacing_cents).floor() as usize;
    let amp = db_to_linear(spec.cmp_level - spec.max_level);

    let mut rng = rand::thread_rng();
    let mut base = vec![0.0; n_tot];
    let mut shifted = vec![0.0; n_tot];

    let mut freq = spec.low_freq;
    let step = 2.0_f64.powf(spec.spacing_cents / 1200.0);
    for _ in 0..n_components {
        let phase = rng.gen::<f64>() * 2.0 * PI;
        let omega = 2.0 * PI * freq;
        let in_band = component_in_selected_region(freq, spec);

        let (amp_shifted, phase_shift_rad) = if in_band {
            match spec.dichotic_difference {
                DichoticDifference::Ipd => (amp, spec.ipd_rad),
                DichoticDifference::Itd => (amp, itd_to_ipd(spec.itd_us / 1.0e6, freq)),
                DichoticDifference::Level => {
                    (db_to_linear(spec.narrow_band_cmp_level - spec.max_level), 0.0)
                }
            }
        } else {
            (amp, 0.0)
        };
        // For the Level difference the raised components go to both ears.
        let amp_base = if in_band
            && spec.dichotic_difference == DichoticDifference::Level
        {
            amp_shifted
        } else {
            amp
        };

        for i in 0..n_tot {
            let t = i as f64 / fs as f64;
            base[i] += amp_base * (omega * t + phase).sin();
            shifted[i] += amp_shifted * (omega * t + phase + phase_shift_rad).sin();
        }
        freq *= step;
    }

    let mut snd = StereoBuffer {
        left: base,
        right: shifted,
        sample_rate: fs,
    };
    gate(spec.ramp_ms, &mut snd, fs);
    snd
}

/// Whether a noise component at `freq` falls in a region selected for
/// the interaural manipulation
fn component_in_selected_region(freq: f64, spec: &SimpleDichoticSpec) -> bool {
    let half_bw = spec.sig_bandwidth_cents / 2.0 / 1200.0;
    for h in spec.low_harm..=spec.high_harm {
        let center = spec.f0 * h as f64;
        let lo = center * 2.0_f64.powf(-half_bw);
        let hi = center * 2.0_f64.powf(half_bw);
        match spec.phase_relationship {
            PhaseRelationship::NoSpi => {
                if freq > lo && freq < hi {
                    return true;
                }
            }
            PhaseRelationship::NpiSo => {
                let prev_hi = if h == spec.low_harm {
                    spec.low_freq
                } else {
                    spec.f0 * (h as f64 - 1.0) * 2.0_f64.powf(half_bw)
                };
                if freq > prev_hi && freq < lo {
                    return true;
                }
                if h == spec.high_harm && freq > hi {
                    return true;
                }
            }
        }
    }
    false
}

// ============================================================================
// Tests
// ============================================================================
