//! Stimulus generator
//!
//! Translates validated parameter sets into new registry sounds,
//! always going through the DSP kernels for the waveform synthesis
//! itself. Every generator validates its full parameter set before any
//! synthesis, then splits the stereo synthesis result into per-channel
//! sounds through one resolution function, and inserts them through
//! the single [`SoundRegistry::insert`] entry point.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dsp::filter::band_pass_filter_stereo;
use crate::dsp::synth::{
    binaural_tone, broadband_noise, complex_tone, gate, huggins_pitch, iterated_rippled_noise,
    simple_dichotic, steep_noise, DichoticDifference, Ear, EarRef, HarmPhase, HarmonicEar,
    PhaseRelationship, SimpleDichoticSpec,
};
use crate::dsp::{apply_pink_tilt, DEFAULT_MAX_LEVEL};
use crate::engine::buffer::StereoBuffer;
use crate::error::{Result, SoundlabError};
use crate::session::registry::SoundRegistry;
use crate::session::sound::{ChannelRole, Sound};

/// Ratio of the lower stop-band edge to the pass-band edge of the
/// shaping filter
const FILTER_LOW_STOP_RATIO: f64 = 0.8;

/// Ratio of the upper stop-band edge to the pass-band edge of the
/// shaping filter
const FILTER_HIGH_STOP_RATIO: f64 = 1.2;

/// Spectral coloration of synthesized noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseColoration {
    #[default]
    White,
    Pink,
}

// ============================================================================
// Broadband noise
// ============================================================================

/// Parameters for [`generate_noise`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Base label for the emitted sounds
    pub label: String,
    /// Intensity spectrum level in dB SPL
    pub spectrum_level: f64,
    /// Duration excluding ramps, in milliseconds
    pub duration_ms: f64,
    /// Onset/offset ramp duration in milliseconds
    pub ramps_ms: f64,
    /// Ear(s) to generate the noise in
    pub ear: Ear,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Spectral coloration
    pub coloration: NoiseColoration,
    /// dB SPL of a full-scale amplitude-1 sinusoid
    pub max_level: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            label: "Noise".to_string(),
            spectrum_level: 40.0,
            duration_ms: 180.0,
            ramps_ms: 10.0,
            ear: Ear::Both,
            sample_rate: 48000,
            coloration: NoiseColoration::White,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl NoiseParams {
    fn validate(&self) -> Result<()> {
        validate_timing(self.duration_ms, self.ramps_ms, self.sample_rate)?;
        validate_finite("spectrum_level", self.spectrum_level)?;
        Ok(())
    }
}

/// Synthesize a broadband noise and insert one sound per requested ear
///
/// # Returns
/// The ids of the inserted sounds: two for `Ear::Both`, one otherwise
pub fn generate_noise(registry: &mut SoundRegistry, params: &NoiseParams) -> Result<Vec<String>> {
    params.validate()?;

    let mut synth = broadband_noise(
        params.spectrum_level,
        params.duration_ms,
        params.ramps_ms,
        params.ear,
        params.sample_rate,
        params.max_level,
    );
    if params.coloration == NoiseColoration::Pink {
        apply_pink_tilt(&mut synth, 1000.0);
    }

    info!(label = %params.label, ear = ?params.ear, "generated noise");
    split_and_insert(registry, synth, params.ear.into(), &params.label)
}

// ============================================================================
// Sinusoid
// ============================================================================

/// Parameters for [`generate_sinusoid`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneParams {
    /// Base label for the emitted sounds
    pub label: String,
    /// Tone frequency in Hz
    pub frequency: f64,
    /// Starting phase in radians
    pub phase: f64,
    /// Tone level in dB SPL (reference channel when an ILD is set)
    pub level: f64,
    /// Duration excluding ramps, in milliseconds
    pub duration_ms: f64,
    /// Onset/offset ramp duration in milliseconds
    pub ramps_ms: f64,
    /// Ear(s) to generate the tone in
    pub ear: Ear,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interaural time difference in microseconds
    pub itd_us: f64,
    /// Reference ear for the ITD
    pub itd_ref: Option<EarRef>,
    /// Interaural level difference in dB
    pub ild_db: f64,
    /// Reference ear for the ILD
    pub ild_ref: Option<EarRef>,
    /// dB SPL of a full-scale amplitude-1 sinusoid
    pub max_level: f64,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            label: "Tone".to_string(),
            frequency: 440.0,
            phase: 0.0,
            level: 65.0,
            duration_ms: 180.0,
            ramps_ms: 10.0,
            ear: Ear::Both,
            sample_rate: 48000,
            itd_us: 0.0,
            itd_ref: None,
            ild_db: 0.0,
            ild_ref: None,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl ToneParams {
    fn validate(&self) -> Result<()> {
        validate_timing(self.duration_ms, self.ramps_ms, self.sample_rate)?;
        validate_finite("level", self.level)?;
        if !(self.frequency > 0.0 && self.frequency < self.sample_rate as f64 / 2.0) {
            return Err(SoundlabError::InvalidParameter {
                reason: format!(
                    "frequency must lie in (0, nyquist), got {} Hz at fs {}",
                    self.frequency, self.sample_rate
                ),
            });
        }
        Ok(())
    }
}

/// Synthesize a pure tone, with binaural cues when `ear == Both`
///
/// The binaural cues are only meaningful for a diotic tone; for a
/// single-ear tone they are ignored (logged and zeroed).
pub fn generate_sinusoid(registry: &mut SoundRegistry, params: &ToneParams) -> Result<Vec<String>> {
    params.validate()?;

    let (itd_us, itd_ref, ild_db, ild_ref) = if params.ear == Ear::Both {
        (params.itd_us, params.itd_ref, params.ild_db, params.ild_ref)
    } else {
        if params.itd_us != 0.0 || params.ild_db != 0.0 {
            warn!(ear = ?params.ear, "binaural cues ignored for single-ear tone");
        }
        (0.0, None, 0.0, None)
    };

    let synth = binaural_tone(
        params.frequency,
        params.phase,
        params.level,
        params.duration_ms,
        params.ramps_ms,
        params.ear,
        itd_us,
        itd_ref,
        ild_db,
        ild_ref,
        params.sample_rate,
        params.max_level,
    );

    info!(label = %params.label, freq = params.frequency, "generated sinusoid");
    split_and_insert(registry, synth, params.ear.into(), &params.label)
}

// ============================================================================
// Harmonic complex
// ============================================================================

/// Synthesis family of a harmonic complex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmType {
    /// Sum of sinusoidal harmonics
    Sinusoid,
    /// Harmonics built from narrow noise bands
    NarrowbandNoise,
    /// Iterated rippled noise
    Irn,
    /// Huggins pitch (phase transitions in diotic noise)
    Huggins,
    /// Dichotic pitch from IPD/ITD on harmonic bands of a noise cloud
    SimpleDichotic,
    /// Narrowband tones in noise (level-difference variant)
    Narrowband2,
}

impl HarmType {
    /// The two variants that skip the band-pass shaping filter
    fn is_dichotic_cloud(&self) -> bool {
        matches!(self, HarmType::SimpleDichotic | HarmType::Narrowband2)
    }
}

/// One masking-noise sub-band
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaskingBand {
    /// Lower pass-band edge in Hz
    pub low_hz: f64,
    /// Upper pass-band edge in Hz
    pub high_hz: f64,
    /// Spectrum level of the band in dB SPL
    pub level: f64,
}

/// Masking noise added to a harmonic complex before emission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingNoiseParams {
    /// Spectral coloration of the masker
    pub coloration: NoiseColoration,
    /// First band-limited component
    pub band1: MaskingBand,
    /// Second band-limited component, at its own level
    pub band2: MaskingBand,
}

/// Parameters for [`generate_harmonic_complex`]
///
/// Each [`HarmType`] consumes its own subset of the fields; validation
/// checks the subset the selected type needs and ignores the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmonicComplexParams {
    /// Base label for the emitted sounds
    pub label: String,
    /// Synthesis family
    pub harm_type: HarmType,
    /// Fundamental frequency in Hz
    pub f0: f64,
    /// Lowest harmonic component number (1-based)
    pub low_harm: u32,
    /// Highest harmonic component number
    pub high_harm: u32,
    /// Level in dB SPL: per-partial for Sinusoid, spectrum level for
    /// the noise-derived families, component level for the clouds
    pub level: f64,
    /// Duration excluding ramps, in milliseconds
    pub duration_ms: f64,
    /// Onset/offset ramp duration in milliseconds
    pub ramps_ms: f64,
    /// Ear selection; Odd* routes alternating harmonics
    pub ear: HarmonicEar,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// dB SPL of a full-scale amplitude-1 sinusoid
    pub max_level: f64,

    // Sinusoid family
    /// Phase relationship between partials
    pub harm_phase: HarmPhase,
    /// Harmonic stretch in %F0
    pub stretch_pct: f64,

    // Narrowband-noise family
    /// Width of each noise band in Hz
    pub bandwidth_hz: f64,

    // IRN family
    /// Number of delay-and-add iterations
    pub irn_iterations: u32,
    /// Gain of the delayed copy per iteration
    pub irn_gain: f64,

    // Huggins / dichotic families
    /// Shift the harmonic bands or the regions between them
    pub phase_relationship: PhaseRelationship,
    /// Coloration of the underlying noise
    pub coloration: NoiseColoration,
    /// Manipulation applied to the bands (SimpleDichotic: Ipd or Itd)
    pub dichotic_difference: DichoticDifference,
    /// Interaural time difference in microseconds
    pub itd_us: f64,
    /// Interaural phase difference in radians
    pub ipd_rad: f64,
    /// Component level inside the bands (Narrowband2)
    pub narrow_band_cmp_level: f64,
    /// Lowest noise-cloud component frequency in Hz
    pub low_freq: f64,
    /// Highest noise-cloud component frequency in Hz
    pub high_freq: f64,
    /// Noise-cloud component spacing in cents
    pub spacing_cents: f64,
    /// Width of each harmonic band in cents
    pub bandwidth_cents: f64,

    // Band-pass shaping (all families except the dichotic clouds)
    /// Lower pass-band edge of the shaping filter in Hz
    pub filter_low_hz: f64,
    /// Upper pass-band edge of the shaping filter in Hz
    pub filter_high_hz: f64,

    /// Optional masking noise added before emission
    pub masking_noise: Option<MaskingNoiseParams>,
}

impl Default for HarmonicComplexParams {
    fn default() -> Self {
        Self {
            label: "Harmonic Complex".to_string(),
            harm_type: HarmType::Sinusoid,
            f0: 440.0,
            low_harm: 1,
            high_harm: 10,
            level: 55.0,
            duration_ms: 180.0,
            ramps_ms: 10.0,
            ear: HarmonicEar::Both,
            sample_rate: 48000,
            max_level: DEFAULT_MAX_LEVEL,
            harm_phase: HarmPhase::Sine,
            stretch_pct: 0.0,
            bandwidth_hz: 80.0,
            irn_iterations: 8,
            irn_gain: 1.0,
            phase_relationship: PhaseRelationship::NoSpi,
            coloration: NoiseColoration::White,
            dichotic_difference: DichoticDifference::Ipd,
            itd_us: 0.0,
            ipd_rad: std::f64::consts::PI,
            narrow_band_cmp_level: 40.0,
            low_freq: 40.0,
            high_freq: 2000.0,
            spacing_cents: 10.0,
            bandwidth_cents: 100.0,
            filter_low_hz: 440.0,
            filter_high_hz: 4400.0,
            masking_noise: None,
        }
    }
}

impl HarmonicComplexParams {
    fn validate(&self) -> Result<()> {
        validate_timing(self.duration_ms, self.ramps_ms, self.sample_rate)?;
        validate_finite("level", self.level)?;
        if self.f0 <= 0.0 {
            return invalid("f0 must be positive");
        }
        if self.low_harm == 0 || self.low_harm > self.high_harm {
            return invalid("harmonic range requires 1 <= low_harm <= high_harm");
        }

        match self.harm_type {
            HarmType::Sinusoid => {}
            HarmType::NarrowbandNoise => {
                if self.bandwidth_hz <= 0.0 {
                    return invalid("bandwidth_hz must be positive for narrowband-noise harmonics");
                }
            }
            HarmType::Irn => {
                if self.irn_iterations == 0 {
                    return invalid("irn_iterations must be at least 1");
                }
            }
            HarmType::Huggins => {
                if self.bandwidth_hz <= 0.0 {
                    return invalid("bandwidth_hz must be positive for a Huggins pitch");
                }
            }
            HarmType::SimpleDichotic | HarmType::Narrowband2 => {
                if !(self.low_freq > 0.0 && self.low_freq < self.high_freq) {
                    return invalid("noise cloud requires 0 < low_freq < high_freq");
                }
                if self.spacing_cents <= 0.0 || self.bandwidth_cents <= 0.0 {
                    return invalid("spacing_cents and bandwidth_cents must be positive");
                }
                if self.harm_type == HarmType::SimpleDichotic
                    && self.dichotic_difference == DichoticDifference::Level
                {
                    return invalid(
                        "SimpleDichotic takes an Ipd or Itd difference; use Narrowband2 for the level variant",
                    );
                }
            }
        }

        // The inherently binaural variants have no single-ear rendition
        let binaural_only = matches!(
            self.harm_type,
            HarmType::Huggins | HarmType::SimpleDichotic | HarmType::Narrowband2
        );
        if binaural_only && self.ear != HarmonicEar::Both {
            return invalid("this synthesis family is binaural; ear must be Both");
        }
        // Alternating-harmonic routing only exists where harmonics do
        let odd = matches!(self.ear, HarmonicEar::OddLeft | HarmonicEar::OddRight);
        if odd && !matches!(self.harm_type, HarmType::Sinusoid | HarmType::NarrowbandNoise) {
            return invalid("Odd ear routing requires a Sinusoid or NarrowbandNoise complex");
        }

        if !self.harm_type.is_dichotic_cloud() {
            let nyquist = self.sample_rate as f64 / 2.0;
            if !(self.filter_low_hz > 0.0
                && self.filter_low_hz < self.filter_high_hz
                && self.filter_high_hz * FILTER_HIGH_STOP_RATIO < nyquist)
            {
                return invalid("shaping filter requires 0 < filter_low_hz < filter_high_hz, with the upper stop edge below nyquist");
            }
        }

        if let Some(masker) = &self.masking_noise {
            for (name, band) in [("band1", &masker.band1), ("band2", &masker.band2)] {
                if !(band.low_hz > 0.0 && band.low_hz < band.high_hz) {
                    return invalid(&format!("masking {} requires 0 < low_hz < high_hz", name));
                }
            }
        }
        Ok(())
    }
}

/// Synthesize a harmonic complex and insert the resulting sounds
///
/// After synthesis the non-dichotic families are shaped by a band-pass
/// filter with stop-band edges at 0.8x and 1.2x of the requested
/// pass band. A requested masking noise is band-limited, summed,
/// length-matched, ramped and added before the channel split.
pub fn generate_harmonic_complex(
    registry: &mut SoundRegistry,
    params: &HarmonicComplexParams,
) -> Result<Vec<String>> {
    params.validate()?;

    let mut stim = synthesize_complex(params);

    if !params.harm_type.is_dichotic_cloud() {
        stim = band_pass_filter_stereo(
            params.filter_low_hz * FILTER_LOW_STOP_RATIO,
            params.filter_low_hz,
            params.filter_high_hz,
            params.filter_high_hz * FILTER_HIGH_STOP_RATIO,
            &stim,
        );
    }

    if let Some(masker) = &params.masking_noise {
        add_masking_noise(&mut stim, masker, params);
    }

    info!(label = %params.label, harm_type = ?params.harm_type, "generated harmonic complex");
    split_and_insert(registry, stim, params.ear, &params.label)
}

/// Dispatch to the synthesis kernel for the selected family
fn synthesize_complex(params: &HarmonicComplexParams) -> StereoBuffer {
    match params.harm_type {
        HarmType::Sinusoid => complex_tone(
            params.f0,
            params.harm_phase,
            params.low_harm,
            params.high_harm,
            params.stretch_pct,
            params.level,
            params.duration_ms,
            params.ramps_ms,
            params.ear,
            params.sample_rate,
            params.max_level,
        ),
        HarmType::NarrowbandNoise => narrowband_harmonic_complex(params),
        HarmType::Irn => iterated_rippled_noise(
            params.level,
            params.f0,
            params.irn_iterations,
            params.irn_gain,
            params.duration_ms,
            params.ramps_ms,
            plain_ear(params.ear),
            params.sample_rate,
            params.max_level,
        ),
        HarmType::Huggins => huggins_pitch(
            params.f0,
            params.low_harm,
            params.high_harm,
            params.level,
            params.bandwidth_hz,
            params.phase_relationship,
            params.coloration == NoiseColoration::Pink,
            params.duration_ms,
            params.ramps_ms,
            params.sample_rate,
            params.max_level,
        ),
        HarmType::SimpleDichotic | HarmType::Narrowband2 => simple_dichotic(&SimpleDichoticSpec {
            f0: params.f0,
            low_harm: params.low_harm,
            high_harm: params.high_harm,
            cmp_level: params.level,
            low_freq: params.low_freq,
            high_freq: params.high_freq,
            spacing_cents: params.spacing_cents,
            sig_bandwidth_cents: params.bandwidth_cents,
            phase_relationship: params.phase_relationship,
            dichotic_difference: if params.harm_type == HarmType::Narrowband2 {
                DichoticDifference::Level
            } else {
                params.dichotic_difference
            },
            itd_us: params.itd_us,
            ipd_rad: params.ipd_rad,
            narrow_band_cmp_level: params.narrow_band_cmp_level,
            duration_ms: params.duration_ms,
            ramp_ms: params.ramps_ms,
            sample_rate: params.sample_rate,
            max_level: params.max_level,
        }),
    }
}

/// Harmonic complex from narrow noise bands centered on the harmonics
fn narrowband_harmonic_complex(params: &HarmonicComplexParams) -> StereoBuffer {
    let band = |h: u32, ear: Ear| {
        let center = params.f0 * h as f64;
        steep_noise(
            center - params.bandwidth_hz / 2.0,
            center + params.bandwidth_hz / 2.0,
            params.level,
            params.duration_ms,
            params.ramps_ms,
            ear,
            params.sample_rate,
            params.max_level,
        )
    };

    match params.ear {
        HarmonicEar::Left | HarmonicEar::Right | HarmonicEar::Both => {
            let ear = plain_ear(params.ear);
            let mut sum = band(params.low_harm, ear);
            for h in params.low_harm + 1..=params.high_harm {
                sum.add(&band(h, ear));
            }
            sum
        }
        HarmonicEar::OddLeft | HarmonicEar::OddRight => {
            // Build each parity set monaurally, then route odd/even to
            // opposite ears
            let n = band(params.low_harm, Ear::Left).len();
            let mut odd = vec![0.0; n];
            let mut even = vec![0.0; n];
            for h in params.low_harm..=params.high_harm {
                let b = band(h, Ear::Left);
                let target = if h % 2 == 1 { &mut odd } else { &mut even };
                for (dst, src) in target.iter_mut().zip(b.left.iter()) {
                    *dst += src;
                }
            }
            let (left, right) = if params.ear == HarmonicEar::OddLeft {
                (odd, even)
            } else {
                (even, odd)
            };
            StereoBuffer {
                left,
                right,
                sample_rate: params.sample_rate,
            }
        }
    }
}

/// Band-limit, sum, length-match, ramp and add the masking noise
fn add_masking_noise(
    stim: &mut StereoBuffer,
    masker: &MaskingNoiseParams,
    params: &HarmonicComplexParams,
) {
    let total_ms = params.duration_ms + 2.0 * params.ramps_ms;
    let mut sum = StereoBuffer::new(stim.len(), params.sample_rate);

    for band in [&masker.band1, &masker.band2] {
        let mut noise = broadband_noise(
            band.level,
            total_ms,
            0.0,
            Ear::Both,
            params.sample_rate,
            params.max_level,
        );
        if masker.coloration == NoiseColoration::Pink {
            apply_pink_tilt(&mut noise, 1000.0);
        }
        let mut limited = band_pass_filter_stereo(
            band.low_hz * FILTER_LOW_STOP_RATIO,
            band.low_hz,
            band.high_hz,
            band.high_hz * FILTER_HIGH_STOP_RATIO,
            &noise,
        );
        limited.resize(stim.len());
        sum.add(&limited);
    }

    gate(params.ramps_ms, &mut sum, params.sample_rate);
    stim.add(&sum);
}

// ============================================================================
// Channel split
// ============================================================================

impl From<Ear> for HarmonicEar {
    fn from(ear: Ear) -> Self {
        match ear {
            Ear::Left => HarmonicEar::Left,
            Ear::Right => HarmonicEar::Right,
            Ear::Both => HarmonicEar::Both,
        }
    }
}

/// Collapse a harmonic ear selection to the plain three-valued one
fn plain_ear(ear: HarmonicEar) -> Ear {
    match ear {
        HarmonicEar::Left => Ear::Left,
        HarmonicEar::Right => Ear::Right,
        HarmonicEar::Both | HarmonicEar::OddLeft | HarmonicEar::OddRight => Ear::Both,
    }
}

/// Split a stereo synthesis result into per-channel sounds and insert
/// them
///
/// The single place where an ear selection is resolved into emitted
/// (waveform, role) pairs: a single ear emits one sound carrying that
/// role; Both and the Odd* selections emit exactly two sounds tagged
/// Left and Right.
fn split_and_insert(
    registry: &mut SoundRegistry,
    synth: StereoBuffer,
    ear: HarmonicEar,
    label: &str,
) -> Result<Vec<String>> {
    let fs = synth.sample_rate;
    let emitted: Vec<(Vec<f64>, ChannelRole, String)> = match ear {
        HarmonicEar::Left => vec![(synth.left, ChannelRole::Left, label.to_string())],
        HarmonicEar::Right => vec![(synth.right, ChannelRole::Right, label.to_string())],
        HarmonicEar::Both | HarmonicEar::OddLeft | HarmonicEar::OddRight => vec![
            (synth.left, ChannelRole::Left, format!("{} L", label)),
            (synth.right, ChannelRole::Right, format!("{} R", label)),
        ],
    };

    let mut ids = Vec::with_capacity(emitted.len());
    for (wave, role, sound_label) in emitted {
        ids.push(registry.insert(Sound::new(sound_label, role, wave, fs))?);
    }
    Ok(ids)
}

// ============================================================================
// Shared validation helpers
// ============================================================================

fn invalid(reason: &str) -> Result<()> {
    Err(SoundlabError::InvalidParameter {
        reason: reason.to_string(),
    })
}

fn validate_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SoundlabError::InvalidParameter {
            reason: format!("{} must be finite, got {}", name, value),
        })
    }
}

fn validate_timing(duration_ms: f64, ramps_ms: f64, sample_rate: u32) -> Result<()> {
    if !(duration_ms.is_finite() && duration_ms > 0.0) {
        return Err(SoundlabError::InvalidParameter {
            reason: format!("duration_ms must be positive, got {}", duration_ms),
        });
    }
    if !(ramps_ms.is_finite() && ramps_ms >= 0.0) {
        return Err(SoundlabError::InvalidParameter {
            reason: format!("ramps_ms must be non-negative, got {}", ramps_ms),
        });
    }
    if sample_rate == 0 {
        return Err(SoundlabError::InvalidParameter {
            reason: "sample_rate must be positive".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn samples_for(duration_ms: f64, ramps_ms: f64, fs: u32) -> usize {
        ((duration_ms / 1000.0 * fs as f64).round() + 2.0 * (ramps_ms / 1000.0 * fs as f64).round())
            as usize
    }

    #[test]
    fn test_noise_both_emits_left_right_pair() {
        let mut registry = SoundRegistry::new();
        let params = NoiseParams::default();
        let ids = generate_noise(&mut registry, &params).unwrap();

        assert_eq!(ids.len(), 2);
        let left = registry.get(&ids[0]).unwrap();
        let right = registry.get(&ids[1]).unwrap();
        assert_eq!(left.channel_role, ChannelRole::Left);
        assert_eq!(right.channel_role, ChannelRole::Right);
        assert_eq!(left.label, "Noise L");
        assert_eq!(right.label, "Noise R");
        assert_eq!(left.sample_count(), samples_for(180.0, 10.0, 48000));
        assert_eq!(left.bit_depth, None);
    }

    #[test]
    fn test_noise_single_ear_emits_one_sound() {
        let mut registry = SoundRegistry::new();
        let params = NoiseParams {
            ear: Ear::Right,
            ..NoiseParams::default()
        };
        let ids = generate_noise(&mut registry, &params).unwrap();

        assert_eq!(ids.len(), 1);
        let sound = registry.get(&ids[0]).unwrap();
        assert_eq!(sound.channel_role, ChannelRole::Right);
        assert_eq!(sound.label, "Noise");
        assert!(sound.waveform().iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_noise_rejects_bad_duration() {
        let mut registry = SoundRegistry::new();
        let params = NoiseParams {
            duration_ms: 0.0,
            ..NoiseParams::default()
        };
        let err = generate_noise(&mut registry, &params).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pink_noise_differs_from_white() {
        let mut registry = SoundRegistry::new();
        let ids = generate_noise(
            &mut registry,
            &NoiseParams {
                coloration: NoiseColoration::Pink,
                ear: Ear::Left,
                ..NoiseParams::default()
            },
        )
        .unwrap();
        let sound = registry.get(&ids[0]).unwrap();
        assert!(sound.waveform().iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_sinusoid_cues_zeroed_off_both() {
        let mut registry = SoundRegistry::new();
        let with_cues = ToneParams {
            ear: Ear::Left,
            itd_us: 500.0,
            itd_ref: Some(EarRef::Right),
            ild_db: -10.0,
            ild_ref: Some(EarRef::Right),
            ..ToneParams::default()
        };
        let without = ToneParams {
            ear: Ear::Left,
            ..ToneParams::default()
        };

        let a = generate_sinusoid(&mut registry, &with_cues).unwrap();
        let b = generate_sinusoid(&mut registry, &without).unwrap();

        // Synthesis is deterministic, so ignoring the cues must give
        // the identical waveform
        assert_eq!(
            registry.get(&a[0]).unwrap().waveform(),
            registry.get(&b[0]).unwrap().waveform()
        );
    }

    #[test]
    fn test_sinusoid_rejects_frequency_above_nyquist() {
        let mut registry = SoundRegistry::new();
        let params = ToneParams {
            frequency: 30000.0,
            sample_rate: 48000,
            ..ToneParams::default()
        };
        assert!(generate_sinusoid(&mut registry, &params).is_err());
    }

    #[test]
    fn test_harmonic_sinusoid_both_pair() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams::default();
        let ids = generate_harmonic_complex(&mut registry, &params).unwrap();

        assert_eq!(ids.len(), 2);
        let left = registry.get(&ids[0]).unwrap();
        let right = registry.get(&ids[1]).unwrap();
        assert_eq!(left.channel_role, ChannelRole::Left);
        assert_eq!(right.channel_role, ChannelRole::Right);
        // Diotic complex: both emitted channels carry the same signal
        assert_eq!(left.waveform(), right.waveform());
        assert_eq!(left.sample_count(), samples_for(180.0, 10.0, 48000));
    }

    #[test]
    fn test_harmonic_odd_routing_emits_two_distinct_sounds() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams {
            ear: HarmonicEar::OddLeft,
            ..HarmonicComplexParams::default()
        };
        let ids = generate_harmonic_complex(&mut registry, &params).unwrap();

        assert_eq!(ids.len(), 2);
        let left = registry.get(&ids[0]).unwrap();
        let right = registry.get(&ids[1]).unwrap();
        assert_eq!(left.channel_role, ChannelRole::Left);
        assert_eq!(right.channel_role, ChannelRole::Right);
        assert_ne!(left.waveform(), right.waveform());
    }

    #[test]
    fn test_irn_generates() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams {
            harm_type: HarmType::Irn,
            f0: 250.0,
            duration_ms: 100.0,
            ..HarmonicComplexParams::default()
        };
        let ids = generate_harmonic_complex(&mut registry, &params).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(registry
            .get(&ids[0])
            .unwrap()
            .waveform()
            .iter()
            .any(|&s| s != 0.0));
    }

    #[test]
    fn test_huggins_requires_both_ears() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams {
            harm_type: HarmType::Huggins,
            ear: HarmonicEar::Left,
            ..HarmonicComplexParams::default()
        };
        let err = generate_harmonic_complex(&mut registry, &params).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_odd_routing_rejected_for_noise_families() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams {
            harm_type: HarmType::Irn,
            ear: HarmonicEar::OddRight,
            ..HarmonicComplexParams::default()
        };
        assert!(generate_harmonic_complex(&mut registry, &params).is_err());
    }

    #[test]
    fn test_simple_dichotic_rejects_level_difference() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams {
            harm_type: HarmType::SimpleDichotic,
            dichotic_difference: DichoticDifference::Level,
            duration_ms: 50.0,
            ..HarmonicComplexParams::default()
        };
        assert!(generate_harmonic_complex(&mut registry, &params).is_err());
    }

    #[test]
    fn test_narrowband2_is_diotic() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams {
            harm_type: HarmType::Narrowband2,
            duration_ms: 50.0,
            high_freq: 1000.0,
            spacing_cents: 50.0,
            narrow_band_cmp_level: 50.0,
            ..HarmonicComplexParams::default()
        };
        let ids = generate_harmonic_complex(&mut registry, &params).unwrap();
        let left = registry.get(&ids[0]).unwrap();
        let right = registry.get(&ids[1]).unwrap();
        for (l, r) in left.waveform().iter().zip(right.waveform().iter()) {
            assert!((l - r).abs() < 1e-9);
        }
    }

    #[test]
    fn test_masking_noise_adds_energy() {
        let mut registry = SoundRegistry::new();
        let base = HarmonicComplexParams {
            duration_ms: 100.0,
            ..HarmonicComplexParams::default()
        };
        let with_masker = HarmonicComplexParams {
            masking_noise: Some(MaskingNoiseParams {
                coloration: NoiseColoration::White,
                band1: MaskingBand {
                    low_hz: 200.0,
                    high_hz: 800.0,
                    level: 50.0,
                },
                band2: MaskingBand {
                    low_hz: 1000.0,
                    high_hz: 4000.0,
                    level: 45.0,
                },
            }),
            ..base.clone()
        };

        let plain_ids = generate_harmonic_complex(&mut registry, &base).unwrap();
        let masked_ids = generate_harmonic_complex(&mut registry, &with_masker).unwrap();

        let plain = registry.get(&plain_ids[0]).unwrap();
        let masked = registry.get(&masked_ids[0]).unwrap();
        assert_eq!(plain.sample_count(), masked.sample_count());

        let rms = |w: &[f64]| (w.iter().map(|s| s * s).sum::<f64>() / w.len() as f64).sqrt();
        assert!(rms(masked.waveform()) > rms(plain.waveform()));
    }

    #[test]
    fn test_masking_noise_band_validation() {
        let mut registry = SoundRegistry::new();
        let params = HarmonicComplexParams {
            masking_noise: Some(MaskingNoiseParams {
                coloration: NoiseColoration::White,
                band1: MaskingBand {
                    low_hz: 800.0,
                    high_hz: 200.0,
                    level: 50.0,
                },
                band2: MaskingBand {
                    low_hz: 1000.0,
                    high_hz: 4000.0,
                    level: 45.0,
                },
            }),
            ..HarmonicComplexParams::default()
        };
        assert!(generate_harmonic_complex(&mut registry, &params).is_err());
    }
}
