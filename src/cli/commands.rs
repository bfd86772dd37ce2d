//! CLI command implementations
//!
//! Each command builds a transient session registry, runs the
//! corresponding engine operations and writes or prints the result.

use std::path::Path;

use crate::cli::coloration;
use crate::dsp::resample::{ResampleMethod, SmoothingWindow};
use crate::dsp::synth::{Ear, EarRef, HarmonicEar};
use crate::engine::compose::{compose_stereo, resolve_mono, MonoResolution};
use crate::engine::io::{load_into_registry, load_wav, save_stereo};
use crate::engine::transform;
use crate::error::{Result, SoundlabError};
use crate::session::registry::SoundRegistry;
use crate::session::stimulus::{
    generate_harmonic_complex, generate_noise, generate_sinusoid, HarmType,
    HarmonicComplexParams, NoiseParams, ToneParams,
};

/// Compose the given registry sounds and write them as a stereo WAV
fn compose_and_save(
    registry: &SoundRegistry,
    ids: &[String],
    out: &Path,
    bits: u16,
) -> Result<()> {
    let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
    let sounds = registry.get_many(&id_refs)?;
    let buffer = compose_stereo(&sounds)?;
    save_stereo(out, &buffer, bits)
}

#[allow(clippy::too_many_arguments)]
pub fn gen_noise(
    out: &Path,
    spectrum_level: f64,
    duration: f64,
    ramps: f64,
    ear: Ear,
    pink: bool,
    rate: u32,
    bits: u16,
) -> Result<()> {
    let mut registry = SoundRegistry::new();
    let params = NoiseParams {
        label: "Noise".to_string(),
        spectrum_level,
        duration_ms: duration,
        ramps_ms: ramps,
        ear,
        sample_rate: rate,
        coloration: coloration(pink),
        ..NoiseParams::default()
    };
    let ids = generate_noise(&mut registry, &params)?;
    compose_and_save(&registry, &ids, out, bits)?;
    println!("Wrote {} ({} sound(s))", out.display(), ids.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn gen_tone(
    out: &Path,
    frequency: f64,
    level: f64,
    duration: f64,
    ramps: f64,
    ear: Ear,
    itd: f64,
    itd_ref: Option<EarRef>,
    ild: f64,
    ild_ref: Option<EarRef>,
    rate: u32,
    bits: u16,
) -> Result<()> {
    let mut registry = SoundRegistry::new();
    let params = ToneParams {
        label: "Tone".to_string(),
        frequency,
        level,
        duration_ms: duration,
        ramps_ms: ramps,
        ear,
        sample_rate: rate,
        itd_us: itd,
        itd_ref,
        ild_db: ild,
        ild_ref,
        ..ToneParams::default()
    };
    let ids = generate_sinusoid(&mut registry, &params)?;
    compose_and_save(&registry, &ids, out, bits)?;
    println!("Wrote {} ({} sound(s))", out.display(), ids.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn gen_harm(
    out: &Path,
    harm_type: HarmType,
    f0: f64,
    low_harm: u32,
    high_harm: u32,
    level: f64,
    duration: f64,
    ramps: f64,
    ear: HarmonicEar,
    filter_low: Option<f64>,
    filter_high: Option<f64>,
    rate: u32,
    bits: u16,
) -> Result<()> {
    let mut registry = SoundRegistry::new();
    let defaults = HarmonicComplexParams::default();
    let params = HarmonicComplexParams {
        label: "Harmonic Complex".to_string(),
        harm_type,
        f0,
        low_harm,
        high_harm,
        level,
        duration_ms: duration,
        ramps_ms: ramps,
        ear,
        sample_rate: rate,
        // Default pass band spans the requested harmonics
        filter_low_hz: filter_low.unwrap_or(f0 * low_harm as f64),
        filter_high_hz: filter_high.unwrap_or(f0 * high_harm as f64),
        ..defaults
    };
    let ids = generate_harmonic_complex(&mut registry, &params)?;
    compose_and_save(&registry, &ids, out, bits)?;
    println!("Wrote {} ({} sound(s))", out.display(), ids.len());
    Ok(())
}

pub fn info(file: &Path) -> Result<()> {
    let mut registry = SoundRegistry::new();
    let label = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sound".to_string());
    load_into_registry(&mut registry, file, &label)?;
    let listing = registry.list();
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

pub fn cut(input: &Path, out: &Path, from: usize, to: usize, bits: u16) -> Result<()> {
    transform_file(input, out, bits, |wave, _rate| {
        transform::cut(wave, from, to)
    })
}

pub fn resample(input: &Path, out: &Path, rate: u32, window: &str, bits: u16) -> Result<()> {
    let window: SmoothingWindow = window
        .parse()
        .map_err(|reason| SoundlabError::InvalidParameter { reason })?;
    let wav = load_wav(input)?;
    let channels: Vec<Vec<f64>> = wav
        .channels
        .iter()
        .map(|ch| transform::resample(ch, wav.sample_rate, rate, ResampleMethod::Fourier, window))
        .collect::<Result<_>>()?;
    write_channels(out, &channels, rate, bits)?;
    println!("Wrote {} at {} Hz", out.display(), rate);
    Ok(())
}

pub fn scale(input: &Path, out: &Path, db: f64, bits: u16) -> Result<()> {
    transform_file(input, out, bits, |wave, _rate| {
        Ok(transform::scale_db(db, wave))
    })
}

pub fn compare(a: &Path, b: &Path) -> Result<()> {
    let wav_a = load_wav(a)?;
    let wav_b = load_wav(b)?;
    // Compare the first channel of each file
    let diff = transform::level_difference_db(&wav_a.channels[0], &wav_b.channels[0])?;
    println!("{:+.2} dB", diff);
    Ok(())
}

pub fn mix(inputs: &[std::path::PathBuf], out: &Path, bits: u16) -> Result<()> {
    let mut registry = SoundRegistry::new();
    let mut ids = Vec::new();
    for input in inputs {
        let label = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "sound".to_string());
        ids.extend(load_into_registry(&mut registry, input, &label)?);
    }

    // Mono files need explicit roles before composition
    let mut resolved = Vec::new();
    for id in &ids {
        let sound = registry.get(id)?;
        for s in resolve_mono(sound, MonoResolution::Duplicate) {
            resolved.push(s);
        }
    }
    let sound_refs: Vec<&crate::session::sound::Sound> = resolved.iter().collect();
    let buffer = compose_stereo(&sound_refs)?;
    save_stereo(out, &buffer, bits)?;
    println!("Mixed {} file(s) into {}", inputs.len(), out.display());
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Apply a per-channel transform to a WAV file and write the result
fn transform_file<F>(input: &Path, out: &Path, bits: u16, f: F) -> Result<()>
where
    F: Fn(&[f64], u32) -> Result<Vec<f64>>,
{
    let wav = load_wav(input)?;
    let channels: Vec<Vec<f64>> = wav
        .channels
        .iter()
        .map(|ch| f(ch, wav.sample_rate))
        .collect::<Result<_>>()?;
    write_channels(out, &channels, wav.sample_rate, bits)?;
    println!("Wrote {}", out.display());
    Ok(())
}

/// Write de-interleaved channels back out, preserving channel count
fn write_channels(out: &Path, channels: &[Vec<f64>], rate: u32, bits: u16) -> Result<()> {
    use crate::engine::buffer::StereoBuffer;
    use crate::engine::io::save_mono;
    use crate::session::sound::{ChannelRole, Sound};

    match channels {
        [mono] => {
            let sound = Sound::new("out", ChannelRole::Mono, mono.clone(), rate);
            save_mono(out, &sound, bits)
        }
        [file_left, file_right] => {
            // The file channels were produced by the save-path swap, so
            // writing them back goes through the same convention: the
            // buffer's right column lands in the file's first channel.
            let buffer = StereoBuffer {
                left: file_right.clone(),
                right: file_left.clone(),
                sample_rate: rate,
            };
            save_stereo(out, &buffer, bits)
        }
        _ => Err(SoundlabError::UnsupportedFormat {
            format: format!("{}-channel audio", channels.len()),
        }),
    }
}
