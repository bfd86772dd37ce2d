//! WAV file I/O
//!
//! Loading turns each file channel into its own registry sound (stereo
//! files become a Left/Right pair, mono files a single Mono sound),
//! recording the source bit depth. Saving goes through the channel
//! compositor's stereo buffer.
//!
//! The save path swaps the stereo columns immediately before writing:
//! in-memory column 0 lands in the file's right channel and vice
//! versa. This asymmetry between the in-memory and on-disk conventions
//! is long-standing and preserved for compatibility with existing
//! files; see the integration tests that pin it down.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use num_traits::AsPrimitive;
use tracing::info;

use crate::engine::buffer::StereoBuffer;
use crate::error::{Result, SoundlabError};
use crate::session::registry::SoundRegistry;
use crate::session::sound::{ChannelRole, Sound};

/// A decoded WAV file, one sample vector per channel
#[derive(Debug, Clone)]
pub struct LoadedWav {
    /// De-interleaved channels, f64 samples in ±1.0
    pub channels: Vec<Vec<f64>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bit depth of the file
    pub bit_depth: u16,
}

/// Read a WAV file into f64 channels
///
/// Integer formats are normalized to ±1.0.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a readable WAV file
/// * `UnsupportedFormat` - For more than 2 channels or unknown depths
pub fn load_wav(path: &Path) -> Result<LoadedWav> {
    if !path.exists() {
        return Err(SoundlabError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| SoundlabError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels == 0 || num_channels > 2 {
        return Err(SoundlabError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", num_channels),
        });
    }

    let samples = read_samples_as_f64(reader, spec.bits_per_sample, spec.sample_format)?;
    let channels = deinterleave(&samples, num_channels);

    info!(
        path = %path.display(),
        channels = num_channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "loaded wav"
    );

    Ok(LoadedWav {
        channels,
        sample_rate: spec.sample_rate,
        bit_depth: spec.bits_per_sample,
    })
}

/// Load a WAV file and insert its channels into the registry
///
/// A stereo file becomes two sounds with Left/Right roles and " L" /
/// " R" label suffixes; a mono file becomes one Mono sound.
///
/// # Returns
/// The ids of the inserted sounds, in channel order
pub fn load_into_registry(
    registry: &mut SoundRegistry,
    path: &Path,
    label: &str,
) -> Result<Vec<String>> {
    let wav = load_wav(path)?;

    let mut ids = Vec::with_capacity(wav.channels.len());
    if wav.channels.len() == 1 {
        let sound = Sound::from_file(
            label,
            ChannelRole::Mono,
            wav.channels.into_iter().next().unwrap(),
            wav.sample_rate,
            wav.bit_depth,
        );
        ids.push(registry.insert(sound)?);
    } else {
        let mut channels = wav.channels.into_iter();
        let left = Sound::from_file(
            format!("{} L", label),
            ChannelRole::Left,
            channels.next().unwrap(),
            wav.sample_rate,
            wav.bit_depth,
        );
        let right = Sound::from_file(
            format!("{} R", label),
            ChannelRole::Right,
            channels.next().unwrap(),
            wav.sample_rate,
            wav.bit_depth,
        );
        ids.push(registry.insert(left)?);
        ids.push(registry.insert(right)?);
    }
    Ok(ids)
}

/// Write a composed stereo buffer to a WAV file
///
/// The on-disk column swap applies here: the interleaved frames are
/// written as (right, left).
///
/// # Arguments
/// * `path` - Destination file
/// * `buffer` - Composed stereo buffer
/// * `bit_depth` - 16, 24 or 32 (32 writes IEEE float)
pub fn save_stereo(path: &Path, buffer: &StereoBuffer, bit_depth: u16) -> Result<()> {
    let spec = wav_spec(2, buffer.sample_rate, bit_depth)?;
    let interleaved = buffer.to_interleaved_swapped();
    write_wav(path, spec, &interleaved, bit_depth)?;
    info!(path = %path.display(), bits = bit_depth, frames = buffer.len(), "saved stereo wav");
    Ok(())
}

/// Write a single sound to a mono WAV file
pub fn save_mono(path: &Path, sound: &Sound, bit_depth: u16) -> Result<()> {
    let spec = wav_spec(1, sound.sample_rate(), bit_depth)?;
    write_wav(path, spec, sound.waveform(), bit_depth)?;
    info!(path = %path.display(), bits = bit_depth, frames = sound.sample_count(), "saved mono wav");
    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn wav_spec(channels: u16, sample_rate: u32, bit_depth: u16) -> Result<WavSpec> {
    match bit_depth {
        16 | 24 | 32 => Ok(WavSpec {
            channels,
            sample_rate,
            bits_per_sample: bit_depth,
            sample_format: if bit_depth == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }),
        other => Err(SoundlabError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16, 24, 32 supported)", other),
        }),
    }
}

fn write_wav(path: &Path, spec: WavSpec, samples: &[f64], bit_depth: u16) -> Result<()> {
    let mut writer = WavWriter::create(path, spec).map_err(io_error)?;

    match bit_depth {
        16 => {
            for &sample in samples {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(io_error)?;
            }
        }
        24 => {
            for &sample in samples {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(io_error)?;
            }
        }
        32 => {
            for &sample in samples {
                writer.write_sample(sample as f32).map_err(io_error)?;
            }
        }
        _ => unreachable!("depth validated by wav_spec"),
    }

    writer.finalize().map_err(io_error)?;
    Ok(())
}

fn io_error(e: hound::Error) -> SoundlabError {
    SoundlabError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}

/// Read samples from a WAV reader and normalize to f64
fn read_samples_as_f64<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f64>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| SoundlabError::InvalidAudio {
                reason: format!("Failed to read float samples: {}", e),
                source: Some(Box::new(e)),
            }),
        SampleFormat::Int => match bits_per_sample {
            8 => read_int_samples::<R, i8>(&mut reader, 128.0),
            16 => read_int_samples::<R, i16>(&mut reader, 32768.0),
            24 => read_int_samples::<R, i32>(&mut reader, 8388608.0),
            32 => read_int_samples::<R, i32>(&mut reader, 2147483648.0),
            _ => Err(SoundlabError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

/// Read integer samples of type `S` and scale them into ±1.0
fn read_int_samples<R, S>(reader: &mut WavReader<R>, full_scale: f64) -> Result<Vec<f64>>
where
    R: std::io::Read,
    S: hound::Sample + AsPrimitive<f64>,
{
    reader
        .samples::<S>()
        .map(|s| s.map(|v| v.as_() / full_scale))
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|e| SoundlabError::InvalidAudio {
            reason: format!("Failed to read {}-scaled samples: {}", full_scale, e),
            source: Some(Box::new(e)),
        })
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
fn deinterleave(samples: &[f64], channels: usize) -> Vec<Vec<f64>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];
    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }
    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp_wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 / n as f64) * 0.9).collect()
    }

    #[test]
    fn test_mono_round_trip_16bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.wav");

        let sound = Sound::new("ramp", ChannelRole::Mono, ramp_wave(4800), 48000);
        save_mono(&path, &sound, 16).unwrap();

        let wav = load_wav(&path).unwrap();
        assert_eq!(wav.channels.len(), 1);
        assert_eq!(wav.sample_rate, 48000);
        assert_eq!(wav.bit_depth, 16);
        for (orig, loaded) in sound.waveform().iter().zip(wav.channels[0].iter()) {
            assert!((orig - loaded).abs() < 1.0e-3, "{} vs {}", orig, loaded);
        }
    }

    #[test]
    fn test_stereo_save_applies_column_swap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("swap.wav");

        let buffer = StereoBuffer {
            left: vec![0.5; 100],
            right: vec![-0.25; 100],
            sample_rate: 48000,
        };
        save_stereo(&path, &buffer, 32).unwrap();

        let wav = load_wav(&path).unwrap();
        // On disk the first channel holds the in-memory RIGHT column
        assert!(wav.channels[0].iter().all(|&s| (s + 0.25).abs() < 1e-6));
        assert!(wav.channels[1].iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_load_into_registry_stereo_roles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pair.wav");

        let buffer = StereoBuffer {
            left: ramp_wave(1000),
            right: ramp_wave(1000),
            sample_rate: 44100,
        };
        save_stereo(&path, &buffer, 24).unwrap();

        let mut registry = SoundRegistry::new();
        let ids = load_into_registry(&mut registry, &path, "pair").unwrap();
        assert_eq!(ids.len(), 2);

        let left = registry.get(&ids[0]).unwrap();
        let right = registry.get(&ids[1]).unwrap();
        assert_eq!(left.channel_role, ChannelRole::Left);
        assert_eq!(right.channel_role, ChannelRole::Right);
        assert_eq!(left.label, "pair L");
        assert_eq!(right.label, "pair R");
        assert_eq!(left.bit_depth, Some(24));
        assert_eq!(left.sample_rate(), 44100);
    }

    #[test]
    fn test_load_into_registry_mono_role() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.wav");

        let sound = Sound::new("m", ChannelRole::Mono, ramp_wave(100), 8000);
        save_mono(&path, &sound, 16).unwrap();

        let mut registry = SoundRegistry::new();
        let ids = load_into_registry(&mut registry, &path, "clip").unwrap();
        assert_eq!(ids.len(), 1);
        let loaded = registry.get(&ids[0]).unwrap();
        assert_eq!(loaded.channel_role, ChannelRole::Mono);
        assert_eq!(loaded.bit_depth, Some(16));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_wav(Path::new("/nonexistent/audio.wav"));
        match result.unwrap_err() {
            SoundlabError::FileNotFound { path, .. } => assert!(path.contains("nonexistent")),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_bit_depth_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        let sound = Sound::new("m", ChannelRole::Mono, ramp_wave(10), 8000);
        let err = save_mono(&path, &sound, 12).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }
}
