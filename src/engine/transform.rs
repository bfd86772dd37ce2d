//! Transform pipeline
//!
//! Pure waveform transforms (cut, concatenate, resample, scale, level
//! measurement) plus thin registry wrappers that apply them to sounds
//! in place. Every transform validates before touching anything, so a
//! failed call never leaves a sound half-updated.

use tracing::debug;

use crate::dsp::level::{db_to_linear, rms};
use crate::dsp::resample::{resample_kernel, ResampleMethod, SmoothingWindow};
use crate::error::{Result, SoundlabError};
use crate::session::registry::SoundRegistry;

/// How the delay between two concatenated sounds is realized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMode {
    /// Insert `delay` seconds of silence between the two sounds
    Gap,
    /// Start the second sound `delay` seconds after the first one's
    /// onset; where the two overlap they are added
    Overlap,
}

/// Output order of a concatenation, independent of which argument is
/// logically "first"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatOrder {
    FirstThenSecond,
    SecondThenFirst,
}

/// Excise the region `[start_sample, end_sample)` from a waveform
///
/// The result is the samples before `start_sample` followed by the
/// samples from `end_sample` onward: cut removes a segment, it does
/// not extract one.
///
/// # Errors
/// * `OutOfRange` - Unless `0 <= start < end <= len`
/// * `CutWholeBuffer` - If the range covers the whole buffer; the
///   caller should remove the sound instead
pub fn cut(wave: &[f64], start_sample: usize, end_sample: usize) -> Result<Vec<f64>> {
    if start_sample >= end_sample || end_sample > wave.len() {
        return Err(SoundlabError::OutOfRange {
            start: start_sample,
            end: end_sample,
            len: wave.len(),
        });
    }
    if start_sample == 0 && end_sample == wave.len() {
        return Err(SoundlabError::CutWholeBuffer);
    }

    let mut out = Vec::with_capacity(wave.len() - (end_sample - start_sample));
    out.extend_from_slice(&wave[..start_sample]);
    out.extend_from_slice(&wave[end_sample..]);
    Ok(out)
}

/// Join two waveforms with a delay between them
///
/// Both inputs must already share `sample_rate`; the session-level
/// wrapper checks that. `delay_secs` is realized according to `mode`;
/// `order` selects which buffer comes out first.
///
/// In `Overlap` mode the second buffer starts `delay_secs` after the
/// first one's onset. If the delay reaches past the first buffer's end
/// the remainder becomes a silent gap, matching the original behavior.
///
/// # Errors
/// * `InvalidParameter` - If `delay_secs` is negative or not finite
pub fn concatenate(
    first: &[f64],
    second: &[f64],
    delay_secs: f64,
    mode: DelayMode,
    order: ConcatOrder,
    sample_rate: u32,
) -> Result<Vec<f64>> {
    if !delay_secs.is_finite() || delay_secs < 0.0 {
        return Err(SoundlabError::InvalidParameter {
            reason: format!("delay must be a non-negative number of seconds, got {}", delay_secs),
        });
    }

    let (a, b) = match order {
        ConcatOrder::FirstThenSecond => (first, second),
        ConcatOrder::SecondThenFirst => (second, first),
    };
    let n_delay = (delay_secs * sample_rate as f64).round() as usize;

    let out = match mode {
        DelayMode::Gap => {
            let mut out = Vec::with_capacity(a.len() + n_delay + b.len());
            out.extend_from_slice(a);
            out.extend(std::iter::repeat(0.0).take(n_delay));
            out.extend_from_slice(b);
            out
        }
        DelayMode::Overlap => {
            if n_delay < a.len() {
                // b starts inside a; the shared region is additive
                let total = a.len().max(n_delay + b.len());
                let mut out = Vec::with_capacity(total);
                out.extend_from_slice(a);
                out.resize(total, 0.0);
                for (i, &s) in b.iter().enumerate() {
                    out[n_delay + i] += s;
                }
                out
            } else {
                // delay reaches past a's end: silence fills the rest
                let mut out = Vec::with_capacity(n_delay + b.len());
                out.extend_from_slice(a);
                out.resize(n_delay, 0.0);
                out.extend_from_slice(b);
                out
            }
        }
    };
    Ok(out)
}

/// Resample a waveform to a new rate
///
/// Output length is exactly `round(len * new_rate / old_rate)`.
///
/// # Errors
/// * `InvalidParameter` - If either rate is zero
pub fn resample(
    wave: &[f64],
    old_rate: u32,
    new_rate: u32,
    method: ResampleMethod,
    window: SmoothingWindow,
) -> Result<Vec<f64>> {
    if old_rate == 0 || new_rate == 0 {
        return Err(SoundlabError::InvalidParameter {
            reason: "sample rates must be positive".to_string(),
        });
    }
    Ok(resample_kernel(wave, new_rate, old_rate, method, window))
}

/// Scale a waveform by `db` decibels
///
/// Multiplying amplitudes adds decibels, so `scale_db(x)` followed by
/// `scale_db(-x)` is the identity within floating-point tolerance.
pub fn scale_db(db: f64, wave: &[f64]) -> Vec<f64> {
    let factor = db_to_linear(db);
    wave.iter().map(|&s| s * factor).collect()
}

/// Level difference between two waveforms in dB
///
/// Positive means `a` is louder than `b`.
///
/// # Errors
/// * `DivisionByZero` - If the reference `b` has zero RMS
pub fn level_difference_db(a: &[f64], b: &[f64]) -> Result<f64> {
    let rms_b = rms(b);
    if rms_b == 0.0 {
        return Err(SoundlabError::DivisionByZero);
    }
    Ok(20.0 * (rms(a) / rms_b).log10())
}

// ============================================================================
// Registry wrappers
// ============================================================================

/// Cut a region out of a registered sound, in place
pub fn cut_in_place(
    registry: &mut SoundRegistry,
    id: &str,
    start_sample: usize,
    end_sample: usize,
) -> Result<()> {
    let sound = registry.get(id)?;
    let new_wave = cut(sound.waveform(), start_sample, end_sample)?;
    debug!(id = %id, start = start_sample, end = end_sample, "cut");
    registry.get_mut(id)?.set_waveform(new_wave);
    Ok(())
}

/// Scale a registered sound by `db` decibels, in place
pub fn scale_in_place(registry: &mut SoundRegistry, id: &str, db: f64) -> Result<()> {
    let sound = registry.get(id)?;
    let new_wave = scale_db(db, sound.waveform());
    debug!(id = %id, db, "scale");
    registry.get_mut(id)?.set_waveform(new_wave);
    Ok(())
}

/// Resample a registered sound, updating waveform and rate atomically
pub fn resample_in_place(
    registry: &mut SoundRegistry,
    id: &str,
    new_rate: u32,
    method: ResampleMethod,
    window: SmoothingWindow,
) -> Result<()> {
    let sound = registry.get(id)?;
    let new_wave = resample(sound.waveform(), sound.sample_rate(), new_rate, method, window)?;
    debug!(id = %id, new_rate, "resample");
    registry.get_mut(id)?.replace_waveform(new_wave, new_rate);
    Ok(())
}

/// Concatenate two registered sounds into a new waveform
///
/// # Errors
/// * `SampleRateMismatch` - If the two sounds differ in rate
pub fn concatenate_sounds(
    registry: &SoundRegistry,
    first_id: &str,
    second_id: &str,
    delay_secs: f64,
    mode: DelayMode,
    order: ConcatOrder,
) -> Result<Vec<f64>> {
    let first = registry.get(first_id)?;
    let second = registry.get(second_id)?;
    if first.sample_rate() != second.sample_rate() {
        return Err(SoundlabError::SampleRateMismatch {
            expected: first.sample_rate(),
            found: second.sample_rate(),
        });
    }
    concatenate(
        first.waveform(),
        second.waveform(),
        delay_secs,
        mode,
        order,
        first.sample_rate(),
    )
}

// ============================================================================
// Tests
// ============================================================================
