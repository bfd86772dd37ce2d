//! Spectral filtering kernels
//!
//! FIR band filtering (frequency-sampling design), narrow-band phase
//! shifting for dichotic stimuli, and the pink spectral tilt. All FFT
//! work goes through `rustfft`.

use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::dsp::synth::Ear;
use crate::engine::buffer::StereoBuffer;

/// Number of taps of the band-pass shaping filter
const FIR_TAPS: usize = 256;

/// Stop-band gain of the shaping filter (-90 dB)
const STOP_GAIN: f64 = 0.00003;

// ============================================================================
// FFT helpers
// ============================================================================

fn fft_forward(buf: &mut [Complex<f64>]) {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buf.len());
    fft.process(buf);
}

/// Inverse FFT, normalized by 1/n
fn fft_inverse(buf: &mut [Complex<f64>]) {
    let n = buf.len();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_inverse(n);
    fft.process(buf);
    let scale = 1.0 / n as f64;
    for c in buf.iter_mut() {
        *c *= scale;
    }
}

fn to_complex(wave: &[f64], len: usize) -> Vec<Complex<f64>> {
    let mut buf = vec![Complex::new(0.0, 0.0); len];
    for (dst, &src) in buf.iter_mut().zip(wave.iter()) {
        dst.re = src;
    }
    buf
}

// ============================================================================
// FIR band filter
// ============================================================================

/// Apply a band-shaping FIR filter to a waveform
///
/// The ideal frequency response transitions from 0 to 1 between
/// `low_stop_hz` and `low_pass_hz` and from 1 to 0 between
/// `high_pass_hz` and `high_stop_hz`. Degenerate edges select a
/// low-pass (`low_pass_hz == 0`) or high-pass (`high_pass_hz >=
/// Nyquist`) response instead. The filter is linear-phase with 256
/// taps; the output has the same length as the input (centered
/// convolution).
///
/// # Arguments
/// * `low_stop_hz` - End of the lower stop band in Hz
/// * `low_pass_hz` - Start of the pass band in Hz
/// * `high_pass_hz` - End of the pass band in Hz
/// * `high_stop_hz` - Start of the upper stop band in Hz
/// * `wave` - The samples to filter
/// * `fs` - Sample rate of `wave`
pub fn band_pass_filter(
    low_stop_hz: f64,
    low_pass_hz: f64,
    high_pass_hz: f64,
    high_stop_hz: f64,
    wave: &[f64],
    fs: u32,
) -> Vec<f64> {
    let nyq = fs as f64 / 2.0;
    let f1 = low_stop_hz / nyq;
    let f2 = low_pass_hz / nyq;
    let f3 = high_pass_hz / nyq;
    let f4 = high_stop_hz / nyq;

    let (freqs, gains): (Vec<f64>, Vec<f64>) = if f2 == 0.0 {
        // low pass
        (vec![0.0, f3, f4, 1.0], vec![1.0, 1.0, STOP_GAIN, 0.0])
    } else if f3 < 1.0 {
        // band pass
        (
            vec![0.0, f1, f2, (f2 + f3) / 2.0, f3, f4, 1.0],
            vec![0.0, STOP_GAIN, 1.0, 1.0, 1.0, STOP_GAIN, 0.0],
        )
    } else {
        // high pass
        (
            vec![0.0, f1, f2, 0.999999, 1.0],
            vec![0.0, STOP_GAIN, 1.0, 1.0, 0.0],
        )
    };

    let taps = firwin2(FIR_TAPS, &freqs, &gains);
    convolve_same(wave, &taps)
}

/// Filter both columns of a stereo buffer (see [`band_pass_filter`])
pub fn band_pass_filter_stereo(
    low_stop_hz: f64,
    low_pass_hz: f64,
    high_pass_hz: f64,
    high_stop_hz: f64,
    sig: &StereoBuffer,
) -> StereoBuffer {
    StereoBuffer {
        left: band_pass_filter(
            low_stop_hz,
            low_pass_hz,
            high_pass_hz,
            high_stop_hz,
            &sig.left,
            sig.sample_rate,
        ),
        right: band_pass_filter(
            low_stop_hz,
            low_pass_hz,
            high_pass_hz,
            high_stop_hz,
            &sig.right,
            sig.sample_rate,
        ),
        sample_rate: sig.sample_rate,
    }
}

/// Design a linear-phase FIR filter from an arbitrary piecewise-linear
/// magnitude response (frequency sampling method, Hamming windowed)
///
/// `freqs` are normalized to [0, 1] with 1 = Nyquist and must be
/// increasing; `gains` are the desired magnitudes at those points.
fn firwin2(n_taps: usize, freqs: &[f64], gains: &[f64]) -> Vec<f64> {
    debug_assert_eq!(freqs.len(), gains.len());
    let nfreqs = 1 + n_taps.next_power_of_two();

    // Interpolate the desired magnitude onto a regular grid
    let mut fx = vec![0.0; nfreqs];
    for (i, g) in fx.iter_mut().enumerate() {
        let x = i as f64 / (nfreqs - 1) as f64;
        *g = interp_linear(freqs, gains, x);
    }

    // Linear phase term, then back to the time domain
    let m = 2 * (nfreqs - 1);
    let mut spectrum = vec![Complex::new(0.0, 0.0); m];
    let delay = (n_taps - 1) as f64 / 2.0;
    for k in 0..nfreqs {
        let x = k as f64 / (nfreqs - 1) as f64;
        let shift = Complex::from_polar(1.0, -delay * PI * x);
        spectrum[k] = shift * fx[k];
        if k > 0 && k < nfreqs - 1 {
            spectrum[m - k] = spectrum[k].conj();
        }
    }
    fft_inverse(&mut spectrum);

    let mut taps: Vec<f64> = spectrum.iter().take(n_taps).map(|c| c.re).collect();
    for (i, t) in taps.iter_mut().enumerate() {
        let w = 0.54 - 0.46 * (2.0 * PI * i as f64 / (n_taps - 1) as f64).cos();
        *t *= w;
    }
    taps
}

fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    if x <= xs[0] {
        return ys[0];
    }
    for i in 1..xs.len() {
        if x <= xs[i] {
            let span = xs[i] - xs[i - 1];
            if span <= 0.0 {
                return ys[i];
            }
            let frac = (x - xs[i - 1]) / span;
            return ys[i - 1] + frac * (ys[i] - ys[i - 1]);
        }
    }
    *ys.last().unwrap()
}

/// Centered same-length convolution of `wave` with `taps`
fn convolve_same(wave: &[f64], taps: &[f64]) -> Vec<f64> {
    let n = wave.len();
    let lb = taps.len();
    let start = (lb - 1) / 2;
    let mut out = vec![0.0; n];
    for (i, o) in out.iter_mut().enumerate() {
        let shifted = i + start;
        // y[i] = sum_k wave[shifted - k] * taps[k]
        let k_lo = shifted.saturating_sub(n - 1);
        let k_hi = shifted.min(lb - 1);
        let mut acc = 0.0;
        for k in k_lo..=k_hi {
            acc += taps[k] * wave[shifted - k];
        }
        *o = acc;
    }
    out
}

// ============================================================================
// Phase shift
// ============================================================================

/// Shift the phase of a sound within a frequency region
///
/// The spectrum bins between `f1` and `f2` Hz are rotated by
/// `phase_rad` (their mirrored negative-frequency bins by
/// `-phase_rad`, keeping the output real). Used to build dichotic
/// pitches: a pi shift in one ear over a narrow band creates a Huggins
/// pitch at that band.
///
/// # Arguments
/// * `sig` - Input stereo signal
/// * `f1` / `f2` - Region to shift, in Hz
/// * `phase_rad` - Phase rotation in radians
/// * `ear` - Which column(s) to process; the other is copied through
pub fn phase_shift(
    sig: &StereoBuffer,
    f1: f64,
    f2: f64,
    phase_rad: f64,
    ear: Ear,
) -> StereoBuffer {
    let mut out = sig.clone();
    match ear {
        Ear::Left => out.left = phase_shift_wave(&sig.left, f1, f2, phase_rad, sig.sample_rate),
        Ear::Right => {
            out.right = phase_shift_wave(&sig.right, f1, f2, phase_rad, sig.sample_rate)
        }
        Ear::Both => {
            out.left = phase_shift_wave(&sig.left, f1, f2, phase_rad, sig.sample_rate);
            out.right = phase_shift_wave(&sig.right, f1, f2, phase_rad, sig.sample_rate);
        }
    }
    out
}

fn phase_shift_wave(wave: &[f64], f1: f64, f2: f64, phase_rad: f64, fs: u32) -> Vec<f64> {
    let n = wave.len();
    if n == 0 {
        return Vec::new();
    }
    let n_fft = n.next_power_of_two();
    let mut spectrum = to_complex(wave, n_fft);
    fft_forward(&mut spectrum);

    let bin = |f: f64| (f * n_fft as f64 / fs as f64).round() as usize;
    let start = bin(f1).max(1);
    let end = bin(f2).min(n_fft / 2);

    let rot = Complex::from_polar(1.0, phase_rad);
    let rot_conj = rot.conj();
    for k in start..=end {
        spectrum[k] *= rot;
        let mirror = n_fft - k;
        if mirror != k && mirror < n_fft {
            spectrum[mirror] *= rot_conj;
        }
    }

    fft_inverse(&mut spectrum);
    spectrum.iter().take(n).map(|c| c.re).collect()
}

// ============================================================================
// Pink tilt
// ============================================================================

/// Tilt a white spectrum into a pink one, in place
///
/// Every bin's magnitude is scaled by `sqrt(ref / k)` so power falls
/// at 3 dB per octave. `ref_hz` is the frequency whose spectrum level
/// is left unchanged.
pub fn apply_pink_tilt(sig: &mut StereoBuffer, ref_hz: f64) {
    let n = sig.len();
    if n < 2 {
        return;
    }
    let fs = sig.sample_rate;
    sig.left = pink_tilt_wave(&sig.left, fs, ref_hz);
    sig.right = pink_tilt_wave(&sig.right, fs, ref_hz);
}

fn pink_tilt_wave(wave: &[f64], fs: u32, ref_hz: f64) -> Vec<f64> {
    let n = wave.len();
    let reference = 1.0 + ref_hz * n as f64 / fs as f64;

    let mut spectrum = to_complex(wave, n);
    fft_forward(&mut spectrum);

    for k in 1..=n / 2 {
        let factor = (reference / k as f64).sqrt();
        spectrum[k] *= factor;
        let mirror = n - k;
        if mirror != k {
            spectrum[mirror] *= factor;
        }
    }

    fft_inverse(&mut spectrum);
    spectrum.iter().map(|c| c.re).collect()
}

// ============================================================================
// Tests
// ============================================================================
