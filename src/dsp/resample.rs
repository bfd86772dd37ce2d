//! Fourier-domain resampling
//!
//! Changes the sample rate of a waveform by truncating or zero-padding
//! its spectrum. The output length is exactly
//! `round(len * new_rate / old_rate)`; an optional smoothing window is
//! applied over the spectrum before the length change to trade
//! sharpness for reduced ringing.

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

/// Resampling algorithm selector
///
/// Only the Fourier method is implemented; the enum keeps the engine
/// API stable if a polyphase kernel is added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResampleMethod {
    #[default]
    Fourier,
}

/// Spectral smoothing window applied during resampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmoothingWindow {
    #[default]
    None,
    Hamming,
    Hanning,
    Blackman,
    Bartlett,
}

impl SmoothingWindow {
    /// Periodic window samples of length `n`, or None for no window
    fn samples(&self, n: usize) -> Option<Vec<f64>> {
        use std::f64::consts::PI;
        let nf = n as f64;
        let w = |f: &dyn Fn(f64) -> f64| -> Vec<f64> {
            (0..n).map(|i| f(i as f64 / nf)).collect()
        };
        match self {
            SmoothingWindow::None => None,
            SmoothingWindow::Hamming => Some(w(&|x| 0.54 - 0.46 * (2.0 * PI * x).cos())),
            SmoothingWindow::Hanning => Some(w(&|x| 0.5 - 0.5 * (2.0 * PI * x).cos())),
            SmoothingWindow::Blackman => Some(w(&|x| {
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })),
            SmoothingWindow::Bartlett => Some(w(&|x| 1.0 - (2.0 * x - 1.0).abs())),
        }
    }
}

impl std::str::FromStr for SmoothingWindow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SmoothingWindow::None),
            "hamming" => Ok(SmoothingWindow::Hamming),
            "hanning" => Ok(SmoothingWindow::Hanning),
            "blackman" => Ok(SmoothingWindow::Blackman),
            "bartlett" => Ok(SmoothingWindow::Bartlett),
            other => Err(format!("unknown smoothing window '{}'", other)),
        }
    }
}

/// Resample a waveform to a new rate
///
/// # Arguments
/// * `wave` - Input samples at `old_rate`
/// * `new_rate` - Target sample rate in Hz
/// * `old_rate` - Current sample rate in Hz
/// * `method` - Resampling algorithm
/// * `window` - Spectral smoothing window, or `SmoothingWindow::None`
///
/// # Returns
/// The resampled waveform, `round(len * new_rate / old_rate)` samples
/// long.
pub fn resample_kernel(
    wave: &[f64],
    new_rate: u32,
    old_rate: u32,
    method: ResampleMethod,
    window: SmoothingWindow,
) -> Vec<f64> {
    let ResampleMethod::Fourier = method;

    let n = wave.len();
    let m = (n as f64 * new_rate as f64 / old_rate as f64).round() as usize;
    if n == 0 || m == 0 {
        return vec![0.0; m];
    }
    if m == n {
        return wave.to_vec();
    }

    let mut planner = FftPlanner::new();
    let mut x: Vec<Complex<f64>> = wave.iter().map(|&s| Complex::new(s, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut x);

    // The window is given centered on DC (spectrum order)
    if let Some(w) = window.samples(n) {
        for (k, c) in x.iter_mut().enumerate() {
            *c *= w[(k + n / 2) % n];
        }
    }

    // Copy the shared part of the spectrum, folding or splitting the
    // Nyquist bin as needed.
    let mut y = vec![Complex::new(0.0, 0.0); m];
    let nmin = n.min(m);
    y[0] = x[0];
    for k in 1..=(nmin - 1) / 2 {
        y[k] = x[k];
        y[m - k] = x[n - k];
    }
    if nmin % 2 == 0 {
        let h = nmin / 2;
        if m < n {
            y[h] = x[h] + x[n - h];
        } else if m > n {
            y[h] = x[h] * 0.5;
            y[m - h] = x[n - h] * 0.5;
        } else {
            y[h] = x[h];
        }
    }

    planner.plan_fft_inverse(m).process(&mut y);
    let scale = 1.0 / n as f64; // ifft normalization and m/n amplitude scale combined
    y.iter().map(|c| c.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::level::rms;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn sine(freq: f64, fs: u32, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs as f64).sin())
            .collect()
    }

    #[test_case(48000, 48000, 24000, 24000; "downsample by two")]
    #[test_case(48000, 48000, 96000, 96000; "upsample by two")]
    #[test_case(1000, 8000, 44100, 5513; "fractional ratio rounds")]
    #[test_case(4800, 48000, 32000, 3200; "two thirds")]
    fn test_output_length_is_exact(len: usize, old: u32, new: u32, expected: usize) {
        let wave = vec![0.25; len];
        let out = resample_kernel(&wave, new, old, ResampleMethod::Fourier, SmoothingWindow::None);
        assert_eq!(out.len(), expected);
    }

    #[test]
    fn test_same_rate_is_identity() {
        let wave = sine(440.0, 48000, 4800);
        let out = resample_kernel(
            &wave,
            48000,
            48000,
            ResampleMethod::Fourier,
            SmoothingWindow::None,
        );
        assert_eq!(out, wave);
    }

    #[test]
    fn test_downsample_preserves_tone_level() {
        // 100 full cycles, so the tone occupies a single bin and
        // survives the rate change untouched
        let wave = sine(1000.0, 48000, 4800);
        let out = resample_kernel(
            &wave,
            24000,
            48000,
            ResampleMethod::Fourier,
            SmoothingWindow::None,
        );
        assert_eq!(out.len(), 2400);
        assert_relative_eq!(rms(&out), 1.0 / 2.0_f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_upsample_round_trip() {
        let wave = sine(440.0, 8000, 800);
        let up = resample_kernel(
            &wave,
            16000,
            8000,
            ResampleMethod::Fourier,
            SmoothingWindow::None,
        );
        let back = resample_kernel(
            &up,
            8000,
            16000,
            ResampleMethod::Fourier,
            SmoothingWindow::None,
        );
        assert_eq!(back.len(), wave.len());
        for (a, b) in back.iter().zip(wave.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_windowed_resample_length() {
        let wave = sine(440.0, 48000, 4800);
        for window in [
            SmoothingWindow::Hamming,
            SmoothingWindow::Hanning,
            SmoothingWindow::Blackman,
            SmoothingWindow::Bartlett,
        ] {
            let out = resample_kernel(&wave, 32000, 48000, ResampleMethod::Fourier, window);
            assert_eq!(out.len(), 3200);
        }
    }

    #[test]
    fn test_window_parsing() {
        assert_eq!(
            "hamming".parse::<SmoothingWindow>().unwrap(),
            SmoothingWindow::Hamming
        );
        assert!("boxcar".parse::<SmoothingWindow>().is_err());
    }
}
