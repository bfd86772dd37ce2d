//! The Sound entity
//!
//! A Sound is a single-channel waveform plus metadata: display label,
//! channel role, sample rate and (for file-loaded sounds) bit depth.
//! Derived quantities (`sample_count`, `duration`) are computed by
//! accessor and never stored, so they cannot drift from the waveform.

use serde::{Deserialize, Serialize};

/// Logical assignment of a Sound to a stereo column during composition.
///
/// `Mono` is a valid storage role for a freshly loaded single-channel
/// file, but the compositor refuses it: callers must resolve Mono into
/// explicit Left/Right roles first (see `engine::compose::resolve_mono`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelRole {
    Left,
    Right,
    Mono,
}

impl ChannelRole {
    /// Stereo column index for this role, or None for Mono
    pub fn column(&self) -> Option<usize> {
        match self {
            ChannelRole::Left => Some(0),
            ChannelRole::Right => Some(1),
            ChannelRole::Mono => None,
        }
    }
}

impl std::fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelRole::Left => write!(f, "Left"),
            ChannelRole::Right => write!(f, "Right"),
            ChannelRole::Mono => write!(f, "Mono"),
        }
    }
}

/// A single-channel sound buffer with its session metadata
///
/// Samples are 64-bit floats in nominal ±1.0 full-scale range. The
/// waveform and sample rate only change together through
/// [`Sound::replace_waveform`], which keeps duration consistent at every
/// observable instant.
#[derive(Debug, Clone)]
pub struct Sound {
    /// Display name; mutable, no uniqueness constraint
    pub label: String,
    /// Stereo column this sound contributes to when composing
    pub channel_role: ChannelRole,
    /// Bit depth of the source file; None for synthetic or derived sounds
    pub bit_depth: Option<u16>,
    waveform: Vec<f64>,
    sample_rate: u32,
}

impl Sound {
    /// Create a new sound from a waveform
    ///
    /// # Arguments
    /// * `label` - Display name
    /// * `channel_role` - Stereo column assignment
    /// * `waveform` - Single-channel samples
    /// * `sample_rate` - Sample rate in Hz (must be positive)
    pub fn new(
        label: impl Into<String>,
        channel_role: ChannelRole,
        waveform: Vec<f64>,
        sample_rate: u32,
    ) -> Self {
        debug_assert!(sample_rate > 0, "sample rate must be positive");
        Self {
            label: label.into(),
            channel_role,
            bit_depth: None,
            waveform,
            sample_rate,
        }
    }

    /// Create a sound loaded from a file with a known bit depth
    pub fn from_file(
        label: impl Into<String>,
        channel_role: ChannelRole,
        waveform: Vec<f64>,
        sample_rate: u32,
        bit_depth: u16,
    ) -> Self {
        let mut sound = Self::new(label, channel_role, waveform, sample_rate);
        sound.bit_depth = Some(bit_depth);
        sound
    }

    /// The waveform samples
    #[inline]
    pub fn waveform(&self) -> &[f64] {
        &self.waveform
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples (derived, never stored)
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.waveform.len()
    }

    /// Duration in seconds (derived, never stored)
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.waveform.len() as f64 / self.sample_rate as f64
    }

    /// Replace the waveform, keeping the current sample rate
    ///
    /// Used by cut and scale, which change samples but not the rate.
    pub fn set_waveform(&mut self, waveform: Vec<f64>) {
        self.waveform = waveform;
    }

    /// Replace waveform and sample rate together
    ///
    /// The resample operation is the only caller: the two fields must
    /// change atomically so duration stays consistent.
    pub fn replace_waveform(&mut self, waveform: Vec<f64>, sample_rate: u32) {
        debug_assert!(sample_rate > 0, "sample rate must be positive");
        self.waveform = waveform;
        self.sample_rate = sample_rate;
    }

    /// Metadata summary for display and machine-readable listings
    pub fn info(&self, id: &str) -> SoundInfo {
        SoundInfo {
            id: id.to_string(),
            label: self.label.clone(),
            channel_role: self.channel_role,
            sample_rate: self.sample_rate,
            sample_count: self.sample_count(),
            duration_secs: self.duration_secs(),
            bit_depth: self.bit_depth,
        }
    }
}

/// Read-only metadata snapshot of a Sound, keyed by its registry id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundInfo {
    pub id: String,
    pub label: String,
    pub channel_role: ChannelRole,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_secs: f64,
    pub bit_depth: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_fields() {
        let sound = Sound::new("tone", ChannelRole::Left, vec![0.0; 22050], 44100);
        assert_eq!(sound.sample_count(), 22050);
        assert_relative_eq!(sound.duration_secs(), 0.5);
    }

    #[test]
    fn test_duration_tracks_waveform_mutation() {
        let mut sound = Sound::new("tone", ChannelRole::Left, vec![0.0; 44100], 44100);
        assert_relative_eq!(sound.duration_secs(), 1.0);

        sound.set_waveform(vec![0.0; 11025]);
        assert_eq!(sound.sample_count(), 11025);
        assert_relative_eq!(sound.duration_secs(), 0.25);
    }

    #[test]
    fn test_replace_waveform_updates_rate_atomically() {
        let mut sound = Sound::new("tone", ChannelRole::Right, vec![0.0; 48000], 48000);
        sound.replace_waveform(vec![0.0; 24000], 24000);
        assert_eq!(sound.sample_rate(), 24000);
        assert_relative_eq!(sound.duration_secs(), 1.0);
    }

    #[test]
    fn test_bit_depth_only_for_file_sounds() {
        let synth = Sound::new("noise", ChannelRole::Left, vec![0.0; 10], 48000);
        assert_eq!(synth.bit_depth, None);

        let loaded = Sound::from_file("clip", ChannelRole::Mono, vec![0.0; 10], 48000, 16);
        assert_eq!(loaded.bit_depth, Some(16));
    }

    #[test]
    fn test_channel_role_columns() {
        assert_eq!(ChannelRole::Left.column(), Some(0));
        assert_eq!(ChannelRole::Right.column(), Some(1));
        assert_eq!(ChannelRole::Mono.column(), None);
    }
}
