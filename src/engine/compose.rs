//! Channel compositor
//!
//! Merges a selection of single-channel sounds sharing one sample rate
//! into a zero-padded stereo buffer. The same function feeds both the
//! playback path and the save path; the save path additionally swaps
//! the columns at the I/O boundary (see `engine::io`).

use crate::engine::buffer::StereoBuffer;
use crate::error::{Result, SoundlabError};
use crate::session::sound::{ChannelRole, Sound};

/// How to resolve a Mono sound into explicit stereo roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonoResolution {
    /// Assign the sound to the left column
    Left,
    /// Assign the sound to the right column
    Right,
    /// Duplicate the sound into both columns
    Duplicate,
}

/// Mix a set of sounds into one stereo buffer
///
/// Every sound is zero-padded on the right to the length of the
/// longest one and added (not overwritten) into the column selected by
/// its channel role, so several sounds routed to the same column mix.
///
/// # Errors
/// * `InvalidParameter` - If `sounds` is empty
/// * `SampleRateMismatch` - If the sounds do not share one sample rate
/// * `UnresolvedChannelRole` - If any sound still has the Mono role;
///   resolve it first with [`resolve_mono`]
pub fn compose_stereo(sounds: &[&Sound]) -> Result<StereoBuffer> {
    let first = sounds.first().ok_or_else(|| SoundlabError::InvalidParameter {
        reason: "no sounds selected for composition".to_string(),
    })?;

    let sample_rate = first.sample_rate();
    for sound in sounds {
        if sound.sample_rate() != sample_rate {
            return Err(SoundlabError::SampleRateMismatch {
                expected: sample_rate,
                found: sound.sample_rate(),
            });
        }
        if sound.channel_role == ChannelRole::Mono {
            return Err(SoundlabError::UnresolvedChannelRole {
                label: sound.label.clone(),
            });
        }
    }

    let target_len = sounds
        .iter()
        .map(|s| s.sample_count())
        .max()
        .unwrap_or(0);

    let mut buffer = StereoBuffer::new(target_len, sample_rate);
    for sound in sounds {
        // Mono was rejected above, so column() is always Some here
        let column = sound
            .channel_role
            .column()
            .expect("mono role rejected by validation");
        buffer.add_into(column, sound.waveform());
    }
    Ok(buffer)
}

/// Resolve a Mono sound into one or two explicitly-routed copies
///
/// Returns new sounds carrying the resolved roles; the input is not
/// modified. Non-Mono sounds come back unchanged as a single copy.
pub fn resolve_mono(sound: &Sound, resolution: MonoResolution) -> Vec<Sound> {
    if sound.channel_role != ChannelRole::Mono {
        return vec![sound.clone()];
    }
    match resolution {
        MonoResolution::Left => {
            let mut s = sound.clone();
            s.channel_role = ChannelRole::Left;
            vec![s]
        }
        MonoResolution::Right => {
            let mut s = sound.clone();
            s.channel_role = ChannelRole::Right;
            vec![s]
        }
        MonoResolution::Duplicate => {
            let mut left = sound.clone();
            left.channel_role = ChannelRole::Left;
            let mut right = sound.clone();
            right.channel_role = ChannelRole::Right;
            vec![left, right]
        }
    }
}
