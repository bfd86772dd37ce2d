//! Integration Tests
//!
//! End-to-end tests for the session engine: registry lifecycle,
//! composition, transforms and generation working together.

use std::collections::HashSet;

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;

use soundlab::dsp::resample::{ResampleMethod, SmoothingWindow};
use soundlab::dsp::synth::Ear;
use soundlab::engine::buffer::StereoBuffer;
use soundlab::engine::compose::compose_stereo;
use soundlab::engine::io::{load_wav, save_stereo};
use soundlab::engine::transform::{
    concatenate, cut, level_difference_db, resample, scale_db, ConcatOrder, DelayMode,
};
use soundlab::session::registry::SoundRegistry;
use soundlab::session::sound::{ChannelRole, Sound};
use soundlab::session::stimulus::{generate_noise, NoiseParams};

fn sine(freq: f64, fs: u32, secs: f64) -> Vec<f64> {
    let n = (secs * fs as f64).round() as usize;
    (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs as f64).sin())
        .collect()
}

// === Registry lifecycle ===

#[test]
fn test_ids_distinct_across_many_insertions() {
    let mut registry = SoundRegistry::new();
    let mut seen = HashSet::new();
    for i in 0..500 {
        let sound = Sound::new(format!("s{}", i), ChannelRole::Left, vec![0.0; 4], 48000);
        let id = registry.insert(sound).unwrap();
        assert!(seen.insert(id));
    }
}

#[test]
fn test_clone_semantics() {
    let mut registry = SoundRegistry::new();
    let id = registry
        .insert(Sound::new("tone", ChannelRole::Left, sine(440.0, 48000, 0.1), 48000))
        .unwrap();
    let copy_id = registry.clone_sound(&id).unwrap();

    assert_ne!(id, copy_id);
    let source = registry.get(&id).unwrap();
    let copy = registry.get(&copy_id).unwrap();
    assert_eq!(copy.label, "tone (copy)");
    assert_eq!(copy.waveform(), source.waveform());
}

// === Spec scenario: compose a 1.0 s Left and a 0.5 s Right sound ===

#[test]
fn test_compose_scenario_one_second_and_half_second() {
    let mut registry = SoundRegistry::new();
    let left_id = registry
        .insert(Sound::new(
            "left",
            ChannelRole::Left,
            sine(440.0, 44100, 1.0),
            44100,
        ))
        .unwrap();
    let right_id = registry
        .insert(Sound::new(
            "right",
            ChannelRole::Right,
            sine(880.0, 44100, 0.5),
            44100,
        ))
        .unwrap();

    let sounds = registry
        .get_many(&[left_id.as_str(), right_id.as_str()])
        .unwrap();
    let buffer = compose_stereo(&sounds).unwrap();

    assert_eq!(buffer.len(), 44100);
    // Column 0 (Left) carries signal over the full second
    assert!(buffer.left[..44100].iter().any(|&s| s != 0.0));
    assert!(buffer.left[22050..].iter().any(|&s| s != 0.0));
    // Column 1 (Right) is signal for the first half, then exactly zero
    assert!(buffer.right[..22050].iter().any(|&s| s != 0.0));
    assert!(buffer.right[22050..].iter().all(|&s| s == 0.0));
}

// === Spec scenario: 0-delay gap concatenation ===

#[test]
fn test_concatenate_scenario_two_seconds() {
    let a = sine(440.0, 8000, 1.0);
    let b = sine(880.0, 8000, 1.0);
    assert_eq!(a.len(), 8000);

    let joined = concatenate(
        &a,
        &b,
        0.0,
        DelayMode::Gap,
        ConcatOrder::FirstThenSecond,
        8000,
    )
    .unwrap();
    assert_eq!(joined.len(), 16000);
}

// === Transform properties ===

#[test]
fn test_cut_length_property() {
    let wave = sine(440.0, 8000, 1.0);
    for (s, e) in [(0, 100), (100, 8000), (4000, 4001)] {
        let out = cut(&wave, s, e).unwrap();
        assert_eq!(out.len(), wave.len() - (e - s));
    }
    assert_eq!(
        cut(&wave, 0, wave.len()).unwrap_err().error_code(),
        "CUT_WHOLE_BUFFER"
    );
}

#[test]
fn test_scale_round_trip_property() {
    let wave = sine(440.0, 48000, 0.25);
    for db in [-30.0, -3.0, 0.0, 7.5, 18.0] {
        let back = scale_db(-db, &scale_db(db, &wave));
        for (a, b) in back.iter().zip(wave.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_resample_exact_output_length() {
    let wave = sine(440.0, 44100, 0.3);
    let cases = [(48000u32, 14400usize), (22050, 6615), (96000, 28800)];
    for (new_rate, expected) in cases {
        let out = resample(
            &wave,
            44100,
            new_rate,
            ResampleMethod::Fourier,
            SmoothingWindow::Hamming,
        )
        .unwrap();
        let predicted = (wave.len() as f64 * new_rate as f64 / 44100.0).round() as usize;
        assert_eq!(out.len(), predicted);
        assert_eq!(out.len(), expected);
    }
}

#[test]
fn test_level_difference_of_sound_with_itself_is_zero() {
    let wave = sine(1000.0, 48000, 0.2);
    assert_relative_eq!(level_difference_db(&wave, &wave).unwrap(), 0.0);
}

// === Generation feeding composition ===

#[test]
fn test_generated_pair_composes_directly() {
    let mut registry = SoundRegistry::new();
    let ids = generate_noise(
        &mut registry,
        &NoiseParams {
            ear: Ear::Both,
            ..NoiseParams::default()
        },
    )
    .unwrap();
    assert_eq!(ids.len(), 2);

    let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
    let sounds = registry.get_many(&id_refs).unwrap();
    let buffer = compose_stereo(&sounds).unwrap();
    assert_eq!(buffer.len(), sounds[0].sample_count());
    assert!(buffer.left.iter().any(|&s| s != 0.0));
    assert!(buffer.right.iter().any(|&s| s != 0.0));
}

// === The save-path column swap ===
//
// The on-disk convention is the mirror image of the in-memory one: the
// compositor's column 0 (Left) is written as the file's SECOND
// (right) channel and vice versa. Removing the swap would silently
// change the channel semantics of every saved file, so these tests pin
// the behavior down explicitly.

#[test]
fn test_save_path_column_swap_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("composed.wav");

    let mut registry = SoundRegistry::new();
    let left_id = registry
        .insert(Sound::new(
            "marker-left",
            ChannelRole::Left,
            vec![0.5; 1000],
            48000,
        ))
        .unwrap();
    let right_id = registry
        .insert(Sound::new(
            "marker-right",
            ChannelRole::Right,
            vec![-0.5; 1000],
            48000,
        ))
        .unwrap();

    let sounds = registry
        .get_many(&[left_id.as_str(), right_id.as_str()])
        .unwrap();
    let buffer = compose_stereo(&sounds).unwrap();
    save_stereo(&path, &buffer, 32).unwrap();

    let on_disk = load_wav(&path).unwrap();
    // File channel 0 holds the in-memory RIGHT column
    assert!(on_disk.channels[0].iter().all(|&s| (s + 0.5).abs() < 1e-6));
    // File channel 1 holds the in-memory LEFT column
    assert!(on_disk.channels[1].iter().all(|&s| (s - 0.5).abs() < 1e-6));
}

#[test]
fn test_playback_buffer_and_saved_file_use_same_compositor() {
    // The playback path consumes the compositor output directly; the
    // save path must produce that same buffer before its swap.
    let left = Sound::new("l", ChannelRole::Left, sine(440.0, 48000, 0.1), 48000);
    let right = Sound::new("r", ChannelRole::Right, sine(660.0, 48000, 0.1), 48000);

    let playback = compose_stereo(&[&left, &right]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.wav");
    save_stereo(&path, &playback, 32).unwrap();
    let on_disk = load_wav(&path).unwrap();

    for (mem, disk) in playback.left.iter().zip(on_disk.channels[1].iter()) {
        assert!((mem - disk).abs() < 1e-6);
    }
    for (mem, disk) in playback.right.iter().zip(on_disk.channels[0].iter()) {
        assert!((mem - disk).abs() < 1e-6);
    }
}

// === Failure atomicity ===

#[test]
fn test_failed_composition_has_no_side_effects() {
    let mut registry = SoundRegistry::new();
    let a = registry
        .insert(Sound::new("a", ChannelRole::Left, vec![1.0; 10], 48000))
        .unwrap();
    let b = registry
        .insert(Sound::new("b", ChannelRole::Right, vec![1.0; 10], 44100))
        .unwrap();

    let sounds = registry.get_many(&[a.as_str(), b.as_str()]).unwrap();
    let err = compose_stereo(&sounds).unwrap_err();
    assert_eq!(err.error_code(), "SAMPLE_RATE_MISMATCH");

    // Registry and sounds untouched by the failed call
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(&a).unwrap().sample_count(), 10);
}

#[test]
fn test_stereo_buffer_swap_is_an_involution() {
    let buffer = StereoBuffer {
        left: vec![1.0, 2.0, 3.0],
        right: vec![4.0, 5.0, 6.0],
        sample_rate: 48000,
    };
    let swapped = buffer.to_interleaved_swapped();
    let plain = buffer.to_interleaved();
    // Swapping exchanges the two slots of every frame
    for frame in 0..3 {
        assert_eq!(swapped[2 * frame], plain[2 * frame + 1]);
        assert_eq!(swapped[2 * frame + 1], plain[2 * frame]);
    }
}
