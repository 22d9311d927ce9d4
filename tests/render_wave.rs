use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec};
use pretty_assertions::assert_eq;
use sonant_core::{RenderOptions, RenderSession, Song, render_song_wave};

const SONG: &str = r#"{
    "rowLen": 5513,
    "endPattern": 3,
    "songData": [
        {
            "osc1_oct": 7, "osc1_vol": 192, "osc1_waveform": 2,
            "osc2_oct": 8, "osc2_det": 7, "osc2_vol": 96, "osc2_waveform": 1,
            "env_attack": 100, "env_sustain": 3000, "env_release": 8000, "env_master": 160,
            "fx_filter": 2, "fx_freq": 4000, "fx_resonance": 120,
            "fx_delay_time": 3, "fx_delay_amt": 60,
            "fx_pan_freq": 3, "fx_pan_amt": 40,
            "lfo_fx_freq": 1, "lfo_freq": 5, "lfo_amt": 90,
            "p": [1, 1],
            "c": [{"n": [135, 0, 0, 0, 138, 0, 0, 0, 142, 0, 0, 0, 147]}]
        },
        {
            "osc1_vol": 0, "osc2_vol": 0, "noise_fader": 200,
            "env_attack": 50, "env_sustain": 200, "env_release": 3000, "env_master": 120,
            "fx_filter": 1, "fx_freq": 9000, "fx_resonance": 200,
            "p": [1, 1],
            "c": [{"n": [0, 0, 0, 0, 123, 0, 0, 0, 0, 0, 0, 0, 123]}]
        }
    ]
}"#;

fn decode(wav: &[u8]) -> (WavSpec, u32, Vec<i16>) {
    let mut reader = WavReader::new(Cursor::new(wav)).expect("valid WAVE");
    let spec = reader.spec();
    let duration = reader.duration();
    let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>().unwrap();
    (spec, duration, samples)
}

#[test]
fn song_renders_to_16bit_stereo_pcm() {
    let song = Song::from_json(SONG).unwrap();
    let wav = render_song_wave(&song, None).unwrap();
    let (spec, duration, samples) = decode(&wav);

    assert_eq!(
        spec,
        WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    );
    let frames = RenderOptions::whole_song(&song).frames();
    assert_eq!(duration as usize, frames);
    assert_eq!(samples.len(), frames * 2);
    assert!(samples.iter().any(|&s| s != 0), "song should be audible");
    assert!(samples.iter().all(|&s| s != i16::MIN), "samples are clamped symmetrically");
}

#[test]
fn decoded_samples_match_clamped_mix() {
    let song = Song::from_json(SONG).unwrap();
    let mut session = RenderSession::new(song, None).unwrap();
    session.run();
    let expected: Vec<i16> = session
        .mix_words()
        .iter()
        .map(|&w| w.clamp(-32767, 32767) as i16)
        .collect();
    let (_, _, samples) = decode(&session.create_wave());
    assert_eq!(samples.len(), expected.len());
    assert!(samples == expected, "WAVE payload differs from the mix");
}

#[test]
fn renders_are_reproducible() {
    let song = Song::from_json(SONG).unwrap();
    let a = render_song_wave(&song, None).unwrap();
    let b = render_song_wave(&song, None).unwrap();
    assert!(a == b, "same song and seed must give identical bytes");

    let reseeded = RenderOptions::whole_song(&song).with_seed(12345);
    let c = render_song_wave(&song, Some(reseeded)).unwrap();
    assert_eq!(c.len(), a.len());
    assert!(c != a, "noise instrument should follow the seed");
}

#[test]
fn selection_export_has_preview_length() {
    let song = Song::from_json(SONG).unwrap();
    let opts = RenderOptions::selection(&song, 1..=1, 0..=0);
    let wav = render_song_wave(&song, Some(opts)).unwrap();
    let (_, duration, _) = decode(&wav);
    // One sequence row plus the eight-row tail.
    assert_eq!(duration, (40.0f64 * 5513.0).round() as u32);
}

#[test]
fn empty_song_is_silent() {
    let wav = render_song_wave(&Song::new(), None).unwrap();
    let (_, duration, samples) = decode(&wav);
    assert_eq!(duration, 9 * 44100);
    assert!(samples.iter().all(|&s| s == 0));
}

#[test]
fn song_json_round_trips() {
    let song = Song::from_json(SONG).unwrap();
    let again = Song::from_json(&song.to_json().unwrap()).unwrap();
    assert_eq!(again, song);
}
