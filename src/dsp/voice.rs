//! Voice — synthesizes single notes of one instrument.
//!
//! Each note runs two oscillators, optional white noise, a shared LFO, the
//! amplitude envelope, a state-variable filter and an auto-panner, then adds
//! the result into an interleaved stereo `i32` channel buffer.

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::rng::white_noise;
use crate::song::Instrument;

use super::envelope::Envelope;
use super::filter::{FilterMode, StateVariableFilter};
use super::note::{CHANNELS, SAMPLE_RATE, note_frequency};
use super::oscillator::Waveform;

/// Instrument parameters resolved for a given row length.
#[derive(Debug, Clone)]
pub struct Voice {
    osc1_waveform: Waveform,
    osc1_tuning: f64,
    osc1_stretch: f64,
    osc1_vol: f64,
    osc1_xenv: bool,
    osc1_lfo: bool,

    osc2_waveform: Waveform,
    osc2_tuning: f64,
    osc2_vol: f64,
    osc2_xenv: bool,

    noise_vol: f64,
    envelope: Envelope,

    lfo_waveform: Waveform,
    lfo_freq: f64,
    lfo_amt: f64,

    filter_mode: FilterMode,
    filter_angle: f64,
    filter_lfo: bool,
    resonance: f64,

    pan_freq: f64,
    pan_amt: f64,
}

impl Voice {
    pub fn new(instr: &Instrument, row_len: u32) -> Self {
        let row_len = row_len.max(1) as f64;
        let master = 156.0 / 255.0 * instr.env_master as f64;
        Voice {
            osc1_waveform: instr.osc1_waveform,
            osc1_tuning: octave_offset(instr.osc1_oct, instr.osc1_det),
            osc1_stretch: 1.0 + 0.0008 * instr.osc1_detune as f64,
            osc1_vol: instr.osc1_vol as f64 * master,
            osc1_xenv: instr.osc1_xenv,
            osc1_lfo: instr.lfo_osc1_freq,

            // Oscillator 2 takes no fine-detune stretch and no LFO routing.
            osc2_waveform: instr.osc2_waveform,
            osc2_tuning: octave_offset(instr.osc2_oct, instr.osc2_det),
            osc2_vol: instr.osc2_vol as f64 * master,
            osc2_xenv: instr.osc2_xenv,

            noise_vol: instr.noise_fader as f64 * master,
            envelope: Envelope::new(instr.env_attack, instr.env_sustain, instr.env_release),

            lfo_waveform: instr.lfo_waveform,
            lfo_freq: 2f64.powi(instr.lfo_freq as i32 - 8) / row_len,
            lfo_amt: instr.lfo_amt as f64 / 512.0,

            filter_mode: instr.fx_filter,
            filter_angle: instr.fx_freq as f64 * PI / SAMPLE_RATE as f64,
            filter_lfo: instr.lfo_fx_freq,
            resonance: instr.fx_resonance as f64 / 255.0,

            pan_freq: TAU * 2f64.powi(instr.fx_pan_freq as i32 - 8) / row_len,
            pan_amt: instr.fx_pan_amt as f64 / 512.0,
        }
    }

    /// Note length in samples.
    pub fn duration(&self) -> usize {
        self.envelope.len()
    }

    /// Phase increments (cycles per sample) of both oscillators for a note slot.
    pub fn increments(&self, note: u8) -> (f64, f64) {
        let n = note as f64;
        (
            note_frequency(n + self.osc1_tuning) * self.osc1_stretch,
            note_frequency(n + self.osc2_tuning),
        )
    }

    /// Render one note starting at sample `onset` and add it into `buf`.
    ///
    /// `onset` also drives the LFO and panner phase, so it must be measured
    /// from the start of the render window. Samples past the end of `buf`
    /// are dropped.
    pub fn render_note<R: Rng + ?Sized>(
        &self,
        note: u8,
        onset: usize,
        buf: &mut [i32],
        rng: &mut R,
    ) {
        let (o1t, o2t) = self.increments(note);
        let mut filter = StateVariableFilter::new(self.filter_mode, self.resonance);
        let mut c1 = 0.0;
        let mut c2 = 0.0;

        for j in 0..self.envelope.len() {
            let k = onset + j;
            let word = k * CHANNELS;
            if word + 1 >= buf.len() {
                break;
            }
            let kf = k as f64;
            let e = self.envelope.level(j);

            let lfo = self.lfo_waveform.sample(self.lfo_freq * kf) * self.lfo_amt + 0.5;

            let mut t = o1t;
            if self.osc1_lfo {
                t += lfo;
            }
            if self.osc1_xenv {
                t *= e * e;
            }
            c1 += t;
            let mut sample = self.osc1_waveform.sample(c1) * self.osc1_vol;

            let mut t = o2t;
            if self.osc2_xenv {
                t *= e * e;
            }
            c2 += t;
            sample += self.osc2_waveform.sample(c2) * self.osc2_vol;

            if self.noise_vol != 0.0 {
                sample += white_noise(rng) * self.noise_vol * e;
            }

            sample *= e;

            let angle = if self.filter_lfo {
                self.filter_angle * lfo
            } else {
                self.filter_angle
            };
            sample = filter.process(sample, StateVariableFilter::coefficient(angle));

            let pan = (self.pan_freq * kf).sin() * self.pan_amt + 0.5;
            buf[word] = buf[word].saturating_add((sample * (1.0 - pan)) as i32);
            buf[word + 1] = buf[word + 1].saturating_add((sample * pan) as i32);
        }
    }
}

/// Semitone offset from an octave (8 = no shift) and semitone setting.
fn octave_offset(octave: u8, semitones: u8) -> f64 {
    (octave as f64 - 8.0) * 12.0 + semitones as f64
}

/// Render a single note of `instr` into a fresh stereo buffer.
///
/// The buffer holds exactly the note's envelope length in frames.
pub fn render_note<R: Rng + ?Sized>(
    instr: &Instrument,
    row_len: u32,
    note: u8,
    rng: &mut R,
) -> Vec<i32> {
    let voice = Voice::new(instr, row_len);
    let mut buf = vec![0i32; voice.duration() * CHANNELS];
    voice.render_note(note, 0, &mut buf, rng);
    buf
}
