//! Song data model.
//!
//! These types map directly onto the tracker's JSON song layout
//! (`rowLen`, `endPattern`, `songData[].osc1_oct`, `p`, `c[].n`, ...).
//! A song is read-only input to the renderer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dsp::filter::FilterMode;
use crate::dsp::note::SAMPLE_RATE;
use crate::dsp::oscillator::Waveform;
use crate::error::{Result, SonantError};

/// Instruments (channels) per song.
pub const NUM_INSTRUMENTS: usize = 8;
/// Sequence slots per instrument.
pub const SEQUENCE_LENGTH: usize = 48;
/// Maximum pattern definitions per instrument.
pub const MAX_COLUMNS: usize = 10;
/// Note slots (rows) per pattern.
pub const PATTERN_LENGTH: usize = 32;

// ── Song ────────────────────────────────────────────────────

/// A complete song: tempo, length and exactly eight instruments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SongFile")]
pub struct Song {
    /// Samples per pattern row.
    pub row_len: u32,
    /// One past the last played sequence row, plus one.
    pub end_pattern: u32,
    /// Song duration in seconds. Advisory; render options may override it.
    pub song_len: f64,
    #[serde(rename = "songData")]
    pub instruments: Vec<Instrument>,
}

/// Lenient on-disk shape: accepts the compacted export form.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SongFile {
    row_len: u32,
    end_pattern: u32,
    #[serde(default)]
    song_len: Option<f64>,
    #[serde(default)]
    song_data: Vec<Instrument>,
}

impl From<SongFile> for Song {
    fn from(file: SongFile) -> Self {
        let mut instruments = file.song_data;
        for instr in &mut instruments {
            instr.pad();
        }
        while instruments.len() < NUM_INSTRUMENTS {
            instruments.push(Instrument::default());
        }
        let song_len = file
            .song_len
            .unwrap_or_else(|| song_length_seconds(file.end_pattern, file.row_len));
        Song {
            row_len: file.row_len,
            end_pattern: file.end_pattern,
            song_len,
            instruments,
        }
    }
}

impl Default for Song {
    fn default() -> Self {
        Song::new()
    }
}

impl Song {
    /// An empty 120 BPM song with default instruments.
    pub fn new() -> Self {
        let row_len = samples_per_row(120);
        let end_pattern = 2;
        Song {
            row_len,
            end_pattern,
            song_len: song_length_seconds(end_pattern, row_len),
            instruments: vec![Instrument::default(); NUM_INSTRUMENTS],
        }
    }

    /// Decode a song from the tracker's JSON format and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let song: Song = serde_json::from_str(json)?;
        song.validate()?;
        Ok(song)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Tempo in beats per minute (four rows per beat).
    pub fn bpm(&self) -> u32 {
        if self.row_len == 0 {
            return 0;
        }
        (60.0 * SAMPLE_RATE as f64 / 4.0 / self.row_len as f64).round() as u32
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.row_len = samples_per_row(bpm);
        self.song_len = song_length_seconds(self.end_pattern, self.row_len);
    }

    pub fn rows_per_second(&self) -> f64 {
        SAMPLE_RATE as f64 / self.row_len as f64
    }

    /// Index of the last sequence row played by default.
    pub fn last_row(&self) -> usize {
        self.end_pattern.saturating_sub(2) as usize
    }

    /// Recompute `end_pattern` and `song_len` from the sequence contents.
    pub fn update_ranges(&mut self) {
        let last_used = (0..SEQUENCE_LENGTH).rev().find(|&row| {
            self.instruments
                .iter()
                .any(|instr| instr.patterns.get(row).is_some_and(|&p| p > 0))
        });
        self.end_pattern = last_used.map_or(2, |row| row as u32 + 2);
        self.song_len = song_length_seconds(self.end_pattern, self.row_len);
    }

    /// Check the structural invariants the renderer relies on.
    pub fn validate(&self) -> Result<()> {
        if self.row_len == 0 {
            return Err(SonantError::ZeroRowLength);
        }
        if !(2..=SEQUENCE_LENGTH as u32 + 1).contains(&self.end_pattern) {
            return Err(SonantError::EndPattern(self.end_pattern));
        }
        if self.instruments.len() != NUM_INSTRUMENTS {
            return Err(SonantError::InstrumentCount {
                expected: NUM_INSTRUMENTS,
                found: self.instruments.len(),
            });
        }
        for (i, instr) in self.instruments.iter().enumerate() {
            instr.validate(i)?;
        }
        Ok(())
    }
}

/// Samples per row for a tempo in BPM (four rows per beat).
pub fn samples_per_row(bpm: u32) -> u32 {
    (60.0 * SAMPLE_RATE as f64 / 4.0 / bpm.max(1) as f64).round() as u32
}

/// Song duration in whole seconds, including an eight-row tail.
pub fn song_length_seconds(end_pattern: u32, row_len: u32) -> f64 {
    ((end_pattern as f64 * PATTERN_LENGTH as f64 + 8.0) * row_len as f64 / SAMPLE_RATE as f64)
        .round()
}

// ── Instrument ──────────────────────────────────────────────

/// One synth voice and its note data.
///
/// Missing fields decode to the tracker's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    // Oscillator 1
    pub osc1_oct: u8,
    pub osc1_det: u8,
    pub osc1_detune: u8,
    #[serde(with = "flag")]
    pub osc1_xenv: bool,
    pub osc1_vol: u8,
    pub osc1_waveform: Waveform,

    // Oscillator 2
    pub osc2_oct: u8,
    pub osc2_det: u8,
    pub osc2_detune: u8,
    #[serde(with = "flag")]
    pub osc2_xenv: bool,
    pub osc2_vol: u8,
    pub osc2_waveform: Waveform,

    pub noise_fader: u8,

    // Envelope, in samples
    pub env_attack: u32,
    pub env_sustain: u32,
    pub env_release: u32,
    pub env_master: u8,

    // Effects
    pub fx_filter: FilterMode,
    pub fx_freq: u32,
    pub fx_resonance: u8,
    pub fx_delay_time: u8,
    pub fx_delay_amt: u8,
    pub fx_pan_freq: u8,
    pub fx_pan_amt: u8,

    // LFO
    #[serde(with = "flag")]
    pub lfo_osc1_freq: bool,
    #[serde(with = "flag")]
    pub lfo_fx_freq: bool,
    pub lfo_freq: u8,
    pub lfo_amt: u8,
    pub lfo_waveform: Waveform,

    /// Sequence: 0 = silent, otherwise 1-based index into `columns`.
    #[serde(rename = "p")]
    pub patterns: Vec<u8>,
    /// Pattern definitions.
    #[serde(rename = "c")]
    pub columns: Vec<Column>,
}

impl Default for Instrument {
    fn default() -> Self {
        Instrument {
            osc1_oct: 7,
            osc1_det: 0,
            osc1_detune: 0,
            osc1_xenv: false,
            osc1_vol: 192,
            osc1_waveform: Waveform::Sine,
            osc2_oct: 7,
            osc2_det: 0,
            osc2_detune: 0,
            osc2_xenv: false,
            osc2_vol: 192,
            osc2_waveform: Waveform::Sine,
            noise_fader: 0,
            env_attack: 200,
            env_sustain: 2000,
            env_release: 20000,
            env_master: 192,
            fx_filter: FilterMode::Off,
            fx_freq: 11025,
            fx_resonance: 255,
            fx_delay_time: 0,
            fx_delay_amt: 0,
            fx_pan_freq: 0,
            fx_pan_amt: 0,
            lfo_osc1_freq: false,
            lfo_fx_freq: false,
            lfo_freq: 0,
            lfo_amt: 0,
            lfo_waveform: Waveform::Sine,
            patterns: vec![0; SEQUENCE_LENGTH],
            columns: vec![Column::default(); MAX_COLUMNS],
        }
    }
}

impl Instrument {
    /// Note slot value at (`position`, `row`), or `None` for silence.
    pub fn note(&self, position: usize, row: usize) -> Option<u8> {
        let pattern = *self.patterns.get(position)?;
        if pattern == 0 {
            return None;
        }
        let column = self.columns.get(pattern as usize - 1)?;
        column.notes.get(row).copied().filter(|&n| n != 0)
    }

    /// Pad a compacted instrument back to the canonical shape.
    fn pad(&mut self) {
        if self.patterns.len() < SEQUENCE_LENGTH {
            self.patterns.resize(SEQUENCE_LENGTH, 0);
        }
        if self.columns.len() < MAX_COLUMNS {
            self.columns.resize(MAX_COLUMNS, Column::default());
        }
        for column in &mut self.columns {
            if column.notes.len() < PATTERN_LENGTH {
                column.notes.resize(PATTERN_LENGTH, 0);
            }
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.patterns.len() != SEQUENCE_LENGTH {
            return Err(SonantError::SequenceLength {
                instrument: index,
                expected: SEQUENCE_LENGTH,
                found: self.patterns.len(),
            });
        }
        if self.columns.len() > MAX_COLUMNS {
            return Err(SonantError::TooManyColumns {
                instrument: index,
                max: MAX_COLUMNS,
                found: self.columns.len(),
            });
        }
        for (c, column) in self.columns.iter().enumerate() {
            if column.notes.len() != PATTERN_LENGTH {
                return Err(SonantError::ColumnLength {
                    instrument: index,
                    column: c,
                    expected: PATTERN_LENGTH,
                    found: column.notes.len(),
                });
            }
        }
        for (row, &pattern) in self.patterns.iter().enumerate() {
            if pattern as usize > self.columns.len() {
                return Err(SonantError::MissingColumn {
                    instrument: index,
                    row,
                    pattern,
                });
            }
        }
        Ok(())
    }
}

// ── Column ──────────────────────────────────────────────────

/// A pattern definition: 32 note slots. 0 = no note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "n", default)]
    pub notes: Vec<u8>,
}

impl Default for Column {
    fn default() -> Self {
        Column {
            notes: vec![0; PATTERN_LENGTH],
        }
    }
}

/// Flags are stored as 0/1 in song files; older exports use booleans.
mod flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u8(*value as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(u64),
        }
        Ok(match Flag::deserialize(d)? {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        })
    }
}
