//! Render session — incremental, resumable song rendering.
//!
//! A session walks the selected instruments one at a time. Each call to
//! [`RenderSession::generate`] synthesizes at most [`PATTERNS_PER_STEP`]
//! sequence rows of the current instrument and returns, so a host can
//! interleave rendering with other work on a single thread. When an
//! instrument's last row is done its echo is applied and its channel
//! buffer is summed into the shared mix.

use std::ops::RangeInclusive;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, SonantError};
use crate::rng::{DEFAULT_SEED, NoiseRng, create_rng};
use crate::song::{NUM_INSTRUMENTS, PATTERN_LENGTH, SEQUENCE_LENGTH, Song};

use super::delay::Echo;
use super::mixer::{MixBuffer, MixMeter};
use super::note::{CHANNELS, SAMPLE_RATE};
use super::voice::Voice;
use super::wave::encode_wave;

/// Sequence rows rendered per [`RenderSession::generate`] call.
pub const PATTERNS_PER_STEP: usize = 8;

/// What to render: a rectangle of sequence rows × instruments and the
/// length of the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub first_row: usize,
    pub last_row: usize,
    pub first_col: usize,
    pub last_col: usize,
    /// Output length in seconds. Notes running past it are cut.
    pub num_seconds: f64,
    /// Noise generator seed. A fixed default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl RenderOptions {
    /// Every instrument over the song's full sequence.
    pub fn whole_song(song: &Song) -> Self {
        RenderOptions {
            first_row: 0,
            last_row: song.last_row(),
            first_col: 0,
            last_col: NUM_INSTRUMENTS - 1,
            num_seconds: song.song_len,
            seed: None,
        }
    }

    /// A selection preview, sized to the selected rows plus an eight-row tail.
    pub fn selection(song: &Song, rows: RangeInclusive<usize>, cols: RangeInclusive<usize>) -> Self {
        let (first_row, last_row) = rows.into_inner();
        let (first_col, last_col) = cols.into_inner();
        let row_count = (last_row + 1).saturating_sub(first_row);
        let num_seconds = ((row_count * PATTERN_LENGTH + 8) as f64 * song.row_len as f64)
            / SAMPLE_RATE as f64;
        RenderOptions {
            first_row,
            last_row,
            first_col,
            last_col,
            num_seconds,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Output length in stereo frames.
    pub fn frames(&self) -> usize {
        (SAMPLE_RATE as f64 * self.num_seconds).round() as usize
    }

    /// Longest render a song can ask for: every sequence row plus the tail.
    fn max_seconds(song: &Song) -> f64 {
        (((SEQUENCE_LENGTH + 1) * PATTERN_LENGTH + 8) as f64 * song.row_len as f64
            / SAMPLE_RATE as f64)
            .ceil()
    }

    fn validate(&self, song: &Song) -> Result<()> {
        if self.first_row > self.last_row || self.last_row >= SEQUENCE_LENGTH {
            return Err(SonantError::invalid_range(format!(
                "rows {}..={} (sequence has {SEQUENCE_LENGTH} rows)",
                self.first_row, self.last_row
            )));
        }
        if self.first_col > self.last_col || self.last_col >= NUM_INSTRUMENTS {
            return Err(SonantError::invalid_range(format!(
                "instruments {}..={} (song has {NUM_INSTRUMENTS})",
                self.first_col, self.last_col
            )));
        }
        if !self.num_seconds.is_finite()
            || self.num_seconds < 0.0
            || self.num_seconds > Self::max_seconds(song)
        {
            return Err(SonantError::InvalidDuration(self.num_seconds));
        }
        Ok(())
    }
}

/// Result of one render step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub done: bool,
    /// Fraction of the selected work completed, in [0, 1].
    pub progress: f64,
}

/// State of one render: owned song, cursors and buffers.
///
/// Dropping the session cancels the render.
pub struct RenderSession<R = NoiseRng> {
    song: Song,
    options: RenderOptions,
    current_col: usize,
    current_row: usize,
    /// Scratch buffer for the instrument being rendered.
    channel: Vec<i32>,
    mix: MixBuffer,
    rng: R,
}

impl RenderSession<NoiseRng> {
    /// Start a render of `song`. `None` renders the whole song.
    pub fn new(song: Song, options: Option<RenderOptions>) -> Result<Self> {
        let options = options.unwrap_or_else(|| RenderOptions::whole_song(&song));
        let rng = create_rng(options.seed.unwrap_or(DEFAULT_SEED));
        Self::with_rng(song, options, rng)
    }
}

impl<R: RngCore> RenderSession<R> {
    /// Start a render drawing noise from `rng`. `options.seed` is ignored.
    pub fn with_rng(song: Song, options: RenderOptions, rng: R) -> Result<Self> {
        song.validate()?;
        options.validate(&song)?;

        let frames = options.frames();
        debug!(
            rows = ?(options.first_row..=options.last_row),
            instruments = ?(options.first_col..=options.last_col),
            frames,
            "render session initialised"
        );

        Ok(RenderSession {
            current_col: options.first_col,
            current_row: options.first_row,
            channel: vec![0; frames * CHANNELS],
            mix: MixBuffer::new(frames),
            song,
            options,
            rng,
        })
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn is_done(&self) -> bool {
        self.current_col > self.options.last_col
    }

    /// Completed fraction: finished instruments plus the current one's row share.
    pub fn progress(&self) -> f64 {
        let o = &self.options;
        let rows = (o.last_row - o.first_row + 1) as f64;
        let cols = (o.last_col - o.first_col + 1) as f64;
        let row_share = (self.current_row - o.first_row) as f64 / rows;
        ((self.current_col - o.first_col) as f64 + row_share) / cols
    }

    /// Render the next batch of rows. Calling after completion does nothing.
    pub fn generate(&mut self) -> Progress {
        if self.is_done() {
            return Progress {
                done: true,
                progress: 1.0,
            };
        }

        let first_row = self.options.first_row;
        let last_row = self.options.last_row;
        let row_len = self.song.row_len as usize;
        let instr = &self.song.instruments[self.current_col];
        let voice = Voice::new(instr, self.song.row_len);

        if self.current_row == first_row {
            self.channel.fill(0);
        }

        let step_end = (self.current_row + PATTERNS_PER_STEP - 1).min(last_row);
        trace!(
            instrument = self.current_col,
            rows = ?(self.current_row..=step_end),
            "render step"
        );
        for position in self.current_row..=step_end {
            let base = (position - first_row) * PATTERN_LENGTH * row_len;
            for row in 0..PATTERN_LENGTH {
                if let Some(note) = instr.note(position, row) {
                    voice.render_note(note, base + row * row_len, &mut self.channel, &mut self.rng);
                }
            }
        }
        self.current_row = step_end + 1;

        if self.current_row > last_row {
            let echo = Echo::new(instr.fx_delay_time, instr.fx_delay_amt, self.song.row_len);
            if !echo.is_silent() {
                echo.apply(&mut self.channel);
            }
            self.mix.accumulate(&self.channel);
            debug!(
                instrument = self.current_col,
                delay_words = echo.delay_words,
                "instrument mixed"
            );

            self.current_row = first_row;
            self.current_col += 1;
            if self.is_done() {
                self.channel = Vec::new();
                debug!("render complete");
            }
        }

        Progress {
            done: self.is_done(),
            progress: self.progress(),
        }
    }

    /// Step until the render completes.
    pub fn run(&mut self) -> Progress {
        loop {
            let p = self.generate();
            if p.done {
                return p;
            }
        }
    }

    /// Package the mix as a WAVE file. Before completion this holds only
    /// the instruments finished so far.
    pub fn create_wave(&self) -> Vec<u8> {
        encode_wave(&self.mix.to_vec())
    }

    /// Snapshot of the raw 32-bit mix words (interleaved stereo).
    pub fn mix_words(&self) -> Vec<i32> {
        self.mix.to_vec()
    }

    /// `frames` stereo frames of the mix starting `t` seconds in, scaled to about ±2.
    pub fn sample_data(&self, t: f64, frames: usize) -> Vec<[f32; 2]> {
        self.mix.meter().window(t, frames)
    }

    /// Handle for reading mix levels from another thread.
    pub fn meter(&self) -> MixMeter {
        self.mix.meter()
    }
}

/// Render a song (or a selection of it) straight to WAVE bytes.
pub fn render_song_wave(song: &Song, options: Option<RenderOptions>) -> Result<Vec<u8>> {
    let mut session = RenderSession::new(song.clone(), options)?;
    session.run();
    Ok(session.create_wave())
}
