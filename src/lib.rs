//! Player core for the Sonant tracker format.
//!
//! A [`Song`] holds eight instruments, each a two-oscillator synth with noise,
//! an LFO, a state-variable filter, auto-pan and a ping-pong echo, driven by
//! a 48-slot sequence of 32-row patterns. [`RenderSession`] turns a song into
//! 16-bit stereo audio a few sequence rows at a time.

pub mod dsp;
pub mod error;
pub mod rng;
pub mod song;

pub use dsp::engine::{Progress, RenderOptions, RenderSession, render_song_wave};
pub use dsp::filter::FilterMode;
pub use dsp::mixer::MixMeter;
pub use dsp::oscillator::Waveform;
pub use dsp::voice::render_note;
pub use error::{Result, SonantError};
pub use song::{Column, Instrument, Song};

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the sonant_core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-exposed: render a JSON song to a WAV byte array in one call.
#[wasm_bindgen]
pub fn render_song_wav(json: &str) -> std::result::Result<Vec<u8>, JsValue> {
    let song = Song::from_json(json).map_err(js_error)?;
    render_song_wave(&song, None).map_err(js_error)
}

/// WASM-exposed incremental player.
///
/// ```js
/// const player = new Player();
/// player.init(song, { firstRow: 0, lastRow: 3, firstCol: 0, lastCol: 7, numSeconds: 12 });
/// while (!player.generate().done) { await nextFrame(); }
/// const wav = player.createWave();
/// ```
#[wasm_bindgen]
#[derive(Default)]
pub struct Player {
    session: Option<RenderSession>,
}

#[wasm_bindgen]
impl Player {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Player {
        Player::default()
    }

    /// Start a new render, discarding any previous one. `opts` may be
    /// `undefined` to render the whole song.
    pub fn init(&mut self, song: JsValue, opts: JsValue) -> std::result::Result<(), JsValue> {
        let song: Song = serde_wasm_bindgen::from_value(song).map_err(js_error)?;
        let options: Option<RenderOptions> = if opts.is_undefined() || opts.is_null() {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(opts).map_err(js_error)?)
        };
        self.session = Some(RenderSession::new(song, options).map_err(js_error)?);
        Ok(())
    }

    /// Render the next batch; returns `{ done, progress }`.
    pub fn generate(&mut self) -> std::result::Result<JsValue, JsValue> {
        let progress = self.session_mut()?.generate();
        serde_wasm_bindgen::to_value(&progress).map_err(js_error)
    }

    #[wasm_bindgen(js_name = createWave)]
    pub fn create_wave(&self) -> std::result::Result<Vec<u8>, JsValue> {
        Ok(self.session()?.create_wave())
    }

    /// `n` interleaved L/R frames of the mix starting `t` seconds in.
    #[wasm_bindgen(js_name = getData)]
    pub fn get_data(&self, t: f64, n: usize) -> Vec<f32> {
        match &self.session {
            Some(session) => session.sample_data(t, n).into_iter().flatten().collect(),
            None => vec![0.0; n * 2],
        }
    }
}

impl Player {
    fn session(&self) -> std::result::Result<&RenderSession, JsValue> {
        self.session
            .as_ref()
            .ok_or_else(|| JsValue::from_str("player not initialised"))
    }

    fn session_mut(&mut self) -> std::result::Result<&mut RenderSession, JsValue> {
        self.session
            .as_mut()
            .ok_or_else(|| JsValue::from_str("player not initialised"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_manifest() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn uninitialised_player_reads_silence() {
        let player = Player::new();
        assert_eq!(player.get_data(0.0, 3), vec![0.0; 6]);
    }
}
