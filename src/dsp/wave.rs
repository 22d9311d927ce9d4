//! WAVE packaging — 16-bit stereo PCM at 44.1 kHz.

use super::note::{CHANNELS, SAMPLE_RATE};

/// Size of the canonical RIFF/WAVE header.
pub const HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;

/// Largest magnitude written; the mix is clamped symmetrically.
const CLAMP: i32 = 32767;

/// Encode interleaved 32-bit mix words as a complete WAVE file.
///
/// The mix keeps 32-bit headroom until here, the only place it is narrowed:
/// each word is clamped to [-32767, 32767] and written as 16 bits.
pub fn encode_wave(words: &[i32]) -> Vec<u8> {
    let channels = CHANNELS as u16;
    let byte_rate = SAMPLE_RATE * channels as u32 * (BITS_PER_SAMPLE as u32 / 8);
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let data_size = (words.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &word in words {
        buf.extend_from_slice(&clamp_sample(word).to_le_bytes());
    }

    buf
}

#[inline]
fn clamp_sample(word: i32) -> i16 {
    word.clamp(-CLAMP, CLAMP) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(wav: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([wav[at], wav[at + 1], wav[at + 2], wav[at + 3]])
    }

    #[test]
    fn wav_header_valid() {
        let wav = encode_wave(&[0; 8]);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);
        assert_eq!(u32_at(&wav, 24), 44100);
        assert_eq!(u32_at(&wav, 28), 176400);
        assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 4);
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
    }

    #[test]
    fn wav_size_fields_match_payload() {
        let words = vec![0i32; 2 * 22050];
        let wav = encode_wave(&words);
        assert_eq!(wav.len(), HEADER_LEN + 2 * words.len());
        assert_eq!(u32_at(&wav, 4) as usize, wav.len() - 8);
        assert_eq!(u32_at(&wav, 40) as usize, wav.len() - HEADER_LEN);
    }

    #[test]
    fn empty_mix_is_header_only() {
        let wav = encode_wave(&[]);
        assert_eq!(wav.len(), HEADER_LEN);
        assert_eq!(u32_at(&wav, 4), 36);
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn samples_are_clamped_not_wrapped() {
        let wav = encode_wave(&[40000, -40000, 32768, -32768, 1234, -1]);
        let samples: Vec<i16> = wav[HEADER_LEN..]
            .chunks(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, vec![32767, -32767, 32767, -32767, 1234, -1]);
    }
}
