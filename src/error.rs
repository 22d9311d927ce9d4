use thiserror::Error;

/// Result type for song loading and render setup.
pub type Result<T> = std::result::Result<T, SonantError>;

/// Errors raised while decoding a song or setting up a render session.
///
/// Rendering itself never fails: every structural check happens before the
/// first sample is written.
#[derive(Debug, Error)]
pub enum SonantError {
    #[error("song must have {expected} instruments, found {found}")]
    InstrumentCount { expected: usize, found: usize },

    #[error("instrument {instrument}: sequence must have {expected} slots, found {found}")]
    SequenceLength {
        instrument: usize,
        expected: usize,
        found: usize,
    },

    #[error("instrument {instrument}: at most {max} patterns allowed, found {found}")]
    TooManyColumns {
        instrument: usize,
        max: usize,
        found: usize,
    },

    #[error("instrument {instrument}, pattern {column}: expected {expected} note slots, found {found}")]
    ColumnLength {
        instrument: usize,
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("instrument {instrument}, sequence row {row}: references pattern {pattern} which does not exist")]
    MissingColumn {
        instrument: usize,
        row: usize,
        pattern: u8,
    },

    #[error("row length must be at least one sample")]
    ZeroRowLength,

    #[error("end pattern {0} out of range (2..=49)")]
    EndPattern(u32),

    #[error("invalid render range: {0}")]
    InvalidRange(String),

    #[error("invalid render duration: {0} seconds")]
    InvalidDuration(f64),

    #[error("unknown waveform selector {0} (expected 0-3)")]
    UnknownWaveform(u8),

    #[error("unknown filter selector {0} (expected 0-4)")]
    UnknownFilter(u8),

    #[error("song JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SonantError {
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = SonantError::MissingColumn {
            instrument: 3,
            row: 12,
            pattern: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("instrument 3"), "got: {msg}");
        assert!(msg.contains("pattern 7"), "got: {msg}");
    }

    #[test]
    fn json_errors_convert() {
        let parse: std::result::Result<u8, _> = serde_json::from_str("nope");
        let err: SonantError = parse.unwrap_err().into();
        assert!(matches!(err, SonantError::Json(_)));
    }
}
