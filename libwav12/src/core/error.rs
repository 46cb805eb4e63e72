//! error types for the wav12 codec

use std::io;

/// Everything that can go wrong while packing, unpacking or expanding.
#[derive(Debug, thiserror::Error)]
pub enum Wav12Error {
    /// a writer ran out of destination space
    #[error("buffer overflow: destination holds {capacity} bytes")]
    BufferOverflow { capacity: usize },

    /// a reader asked for bytes past the end of its source
    #[error("stream exhausted after {limit} bytes")]
    StreamExhausted { limit: usize },

    /// a request exceeded a size or range limit
    #[error("{what} out of bounds: requested {requested}, available {available}")]
    OutOfBounds {
        what: &'static str,
        requested: usize,
        available: usize,
    },

    /// malformed asset, header or memory image
    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    /// a decoded sample left the 16-bit range
    #[error("corrupt stream: sample {value} does not fit 16 bits")]
    CorruptStream { value: i32 },

    /// the expander failed earlier and refuses further work
    #[error("expander halted after a previous error")]
    Halted,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Wav12Error {
    pub(crate) fn out_of_bounds(what: &'static str, requested: usize, available: usize) -> Self {
        Wav12Error::OutOfBounds {
            what,
            requested,
            available,
        }
    }
}

/// result alias used across the crate
pub type Wav12Result<T> = Result<T, Wav12Error>;
