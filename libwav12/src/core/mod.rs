pub mod audio_constants;
pub mod bits;
pub mod error;
pub mod types;

pub use audio_constants::*;
pub use bits::{BitAccum, BitReader, BitWriter};
pub use error::{Wav12Error, Wav12Result};
pub use types::*;
