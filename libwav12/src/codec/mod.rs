//! Predictive delta codec for wav12
//!
//! Each sample is predicted from the previous three by quadratic
//! extrapolation and only the difference is stored, in the fewest bits that
//! hold it. Optional shift quantization trades precision for size.

pub mod decoder;
pub mod encoder;
pub mod linear;
pub mod predictor;
pub mod stats;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use linear::{linear_compress, linear_expand};
pub use predictor::Context;
pub use stats::CompressStat;
