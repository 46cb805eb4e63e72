//! incremental decode for wav12 assets
//!
//! expands a bounded number of samples per call while keeping predictor state,
//! for playback loops that cannot hold a whole asset in memory
mod expander;
mod types;

pub use expander::Expander;
pub use types::ExpanderState;
