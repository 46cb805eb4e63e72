//! Streaming types and enums

/// Expander state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpanderState {
    /// Bound to a stream, nothing expanded yet
    Idle,
    /// Part of the samples expanded
    Active,
    /// Every sample expanded
    Done,
    /// A decode error stopped the expander
    Halted,
}

impl ExpanderState {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpanderState::Idle => "idle",
            ExpanderState::Active => "active",
            ExpanderState::Done => "done",
            ExpanderState::Halted => "halted",
        }
    }
}
