use std::fmt;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReasonerState {
    /// Nothing has been handed to the backend yet.
    NotLoaded,
    Loaded,
    Materialised,
    /// The knowledge base changed after loading; answers may be stale.
    Changed,
    Closed,
}

impl ReasonerState {
    pub fn is_queryable(self) -> bool {
        matches!(
            self,
            ReasonerState::Loaded | ReasonerState::Materialised | ReasonerState::Changed
        )
    }
}

impl fmt::Display for ReasonerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReasonerState::NotLoaded => "NOT_LOADED",
            ReasonerState::Loaded => "LOADED",
            ReasonerState::Materialised => "MATERIALISED",
            ReasonerState::Changed => "CHANGED",
            ReasonerState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// How far the answers the reasoner currently exposes can be trusted. Best grade first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Correctness {
    SoundAndComplete,
    SoundButIncomplete,
    Incorrect,
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Correctness::SoundAndComplete => "SOUND_AND_COMPLETE",
            Correctness::SoundButIncomplete => "SOUND_BUT_INCOMPLETE",
            Correctness::Incorrect => "INCORRECT",
        };
        f.write_str(name)
    }
}
