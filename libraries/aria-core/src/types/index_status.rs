//! Indexing run status types

use serde::{Deserialize, Serialize};

/// State of an indexing run: idle -> running -> {completed, error}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    Idle,
    Running,
    Completed,
    Error,
}

impl IndexState {
    /// String form persisted in the status row
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexState::Idle => "idle",
            IndexState::Running => "running",
            IndexState::Completed => "completed",
            IndexState::Error => "error",
        }
    }

    /// Parse the persisted string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(IndexState::Idle),
            "running" => Some(IndexState::Running),
            "completed" => Some(IndexState::Completed),
            "error" => Some(IndexState::Error),
            _ => None,
        }
    }
}

/// The most recent (or ongoing) indexing run.
///
/// One row is created at the start of each run and updated in place
/// throughout; `total_files` is fixed by the counting pass before any
/// processing begins so progress reporting has a stable denominator, and
/// `processed_files` only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatus {
    pub id: i64,
    pub state: IndexState,
    /// Unix epoch seconds
    pub started_at: Option<i64>,
    /// Unix epoch seconds
    pub completed_at: Option<i64>,
    pub total_files: i64,
    pub processed_files: i64,
    /// Set only when `state` is `Error`
    pub error_message: Option<String>,
}

impl IndexStatus {
    /// The status reported before any run has ever happened.
    pub fn idle() -> Self {
        Self {
            id: 0,
            state: IndexState::Idle,
            started_at: None,
            completed_at: None,
            total_files: 0,
            processed_files: 0,
            error_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_state_round_trip() {
        for state in [
            IndexState::Idle,
            IndexState::Running,
            IndexState::Completed,
            IndexState::Error,
        ] {
            assert_eq!(IndexState::from_str(state.as_str()), Some(state));
        }
    }

    #[test]
    fn invalid_state_string() {
        assert_eq!(IndexState::from_str("paused"), None);
        assert_eq!(IndexState::from_str(""), None);
    }
}
