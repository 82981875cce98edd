/// Worker state definitions
use std::fmt;

/// Represents what a worker is currently doing
///
/// A worker waits `Idle` on the queue, moves to `Expanding` when it takes a
/// page, alternates between `Expanding` and `Fetching` while it works through
/// the page's links, and returns to `Idle`. Cancellation moves it to
/// `Stopped` from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting for a page on the queue
    Idle,

    /// Fetching one admitted link
    Fetching,

    /// Running the page hook, extracting and filtering links
    Expanding,

    /// Exited its loop
    Stopped,
}

impl WorkerState {
    /// Returns true if the worker will not do any more work
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        match (self, next) {
            (Self::Stopped, _) => false,
            (_, Self::Stopped) => true,
            (Self::Idle, Self::Expanding) => true,
            (Self::Expanding, Self::Fetching | Self::Idle) => true,
            (Self::Fetching, Self::Expanding) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Expanding => "expanding",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cycle() {
        assert!(WorkerState::Idle.can_transition_to(WorkerState::Expanding));
        assert!(WorkerState::Expanding.can_transition_to(WorkerState::Fetching));
        assert!(WorkerState::Fetching.can_transition_to(WorkerState::Expanding));
        assert!(WorkerState::Expanding.can_transition_to(WorkerState::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!WorkerState::Idle.can_transition_to(WorkerState::Fetching));
        assert!(!WorkerState::Fetching.can_transition_to(WorkerState::Idle));
        assert!(!WorkerState::Stopped.can_transition_to(WorkerState::Idle));
        assert!(!WorkerState::Stopped.can_transition_to(WorkerState::Stopped));
    }

    #[test]
    fn test_stop_from_any_live_state() {
        for state in [WorkerState::Idle, WorkerState::Fetching, WorkerState::Expanding] {
            assert!(state.can_transition_to(WorkerState::Stopped));
            assert!(!state.is_terminal());
        }
        assert!(WorkerState::Stopped.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerState::Expanding.to_string(), "expanding");
    }
}
