//! Experiment lifecycle state machine
//!
//! Owns the Idle/Running state, the elapsed-seconds counter and the
//! configured duration. Transitions happen only through explicit calls
//! from the dispatcher (commands) or through duration expiry; the
//! monitor and reporter never mutate this state.

/// Experiment phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    Idle,
    Running,
}

/// Idle/Running state machine with a duration bound
///
/// The elapsed counter is meaningful only while Running and resets to
/// zero on every transition into Running. The duration survives Stop
/// and applies to the next run as well.
pub struct ExperimentController {
    state: ExperimentState,
    elapsed_secs: u32,
    duration_secs: u32,
}

impl ExperimentController {
    pub fn new(default_duration_secs: u32) -> Self {
        Self {
            state: ExperimentState::Idle,
            elapsed_secs: 0,
            duration_secs: default_duration_secs,
        }
    }

    pub fn state(&self) -> ExperimentState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ExperimentState::Running
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Set the duration bound, effective at the next expiry comparison.
    /// Valid in either state and idempotent.
    pub fn set_duration(&mut self, secs: u32) {
        self.duration_secs = secs;
    }

    /// Enter Running and reset the elapsed counter
    ///
    /// Returns false (and changes nothing) if already Running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = ExperimentState::Running;
        self.elapsed_secs = 0;
        true
    }

    /// Return to Idle (STOP command path)
    pub fn stop(&mut self) {
        self.state = ExperimentState::Idle;
    }

    /// Count one elapsed second while Running
    ///
    /// Returns the new elapsed value, or None when Idle (a stale timer
    /// tick after stop must not advance anything).
    pub fn advance_second(&mut self) -> Option<u32> {
        if !self.is_running() {
            return None;
        }
        self.elapsed_secs += 1;
        Some(self.elapsed_secs)
    }

    /// Whether the duration bound is hit at the current elapsed value
    ///
    /// Exact comparison: lowering the duration below the already
    /// elapsed time means the bound is never hit and the run continues
    /// until an explicit STOP.
    pub fn duration_expired(&self) -> bool {
        self.elapsed_secs == self.duration_secs
    }
}
