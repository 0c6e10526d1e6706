use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// What completed a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoodUpTrigger {
    /// The user confirmed it.
    Manual,
    /// Overtime reached the auto-restart threshold.
    AutoRestart,
}

/// Every state change of the engine produces an Event.
/// Hosts may print, forward or ignore them; the snapshot stays authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerResumed {
        phase: Phase,
        remaining_ms: u64,
        elapsed_overtime_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_ms: u64,
        elapsed_overtime_ms: u64,
        at: DateTime<Utc>,
    },
    /// Countdown crossed into the pre-alert window.
    PreAlertStarted {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Countdown hit zero and the count-up began.
    OvertimeStarted {
        at: DateTime<Utc>,
    },
    /// A cycle completed and was logged.
    ///
    /// `persisted` is false when the store write failed; the entry is still
    /// in the in-memory log and `TimerEngine::retry_persist` can flush it.
    StoodUp {
        trigger: StoodUpTrigger,
        persisted: bool,
        log_len: usize,
        at: DateTime<Utc>,
    },
    TimerCancelled {
        at: DateTime<Utc>,
    },
    LogCleared {
        persisted: bool,
        at: DateTime<Utc>,
    },
}
