use serde::{Deserialize, Serialize};

use super::Phase;

/// Read-only view handed to the renderer after every engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub enabled: bool,
    pub phase: Phase,
    pub is_overtime: bool,
    /// 0.0 .. 1.0 through the countdown, pinned to 1.0 in overtime.
    pub progress: f64,
    /// `mm:ss` of remaining time, or of elapsed overtime.
    pub label: String,
    pub pre_alert_active: bool,
    pub remaining_ms: u64,
    pub elapsed_overtime_ms: u64,
    pub log_len: usize,
}

/// Whole seconds, truncated. Minutes keep counting past 59.
pub fn format_mmss(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub(crate) fn countdown_progress(remaining_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 1.0;
    }
    (1.0 - remaining_ms as f64 / total_ms as f64).clamp(0.0, 1.0)
}
