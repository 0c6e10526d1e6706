use serde::Serialize;

use super::AutoRestart;
use crate::error::{CoreError, Result};

/// Validated timer settings.
///
/// Only obtainable through [`TimerConfig::new`], so an engine can never be
/// built from out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerConfig {
    total_secs: u64,
    pre_alert_secs: u64,
    auto_restart: AutoRestart,
}

impl TimerConfig {
    /// # Errors
    ///
    /// `InvalidConfiguration` if `total_secs` is zero, the pre-alert window
    /// is longer than the cycle, or the auto-restart threshold is zero.
    pub fn new(total_secs: u64, pre_alert_secs: u64, auto_restart_secs: Option<u64>) -> Result<Self> {
        if total_secs == 0 {
            return Err(CoreError::InvalidConfiguration(
                "total must be greater than zero".into(),
            ));
        }
        if pre_alert_secs > total_secs {
            return Err(CoreError::InvalidConfiguration(format!(
                "pre-alert window ({pre_alert_secs}s) exceeds total ({total_secs}s)"
            )));
        }
        let auto_restart = match auto_restart_secs {
            None => AutoRestart::Off,
            Some(0) => {
                return Err(CoreError::InvalidConfiguration(
                    "auto-restart threshold must be greater than zero".into(),
                ))
            }
            Some(secs) => AutoRestart::from_secs(secs),
        };
        Ok(Self {
            total_secs,
            pre_alert_secs,
            auto_restart,
        })
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn pre_alert_secs(&self) -> u64 {
        self.pre_alert_secs
    }

    pub fn auto_restart(&self) -> AutoRestart {
        self.auto_restart
    }

    pub fn auto_restart_secs(&self) -> Option<u64> {
        self.auto_restart.secs()
    }

    pub(crate) fn set_auto_restart(&mut self, setting: AutoRestart) {
        self.auto_restart = setting;
    }

    pub(crate) fn total_ms(&self) -> u64 {
        self.total_secs.saturating_mul(1000)
    }

    pub(crate) fn pre_alert_ms(&self) -> u64 {
        self.pre_alert_secs.saturating_mul(1000)
    }

    pub(crate) fn auto_restart_ms(&self) -> Option<u64> {
        self.auto_restart_secs().map(|s| s.saturating_mul(1000))
    }
}
