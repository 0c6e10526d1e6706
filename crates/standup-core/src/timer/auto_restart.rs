use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How long overtime may run before the cycle restarts on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoRestart {
    #[default]
    Off,
    /// Restart after this many seconds of overtime.
    After(NonZeroU64),
}

impl AutoRestart {
    /// Choices offered by a picker, in display order.
    pub const PRESETS: [AutoRestart; 5] = [
        AutoRestart::Off,
        AutoRestart::minutes(5),
        AutoRestart::minutes(10),
        AutoRestart::minutes(15),
        AutoRestart::minutes(30),
    ];

    const fn minutes(min: u64) -> Self {
        match NonZeroU64::new(min * 60) {
            Some(secs) => AutoRestart::After(secs),
            None => AutoRestart::Off,
        }
    }

    /// `0` maps to `Off`.
    pub fn from_secs(secs: u64) -> Self {
        NonZeroU64::new(secs).map_or(AutoRestart::Off, AutoRestart::After)
    }

    pub fn secs(self) -> Option<u64> {
        match self {
            AutoRestart::Off => None,
            AutoRestart::After(secs) => Some(secs.get()),
        }
    }

    pub fn label(self) -> String {
        match self.secs() {
            None => "Off".to_string(),
            Some(secs) if secs % 60 == 0 => format!("{}m", secs / 60),
            Some(secs) => format!("{secs}s"),
        }
    }
}

impl fmt::Display for AutoRestart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Accepts `off`, `<n>m`, `<n>s` or a bare number of seconds.
impl FromStr for AutoRestart {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "off" || s == "0" {
            return Ok(AutoRestart::Off);
        }

        let (digits, scale) = if let Some(d) = s.strip_suffix('m') {
            (d, 60)
        } else if let Some(d) = s.strip_suffix('s') {
            (d, 1)
        } else {
            (s.as_str(), 1)
        };

        let n: u64 = digits
            .parse()
            .map_err(|_| ConfigError::ParseFailed(format!("invalid auto-restart setting '{s}'")))?;
        n.checked_mul(scale)
            .and_then(NonZeroU64::new)
            .map(AutoRestart::After)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "auto_restart".into(),
                message: format!("'{s}' must be a positive duration or 'off'"),
            })
    }
}
