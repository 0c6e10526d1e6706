//! Activity log: every confirmed stand-up, most recent first.
//!
//! The log is persisted as a flat list of epoch-second timestamps under
//! [`LOG_STORE_KEY`]. Loading never fails; anything unreadable becomes an
//! empty log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::KvStore;

/// Store key the log lives under.
pub const LOG_STORE_KEY: &str = "StandTimerLogs";

/// A single confirmed stand-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(DateTime<Utc>);

impl LogEntry {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn epoch_secs(&self) -> f64 {
        self.0.timestamp_millis() as f64 / 1000.0
    }

    /// `None` for NaN, infinities and values chrono cannot represent.
    pub fn from_epoch_secs(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let ms = (secs * 1000.0).round();
        if ms < i64::MIN as f64 || ms > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_millis(ms as i64).map(Self)
    }
}

impl From<DateTime<Utc>> for LogEntry {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
    unsaved: bool,
}

impl ActivityLog {
    /// Read the log from `store`, newest first.
    pub fn load(store: &dyn KvStore) -> Self {
        let raw = match store.get(LOG_STORE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "activity log unreadable, starting empty");
                return Self::default();
            }
        };

        let parsed: Option<Vec<LogEntry>> =
            raw.iter().map(|&secs| LogEntry::from_epoch_secs(secs)).collect();
        let Some(mut entries) = parsed else {
            tracing::warn!(count = raw.len(), "activity log holds invalid timestamps, starting empty");
            return Self::default();
        };

        entries.sort_unstable_by(|a, b| b.cmp(a));
        tracing::debug!(count = entries.len(), "activity log loaded");
        Self {
            entries,
            unsaved: false,
        }
    }

    /// Record `entry` at the front and write the whole log through.
    ///
    /// The entry is kept in memory even if the write fails.
    pub fn append(&mut self, store: &dyn KvStore, entry: LogEntry) -> Result<(), StoreError> {
        self.entries.insert(0, entry);
        self.unsaved = true;
        self.persist(store)
    }

    /// Empty the log in memory and in `store`.
    pub fn clear(&mut self, store: &dyn KvStore) -> Result<(), StoreError> {
        self.entries.clear();
        self.unsaved = true;
        self.persist(store)
    }

    /// Write the in-memory log to `store`.
    pub fn persist(&mut self, store: &dyn KvStore) -> Result<(), StoreError> {
        let timestamps: Vec<f64> = self.entries.iter().map(LogEntry::epoch_secs).collect();
        store.set(LOG_STORE_KEY, &timestamps)?;
        self.unsaved = false;
        Ok(())
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True while the last write to the store has not succeeded.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }
}
