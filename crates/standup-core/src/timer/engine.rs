//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads and never reads the clock - every time-dependent call
//! takes `now`, and the caller is responsible for calling `tick()`
//! periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Paused-Countdown <-> Running-Countdown -> Running-Overtime <-> Paused-Overtime
//!        ^                                        |
//!        +---- confirm_stood_up / cancel ---------+
//! ```
//!
//! While running, the live value is derived from an anchor: the deadline
//! in countdown, the overtime start in overtime. While paused, the frozen
//! `remaining_ms` / `elapsed_overtime_ms` is authoritative. Nothing is
//! accumulated per tick, so missed or irregular ticks cannot drift.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(config, store);
//! engine.set_enabled(true, Utc::now());
//! // In a loop:
//! engine.tick(Utc::now()); // Returns Some(Event) on pre-alert, overtime, auto-restart
//! render(engine.snapshot());
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::TimerConfig;
use super::snapshot::{countdown_progress, format_mmss, Snapshot};
use super::AutoRestart;
use crate::activity::{ActivityLog, LogEntry};
use crate::error::StoreError;
use crate::events::{Event, StoodUpTrigger};
use crate::storage::KvStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Countdown,
    Overtime,
}

/// Mutable timing state.
///
/// Serializable so short-lived hosts (the CLI) can save it between runs and
/// hand it back to [`TimerEngine::restore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub enabled: bool,
    pub phase: Phase,
    /// Authoritative while paused in countdown.
    pub remaining_ms: u64,
    /// Authoritative while paused in overtime.
    pub elapsed_overtime_ms: u64,
    /// Epoch milliseconds: the deadline in countdown, the overtime start in
    /// overtime. Set iff `enabled`.
    #[serde(default)]
    pub anchor_ms: Option<i64>,
    pub pre_alert_active: bool,
    pub auto_restart_armed: bool,
}

impl EngineState {
    fn initial(config: &TimerConfig) -> Self {
        Self {
            enabled: false,
            phase: Phase::Countdown,
            remaining_ms: config.total_ms(),
            elapsed_overtime_ms: 0,
            anchor_ms: None,
            pre_alert_active: false,
            auto_restart_armed: false,
        }
    }
}

/// Core timer engine.
///
/// Single-writer: all mutation goes through `&mut self`, no internal locking.
pub struct TimerEngine {
    config: TimerConfig,
    state: EngineState,
    log: ActivityLog,
    store: Arc<dyn KvStore>,
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// Create an engine paused at the start of a countdown.
    ///
    /// Loads the activity log from `store`; an unreadable log starts empty.
    pub fn new(config: TimerConfig, store: Arc<dyn KvStore>) -> Self {
        let log = ActivityLog::load(&*store);
        Self {
            state: EngineState::initial(&config),
            config,
            log,
            store,
        }
    }

    /// Rebuild an engine from a previously saved [`EngineState`].
    ///
    /// The state is repaired against `config` where it no longer fits: a
    /// running state without an anchor is paused, a frozen `remaining_ms`
    /// longer than the current total is clamped.
    pub fn restore(config: TimerConfig, state: EngineState, store: Arc<dyn KvStore>) -> Self {
        let mut engine = Self::new(config, store);
        engine.state = state;

        let total_ms = engine.config.total_ms();
        let state = &mut engine.state;
        if state.enabled != state.anchor_ms.is_some() {
            tracing::warn!(enabled = state.enabled, "saved engine state inconsistent, pausing");
            state.enabled = false;
            state.anchor_ms = None;
        }
        if state.phase == Phase::Countdown {
            // A shorter total pulls the deadline in, measured from the
            // instant `remaining_ms` was last synced.
            if let Some(deadline) = state.anchor_ms.as_mut() {
                let latest = deadline
                    .saturating_sub(ms_i64(state.remaining_ms))
                    .saturating_add(ms_i64(total_ms));
                *deadline = (*deadline).min(latest);
            }
        }
        state.remaining_ms = state.remaining_ms.min(total_ms);
        engine.refresh_pre_alert();
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.remaining_ms
    }

    pub fn elapsed_overtime_ms(&self) -> u64 {
        self.state.elapsed_overtime_ms
    }

    pub fn pre_alert_active(&self) -> bool {
        self.state.pre_alert_active
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// 0.0 .. 1.0 through the countdown; 1.0 in overtime.
    pub fn progress(&self) -> f64 {
        match self.state.phase {
            Phase::Countdown => countdown_progress(self.state.remaining_ms, self.config.total_ms()),
            Phase::Overtime => 1.0,
        }
    }

    /// `mm:ss` of remaining time, or of elapsed overtime.
    pub fn label(&self) -> String {
        match self.state.phase {
            Phase::Countdown => format_mmss(self.state.remaining_ms),
            Phase::Overtime => format_mmss(self.state.elapsed_overtime_ms),
        }
    }

    /// Build the renderer view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            enabled: self.state.enabled,
            phase: self.state.phase,
            is_overtime: self.state.phase == Phase::Overtime,
            progress: self.progress(),
            label: self.label(),
            pre_alert_active: self.state.pre_alert_active,
            remaining_ms: self.state.remaining_ms,
            elapsed_overtime_ms: self.state.elapsed_overtime_ms,
            log_len: self.log.len(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or pause the clock. Returns `None` if already in that state.
    pub fn set_enabled(&mut self, enabled: bool, now: DateTime<Utc>) -> Option<Event> {
        if enabled == self.state.enabled {
            return None;
        }
        let now_ms = now.timestamp_millis();

        if enabled {
            let anchor = match self.state.phase {
                Phase::Countdown => now_ms.saturating_add(ms_i64(self.state.remaining_ms)),
                Phase::Overtime => now_ms.saturating_sub(ms_i64(self.state.elapsed_overtime_ms)),
            };
            self.state.anchor_ms = Some(anchor);
            self.state.enabled = true;
            self.refresh_pre_alert();
            tracing::debug!(phase = ?self.state.phase, "timer resumed");
            Some(Event::TimerResumed {
                phase: self.state.phase,
                remaining_ms: self.state.remaining_ms,
                elapsed_overtime_ms: self.state.elapsed_overtime_ms,
                at: now,
            })
        } else {
            // Flush the live value before dropping the anchor.
            self.sync_live_value(now_ms);
            self.state.anchor_ms = None;
            self.state.enabled = false;
            tracing::debug!(phase = ?self.state.phase, "timer paused");
            Some(Event::TimerPaused {
                phase: self.state.phase,
                remaining_ms: self.state.remaining_ms,
                elapsed_overtime_ms: self.state.elapsed_overtime_ms,
                at: now,
            })
        }
    }

    /// Call periodically. Never fails; a no-op while paused.
    ///
    /// Returns `Some(Event)` when the countdown enters the pre-alert window,
    /// when overtime begins, or when auto-restart completes the cycle.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.state.enabled {
            return None;
        }
        let now_ms = now.timestamp_millis();
        self.sync_live_value(now_ms);

        match self.state.phase {
            Phase::Countdown => {
                let was_pre_alert = self.state.pre_alert_active;
                self.refresh_pre_alert();

                if self.state.remaining_ms == 0 {
                    self.enter_overtime(now_ms);
                    return Some(Event::OvertimeStarted { at: now });
                }
                if self.state.pre_alert_active && !was_pre_alert {
                    tracing::debug!(remaining_ms = self.state.remaining_ms, "pre-alert started");
                    return Some(Event::PreAlertStarted {
                        remaining_ms: self.state.remaining_ms,
                        at: now,
                    });
                }
                None
            }
            Phase::Overtime => {
                self.state.pre_alert_active = true;

                let threshold = self.config.auto_restart_ms()?;
                if self.state.auto_restart_armed && self.state.elapsed_overtime_ms >= threshold {
                    tracing::debug!(
                        elapsed_overtime_ms = self.state.elapsed_overtime_ms,
                        "auto-restart threshold reached"
                    );
                    let event = self.complete_cycle(now, StoodUpTrigger::AutoRestart);
                    self.state.auto_restart_armed = false;
                    return Some(event);
                }
                None
            }
        }
    }

    /// Log a stand-up at `now` and start a fresh countdown.
    ///
    /// Works from any phase. If the clock is running it keeps running from a
    /// new deadline; if paused it stays paused with the full cycle left.
    pub fn confirm_stood_up(&mut self, now: DateTime<Utc>) -> Event {
        self.complete_cycle(now, StoodUpTrigger::Manual)
    }

    /// Stop the clock and rewind to a full countdown. The log is untouched.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Event {
        self.state = EngineState::initial(&self.config);
        tracing::debug!("timer cancelled");
        Event::TimerCancelled { at: now }
    }

    /// Change the auto-restart threshold. Evaluated on the next tick.
    pub fn configure_auto_restart(&mut self, setting: AutoRestart) {
        tracing::debug!(setting = %setting, "auto-restart configured");
        self.config.set_auto_restart(setting);
    }

    /// Empty the activity log. Timing state is untouched.
    pub fn clear_log(&mut self, now: DateTime<Utc>) -> Event {
        let persisted = match self.log.clear(&*self.store) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist cleared activity log");
                false
            }
        };
        Event::LogCleared {
            persisted,
            at: now,
        }
    }

    /// Write the in-memory log to the store again after a failed write.
    pub fn retry_persist(&mut self) -> Result<(), StoreError> {
        self.log.persist(&*self.store)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Single choke point for "cycle completed": both manual confirmation
    /// and auto-restart come through here.
    fn complete_cycle(&mut self, now: DateTime<Utc>, trigger: StoodUpTrigger) -> Event {
        let persisted = match self.log.append(&*self.store, LogEntry::new(now)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist activity log entry");
                false
            }
        };

        let enabled = self.state.enabled;
        self.state = EngineState::initial(&self.config);
        if enabled {
            self.state.enabled = true;
            self.state.anchor_ms = Some(
                now.timestamp_millis()
                    .saturating_add(ms_i64(self.config.total_ms())),
            );
        }

        tracing::debug!(?trigger, log_len = self.log.len(), "stood up");
        Event::StoodUp {
            trigger,
            persisted,
            log_len: self.log.len(),
            at: now,
        }
    }

    /// Recompute the live value from the anchor. No-op while paused.
    fn sync_live_value(&mut self, now_ms: i64) {
        let Some(anchor) = self.state.anchor_ms else {
            return;
        };
        match self.state.phase {
            Phase::Countdown => {
                let left = anchor.saturating_sub(now_ms).max(0);
                self.state.remaining_ms = (left as u64).min(self.config.total_ms());
            }
            Phase::Overtime => {
                self.state.elapsed_overtime_ms = now_ms.saturating_sub(anchor).max(0) as u64;
            }
        }
    }

    fn refresh_pre_alert(&mut self) {
        self.state.pre_alert_active = match self.state.phase {
            Phase::Countdown => self.state.remaining_ms <= self.config.pre_alert_ms(),
            Phase::Overtime => true,
        };
    }

    fn enter_overtime(&mut self, now_ms: i64) {
        self.state.phase = Phase::Overtime;
        self.state.remaining_ms = 0;
        self.state.elapsed_overtime_ms = 0;
        self.state.anchor_ms = Some(now_ms);
        self.state.pre_alert_active = true;
        self.state.auto_restart_armed = true;
        tracing::debug!("overtime started");
    }
}

fn ms_i64(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::LOG_STORE_KEY;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn engine_with(total: u64, pre_alert: u64, auto: Option<u64>) -> (TimerEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = TimerConfig::new(total, pre_alert, auto).unwrap();
        (TimerEngine::new(config, store.clone()), store)
    }

    #[test]
    fn starts_paused_with_full_countdown() {
        let (engine, _) = engine_with(600, 120, None);
        assert!(!engine.is_enabled());
        assert_eq!(engine.phase(), Phase::Countdown);
        assert_eq!(engine.remaining_ms(), 600_000);
        assert!(engine.state().anchor_ms.is_none());
        assert!(!engine.pre_alert_active());
    }

    #[test]
    fn enable_and_disable_toggle_anchor() {
        let (mut engine, _) = engine_with(600, 120, None);

        assert!(engine.set_enabled(true, at(0)).is_some());
        assert_eq!(engine.state().anchor_ms, Some(at(600).timestamp_millis()));
        assert!(engine.set_enabled(true, at(5)).is_none());

        assert!(engine.set_enabled(false, at(10)).is_some());
        assert!(engine.state().anchor_ms.is_none());
        assert_eq!(engine.remaining_ms(), 590_000);
        assert!(engine.set_enabled(false, at(11)).is_none());
    }

    #[test]
    fn tick_while_paused_is_noop() {
        let (mut engine, _) = engine_with(600, 120, None);
        assert!(engine.tick(at(1_000)).is_none());
        assert_eq!(engine.remaining_ms(), 600_000);
        assert_eq!(engine.phase(), Phase::Countdown);
    }

    #[test]
    fn pre_alert_and_overtime_scenario() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));

        assert!(engine.tick(at(400)).is_none());
        assert_eq!(engine.remaining_ms(), 200_000);
        assert!(!engine.pre_alert_active());

        assert!(matches!(engine.tick(at(500)), Some(Event::PreAlertStarted { .. })));
        assert_eq!(engine.remaining_ms(), 100_000);
        assert!(engine.pre_alert_active());

        assert!(matches!(engine.tick(at(600)), Some(Event::OvertimeStarted { .. })));
        assert_eq!(engine.phase(), Phase::Overtime);
        assert_eq!(engine.elapsed_overtime_ms(), 0);
        assert!(engine.pre_alert_active());
        assert!(engine.state().auto_restart_armed);
    }

    #[test]
    fn pre_alert_event_fires_once() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        assert!(engine.tick(at(490)).is_some());
        assert!(engine.tick(at(491)).is_none());
    }

    #[test]
    fn resume_inside_pre_alert_window_shows_immediately() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        // Paused at 50s left without any tick observing the window.
        engine.set_enabled(false, at(550));
        assert_eq!(engine.remaining_ms(), 50_000);
        assert!(!engine.pre_alert_active());

        engine.set_enabled(true, at(1_000));
        assert!(engine.pre_alert_active());
    }

    #[test]
    fn overtime_counts_up_and_survives_pause() {
        let (mut engine, _) = engine_with(60, 10, None);
        engine.set_enabled(true, at(0));
        engine.tick(at(60));
        engine.tick(at(90));
        assert_eq!(engine.elapsed_overtime_ms(), 30_000);
        assert_eq!(engine.label(), "00:30");
        assert_eq!(engine.progress(), 1.0);

        engine.set_enabled(false, at(100));
        assert_eq!(engine.elapsed_overtime_ms(), 40_000);
        engine.set_enabled(true, at(500));
        engine.tick(at(505));
        assert_eq!(engine.elapsed_overtime_ms(), 45_000);
        assert_eq!(engine.phase(), Phase::Overtime);
    }

    #[test]
    fn pause_time_is_never_counted() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.tick(at(300));
        engine.set_enabled(false, at(300));
        assert_eq!(engine.remaining_ms(), 300_000);

        engine.set_enabled(true, at(350));
        engine.tick(at(350));
        assert_eq!(engine.remaining_ms(), 300_000);
    }

    #[test]
    fn pause_resume_same_instant_is_noop() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.tick(at(123));
        let before = engine.snapshot();

        engine.set_enabled(false, at(123));
        engine.set_enabled(true, at(123));
        engine.tick(at(123));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn confirm_stood_up_while_running_restarts_countdown() {
        let (mut engine, store) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.tick(at(700));
        assert_eq!(engine.phase(), Phase::Overtime);

        let event = engine.confirm_stood_up(at(750));
        assert!(matches!(
            event,
            Event::StoodUp {
                trigger: StoodUpTrigger::Manual,
                persisted: true,
                log_len: 1,
                ..
            }
        ));
        assert!(engine.is_enabled());
        assert_eq!(engine.phase(), Phase::Countdown);
        assert_eq!(engine.remaining_ms(), 600_000);
        assert!(!engine.pre_alert_active());
        assert_eq!(engine.state().anchor_ms, Some(at(1_350).timestamp_millis()));
        assert_eq!(store.raw(LOG_STORE_KEY).unwrap().len(), 1);

        engine.tick(at(760));
        assert_eq!(engine.remaining_ms(), 590_000);
    }

    #[test]
    fn confirm_stood_up_while_paused_stays_paused() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.set_enabled(false, at(200));

        engine.confirm_stood_up(at(210));
        assert!(!engine.is_enabled());
        assert!(engine.state().anchor_ms.is_none());
        assert_eq!(engine.remaining_ms(), 600_000);
        assert_eq!(engine.log().len(), 1);
    }

    #[test]
    fn auto_restart_fires_once_per_episode() {
        let (mut engine, store) = engine_with(600, 120, Some(60));
        engine.set_enabled(true, at(0));
        engine.tick(at(600));
        assert_eq!(engine.phase(), Phase::Overtime);

        let mut auto = 0;
        for t in 601..=800 {
            if let Some(Event::StoodUp { trigger, .. }) = engine.tick(at(t)) {
                assert_eq!(trigger, StoodUpTrigger::AutoRestart);
                auto += 1;
            }
        }
        assert_eq!(auto, 1);
        assert_eq!(engine.log().len(), 1);
        assert_eq!(engine.log().latest().unwrap().at(), at(660));
        assert_eq!(store.raw(LOG_STORE_KEY).unwrap().len(), 1);
        assert_eq!(engine.phase(), Phase::Countdown);
        assert_eq!(engine.remaining_ms(), 460_000);
    }

    #[test]
    fn auto_restart_rearms_on_next_episode() {
        let (mut engine, _) = engine_with(10, 0, Some(5));
        engine.set_enabled(true, at(0));
        for t in 1..=40 {
            engine.tick(at(t));
        }
        // Overtime at 10, restart at 15, overtime at 25, restart at 30, overtime at 40.
        assert_eq!(engine.log().len(), 2);
        assert_eq!(engine.phase(), Phase::Overtime);
    }

    #[test]
    fn threshold_lowered_mid_episode_fires_on_next_tick() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.tick(at(600));
        engine.tick(at(700));
        assert_eq!(engine.log().len(), 0);

        engine.configure_auto_restart(AutoRestart::from_secs(60));
        assert_eq!(engine.log().len(), 0);
        assert!(matches!(
            engine.tick(at(701)),
            Some(Event::StoodUp {
                trigger: StoodUpTrigger::AutoRestart,
                ..
            })
        ));
        assert_eq!(engine.log().len(), 1);
    }

    #[test]
    fn auto_restart_off_never_fires() {
        let (mut engine, _) = engine_with(60, 0, Some(30));
        engine.configure_auto_restart(AutoRestart::Off);
        engine.set_enabled(true, at(0));
        engine.tick(at(60));
        engine.tick(at(10_000));
        assert_eq!(engine.log().len(), 0);
        assert_eq!(engine.elapsed_overtime_ms(), 9_940_000);
    }

    #[test]
    fn cancel_resets_everything_but_log() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.confirm_stood_up(at(10));
        engine.tick(at(700));

        engine.cancel(at(701));
        assert!(!engine.is_enabled());
        assert_eq!(engine.phase(), Phase::Countdown);
        assert_eq!(engine.remaining_ms(), 600_000);
        assert!(engine.state().anchor_ms.is_none());
        assert!(!engine.pre_alert_active());
        assert!(!engine.state().auto_restart_armed);
        assert_eq!(engine.log().len(), 1);
    }

    #[test]
    fn long_suspend_collapses_into_one_overtime_entry() {
        let (mut engine, _) = engine_with(600, 120, Some(60));
        engine.set_enabled(true, at(0));
        assert!(matches!(
            engine.tick(at(100_000)),
            Some(Event::OvertimeStarted { .. })
        ));
        assert_eq!(engine.elapsed_overtime_ms(), 0);
        assert_eq!(engine.log().len(), 0);
    }

    #[test]
    fn backwards_clock_is_clamped() {
        let (mut engine, _) = engine_with(600, 120, None);
        engine.set_enabled(true, at(100));
        engine.tick(at(50));
        assert_eq!(engine.remaining_ms(), 600_000);

        engine.tick(at(700));
        engine.tick(at(650));
        assert_eq!(engine.phase(), Phase::Overtime);
        assert_eq!(engine.elapsed_overtime_ms(), 0);
    }

    #[test]
    fn write_failure_is_reported_but_state_advances() {
        let (mut engine, store) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.tick(at(650));
        store.set_fail_writes(true);

        let event = engine.confirm_stood_up(at(660));
        assert!(matches!(event, Event::StoodUp { persisted: false, .. }));
        assert_eq!(engine.phase(), Phase::Countdown);
        assert_eq!(engine.log().len(), 1);
        assert!(engine.log().has_unsaved_changes());

        assert!(engine.retry_persist().is_err());
        store.set_fail_writes(false);
        engine.retry_persist().unwrap();
        assert_eq!(store.raw(LOG_STORE_KEY).unwrap().len(), 1);
    }

    #[test]
    fn clear_log_keeps_timing_state() {
        let (mut engine, store) = engine_with(600, 120, None);
        engine.set_enabled(true, at(0));
        engine.confirm_stood_up(at(5));
        engine.tick(at(100));

        let event = engine.clear_log(at(101));
        assert!(matches!(event, Event::LogCleared { persisted: true, .. }));
        assert!(engine.log().is_empty());
        assert_eq!(engine.remaining_ms(), 505_000);
        assert!(ActivityLog::load(&*store).is_empty());
    }

    #[test]
    fn clear_log_write_failure_still_clears_memory() {
        let (mut engine, store) = engine_with(600, 120, None);
        engine.confirm_stood_up(at(5));
        engine.confirm_stood_up(at(10));
        assert_eq!(store.raw(LOG_STORE_KEY).unwrap().len(), 2);
        store.set_fail_writes(true);

        let event = engine.clear_log(at(20));
        assert!(matches!(event, Event::LogCleared { persisted: false, .. }));
        assert!(engine.log().is_empty());
        assert!(engine.log().has_unsaved_changes());
        assert_eq!(store.raw(LOG_STORE_KEY).unwrap().len(), 2);

        store.set_fail_writes(false);
        engine.retry_persist().unwrap();
        assert!(!engine.log().has_unsaved_changes());
        assert_eq!(store.raw(LOG_STORE_KEY).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn auto_restart_write_failure_still_restarts_cycle() {
        let (mut engine, store) = engine_with(600, 120, Some(60));
        engine.set_enabled(true, at(0));
        engine.tick(at(600));
        store.set_fail_writes(true);

        let event = engine.tick(at(660));
        assert!(matches!(
            event,
            Some(Event::StoodUp {
                trigger: StoodUpTrigger::AutoRestart,
                persisted: false,
                ..
            })
        ));
        assert_eq!(engine.phase(), Phase::Countdown);
        assert!(engine.is_enabled());
        assert_eq!(engine.remaining_ms(), 600_000);
        assert_eq!(engine.log().len(), 1);
        assert!(engine.log().has_unsaved_changes());
        assert!(store.raw(LOG_STORE_KEY).is_none());

        engine.tick(at(700));
        assert_eq!(engine.remaining_ms(), 560_000);
    }

    #[test]
    fn snapshot_reflects_phase() {
        let (mut engine, _) = engine_with(600, 120, None);
        let snap = engine.snapshot();
        assert_eq!(snap.label, "10:00");
        assert_eq!(snap.progress, 0.0);
        assert!(!snap.is_overtime);

        engine.set_enabled(true, at(0));
        engine.tick(at(450));
        let snap = engine.snapshot();
        assert_eq!(snap.label, "02:30");
        assert_eq!(snap.progress, 0.75);
        assert!(!snap.pre_alert_active);

        engine.tick(at(600));
        engine.tick(at(605));
        let snap = engine.snapshot();
        assert!(snap.is_overtime);
        assert_eq!(snap.progress, 1.0);
        assert_eq!(snap.label, "00:05");
        assert!(snap.pre_alert_active);
    }

    #[test]
    fn restore_repairs_inconsistent_state() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let config = TimerConfig::new(300, 60, None).unwrap();
        let saved = EngineState {
            enabled: true,
            phase: Phase::Countdown,
            remaining_ms: 900_000,
            elapsed_overtime_ms: 0,
            anchor_ms: None,
            pre_alert_active: false,
            auto_restart_armed: false,
        };

        let engine = TimerEngine::restore(config, saved, store);
        assert!(!engine.is_enabled());
        assert_eq!(engine.remaining_ms(), 300_000);
    }

    #[test]
    fn restore_pulls_in_deadline_for_shorter_total() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let (mut long, _) = engine_with(3_600, 600, None);
        long.set_enabled(true, at(0));

        let config = TimerConfig::new(600, 120, None).unwrap();
        let mut engine = TimerEngine::restore(config, long.state().clone(), store);
        engine.tick(at(0));
        assert_eq!(engine.remaining_ms(), 600_000);
        engine.tick(at(100));
        assert_eq!(engine.remaining_ms(), 500_000);
    }

    #[test]
    fn engine_loads_existing_log() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(LOG_STORE_KEY, &[1_700_000_000.0, 1_700_000_100.0])
            .unwrap();
        let engine = TimerEngine::new(TimerConfig::new(600, 120, None).unwrap(), store);
        assert_eq!(engine.log().len(), 2);
        assert_eq!(engine.log().latest().unwrap().at(), at(100));
    }
}
