//! # Standup Core Library
//!
//! This library provides the core logic for Standup, a "stand up and move"
//! reminder. A countdown runs down to zero, flips into an open-ended
//! overtime count-up, and every confirmed stand-up is recorded in a
//! persisted activity log. The CLI binary is a thin host over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine; the caller supplies
//!   `now` and periodically invokes `tick()`
//! - **Activity Log**: Most-recent-first record of stand-ups, persisted
//!   through an injected key-value store
//! - **Storage**: In-memory and SQLite key-value stores, TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`ActivityLog`]: Stand-up history
//! - [`KvStore`]: Persistence capability injected into the engine
//! - [`Config`]: Application configuration management

pub mod activity;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use activity::{ActivityLog, LogEntry, LOG_STORE_KEY};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::{Event, StoodUpTrigger};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{AutoRestart, EngineState, Phase, Snapshot, TimerConfig, TimerEngine};
