//! Engine lifecycle shared by every command.
//!
//! Each CLI invocation is a short-lived host: it restores the saved engine
//! state, brings it up to the current time, runs one command, and saves the
//! state back. The whole cycle runs inside one immediate SQLite transaction,
//! so two invocations (say `watch` and `timer stood-up` from another shell)
//! take turns instead of overwriting each other's state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use standup_core::{Config, Database, EngineState, Event, KvStore, TimerEngine};

const ENGINE_KEY: &str = "timer_engine";

pub struct Session {
    pub config: Config,
    pub engine: TimerEngine,
    db: Arc<Database>,
}

impl Session {
    /// Open the database, take its write lock, restore the engine and tick
    /// it to now.
    ///
    /// Returns the session and whatever the catch-up tick produced. The lock
    /// is held until [`Session::save`]; dropping the session instead
    /// discards every write made through it.
    pub fn open() -> Result<(Self, Option<Event>), Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open()?);
        db.begin_immediate()?;
        let config = Config::load()?;
        Self::resume(config, db, Utc::now())
    }

    /// Restore the engine from a database that already holds the write lock.
    fn resume(
        config: Config,
        db: Arc<Database>,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<Event>), Box<dyn std::error::Error>> {
        let timer_config = config.timer_config()?;
        let store: Arc<dyn KvStore> = db.clone();

        let engine = match load_state(&db) {
            Some(state) => TimerEngine::restore(timer_config, state, store),
            None => TimerEngine::new(timer_config, store),
        };

        let mut session = Self { config, engine, db };
        let caught_up = session.engine.tick(now);
        Ok((session, caught_up))
    }

    /// Write the engine state and commit, releasing the lock.
    pub fn save(self) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(self.engine.state())?;
        self.db.kv_set(ENGINE_KEY, &json)?;
        self.db.commit()?;
        Ok(())
    }
}

fn load_state(db: &Database) -> Option<EngineState> {
    let json = match db.kv_get(ENGINE_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "could not read saved engine state");
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable engine state");
            None
        }
    }
}
