mod config;
pub mod database;
mod memory;

pub use config::{Config, TimerSection};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StoreError;

/// Key-value capability the engine persists its activity log through.
///
/// Values are flat lists of epoch-second timestamps. Implementations decide
/// how (and whether) anything reaches disk; the engine only needs `get`/`set`
/// to behave synchronously.
pub trait KvStore {
    /// Read the list stored under `key`, `Ok(None)` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, StoreError>;

    /// Replace the list stored under `key`.
    fn set(&self, key: &str, value: &[f64]) -> Result<(), StoreError>;
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[f64]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Returns the data directory.
///
/// Resolution order:
/// 1. `STANDUP_DATA_DIR` if set
/// 2. `~/.config/standup-dev/` when `STANDUP_ENV=dev`
/// 3. `~/.config/standup/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("STANDUP_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STANDUP_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("standup-dev")
            } else {
                base_dir.join("standup")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
