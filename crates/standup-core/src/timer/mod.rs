mod auto_restart;
mod config;
mod engine;
mod snapshot;

pub use auto_restart::AutoRestart;
pub use config::TimerConfig;
pub use engine::{EngineState, Phase, TimerEngine};
pub use snapshot::{format_mmss, Snapshot};
