pub mod config;
pub mod log;
mod session;
pub mod timer;
pub mod watch;
