use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use standup_core::{AutoRestart, Event, Snapshot};

use super::session::Session;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start (or resume) the countdown
    Start,
    /// Pause the timer
    Stop,
    /// Log a stand-up and restart the countdown
    StoodUp,
    /// Stop and rewind to a full countdown
    Cancel,
    /// Set the auto-restart threshold (off, 5m, 10m, 15m, 30m, or seconds)
    AutoRestart {
        setting: AutoRestart,
    },
    /// Write the activity log to disk again after a failed save
    Flush,
}

#[derive(Serialize)]
struct Output {
    events: Vec<Event>,
    snapshot: Snapshot,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, caught_up) = Session::open()?;
    let now = Utc::now();
    let mut events: Vec<Event> = caught_up.into_iter().collect();

    match action {
        TimerAction::Status => {}
        TimerAction::Start => events.extend(session.engine.set_enabled(true, now)),
        TimerAction::Stop => events.extend(session.engine.set_enabled(false, now)),
        TimerAction::StoodUp => {
            let event = session.engine.confirm_stood_up(now);
            if matches!(event, Event::StoodUp { persisted: false, .. }) {
                eprintln!("warning: stand-up recorded but not saved; run `standup timer flush`");
            }
            events.push(event);
        }
        TimerAction::Cancel => events.push(session.engine.cancel(now)),
        TimerAction::AutoRestart { setting } => {
            session.engine.configure_auto_restart(setting);
            session.config.timer.auto_restart_secs = setting.secs().unwrap_or(0);
            session.config.save()?;
            // Re-evaluate immediately: a lowered threshold may already be due.
            events.extend(session.engine.tick(now));
        }
        TimerAction::Flush => session.engine.retry_persist()?,
    }

    let output = Output {
        events,
        snapshot: session.engine.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    session.save()?;
    Ok(())
}
