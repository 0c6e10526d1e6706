use std::time::Duration;

use chrono::Utc;
use standup_core::{Event, Snapshot, StoodUpTrigger};

use super::session::Session;

/// Tick the engine at a fixed cadence until Ctrl-C or `ticks` runs out.
///
/// Each tick is its own session: it takes the database lock, saves, and
/// releases it, so other invocations (`standup timer stood-up` from another
/// shell) can run between ticks and their changes, config included, are
/// picked up on the next one.
pub fn run(interval_secs: u64, ticks: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    if interval_secs == 0 {
        return Err("interval must be at least one second".into());
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;
    runtime.block_on(watch(Duration::from_secs(interval_secs), ticks))
}

async fn watch(interval: Duration, ticks: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut timer = tokio::time::interval(interval);
    let mut remaining = ticks;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted, stopping watch");
                break;
            }
            _ = timer.tick() => {
                let (session, caught_up) = Session::open()?;
                if let Some(event) = caught_up {
                    println!("{}", describe(&event));
                }
                println!("{}", status_line(&session.engine.snapshot()));
                session.save()?;

                if let Some(n) = remaining.as_mut() {
                    *n = n.saturating_sub(1);
                    if *n == 0 {
                        break;
                    }
                }
            }
        }
    }
    tracing::debug!(at = %Utc::now(), "watch finished");
    Ok(())
}

fn status_line(snapshot: &Snapshot) -> String {
    let state = if snapshot.enabled { "running" } else { "paused" };
    let phase = if snapshot.is_overtime { "overtime" } else { "countdown" };
    let alert = if snapshot.pre_alert_active { " [stand up!]" } else { "" };
    format!(
        "{} {phase} {state} {:>3.0}%{alert}",
        snapshot.label,
        snapshot.progress * 100.0
    )
}

fn describe(event: &Event) -> String {
    match event {
        Event::PreAlertStarted { .. } => "Time to get ready to stand up.".to_string(),
        Event::OvertimeStarted { .. } => "Time's up - stand up and move!".to_string(),
        Event::StoodUp {
            trigger: StoodUpTrigger::AutoRestart,
            ..
        } => "Overtime limit reached, cycle restarted.".to_string(),
        other => format!("{other:?}"),
    }
}
