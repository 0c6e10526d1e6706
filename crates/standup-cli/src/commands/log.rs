use chrono::{Local, Utc};
use clap::Subcommand;

use super::session::Session;

#[derive(Subcommand)]
pub enum LogAction {
    /// List stand-ups, most recent first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every stand-up entry
    Clear,
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, caught_up) = Session::open()?;
    // stdout may be JSON; report what the catch-up tick did on stderr.
    if let Some(event) = caught_up {
        eprintln!("timer: {}", serde_json::to_string(&event)?);
    }

    match action {
        LogAction::List { json } => {
            let entries = session.engine.log().entries();
            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
            } else if entries.is_empty() {
                println!("No stand-ups logged.");
            } else {
                for entry in entries {
                    let local = entry.at().with_timezone(&Local);
                    println!("{}", local.format("%Y-%m-%d %H:%M:%S"));
                }
            }
        }
        LogAction::Clear => {
            let event = session.engine.clear_log(Utc::now());
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }

    session.save()?;
    Ok(())
}
