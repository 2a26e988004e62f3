use std::cmp::Reverse;
use std::sync::Arc;

use clap::Subcommand;
use readlog_core::{Config, Database};

use super::common;

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List recent sessions, newest first
    List,
    /// Add a session manually
    Add {
        /// Duration in minutes
        minutes: i64,
    },
    /// Delete the session that ended at the given unix timestamp
    Delete { timestamp: i64 },
}

pub fn run(action: SessionsAction) -> common::CliResult {
    let config = Config::load()?;
    let db = Arc::new(Database::open()?);
    let store = common::session_store(&config, &db)?;
    let rt = common::runtime()?;

    match action {
        SessionsAction::List => {
            let mut sessions = rt.block_on(store.list())?;
            sessions.sort_by_key(|s| Reverse(s.timestamp));
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        SessionsAction::Add { minutes } => {
            if minutes < 0 {
                return Err("duration must be nonnegative".into());
            }
            let session = rt.block_on(store.create(minutes * 60))?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        SessionsAction::Delete { timestamp } => {
            rt.block_on(store.delete(timestamp))?;
            println!("{{\"type\": \"session_deleted\"}}");
        }
    }
    Ok(())
}
