//! Shared plumbing for command modules.

use std::sync::Arc;

use readlog_core::{Config, Database, HttpSessionStore, SessionStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Session store selected by config: the hosted API when a base URL is
/// set, the local database otherwise.
pub fn session_store(
    config: &Config,
    db: &Arc<Database>,
) -> Result<Arc<dyn SessionStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn SessionStore> = match &config.remote.base_url {
        Some(base) => Arc::new(HttpSessionStore::new(base)?),
        None => db.clone(),
    };
    Ok(store)
}

/// One-shot commands own their runtime for the async store calls.
pub fn runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Runtime::new()
}
