use std::sync::Arc;

use chrono::Local;
use clap::Subcommand;
use readlog_core::stats::{bin_by_day, domain};
use readlog_core::{Config, Database};

use super::common;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's and trailing-week totals
    Summary,
    /// Advisory guidance lines
    Guidance,
    /// Per-day chart bins with axis domains
    Chart,
}

pub fn run(action: StatsAction) -> common::CliResult {
    let config = Config::load()?;
    let db = Arc::new(Database::open()?);
    let store = common::session_store(&config, &db)?;
    let rt = common::runtime()?;
    let sessions = rt.block_on(store.list())?;

    let analyzer = config.analyzer();
    let now = Local::now();

    match action {
        StatsAction::Summary => {
            let summary = analyzer.summary(&sessions, &now);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Guidance => {
            for entry in analyzer.guidance(&sessions, &now) {
                println!("{}", analyzer.message(entry));
            }
        }
        StatsAction::Chart => {
            let bins = bin_by_day(&sessions, &Local);
            let report = serde_json::json!({
                "bins": bins,
                "domain": domain(&bins),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
