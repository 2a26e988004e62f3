//! Analytics over session history: aggregates, guidance, chart bins.

mod aggregate;
mod chart;

pub use aggregate::{total_duration, Analyzer, Guidance, Summary};
pub use chart::{bin_by_day, domain, ChartDomain, DailyTotal};
