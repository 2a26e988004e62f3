use clap::Subcommand;
use readlog_core::Config;

use super::common;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one configuration value
    Get { key: String },
    /// Set a configuration value (an empty value unsets remote.base_url)
    Set { key: String, value: String },
    /// Print the whole configuration as TOML
    List,
}

pub fn run(action: ConfigAction) -> common::CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {}", config.get(&key)?);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
