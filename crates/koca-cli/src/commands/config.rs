use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use koca_config::{Config, ConfigError, KEYS};
use koca_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show every configured value
    Show,
    /// Print a single value
    Get { key: String },
    /// Set a value
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, the config file is looked up there from now on.
    /// If omitted, the current configuration file path is printed.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Get { key } => {
            if !KEYS.contains(&key.as_str()) {
                return Err(ConfigError::UnknownKey { key }.into());
            }
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{}", value),
                None => logger::debug(&format!("{} is not set", key)),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, value.clone())?;
            config.save()?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path()?;
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match new_path {
                Some(p) => {
                    Config::set_path(&p)?;
                    logger::success(&format!("Config path set to {}", p));
                }
                None => println!("{}", config_path.display()),
            }
        }
    }
    Ok(())
}
