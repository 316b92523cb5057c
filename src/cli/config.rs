//! Config command handler
//!
//! Reads and edits `~/.config/nearby/config.toml` by dotted key.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Dotted key such as "search.min_results"
    pub key: Option<String>,

    /// New value for KEY
    pub value: Option<String>,

    /// Print the config file location
    #[arg(long, conflicts_with_all = ["key", "reset", "keys", "unset"])]
    pub path: bool,

    /// Overwrite the config file with defaults
    #[arg(long, conflicts_with_all = ["key", "keys", "unset"])]
    pub reset: bool,

    /// List every key with its current value
    #[arg(long, conflicts_with_all = ["key", "unset"])]
    pub keys: bool,

    /// Restore KEY to its default value
    #[arg(long, value_name = "KEY", conflicts_with = "key")]
    pub unset: Option<String>,
}

/// What a `nearby config` invocation asks for
#[derive(Debug, PartialEq)]
enum Action {
    Path,
    Reset,
    Keys,
    Dump,
    Get(String),
    Set(String, String),
    Unset(String),
}

impl ConfigArgs {
    fn action(self) -> Action {
        if self.path {
            return Action::Path;
        }
        if self.reset {
            return Action::Reset;
        }
        if self.keys {
            return Action::Keys;
        }
        if let Some(key) = self.unset {
            return Action::Unset(key);
        }
        match (self.key, self.value) {
            (None, _) => Action::Dump,
            (Some(key), None) => Action::Get(key),
            (Some(key), Some(value)) => Action::Set(key, value),
        }
    }
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action() {
        Action::Path => println!("{}", Config::config_path()?.display()),
        Action::Reset => {
            Config::default().save()?;
            println!("Configuration reset to defaults");
        }
        Action::Keys => {
            for (key, value) in key_listing(&Config::load()?) {
                println!("{:32} {}", key, value);
            }
        }
        Action::Dump => {
            let content = toml::to_string_pretty(&Config::load()?)
                .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
            print!("{}", content);
        }
        Action::Get(key) => println!("{}", lookup(&Config::load()?, &key)?),
        Action::Set(key, value) => {
            let mut config = Config::load()?;
            let stored = assign(&mut config, &key, &value)?;
            config.save()?;
            println!("{} = {}", key, stored);
        }
        Action::Unset(key) => {
            let mut config = Config::load()?;
            let stored = restore_default(&mut config, &key)?;
            config.save()?;
            println!("{} = {} (default)", key, stored);
        }
    }
    Ok(())
}

/// Every key paired with its current value
fn key_listing(config: &Config) -> Vec<(&'static str, String)> {
    Config::available_keys()
        .iter()
        .map(|key| (*key, config.get(key).unwrap_or_default()))
        .collect()
}

fn lookup(config: &Config, key: &str) -> Result<String> {
    config.get(key).ok_or_else(|| unknown_key(key))
}

/// Set `key` and return the value as it is now stored
fn assign(config: &mut Config, key: &str, value: &str) -> Result<String> {
    if config.get(key).is_none() {
        return Err(unknown_key(key));
    }
    config.set(key, value)?;
    lookup(config, key)
}

fn restore_default(config: &mut Config, key: &str) -> Result<String> {
    let default = lookup(&Config::default(), key)?;
    assign(config, key, &default)
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {} (known keys: {})",
        key,
        Config::available_keys().join(", ")
    ))
}
