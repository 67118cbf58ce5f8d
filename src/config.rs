//! Server configuration, loaded from an optional YAML file.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Runtime configuration for the relay.
///
/// Every field has a usable default, so `Config::default()` is enough to
/// run the server locally without writing a configuration file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the TCP listener binds to.
    pub bind_addr: String,

    /// The server's name, used as the prefix of every reply (`<server>` in
    /// `:<server> <NNN> <target> ...`). Defaults to the literal `server`
    /// used throughout the relay's protocol description; embedders may
    /// override it, but nothing in the core depends on any particular
    /// value.
    pub domain: String,

    /// Optional path to a message-of-the-day file. Unreadable or absent
    /// files are not fatal: the server just sends `ERR_NOMOTD`.
    pub motd_file: Option<PathBuf>,

    /// Maximum octets of a nickname.
    pub nicklen: usize,

    /// Maximum octets of a room key (including the leading `#`).
    pub channellen: usize,

    /// Log filter passed to `env_logger`, overridden by `RUST_LOG` if set.
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:6667".to_owned(),
            domain: "server".to_owned(),
            motd_file: None,
            nicklen: 32,
            channellen: 64,
            log: "info".to_owned(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read configuration file: {}", err),
            ConfigError::Parse(err) => write!(f, "failed to parse configuration file: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_yaml::from_str(&contents).map_err(ConfigError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_usable() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:6667");
        assert!(config.motd_file.is_none());
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults_for_missing_fields() {
        let config: Config = serde_yaml::from_str("domain: chat.example\n").unwrap();
        assert_eq!(config.domain, "chat.example");
        assert_eq!(config.bind_addr, "0.0.0.0:6667");
        assert_eq!(config.nicklen, 32);
    }
}
