use crate::{muted_error, weak_error};
use log::error;
use serde::Deserialize;
use std::fs::read_to_string;

/// Stub tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    /// How many times a packet is sent before the stub gives up on it.
    pub retry_budget: u32,
    /// Byte the debugger sends to interrupt a running program.
    pub break_char: u8,
    /// Switch logging off while a trap is served.
    pub mute_log_in_trap: bool,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            retry_budget: 1000,
            break_char: 0x03,
            mute_log_in_trap: false,
        }
    }
}

impl StubConfig {
    const DEFAULT_PATH: &'static str = ".config/trapline/stub.toml";

    pub fn from_toml(data: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(data)
    }

    /// Load config from file, `~/.config/trapline/stub.toml` if no path given.
    /// Return [`None`] on errors.
    pub fn from_file(path: Option<&str>) -> Option<Self> {
        let data = match path {
            None => {
                let path = home::home_dir()?;
                let path = path.join(Self::DEFAULT_PATH);
                muted_error!(read_to_string(path))?
            }
            Some(path) => match read_to_string(path) {
                Ok(data) => data,
                Err(err) => {
                    error!("Error while load stub config file: {err}");
                    return None;
                }
            },
        };

        weak_error!(Self::from_toml(&data))
    }
}
