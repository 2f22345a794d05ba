mod error;
mod gate;
mod health;
mod loader;
mod server;

use std::path::Path;

use serde::Deserialize;

pub use error::Error;
pub use gate::{GateConfig, StaticPath};
pub use health::HealthConfig;
pub use server::{ServerConfig, TlsServerConfig};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gate: GateConfig,
}

impl Config {
    /// Reads, parses and validates the configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        loader::load(path)
    }
}
