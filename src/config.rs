use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ip_range::ClientNetwork;

pub const ENV_PREFIX: &str = "WIRESTACK_";

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Config {
    // profile and runtime storage, defaults to ~/.wirestack
    pub root_dir: Option<PathBuf>,
    // subnet client addresses are allocated from
    pub client_network: Option<ClientNetwork>,
    // interface address given to newly created servers
    pub server_address: Option<String>,
    // resolvers pushed to clients of newly created servers
    pub dns: Option<Vec<String>>,
    // routes newly added clients send through the tunnel
    pub client_allowed_ips: Option<Vec<String>>,
}

/// Reads `path` if it exists and applies `WIRESTACK_*` environment overrides on top.
pub fn load(path: &Path) -> Result<Config, figment::Error> {
    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    tracing::debug!(?path, ?config, "loaded configuration");
    Ok(config)
}
