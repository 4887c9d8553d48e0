use crate::config::Config;
use crate::error::{Error, Result};
use crate::ip_range::ClientNetwork;
use crate::paths::{self, Paths};
use crate::profile::{self, ServerRecord};
use crate::store::ProfileStore;

/// Configuration with every default resolved.
#[derive(Debug, Clone)]
pub struct Ops {
    pub paths: Paths,
    pub client_network: ClientNetwork,
    pub server_address: String,
    pub dns: Vec<String>,
    pub client_allowed_ips: Vec<String>,
}

impl Ops {
    pub fn store(&self) -> ProfileStore {
        ProfileStore::new(self.paths.clone())
    }

    /// Server profile carrying the configured address and resolvers.
    pub fn new_server(&self, name: &str, endpoint: &str, private_key: String, public_key: String) -> ServerRecord {
        let mut server = ServerRecord::new(name, endpoint, private_key, public_key);
        server.address = self.server_address.clone();
        server.dns = self.dns.clone();
        server
    }
}

impl TryFrom<Config> for Ops {
    type Error = Error;

    fn try_from(config: Config) -> Result<Self> {
        let paths = match config.root_dir {
            Some(root_dir) => Paths::new(paths::expand_home(&root_dir)?),
            None => Paths::from_home()?,
        };

        Ok(Self {
            paths,
            client_network: config.client_network.unwrap_or_default(),
            server_address: config
                .server_address
                .unwrap_or_else(|| profile::DEFAULT_SERVER_ADDRESS.to_string()),
            dns: config
                .dns
                .unwrap_or_else(|| profile::DEFAULT_DNS.iter().map(|s| s.to_string()).collect()),
            client_allowed_ips: config
                .client_allowed_ips
                .unwrap_or_else(profile::default_client_allowed_ips),
        })
    }
}
