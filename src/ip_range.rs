use ipnetwork::Ipv4Network;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::profile::ServerRecord;

pub const DEFAULT_CLIENT_NETWORK: &str = "10.0.0.0/24";

// .0 is the network address, .1 belongs to the server
const FIRST_CLIENT_OFFSET: u64 = 2;
const MAX_PREFIX: u8 = 30;

/// Private subnet client addresses are handed out from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientNetwork {
    network: Ipv4Network,
}

impl ClientNetwork {
    pub fn new(network: Ipv4Network) -> Result<Self> {
        if network.prefix() > MAX_PREFIX {
            return Err(Error::InvalidInput(format!(
                "client network {} leaves no room for clients",
                network
            )));
        }
        let base = Ipv4Network::new(network.network(), network.prefix())
            .map_err(|err| Error::InvalidInput(format!("client network {}: {}", network, err)))?;
        Ok(Self { network: base })
    }

    /// Number of addresses in the subnet, network and broadcast included.
    pub fn count(&self) -> u64 {
        1u64 << (32 - u32::from(self.network.prefix()))
    }

    /// Address for the next client appended to `server`.
    ///
    /// Derived from the client count alone: the n-th client gets host offset n + 2. Addresses of
    /// removed clients are never handed out again.
    pub fn next_client_address(&self, server: &ServerRecord) -> Result<String> {
        let offset = FIRST_CLIENT_OFFSET + server.clients.len() as u64;
        // last address is broadcast
        if offset >= self.count() - 1 {
            return Err(Error::CapacityExceeded(format!(
                "no free client address left in {} for server {}",
                self.network, server.name
            )));
        }

        let ip = Ipv4Addr::from(u32::from(self.network.network()) + offset as u32);
        Ok(format!("{}/32", ip))
    }
}

impl Default for ClientNetwork {
    fn default() -> Self {
        DEFAULT_CLIENT_NETWORK.parse().expect("valid default client network")
    }
}

impl fmt::Display for ClientNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)
    }
}

impl FromStr for ClientNetwork {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let network = s
            .parse::<Ipv4Network>()
            .map_err(|err| Error::InvalidInput(format!("client network {}: {}", s, err)))?;
        Self::new(network)
    }
}

impl Serialize for ClientNetwork {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClientNetwork {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<ClientNetwork>().map_err(serde::de::Error::custom)
    }
}
