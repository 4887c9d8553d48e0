use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_SERVER_ADDRESS: &str = "10.0.0.1/24";
pub const DEFAULT_DNS: [&str; 2] = ["1.1.1.1", "9.9.9.9"];
pub const DEFAULT_CLIENT_ALLOWED_IPS: [&str; 2] = ["0.0.0.0/0", "::/0"];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientRecord {
    pub name: String,
    pub private_key: String,
    pub public_key: String,
    // single host cidr, e.g. 10.0.0.2/32
    pub address: String,
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ServerRecord {
    pub name: String,
    // host:port, port doubles as the interface listen port
    pub endpoint: String,
    pub address: String,
    #[serde(default)]
    pub dns: Vec<String>,
    pub server_private_key: String,
    pub server_public_key: String,
    // insertion order determines address allocation
    #[serde(default)]
    pub clients: Vec<ClientRecord>,
}

impl ServerRecord {
    /// Fresh server profile with the stock address and resolvers and no clients.
    pub fn new(name: &str, endpoint: &str, private_key: String, public_key: String) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            address: DEFAULT_SERVER_ADDRESS.to_string(),
            dns: DEFAULT_DNS.iter().map(|s| s.to_string()).collect(),
            server_private_key: private_key,
            server_public_key: public_key,
            clients: Vec::new(),
        }
    }

    pub fn has_client(&self, name: &str) -> bool {
        self.clients.iter().any(|client| client.name == name)
    }
}

/// First client named `client_name`.
pub fn find_client<'a>(server: &'a ServerRecord, client_name: &str) -> Result<&'a ClientRecord> {
    server
        .clients
        .iter()
        .find(|client| client.name == client_name)
        .ok_or_else(|| Error::NotFound(format!("client {} on server {}", client_name, server.name)))
}

pub fn default_client_allowed_ips() -> Vec<String> {
    DEFAULT_CLIENT_ALLOWED_IPS.iter().map(|s| s.to_string()).collect()
}
