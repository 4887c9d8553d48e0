use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::materialize;
use crate::ops::Ops;
use crate::paths;
use crate::profile::{find_client, ClientRecord};
use crate::wg::keys::KeyPair;

/// Client profile without key material.
#[derive(Debug, Serialize)]
pub struct ClientSummary {
    pub name: String,
    pub address: String,
    pub public_key: String,
    pub allowed_ips: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&ClientRecord> for ClientSummary {
    fn from(client: &ClientRecord) -> Self {
        Self {
            name: client.name.clone(),
            address: client.address.clone(),
            public_key: client.public_key.clone(),
            allowed_ips: client.allowed_ips.clone(),
            description: client.description.clone(),
        }
    }
}

/// Appends a new client to `server_name` and saves the profile.
///
/// The stored profile is only touched once name, address and keys are all settled.
pub fn add<F>(
    ops: &Ops,
    server_name: &str,
    client_name: &str,
    description: Option<String>,
    generate_keys: F,
) -> Result<ClientRecord>
where
    F: FnOnce() -> Result<KeyPair>,
{
    if server_name.is_empty() || client_name.is_empty() {
        return Err(Error::InvalidInput("both server and client name are required".to_string()));
    }
    paths::validate_client_name(client_name)?;

    let store = ops.store();
    let mut server = store.load(server_name)?;
    if server.has_client(client_name) {
        return Err(Error::AlreadyExists(format!("client {} on server {}", client_name, server_name)));
    }

    let address = ops.client_network.next_client_address(&server)?;
    if server.clients.iter().any(|client| client.address == address) {
        return Err(Error::AlreadyExists(format!("address {} on server {}", address, server_name)));
    }

    let keys = generate_keys()?;
    let client = ClientRecord {
        name: client_name.to_string(),
        private_key: keys.private_key,
        public_key: keys.public_key,
        address,
        allowed_ips: ops.client_allowed_ips.clone(),
        description,
    };
    server.clients.push(client.clone());
    store.save(&server)?;

    tracing::info!(server = server_name, client = client_name, address = %client.address, "added client");
    Ok(client)
}

pub fn list(ops: &Ops, server_name: &str) -> Result<Vec<ClientSummary>> {
    let server = ops.store().load(server_name)?;
    Ok(server.clients.iter().map(ClientSummary::from).collect())
}

pub fn show(ops: &Ops, server_name: &str, client_name: &str) -> Result<ClientSummary> {
    let server = ops.store().load(server_name)?;
    let client = find_client(&server, client_name)?;
    Ok(ClientSummary::from(client))
}

/// Writes the client's wg-quick config to `output`.
pub fn export(ops: &Ops, server_name: &str, client_name: &str, output: &Path) -> Result<PathBuf> {
    let server = ops.store().load(server_name)?;
    let client = find_client(&server, client_name)?;
    let path = materialize::export_client_config(&server, client, output)?;
    tracing::info!(server = server_name, client = client_name, path = %path.display(), "exported client config");
    Ok(path)
}

/// Renders the client config and hands it to `activate`.
pub fn connect<F>(ops: &Ops, server_name: &str, client_name: &str, activate: F) -> Result<String>
where
    F: FnOnce(&Path) -> Result<String>,
{
    let server = ops.store().load(server_name)?;
    let client = find_client(&server, client_name)?;
    let path = materialize::write_client_config(&ops.paths, &server, client)?;
    activate(&path)
}

/// Re-renders the client config for `deactivate`, then discards it.
pub fn disconnect<F>(ops: &Ops, server_name: &str, client_name: &str, deactivate: F) -> Result<String>
where
    F: FnOnce(&Path) -> Result<String>,
{
    let server = ops.store().load(server_name)?;
    let client = find_client(&server, client_name)?;
    let path = materialize::write_client_config(&ops.paths, &server, client)?;
    let output = deactivate(&path)?;
    materialize::remove_runtime_file(&path);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server;
    use crate::server::tests::{fake_keys, test_ops};
    use std::fs;

    fn setup() -> (tempfile::TempDir, Ops) {
        let (tmp, ops) = test_ops();
        server::add(&ops, "srv", "203.0.113.1:51820", fake_keys("srv")).unwrap();
        (tmp, ops)
    }

    #[test]
    fn test_add_clients_in_order() {
        let (_tmp, ops) = setup();

        let alice = add(&ops, "srv", "alice", None, fake_keys("alice")).unwrap();
        let bob = add(&ops, "srv", "bob", Some("phone".into()), fake_keys("bob")).unwrap();
        assert_eq!(alice.address, "10.0.0.2/32");
        assert_eq!(bob.address, "10.0.0.3/32");
        assert_eq!(alice.allowed_ips, vec!["0.0.0.0/0", "::/0"]);

        let stored = ops.store().load("srv").unwrap();
        assert_eq!(stored.clients, vec![alice, bob]);
        assert_eq!(stored.clients[1].description.as_deref(), Some("phone"));
    }

    #[test]
    fn test_add_duplicate_client_leaves_profile_unchanged() {
        let (_tmp, ops) = setup();
        add(&ops, "srv", "alice", None, fake_keys("alice")).unwrap();
        let before = ops.store().load("srv").unwrap();

        let res = add(&ops, "srv", "alice", None, || panic!("keys generated for duplicate client"));
        assert!(matches!(res, Err(Error::AlreadyExists(_))));
        assert_eq!(ops.store().load("srv").unwrap(), before);
    }

    #[test]
    fn test_add_client_rejects_ambiguous_name() {
        let (_tmp, ops) = setup();
        let before = ops.store().load("srv").unwrap();

        let res = add(&ops, "srv", "b-c", None, fake_keys("b-c"));
        assert!(matches!(res, Err(Error::InvalidInput(_))));
        assert_eq!(ops.store().load("srv").unwrap(), before);
    }

    #[test]
    fn test_add_client_to_missing_server() {
        let (_tmp, ops) = setup();
        assert!(matches!(add(&ops, "nope", "alice", None, fake_keys("alice")), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_add_client_capacity_exceeded() {
        let (_tmp, ops) = setup();
        let mut server = ops.store().load("srv").unwrap();
        for i in 0..253 {
            server.clients.push(ClientRecord {
                name: format!("c{}", i),
                private_key: String::new(),
                public_key: String::new(),
                address: format!("10.0.0.{}/32", i + 2),
                allowed_ips: Vec::new(),
                description: None,
            });
        }
        ops.store().save(&server).unwrap();

        let res = add(&ops, "srv", "late", None, fake_keys("late"));
        assert!(matches!(res, Err(Error::CapacityExceeded(_))));
        assert_eq!(ops.store().load("srv").unwrap().clients.len(), 253);
    }

    #[test]
    fn test_add_client_rejects_colliding_address() {
        let (_tmp, ops) = setup();
        let mut server = ops.store().load("srv").unwrap();
        server.clients.push(ClientRecord {
            name: "manual".into(),
            private_key: String::new(),
            public_key: String::new(),
            address: "10.0.0.3/32".into(),
            allowed_ips: Vec::new(),
            description: None,
        });
        ops.store().save(&server).unwrap();

        let res = add(&ops, "srv", "next", None, fake_keys("next"));
        assert!(matches!(res, Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn test_list_and_show() {
        let (_tmp, ops) = setup();
        assert!(list(&ops, "srv").unwrap().is_empty());
        add(&ops, "srv", "alice", None, fake_keys("alice")).unwrap();

        let clients = list(&ops, "srv").unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].name, "alice");

        let alice = show(&ops, "srv", "alice").unwrap();
        assert_eq!(alice.public_key, "alice-pub");
        assert!(matches!(show(&ops, "srv", "bob"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_export() {
        let (tmp, ops) = setup();
        add(&ops, "srv", "alice", None, fake_keys("alice")).unwrap();

        let output = tmp.path().join("alice.conf");
        let path = export(&ops, "srv", "alice", &output).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("PrivateKey = alice-priv"));
        assert!(content.contains("PublicKey = srv-pub"));
        assert!(content.contains("Endpoint = 203.0.113.1:51820"));
    }

    #[test]
    fn test_connect_and_disconnect() {
        let (_tmp, ops) = setup();
        add(&ops, "srv", "alice", None, fake_keys("alice")).unwrap();
        let runtime_path = ops.paths.client_runtime_config_path("srv", "alice").unwrap();

        connect(&ops, "srv", "alice", |path| {
            assert!(fs::read_to_string(path).unwrap().contains("PersistentKeepalive = 25"));
            Ok(String::new())
        })
        .unwrap();
        assert!(runtime_path.exists());

        disconnect(&ops, "srv", "alice", |_| Ok(String::new())).unwrap();
        assert!(!runtime_path.exists());
    }
}
