use serde::Serialize;
use std::path::Path;

use crate::client::ClientSummary;
use crate::error::{Error, Result};
use crate::materialize;
use crate::ops::Ops;
use crate::paths;
use crate::profile::ServerRecord;
use crate::wg::conf;
use crate::wg::keys::KeyPair;

/// Server profile without key material.
#[derive(Debug, Serialize)]
pub struct ServerSummary {
    pub name: String,
    pub endpoint: String,
    pub address: String,
    pub dns: Vec<String>,
    pub public_key: String,
    pub clients: Vec<ClientSummary>,
}

impl From<&ServerRecord> for ServerSummary {
    fn from(server: &ServerRecord) -> Self {
        Self {
            name: server.name.clone(),
            endpoint: server.endpoint.clone(),
            address: server.address.clone(),
            dns: server.dns.clone(),
            public_key: server.server_public_key.clone(),
            clients: server.clients.iter().map(ClientSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedServer {
    pub deleted: String,
}

pub fn add<F>(ops: &Ops, name: &str, endpoint: &str, generate_keys: F) -> Result<ServerRecord>
where
    F: FnOnce() -> Result<KeyPair>,
{
    if name.is_empty() || endpoint.is_empty() {
        return Err(Error::InvalidInput("both server name and endpoint are required".to_string()));
    }
    paths::validate_server_name(name)?;
    conf::split_endpoint(endpoint)?;

    let store = ops.store();
    if store.exists(name)? {
        return Err(Error::AlreadyExists(format!("server {}", name)));
    }

    let keys = generate_keys()?;
    let server = ops.new_server(name, endpoint, keys.private_key, keys.public_key);
    store.create(&server)?;

    tracing::info!(server = name, endpoint, "created server profile");
    Ok(server)
}

pub fn list(ops: &Ops) -> Result<Vec<String>> {
    ops.store().list()
}

pub fn delete(ops: &Ops, name: &str) -> Result<DeletedServer> {
    ops.store().delete(name)?;
    Ok(DeletedServer {
        deleted: name.to_string(),
    })
}

pub fn show(ops: &Ops, name: &str) -> Result<ServerSummary> {
    let server = ops.store().load(name)?;
    Ok(ServerSummary::from(&server))
}

/// Renders the server config and hands it to `activate`.
pub fn up<F>(ops: &Ops, name: &str, activate: F) -> Result<String>
where
    F: FnOnce(&Path) -> Result<String>,
{
    let server = ops.store().load(name)?;
    let path = materialize::write_server_config(&ops.paths, &server)?;
    activate(&path)
}

/// Hands the rendered server config to `deactivate`, then discards it.
pub fn down<F>(ops: &Ops, name: &str, deactivate: F) -> Result<String>
where
    F: FnOnce(&Path) -> Result<String>,
{
    let path = ops.paths.server_runtime_config_path(name)?;
    let output = deactivate(&path)?;
    materialize::remove_runtime_file(&path);
    Ok(output)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) fn test_ops() -> (TempDir, Ops) {
        let tmp = TempDir::new().unwrap();
        let ops = Ops::try_from(Config {
            root_dir: Some(tmp.path().join("root")),
            ..Config::default()
        })
        .unwrap();
        (tmp, ops)
    }

    pub(crate) fn fake_keys(prefix: &'static str) -> impl FnOnce() -> Result<KeyPair> {
        move || {
            Ok(KeyPair {
                private_key: format!("{}-priv", prefix),
                public_key: format!("{}-pub", prefix),
            })
        }
    }

    #[test]
    fn test_add_server() {
        let (_tmp, ops) = test_ops();

        let server = add(&ops, "srv", "203.0.113.1:51820", fake_keys("srv")).unwrap();
        assert_eq!(server.server_private_key, "srv-priv");
        assert_eq!(server.server_public_key, "srv-pub");
        assert_eq!(ops.store().load("srv").unwrap(), server);
        assert_eq!(list(&ops).unwrap(), vec!["srv"]);
    }

    #[test]
    fn test_add_existing_server_fails() {
        let (_tmp, ops) = test_ops();
        let original = add(&ops, "srv", "203.0.113.1:51820", fake_keys("first")).unwrap();

        let res = add(&ops, "srv", "198.51.100.7:443", || panic!("keys generated for duplicate server"));
        assert!(matches!(res, Err(Error::AlreadyExists(_))));
        assert_eq!(ops.store().load("srv").unwrap(), original);
    }

    #[test]
    fn test_add_server_rejects_bad_input() {
        let (_tmp, ops) = test_ops();
        assert!(matches!(add(&ops, "", "203.0.113.1:51820", fake_keys("x")), Err(Error::InvalidInput(_))));
        assert!(matches!(add(&ops, "srv", "203.0.113.1", fake_keys("x")), Err(Error::InvalidInput(_))));
        assert!(matches!(
            add(&ops, "client-srv-alice", "203.0.113.1:51820", fake_keys("x")),
            Err(Error::InvalidInput(_))
        ));
        assert!(list(&ops).unwrap().is_empty());
    }

    #[test]
    fn test_key_generation_failure_saves_nothing() {
        let (_tmp, ops) = test_ops();
        let res = add(&ops, "srv", "203.0.113.1:51820", || {
            Err(Error::ExternalTool {
                command: "wg genkey".into(),
                output: "not installed".into(),
            })
        });
        assert!(matches!(res, Err(Error::ExternalTool { .. })));
        assert!(!ops.store().exists("srv").unwrap());
    }

    #[test]
    fn test_show_hides_private_keys() {
        let (_tmp, ops) = test_ops();
        add(&ops, "srv", "203.0.113.1:51820", fake_keys("srv")).unwrap();

        let summary = show(&ops, "srv").unwrap();
        assert_eq!(summary.public_key, "srv-pub");
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("srv-priv"));
    }

    #[test]
    fn test_up_and_down() {
        let (_tmp, ops) = test_ops();
        add(&ops, "srv", "203.0.113.1:51820", fake_keys("srv")).unwrap();

        let output = up(&ops, "srv", |path| {
            let content = fs::read_to_string(path).unwrap();
            assert!(content.contains("ListenPort = 51820"));
            Ok("[#] ip link add srv type wireguard".to_string())
        })
        .unwrap();
        assert_eq!(output, "[#] ip link add srv type wireguard");
        let runtime_path = ops.paths.server_runtime_config_path("srv").unwrap();
        assert!(runtime_path.exists());

        down(&ops, "srv", |path| {
            assert_eq!(path, runtime_path.as_path());
            Ok(String::new())
        })
        .unwrap();
        assert!(!runtime_path.exists());
    }

    #[test]
    fn test_failed_down_keeps_runtime_file() {
        let (_tmp, ops) = test_ops();
        add(&ops, "srv", "203.0.113.1:51820", fake_keys("srv")).unwrap();
        up(&ops, "srv", |_| Ok(String::new())).unwrap();

        let res = down(&ops, "srv", |_| {
            Err(Error::ExternalTool {
                command: "wg-quick down".into(),
                output: "is not a WireGuard interface".into(),
            })
        });
        assert!(matches!(res, Err(Error::ExternalTool { .. })));
        assert!(ops.paths.server_runtime_config_path("srv").unwrap().exists());
    }

    #[test]
    fn test_up_unknown_server() {
        let (_tmp, ops) = test_ops();
        assert!(matches!(up(&ops, "nope", |_| Ok(String::new())), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let (_tmp, ops) = test_ops();
        add(&ops, "srv", "203.0.113.1:51820", fake_keys("srv")).unwrap();
        up(&ops, "srv", |_| Ok(String::new())).unwrap();

        let deleted = delete(&ops, "srv").unwrap();
        assert_eq!(serde_json::to_string(&deleted).unwrap(), r#"{"deleted":"srv"}"#);
        assert!(list(&ops).unwrap().is_empty());
        assert!(!ops.paths.server_runtime_config_path("srv").unwrap().exists());
        assert!(matches!(delete(&ops, "srv"), Err(Error::NotFound(_))));
    }
}
