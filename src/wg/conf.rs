use crate::error::{Error, Result};
use crate::profile::{ClientRecord, ServerRecord};

pub const PERSISTENT_KEEPALIVE_S: u16 = 25;

/// wg-quick configuration for `client`, peering with `server`.
pub fn render_client_config(server: &ServerRecord, client: &ClientRecord) -> Result<String> {
    if client.name.is_empty() {
        return Err(Error::InvalidInput("client name is empty".to_string()));
    }

    let mut conf = String::new();
    conf.push_str("[Interface]\n");
    push_entry(&mut conf, "PrivateKey", &client.private_key);
    push_entry(&mut conf, "Address", &client.address);
    if !server.dns.is_empty() {
        push_entry(&mut conf, "DNS", &server.dns.join(", "));
    }
    conf.push('\n');
    conf.push_str("[Peer]\n");
    push_entry(&mut conf, "PublicKey", &server.server_public_key);
    push_entry(&mut conf, "AllowedIPs", &client.allowed_ips.join(", "));
    push_entry(&mut conf, "Endpoint", &server.endpoint);
    push_entry(&mut conf, "PersistentKeepalive", &PERSISTENT_KEEPALIVE_S.to_string());
    Ok(conf)
}

/// wg-quick configuration for the server interface with one peer section per client.
pub fn render_server_config(server: &ServerRecord) -> Result<String> {
    let (_host, port) = split_endpoint(&server.endpoint)?;

    let mut conf = String::new();
    conf.push_str("[Interface]\n");
    push_entry(&mut conf, "Address", &server.address);
    push_entry(&mut conf, "PrivateKey", &server.server_private_key);
    push_entry(&mut conf, "ListenPort", &port.to_string());
    push_entry(&mut conf, "SaveConfig", "false");
    conf.push('\n');

    for client in &server.clients {
        let allowed_ips = if client.allowed_ips.is_empty() {
            client.address.clone()
        } else {
            client.allowed_ips.join(", ")
        };
        conf.push_str("[Peer]\n");
        push_entry(&mut conf, "PublicKey", &client.public_key);
        push_entry(&mut conf, "AllowedIPs", &allowed_ips);
        conf.push('\n');
    }
    Ok(conf)
}

/// Splits `host:port`; IPv6 hosts have to be bracketed, e.g. `[2001:db8::1]:51820`.
pub fn split_endpoint(endpoint: &str) -> Result<(&str, u16)> {
    let invalid = |reason: &str| Error::InvalidInput(format!("invalid endpoint {:?}: {}", endpoint, reason));

    let (host, port) = if let Some(rest) = endpoint.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(|| invalid("missing ']'"))?;
        let port = after.strip_prefix(':').ok_or_else(|| invalid("missing port"))?;
        (host, port)
    } else {
        let (host, port) = endpoint.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        if host.contains(':') {
            return Err(invalid("too many colons in address"));
        }
        (host, port)
    };

    if host.is_empty() || port.is_empty() {
        return Err(invalid("endpoint must include host and port"));
    }
    if host.contains(['[', ']']) || port.contains(['[', ']']) {
        return Err(invalid("unexpected bracket"));
    }
    let port = port.parse::<u16>().map_err(|_| invalid("port is not a number between 0 and 65535"))?;
    Ok((host, port))
}

fn push_entry(conf: &mut String, key: &str, value: &str) {
    conf.push_str(key);
    conf.push_str(" = ");
    conf.push_str(value);
    conf.push('\n');
}
