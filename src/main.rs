use anyhow::Context;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::Command;
use crate::ops::Ops;
use crate::wg::keys;
use crate::wg::quick;

mod cli;
mod client;
mod config;
mod error;
mod ip_range;
mod materialize;
mod ops;
mod paths;
mod profile;
mod server;
mod store;
mod wg;

fn main() -> anyhow::Result<()> {
    let args = cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config_file = paths::expand_home(&args.config_file)?;
    let config = config::load(&config_file)
        .with_context(|| format!("loading configuration from {}", config_file.display()))?;
    let ops = Ops::try_from(config)?;
    tracing::debug!(?ops, "resolved settings");

    run(&ops, args.command, args.json)
}

fn run(ops: &Ops, command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::Genkey => {
            let pair = keys::generate_key_pair()?;
            if json {
                print_json(&serde_json::json!({
                    "private_key": pair.private_key,
                    "public_key": pair.public_key,
                }))?;
            } else {
                println!("PrivateKey: {}\nPublicKey: {}", pair.private_key, pair.public_key);
            }
        }
        Command::AddServer { name, endpoint } => {
            let server = server::add(ops, &name, &endpoint, keys::generate_key_pair)?;
            let path = ops.paths.profile_path(&server.name)?;
            if json {
                print_json(&server::ServerSummary::from(&server))?;
            } else {
                println!("Server {} created at {}", server.name, path.display());
            }
        }
        Command::ListServers => {
            let names = server::list(ops)?;
            if json {
                print_json(&names)?;
            } else if names.is_empty() {
                println!("no servers found");
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }
        Command::DeleteServer { name } => {
            let deleted = server::delete(ops, &name)?;
            if json {
                print_json(&deleted)?;
            } else {
                println!("Server {} deleted", deleted.deleted);
            }
        }
        Command::ShowServer { name } => {
            let summary = server::show(ops, &name)?;
            if json {
                print_json(&summary)?;
            } else {
                println!(
                    "Name: {}\nEndpoint: {}\nAddress: {}\nClients: {}",
                    summary.name,
                    summary.endpoint,
                    summary.address,
                    summary.clients.len()
                );
                for client in &summary.clients {
                    println!("- {} ({})", client.name, client.address);
                }
            }
        }
        Command::AddClient {
            server,
            client,
            description,
        } => {
            let record = client::add(ops, &server, &client, description, keys::generate_key_pair)?;
            if json {
                print_json(&client::ClientSummary::from(&record))?;
            } else {
                println!("Client {} added to server {} with address {}", record.name, server, record.address);
            }
        }
        Command::ListClients { server } => {
            let clients = client::list(ops, &server)?;
            if json {
                print_json(&clients)?;
            } else if clients.is_empty() {
                println!("no clients found");
            } else {
                for client in clients {
                    println!("{}\t{}", client.name, client.address);
                }
            }
        }
        Command::ShowClient { server, client } => {
            let summary = client::show(ops, &server, &client)?;
            if json {
                print_json(&summary)?;
            } else {
                println!(
                    "Server: {}\nClient: {}\nAddress: {}\nPublicKey: {}\nAllowedIPs: {}",
                    server,
                    summary.name,
                    summary.address,
                    summary.public_key,
                    summary.allowed_ips.join(", ")
                );
                if let Some(description) = &summary.description {
                    println!("Description: {}", description);
                }
            }
        }
        Command::ExportClient { server, client, output } => {
            let path = client::export(ops, &server, &client, &output)?;
            if json {
                print_json(&serde_json::json!({ "path": path }))?;
            } else {
                println!("Client configuration written to {}", path.display());
            }
        }
        Command::Up { server } => print_output(server::up(ops, &server, quick::up)?),
        Command::Down { server } => print_output(server::down(ops, &server, quick::down)?),
        Command::Connect { server, client } => print_output(client::connect(ops, &server, &client, quick::up)?),
        Command::Disconnect { server, client } => {
            print_output(client::disconnect(ops, &server, &client, quick::down)?)
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_output(output: String) {
    if !output.is_empty() {
        println!("{}", output);
    }
}
