use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wirestack - manage local WireGuard server and client profiles
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify config file to use
    #[arg(
        short,
        long,
        global = true,
        env = "WIRESTACK_CONFIG_FILE",
        default_value = "~/.config/wirestack/config.toml"
    )]
    pub config_file: PathBuf,

    /// format output as json
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a WireGuard key pair
    #[command()]
    Genkey,

    /// Create a server profile
    #[command()]
    AddServer {
        /// server name
        #[arg(long)]
        name: String,
        /// endpoint clients connect to, in the form host:port
        #[arg(long)]
        endpoint: String,
    },

    /// List server profiles
    #[command()]
    ListServers,

    /// Delete a server profile and its rendered configuration
    #[command()]
    DeleteServer {
        /// server name
        name: String,
    },

    /// Show server profile details
    #[command()]
    ShowServer {
        /// server name
        name: String,
    },

    /// Add a client to a server profile
    #[command()]
    AddClient {
        /// server name
        #[arg(long)]
        server: String,
        /// client name
        #[arg(long)]
        client: String,
        /// free text stored with the client
        #[arg(long)]
        description: Option<String>,
    },

    /// List clients of a server
    #[command()]
    ListClients {
        /// server name
        #[arg(long)]
        server: String,
    },

    /// Show client details
    #[command()]
    ShowClient {
        /// server name
        #[arg(long)]
        server: String,
        /// client name
        #[arg(long)]
        client: String,
    },

    /// Export a WireGuard client configuration
    #[command()]
    ExportClient {
        /// server name
        #[arg(long)]
        server: String,
        /// client name
        #[arg(long)]
        client: String,
        /// path to write the client configuration to
        #[arg(long)]
        output: PathBuf,
    },

    /// Bring up the WireGuard interface for a server
    #[command()]
    Up {
        /// server name
        server: String,
    },

    /// Bring down the WireGuard interface for a server
    #[command()]
    Down {
        /// server name
        server: String,
    },

    /// Bring up a WireGuard client interface on this machine
    #[command()]
    Connect {
        /// server name
        #[arg(long)]
        server: String,
        /// client name to connect with
        #[arg(long)]
        client: String,
    },

    /// Bring down a WireGuard client interface on this machine
    #[command()]
    Disconnect {
        /// server name
        #[arg(long)]
        server: String,
        /// client name to disconnect
        #[arg(long)]
        client: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
