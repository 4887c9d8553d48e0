use std::process::Command;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: String,
    pub public_key: String,
}

/// Generates a key pair with `wg genkey` and derives the public half with `wg pubkey`.
pub fn generate_key_pair() -> Result<KeyPair> {
    let mut genkey = Command::new("wg");
    genkey.arg("genkey");
    let private_key = super::stdout_text(&super::run(genkey, None)?);

    let mut pubkey = Command::new("wg");
    pubkey.arg("pubkey");
    let public_key = super::stdout_text(&super::run(pubkey, Some(&private_key))?);

    tracing::debug!(public_key, "generated key pair");
    Ok(KeyPair {
        private_key,
        public_key,
    })
}
