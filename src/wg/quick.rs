use std::path::Path;
use std::process::Command;

use crate::error::Result;

/// `wg-quick up <interface_file>`, returns the tool's combined output.
pub fn up(interface_file: &Path) -> Result<String> {
    run_wg_quick("up", interface_file)
}

/// `wg-quick down <interface_file>`, returns the tool's combined output.
pub fn down(interface_file: &Path) -> Result<String> {
    run_wg_quick("down", interface_file)
}

fn run_wg_quick(action: &str, interface_file: &Path) -> Result<String> {
    let mut cmd = Command::new("wg-quick");
    cmd.arg(action).arg(interface_file);
    let output = super::combined_output(&super::run(cmd, None)?);
    tracing::info!(?interface_file, action, "wg-quick");
    Ok(output)
}
