use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::{self, Paths};
use crate::profile::{ClientRecord, ServerRecord};
use crate::wg::conf;

/// Renders the server config into the runtime directory and returns its path.
pub fn write_server_config(paths: &Paths, server: &ServerRecord) -> Result<PathBuf> {
    let content = conf::render_server_config(server)?;
    let path = paths.server_runtime_config_path(&server.name)?;
    write_private(&path, content.as_bytes())?;
    tracing::debug!(server = %server.name, path = %path.display(), "wrote server config");
    Ok(path)
}

/// Renders a client config into the runtime directory and returns its path.
pub fn write_client_config(paths: &Paths, server: &ServerRecord, client: &ClientRecord) -> Result<PathBuf> {
    let content = conf::render_client_config(server, client)?;
    let path = paths.client_runtime_config_path(&server.name, &client.name)?;
    write_private(&path, content.as_bytes())?;
    tracing::debug!(server = %server.name, client = %client.name, path = %path.display(), "wrote client config");
    Ok(path)
}

/// Writes a client config to a caller chosen location, `~` is expanded.
pub fn export_client_config(server: &ServerRecord, client: &ClientRecord, output: &Path) -> Result<PathBuf> {
    let content = conf::render_client_config(server, client)?;
    let path = paths::expand_home(output)?;
    write_private(&path, content.as_bytes())?;
    Ok(path)
}

/// Replaces `path` with `content`, readable and writable by the owner only.
pub fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    let context = || format!("writing {}", path.display());

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| Error::io(context(), err))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|err| Error::io(context(), err))?;

    // mode only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|err| Error::io(context(), err))?;
    }

    file.write_all(content).map_err(|err| Error::io(context(), err))?;
    file.sync_all().map_err(|err| Error::io(context(), err))?;
    Ok(())
}

/// Removes a rendered config. Failures are logged and otherwise ignored.
pub fn remove_runtime_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed runtime config"),
        Err(err) if err.kind() == ErrorKind::NotFound => (),
        Err(err) => tracing::debug!(?err, path = %path.display(), "removing runtime config failed"),
    }
}
