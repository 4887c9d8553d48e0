use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const DEFAULT_ROOT_DIR: &str = ".wirestack";
const SERVERS_DIR: &str = "servers";
const RUNTIME_DIR: &str = "runtime";
const CLIENT_RUNTIME_PREFIX: &str = "client-";
const CLIENT_RUNTIME_SEPARATOR: char = '-';

pub const PROFILE_EXTENSION: &str = "json";
pub const RUNTIME_EXTENSION: &str = "conf";

/// On-disk layout below a per-user root:
///
/// ```text
/// <root>/servers/<server>.json
/// <root>/runtime/<server>.conf
/// <root>/runtime/client-<server>-<client>.conf
/// ```
///
/// Directories are created lazily with owner-only permissions.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.wirestack` for the current user.
    pub fn from_home() -> Result<Self> {
        Ok(Self::new(home_dir()?.join(DEFAULT_ROOT_DIR)))
    }

    pub fn config_root(&self) -> Result<PathBuf> {
        ensure_private_dir(&self.root)?;
        Ok(self.root.clone())
    }

    pub fn profiles_root(&self) -> Result<PathBuf> {
        let dir = self.config_root()?.join(SERVERS_DIR);
        ensure_private_dir(&dir)?;
        Ok(dir)
    }

    pub fn runtime_root(&self) -> Result<PathBuf> {
        let dir = self.config_root()?.join(RUNTIME_DIR);
        ensure_private_dir(&dir)?;
        Ok(dir)
    }

    pub fn profile_path(&self, name: &str) -> Result<PathBuf> {
        validate_name("server", name)?;
        Ok(self.profiles_root()?.join(format!("{}.{}", name, PROFILE_EXTENSION)))
    }

    pub fn server_runtime_config_path(&self, name: &str) -> Result<PathBuf> {
        validate_server_name(name)?;
        Ok(self.runtime_root()?.join(format!("{}.{}", name, RUNTIME_EXTENSION)))
    }

    pub fn client_runtime_config_path(&self, server_name: &str, client_name: &str) -> Result<PathBuf> {
        validate_name("server", server_name)?;
        validate_client_name(client_name)?;
        let file = format!(
            "{}{}{}{}.{}",
            CLIENT_RUNTIME_PREFIX, server_name, CLIENT_RUNTIME_SEPARATOR, client_name, RUNTIME_EXTENSION
        );
        Ok(self.runtime_root()?.join(file))
    }
}

/// Names end up as file name stems, so they must not be able to escape their directory.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput(format!("{} name is empty", kind)));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::InvalidInput(format!("{} name {:?} is not a valid file name", kind, name)));
    }
    Ok(())
}

/// Server names must not look like rendered client configs.
pub fn validate_server_name(name: &str) -> Result<()> {
    validate_name("server", name)?;
    if name.starts_with(CLIENT_RUNTIME_PREFIX) {
        return Err(Error::InvalidInput(format!(
            "server name {:?} must not start with {:?}",
            name, CLIENT_RUNTIME_PREFIX
        )));
    }
    Ok(())
}

/// The last separator in a rendered client config name splits server from client.
pub fn validate_client_name(name: &str) -> Result<()> {
    validate_name("client", name)?;
    if name.contains(CLIENT_RUNTIME_SEPARATOR) {
        return Err(Error::InvalidInput(format!(
            "client name {:?} must not contain {:?}",
            name, CLIENT_RUNTIME_SEPARATOR
        )));
    }
    Ok(())
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        Error::io(
            "resolving home directory",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory for current user"),
        )
    })
}

/// Replaces a leading `~` with the current user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

pub fn ensure_private_dir(path: &Path) -> Result<()> {
    let context = || format!("creating directory {}", path.display());

    #[cfg(unix)]
    {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(path)
            .map_err(|err| Error::io(context(), err))?;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700)).map_err(|err| Error::io(context(), err))?;
    }

    #[cfg(not(unix))]
    fs::create_dir_all(path).map_err(|err| Error::io(context(), err))?;

    Ok(())
}
