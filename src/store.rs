use std::fs;
use std::io::ErrorKind;

use crate::error::{Error, Result};
use crate::materialize;
use crate::paths::{Paths, PROFILE_EXTENSION};
use crate::profile::ServerRecord;

/// Server profiles, one JSON file per server named after it.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    paths: Paths,
}

impl ProfileStore {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    #[cfg(test)]
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Writes the whole record, replacing any stored version.
    pub fn save(&self, server: &ServerRecord) -> Result<()> {
        let path = self.paths.profile_path(&server.name)?;
        let content = serde_json::to_string_pretty(server)
            .map_err(|err| Error::InvalidInput(format!("serializing server {}: {}", server.name, err)))?;

        // rename keeps the previous record intact if the write fails midway
        let tmp_path = path.with_extension(format!("{}.tmp", PROFILE_EXTENSION));
        materialize::write_private(&tmp_path, content.as_bytes())?;
        fs::rename(&tmp_path, &path).map_err(|err| Error::io(format!("replacing {}", path.display()), err))?;

        tracing::debug!(
            server = %server.name,
            clients = server.clients.len(),
            path = %path.display(),
            "saved server profile"
        );
        Ok(())
    }

    /// Saves a new record, refusing to overwrite an existing one.
    pub fn create(&self, server: &ServerRecord) -> Result<()> {
        if self.exists(&server.name)? {
            return Err(Error::AlreadyExists(format!("server {}", server.name)));
        }
        self.save(server)
    }

    pub fn load(&self, name: &str) -> Result<ServerRecord> {
        let path = self.paths.profile_path(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("server {}", name)));
            }
            Err(err) => return Err(Error::io(format!("reading {}", path.display()), err)),
        };

        serde_json::from_str(&content).map_err(|err| Error::CorruptData {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    /// Stored server names in ascending order.
    pub fn list(&self) -> Result<Vec<String>> {
        let root = self.paths.profiles_root()?;
        let entries = fs::read_dir(&root).map_err(|err| Error::io(format!("reading {}", root.display()), err))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| Error::io(format!("reading {}", root.display()), err))?
                .path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Removes the profile and, best effort, the rendered server config.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.paths.profile_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => (),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("server {}", name)));
            }
            Err(err) => return Err(Error::io(format!("deleting {}", path.display()), err)),
        }

        if let Ok(runtime_path) = self.paths.server_runtime_config_path(name) {
            materialize::remove_runtime_file(&runtime_path);
        }

        tracing::info!(server = name, "deleted server profile");
        Ok(())
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        let path = self.paths.profile_path(name)?;
        match fs::metadata(&path) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Error::io(format!("checking {}", path.display()), err)),
        }
    }
}
