//! Runtime artefact paths shared by the client and the supervisor.
//!
//! The supervisor writes its lock, pid, and health snapshot next to its
//! socket. The client reads the health snapshot while waiting for a freshly
//! launched supervisor, so both sides derive the same layout from [`Config`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{Config, SocketEndpoint};

#[cfg(unix)]
use dirs::runtime_dir;

/// Canonical paths for runtime artefacts written by the supervisor.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    runtime_dir: PathBuf,
    lock_path: PathBuf,
    pid_path: PathBuf,
    health_path: PathBuf,
}

impl RuntimePaths {
    /// Derives runtime paths from the configuration, creating the directory.
    pub fn from_config(config: &Config) -> Result<Self, RuntimePathsError> {
        let runtime_dir = runtime_directory(config.supervisor_socket())?;
        fs::create_dir_all(&runtime_dir).map_err(|source| RuntimePathsError::RuntimeDirectory {
            path: runtime_dir.clone(),
            source,
        })?;
        Ok(Self {
            lock_path: runtime_dir.join("wardend.lock"),
            pid_path: runtime_dir.join("wardend.pid"),
            health_path: runtime_dir.join("wardend.health"),
            runtime_dir,
        })
    }

    /// Directory holding runtime artefacts.
    #[must_use]
    pub fn runtime_dir(&self) -> &Path {
        self.runtime_dir.as_path()
    }

    /// Lock file guarding singleton supervisor startup.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        self.lock_path.as_path()
    }

    /// Supervisor pid file.
    #[must_use]
    pub fn pid_path(&self) -> &Path {
        self.pid_path.as_path()
    }

    /// Supervisor health snapshot.
    #[must_use]
    pub fn health_path(&self) -> &Path {
        self.health_path.as_path()
    }
}

fn runtime_directory(endpoint: &SocketEndpoint) -> Result<PathBuf, RuntimePathsError> {
    match endpoint {
        SocketEndpoint::Unix { path } => path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .map(|parent| parent.as_std_path().to_path_buf())
            .ok_or_else(|| RuntimePathsError::MissingSocketParent {
                path: path.to_string(),
            }),
        SocketEndpoint::Tcp { .. } => Ok(default_runtime_directory()),
    }
}

#[cfg(unix)]
fn default_runtime_directory() -> PathBuf {
    if let Some(mut dir) = runtime_dir() {
        dir.push("warden");
        return dir;
    }
    let mut dir = env::temp_dir();
    dir.push("warden");
    dir.push(crate::defaults::user_namespace());
    dir
}

#[cfg(not(unix))]
fn default_runtime_directory() -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push("warden");
    dir
}

/// Errors raised while deriving supervisor runtime paths.
#[derive(Debug, Error)]
pub enum RuntimePathsError {
    /// The socket path lacked a parent directory.
    #[error("socket path '{path}' has no parent directory")]
    MissingSocketParent {
        /// Offending socket path.
        path: String,
    },
    /// Creating the runtime directory failed.
    #[error("failed to prepare runtime directory '{path}': {source}")]
    RuntimeDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}
