//! Path sandbox for tools that touch the file system.
//!
//! Every path argument a tool receives goes through [`resolve_path`] before
//! any file operation runs. Resolution canonicalizes the path (so `..`
//! segments cannot escape) and, when a root directory is configured, rejects
//! anything that lands outside it.

use std::io;
use std::path::{Path, PathBuf};

use crate::core::config::SecurityConfig;

/// Errors produced while resolving a tool-supplied path.
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("path '{path}' is outside the allowed root directory '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("symlink '{path}' is not permitted by the sandbox configuration")]
    SymlinkRejected { path: PathBuf },

    #[error("path does not exist: '{path}'")]
    NotFound { path: PathBuf },

    #[error("cannot resolve path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolve a tool-supplied path against the sandbox configuration.
///
/// Returns the canonical path on success. The path must exist; symlinks are
/// refused outright when `allow_symlinks` is false (their targets could only
/// be re-checked racily otherwise).
pub fn resolve_path(input: &str, security: &SecurityConfig) -> Result<PathBuf, PathSecurityError> {
    let path = Path::new(input);

    if !path.exists() {
        return Err(PathSecurityError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_symlink() && !security.allow_symlinks {
        return Err(PathSecurityError::SymlinkRejected {
            path: path.to_path_buf(),
        });
    }

    let canonical = path.canonicalize().map_err(|source| PathSecurityError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(root) = &security.root_path {
        let canonical_root = root.canonicalize().map_err(|source| PathSecurityError::Io {
            path: root.clone(),
            source,
        })?;

        if !canonical.starts_with(&canonical_root) {
            return Err(PathSecurityError::OutsideRoot {
                path: canonical,
                root: canonical_root,
            });
        }
    }

    Ok(canonical)
}
