//! File provisioning.
//!
//! [`provide_file`] hands back a path that is guaranteed to exist, to be a
//! regular file, and to be readable and writable by this process. The parent
//! directory is created on demand. Existing files are reused as-is, so the
//! call is idempotent for a given `(directory, prefix, suffix)`.

use crate::error::ProvisionError;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use uuid::Uuid;

/// A fresh random prefix for a provisioned file name.
pub fn unique_prefix() -> String {
    Uuid::new_v4().to_string()
}

pub fn provide_file(dir: &Path, prefix: &str, suffix: &str) -> Result<PathBuf, ProvisionError> {
    let result = provide_file_inner(dir, prefix, suffix);
    if let Err(e) = &result {
        error!(dir = %dir.display(), "{}", e);
    }
    result
}

fn provide_file_inner(dir: &Path, prefix: &str, suffix: &str) -> Result<PathBuf, ProvisionError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| ProvisionError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        debug!(dir = %dir.display(), "created directory");
    }

    if !dir.is_dir() {
        return Err(ProvisionError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let file_name = format!("{}{}", prefix, suffix);
    if !is_plain_name(&file_name) {
        return Err(ProvisionError::InvalidName { name: file_name });
    }

    let path = dir.join(&file_name);
    if !path.exists() {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => debug!(path = %path.display(), "created file"),
            // Someone else created it between the check and the open.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(source) => return Err(ProvisionError::CreateFile { path, source }),
        }
    }

    if !path.is_file() {
        return Err(ProvisionError::NotAFile { path });
    }

    set_read_write(&path).map_err(|source| ProvisionError::Permissions {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

#[cfg(unix)]
fn set_read_write(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    let mode = perms.mode();
    if mode & 0o600 != 0o600 {
        perms.set_mode(mode | 0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_read_write(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}
