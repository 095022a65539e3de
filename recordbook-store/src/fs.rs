//! All-or-nothing file replacement.
//!
//! Every write goes to a temporary file in the target's directory and is
//! renamed over the target once flushed, so readers see either the old file
//! or the complete new one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

use crate::{StoreError, StoreResult};

/// Replaces `path` with whatever `write` produces.
///
/// An existing target keeps its permissions. A new one gets the mode a
/// plain create would give it (0666 less the umask on Unix).
/// A read-only target is refused even where the platform would let a rename
/// replace it.
pub(crate) fn write_atomic<F>(path: &Path, operation: &'static str, write: F) -> StoreResult<()>
where
    F: FnOnce(&mut File) -> StoreResult<()>,
{
    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());
    if existing.as_ref().is_some_and(|perms| perms.readonly()) {
        return Err(StoreError::persistence(
            operation,
            path,
            io::Error::new(io::ErrorKind::PermissionDenied, "file is read-only"),
        ));
    }

    let mut builder = Builder::new();
    if existing.is_none() {
        default_permissions(&mut builder);
    }
    let mut tmp = builder
        .tempfile_in(parent_dir(path))
        .map_err(|e| StoreError::persistence(operation, path, e))?;
    if let Some(perms) = existing {
        // Set after creation so the umask does not narrow the copied mode.
        tmp.as_file()
            .set_permissions(perms)
            .map_err(|e| StoreError::persistence(operation, path, e))?;
    }

    write(tmp.as_file_mut())?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::persistence(operation, path, e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::persistence(operation, path, e.error))?;
    Ok(())
}

/// Copies `src` over `dst` byte for byte.
pub(crate) fn copy_atomic(src: &Path, dst: &Path, operation: &'static str) -> StoreResult<()> {
    let bytes = read_bytes(src, operation)?;
    write_atomic(dst, operation, |file| {
        file.write_all(&bytes)
            .map_err(|e| StoreError::persistence(operation, dst, e))
    })
}

/// Reads a whole file, reporting a missing file as [`StoreError::FileNotFound`].
pub(crate) fn read_bytes(path: &Path, operation: &'static str) -> StoreResult<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => StoreError::persistence(operation, path, e),
    })
}

/// `true` if `path` exists; errors probing it (e.g. an unreadable parent
/// directory) are persistence errors rather than "absent".
pub(crate) fn exists(path: &Path, operation: &'static str) -> StoreResult<bool> {
    path.try_exists()
        .map_err(|e| StoreError::persistence(operation, path, e))
}

#[cfg(unix)]
fn default_permissions(builder: &mut Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;
    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn default_permissions(_builder: &mut Builder<'_, '_>) {}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
