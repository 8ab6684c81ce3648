// snowai-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with `AlreadyExists` if the target is present.
    CreateNew,
    Overwrite,
}

/// Writes `content` to `path` through a temporary file in the same directory.
///
/// The target is either fully written or left untouched. Missing parent
/// directories are created.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
    mode: WriteMode,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.flush()?;

    match mode {
        WriteMode::Overwrite => temp_file.persist(path).map_err(|e| e.error)?,
        WriteMode::CreateNew => temp_file.persist_noclobber(path).map_err(|e| e.error)?,
    };

    debug!(path = ?path, "File written");
    Ok(())
}
