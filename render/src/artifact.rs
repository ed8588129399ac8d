use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::RenderError;

/// Replace the file at `path` with `bytes` so readers only ever see a complete file.
///
/// The payload goes to `<path>.tmp` first and is then renamed over `path`.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| fs_error("create_dir", parent, e))?;
    }

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| fs_error("write_artifact", &tmp, e))?;

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            warn!(path = tmp.display().to_string(), error = %cleanup, "failed to remove temp artifact");
        }
        return Err(fs_error("replace_artifact", path, e));
    }

    info!(path = path.display().to_string(), bytes = bytes.len(), "artifact written");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn fs_error(op: &'static str, path: &Path, source: std::io::Error) -> RenderError {
    RenderError::Filesystem {
        op,
        path: path.display().to_string(),
        source,
    }
}
