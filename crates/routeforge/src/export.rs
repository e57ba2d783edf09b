//! Writing `api.json`

use routeforge_core::Api;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize the api description: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write the pretty-printed export of `api` to `path`, creating parent
/// directories as needed
pub async fn write_export(api: &Api, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let export = api.export();
    let json = export.to_json_pretty()?;

    let write_error = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(path, json).await.map_err(write_error)?;

    info!(
        path = %path.display(),
        endpoints = export.endpoints().count(),
        "api description written"
    );
    Ok(())
}
