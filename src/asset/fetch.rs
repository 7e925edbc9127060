//! Async asset reads.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::InlineError;

/// Resolve a `src` value against the asset root.
///
/// Absolute `src` values replace the root, as `Path::join` does.
#[inline]
pub fn resolve_path(root: &Path, src: &str) -> PathBuf {
    root.join(src)
}

/// Read a UTF-8 asset.
pub async fn read_text(path: &Path) -> Result<String, InlineError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InlineError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Read a binary asset.
pub async fn read_bytes(path: &Path) -> Result<Vec<u8>, InlineError> {
    tokio::fs::read(path).await.map_err(|source| InlineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Build `data:image/png;base64,...` from raw PNG bytes.
pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(bytes))
}
