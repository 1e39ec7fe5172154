//! Document loading helpers.

use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::LoadError;

/// Read a UTF-8 text document.
///
/// A missing file maps to [`LoadError::NotFound`]; any other IO failure to
/// [`LoadError::Io`].
pub fn read_text(path: &Path) -> Result<String, LoadError> {
    tracing::debug!(path = %path.display(), "reading document");
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::InvalidData => LoadError::malformed(path, format!("not valid UTF-8: {e}")),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Read and parse a JSON document.
pub fn read_json(path: &Path) -> Result<Value, LoadError> {
    let content = read_text(path)?;
    serde_json::from_str(&content)
        .map_err(|e| LoadError::malformed(path, format!("invalid JSON: {e}")))
}

/// Read a JSON document and deserialize it into `T`.
pub fn read_json_as<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = read_text(path)?;
    serde_json::from_str(&content)
        .map_err(|e| LoadError::malformed(path, format!("unexpected document shape: {e}")))
}
