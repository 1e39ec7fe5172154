//! # Load Errors
//!
//! The only fatal error class of the checker. A document that cannot be
//! found or parsed means the environment is broken (wrong root, typo in a
//! path, hand-edited JSON), so the run aborts instead of reporting it as a
//! finding. There is no retry.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A contract, fixture, or log document could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No document exists at the expected location.
    #[error("document not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The document exists but is not well-formed for its purpose.
    #[error("malformed document '{}': {reason}", path.display())]
    Malformed {
        /// Path (or source label) of the document.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Any other IO failure while reading the document.
    #[error("io error reading '{}': {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Build a [`LoadError::Malformed`] for `path`.
    pub fn malformed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// The path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Malformed { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_path() {
        let err = LoadError::NotFound {
            path: PathBuf::from("contracts/reason_codes.json"),
        };
        assert_eq!(
            err.to_string(),
            "document not found: contracts/reason_codes.json"
        );
    }

    #[test]
    fn malformed_display_includes_reason() {
        let err = LoadError::malformed("fixtures/lifecycle.ndjson", "line 3: expected value");
        let display = err.to_string();
        assert!(display.contains("fixtures/lifecycle.ndjson"));
        assert!(display.contains("line 3: expected value"));
        assert_eq!(err.path(), Path::new("fixtures/lifecycle.ndjson"));
    }
}
