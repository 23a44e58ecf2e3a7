//! Scoped kubeconfig copy.
//!
//! Every run works on a private temporary copy of the operator's kubeconfig so
//! that `kubectl` writes (token refreshes, context switches) from concurrent or
//! crashed runs never land in the real file.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempPath;

use crate::application::ports::ProgressReporter;
use crate::domain::error::CredentialError;

const TEMP_PREFIX: &str = "testpod-kubeconfig-";
const TEMP_SUFFIX: &str = ".yaml";

/// Find the kubeconfig to copy.
///
/// `configured` is the `--kubeconfig` value (populated from `$KUBECONFIG` by
/// the CLI) and may be a path list; its first existing entry wins. When it is
/// unset or none of its entries exist, `<home>/.kube/config` is used.
///
/// # Errors
///
/// Returns [`CredentialError::NotFound`] when no candidate exists.
pub fn locate(configured: Option<&OsStr>, home: Option<&Path>) -> Result<PathBuf> {
    configured
        .filter(|v| !v.is_empty())
        .and_then(|value| std::env::split_paths(value).find(|p| p.is_file()))
        .or_else(|| {
            home.map(|h| h.join(".kube").join("config"))
                .filter(|p| p.is_file())
        })
        .ok_or_else(|| CredentialError::NotFound.into())
}

/// A temporary kubeconfig file removed on [`ScopedKubeconfig::close`] or drop.
#[derive(Debug)]
pub struct ScopedKubeconfig {
    file: TempPath,
}

impl ScopedKubeconfig {
    /// Copy `source` into a fresh owner-only temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Io`] if the source cannot be read or the
    /// copy cannot be written.
    pub fn create(source: &Path) -> Result<Self> {
        let contents = std::fs::read(source).map_err(|e| CredentialError::Io {
            action: "read",
            path: source.to_path_buf(),
            source: e,
        })?;

        let temp_dir = std::env::temp_dir();
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile()
            .map_err(|e| CredentialError::Io {
                action: "create a temporary file in",
                path: temp_dir.clone(),
                source: e,
            })?;

        // tempfile creates 0600 files on unix.
        file.write_all(&contents)
            .and_then(|()| file.flush())
            .map_err(|e| CredentialError::Io {
                action: "write",
                path: file.path().to_path_buf(),
                source: e,
            })?;

        let file = file.into_temp_path();
        tracing::debug!(source = %source.display(), copy = %file.display(), "scoped kubeconfig");
        Ok(Self { file })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Delete the copy. Failure is reported as a warning only.
    pub fn close(self, reporter: &impl ProgressReporter) {
        let path = self.file.to_path_buf();
        if let Err(e) = self.file.close() {
            reporter.warn(&format!(
                "Failed to remove temporary kubeconfig {}: {e}",
                path.display()
            ));
        }
    }
}
