//! The print settings file read by the device on `applyprintsettings`.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::StagingError;

/// Fixed-location settings file, overwritten on every successful attempt.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file contents with `blob`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Io`] if the file cannot be written.
    pub async fn write(&self, blob: &[u8]) -> Result<(), StagingError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StagingError::io(parent, e))?;
        }
        tokio::fs::write(&self.path, blob)
            .await
            .map_err(|e| StagingError::io(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = blob.len(), "print settings written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_overwrites_previous_settings() {
        let temp = TempDir::new().unwrap();
        let settings = SettingsFile::new(temp.path().join("print_settings"));

        settings.write(br#"{"LayerThicknessMicrons": 25, "JobName": "long-old-name"}"#).await.unwrap();
        settings.write(br#"{"LayerThicknessMicrons": 50}"#).await.unwrap();

        assert_eq!(
            std::fs::read(settings.path()).unwrap(),
            br#"{"LayerThicknessMicrons": 50}"#
        );
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let settings = SettingsFile::new(temp.path().join("nested").join("print_settings"));

        settings.write(b"{}").await.unwrap();
        assert!(settings.path().exists());
    }
}
