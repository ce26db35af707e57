//! Backup store configuration
//!
//! Selects where model backups are kept: a directory on disk or process
//! memory (tests and demos).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{RepositoryError, RepositoryResult};
use crate::{BackupStore, FileSystemBackupStore, MemoryBackupStore};

/// Repository source type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositorySource {
    /// Persist under a base directory
    #[default]
    FileSystem,
    /// Keep in memory only
    Memory,
}

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use redirector_repository::RepositoryConfig;
///
/// // File system backups
/// let config = RepositoryConfig::file_system("backup");
///
/// // In-memory backups (for testing)
/// let config = RepositoryConfig::memory();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Configuration source type
    pub source: RepositorySource,

    /// File system base path (required for FileSystem source)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
}

impl RepositoryConfig {
    /// Create a file system repository configuration
    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            base_path: Some(path.into()),
        }
    }

    /// Create an in-memory repository configuration
    pub fn memory() -> Self {
        Self {
            source: RepositorySource::Memory,
            base_path: None,
        }
    }

    /// Check that the fields required by the source are present
    pub fn validate(&self) -> RepositoryResult<()> {
        match self.source {
            RepositorySource::FileSystem => match self.base_path.as_deref() {
                Some(path) if !path.trim().is_empty() => Ok(()),
                _ => Err(RepositoryError::Config(
                    "base_path required for FileSystem source".to_string(),
                )),
            },
            RepositorySource::Memory => Ok(()),
        }
    }

    /// Build the backup store described by this configuration
    pub fn build_backup_store(&self) -> RepositoryResult<Arc<dyn BackupStore>> {
        self.validate()?;
        match (&self.source, self.base_path.as_deref()) {
            (RepositorySource::FileSystem, Some(path)) => {
                Ok(Arc::new(FileSystemBackupStore::new(path)?))
            }
            (RepositorySource::FileSystem, None) => Err(RepositoryError::Config(
                "base_path required for FileSystem source".to_string(),
            )),
            (RepositorySource::Memory, _) => Ok(Arc::new(MemoryBackupStore::new())),
        }
    }
}
