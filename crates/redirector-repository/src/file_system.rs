//! File system backed backup store
//!
//! Layout: `<root>/<app>/<entity>.json`. Writes go to a temporary sibling
//! first and are renamed into place, so a crash never leaves a torn file.

use async_trait::async_trait;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{RepositoryError, RepositoryResult};
use crate::traits::{BackupEntity, BackupStore};

/// Backup store persisting documents under a root directory
#[derive(Debug, Clone)]
pub struct FileSystemBackupStore {
    root_path: PathBuf,
}

impl FileSystemBackupStore {
    /// Create a store rooted at `root_path`
    ///
    /// The directory is created lazily on the first save.
    ///
    /// # Example
    /// ```no_run
    /// use redirector_repository::FileSystemBackupStore;
    ///
    /// let store = FileSystemBackupStore::new("backup").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Config(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Path of the backup file for an entity
    pub fn entity_path(&self, app: &str, entity: BackupEntity) -> PathBuf {
        self.root_path
            .join(sanitize(app))
            .join(format!("{}.json", entity.key()))
    }

    async fn write(&self, app: &str, entity: BackupEntity, content: &str) -> RepositoryResult<()> {
        let target = self.entity_path(app, entity);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).await?;
        }
        let staging = target.with_extension("json.tmp");
        fs::write(&staging, content).await?;
        fs::rename(&staging, &target).await?;
        Ok(())
    }
}

/// Keep application names from escaping the root directory
fn sanitize(app: &str) -> String {
    app.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[async_trait]
impl BackupStore for FileSystemBackupStore {
    async fn save(&self, app: &str, entity: BackupEntity, content: &str) -> bool {
        match self.write(app, entity, content).await {
            Ok(()) => {
                tracing::debug!("Saved {} backup for '{}'", entity, app);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save {} backup for '{}': {}", entity, app, e);
                false
            }
        }
    }

    async fn load(&self, app: &str, entity: BackupEntity) -> Option<String> {
        let path = self.entity_path(app, entity);
        match fs::read_to_string(&path).await {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read backup {}: {}", path.display(), e);
                None
            }
        }
    }
}
