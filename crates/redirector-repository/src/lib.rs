//! Model sources and durable backups for the Redirector
//!
//! This crate provides the seams through which the model pipeline reaches
//! the outside world, plus reference implementations of each.
//!
//! # Features
//!
//! - **Rule sources**: versioned raw rule documents from the control plane
//!   ([`MemoryRuleSource`]) or from the local backup ([`BackupRuleSource`])
//! - **Backup stores**: durable per-app persistence on disk
//!   ([`FileSystemBackupStore`]) or in memory ([`MemoryBackupStore`])
//! - **Stacks suppliers**: host topology from a static table
//!   ([`StaticStacksSupplier`]) or from the backup ([`BackupStacksSupplier`])
//!
//! # Quick Start
//!
//! ```no_run
//! use redirector_repository::{BackupEntity, BackupRuleSource, BackupStore, RuleSource,
//!     FileSystemBackupStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(FileSystemBackupStore::new("backup")?);
//!     store.save("xre", BackupEntity::Whitelist, r#"{"paths":["/dc1/zone1"],"version":1}"#).await;
//!
//!     let source = BackupRuleSource::new(store);
//!     let whitelist = source.whitelist("xre").await?;
//!     println!("Whitelist: {}", whitelist);
//!     Ok(())
//! }
//! ```

pub mod backup_source;
pub mod config;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod traits;

pub use backup_source::{BackupRuleSource, BackupStacksSupplier};
pub use config::{RepositoryConfig, RepositorySource};
pub use error::{RepositoryError, RepositoryResult};
pub use file_system::FileSystemBackupStore;
pub use memory::{MemoryBackupStore, MemoryRuleSource, StaticStacksSupplier};
pub use traits::{BackupEntity, BackupStore, RuleSource, StacksSupplier, SHARED_SCOPE};
