//! Model metadata

use serde::{Deserialize, Serialize};

/// Version of the model last backed up or published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: i64,
}

impl ModelMetadata {
    pub fn new(version: i64) -> Self {
        Self { version }
    }

    /// True when this model is at or past `target`
    pub fn is_in_sync_with(&self, target: i64) -> bool {
        self.version >= target
    }
}
