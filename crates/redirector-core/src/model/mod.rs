//! Model types consumed by the decision engine
//!
//! - Whitelists of stack prefixes
//! - Namespaced lists with their derived IP range view
//! - Stack paths, stack data and host snapshots
//! - Model metadata and per-request decision results

pub mod instance;
pub mod metadata;
pub mod namespaced;
pub mod stack;
pub mod whitelist;

pub use instance::InstanceInfo;
pub use metadata::ModelMetadata;
pub use namespaced::{NamespacedList, NamespacedLists};
pub use stack::{HostAddress, StackData, StackPath, StacksSnapshot};
pub use whitelist::WhiteList;
