//! Host pools
//!
//! A host pool resolves a server to a concrete host. Lookups are filtered
//! against the whitelist according to a [`LookupMode`].

mod round_robin;

pub use round_robin::RoundRobinHostPool;

use redirector_core::{InstanceInfo, Server};

/// Whitelist filtering applied to a host lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupMode {
    /// Whitelisted stacks only
    Default,
    /// Whitelisted stacks first; a bare flavor may spill to other stacks
    DefaultNonWhitelisted,
    /// Every stack
    NonFiltered,
    /// Whitelisted stacks only, never spilling
    WhitelistOnly,
}

/// Source of hosts for redirect decisions
pub trait HostPool: Send + Sync {
    /// Pick a host for `server`, or `None` when no eligible host exists
    fn pick_instance(&self, server: &Server, mode: LookupMode) -> Option<InstanceInfo>;

    /// Number of hosts registered under `path`, ignoring the whitelist
    fn count_hosts_for_path(&self, path: &str) -> usize;

    /// Number of hosts `pick_instance` could choose from for `path`
    fn count_eligible_hosts(&self, path: &str, mode: LookupMode) -> usize;

    /// Total number of registered hosts
    fn host_count(&self) -> usize;
}
