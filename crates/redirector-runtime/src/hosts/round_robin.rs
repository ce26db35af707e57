//! Round-robin host pool built from a stacks snapshot

use super::{HostPool, LookupMode};
use redirector_core::{HostAddress, InstanceInfo, Server, StackPath, StacksSnapshot, WhiteList};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct PoolStack {
    path: StackPath,
    raw_path: String,
    hosts: Vec<HostAddress>,
    whitelisted: bool,
}

/// Host pool cycling through eligible hosts in order
///
/// Built once per model; the whitelist is applied at construction.
#[derive(Debug)]
pub struct RoundRobinHostPool {
    stacks: Vec<PoolStack>,
    cursor: AtomicUsize,
}

impl RoundRobinHostPool {
    pub fn new(snapshot: &StacksSnapshot, whitelist: &WhiteList) -> Self {
        let stacks = snapshot
            .stacks
            .iter()
            .filter_map(|stack| match StackPath::parse(&stack.path) {
                Ok(path) => Some(PoolStack {
                    whitelisted: whitelist.contains_prefix(&path.prefix()),
                    path,
                    raw_path: stack.path.clone(),
                    hosts: stack.hosts.clone(),
                }),
                Err(e) => {
                    tracing::warn!("Skipping stack: {}", e);
                    None
                }
            })
            .collect();

        Self {
            stacks,
            cursor: AtomicUsize::new(0),
        }
    }

    fn eligible<'a>(&'a self, path: &'a str, mode: LookupMode) -> Vec<&'a PoolStack> {
        let matching = self
            .stacks
            .iter()
            .filter(move |stack| !stack.hosts.is_empty() && stack.path.matches_server_path(path));

        match mode {
            LookupMode::NonFiltered => matching.collect(),
            LookupMode::Default | LookupMode::WhitelistOnly => {
                matching.filter(|stack| stack.whitelisted).collect()
            }
            LookupMode::DefaultNonWhitelisted => {
                let (whitelisted, other): (Vec<_>, Vec<_>) =
                    matching.partition(|stack| stack.whitelisted);
                if whitelisted.is_empty() && !path.starts_with('/') {
                    other
                } else {
                    whitelisted
                }
            }
        }
    }
}

impl HostPool for RoundRobinHostPool {
    fn pick_instance(&self, server: &Server, mode: LookupMode) -> Option<InstanceInfo> {
        let candidates: Vec<(&PoolStack, &HostAddress)> = self
            .eligible(&server.path, mode)
            .into_iter()
            .flat_map(|stack| stack.hosts.iter().map(move |host| (stack, host)))
            .collect();

        if candidates.is_empty() {
            tracing::debug!("No hosts for '{}' in mode {:?}", server.path, mode);
            return None;
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
        let (stack, host) = candidates[index];
        Some(InstanceInfo::from_host(server.clone(), stack.raw_path.clone(), host))
    }

    fn count_hosts_for_path(&self, path: &str) -> usize {
        self.stacks
            .iter()
            .filter(|stack| stack.path.matches_server_path(path))
            .map(|stack| stack.hosts.len())
            .sum()
    }

    fn count_eligible_hosts(&self, path: &str, mode: LookupMode) -> usize {
        self.eligible(path, mode)
            .iter()
            .map(|stack| stack.hosts.len())
            .sum()
    }

    fn host_count(&self) -> usize {
        self.stacks.iter().map(|stack| stack.hosts.len()).sum()
    }
}
