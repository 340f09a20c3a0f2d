#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula In-Process Execution Repository Driver
//!
//! Implements [`ExecutionRepo`] on top of `DashMap`s private to the
//! process. This is the fallback backend for C11 (the execution store) —
//! no Redis-like KV crate is wired into this workspace, so a durable
//! driver would be a separate crate behind the same port; this one is
//! what `nebula-api`/`apps/cli` run against today.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use nebula_core::ExecutionId;
use nebula_ports::{ExecutionRepo, PortsError};

struct Lease {
    holder: String,
    expires_at: Instant,
}

/// In-memory [`ExecutionRepo`]. State survives for the life of the process;
/// nothing is persisted across restarts, matching the teacher's
/// in-memory-first posture for ports with no configured durable backend.
#[derive(Default)]
pub struct InMemoryExecutionRepo {
    states: DashMap<ExecutionId, (u64, serde_json::Value)>,
    journals: DashMap<ExecutionId, Vec<serde_json::Value>>,
    leases: DashMap<ExecutionId, Lease>,
}

impl InMemoryExecutionRepo {
    /// Construct an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lease_live(lease: &Lease) -> bool {
        lease.expires_at > Instant::now()
    }
}

#[async_trait]
impl ExecutionRepo for InMemoryExecutionRepo {
    async fn get_state(
        &self,
        id: ExecutionId,
    ) -> Result<Option<(u64, serde_json::Value)>, PortsError> {
        Ok(self.states.get(&id).map(|e| e.value().clone()))
    }

    async fn transition(
        &self,
        id: ExecutionId,
        expected_version: u64,
        new_state: serde_json::Value,
    ) -> Result<bool, PortsError> {
        match self.states.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                let (current_version, _) = occupied.get();
                if *current_version != expected_version {
                    return Ok(false);
                }
                occupied.insert((expected_version + 1, new_state));
                Ok(true)
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                if expected_version != 0 {
                    return Ok(false);
                }
                vacant.insert((1, new_state));
                Ok(true)
            }
        }
    }

    async fn get_journal(&self, id: ExecutionId) -> Result<Vec<serde_json::Value>, PortsError> {
        Ok(self.journals.get(&id).map(|e| e.value().clone()).unwrap_or_default())
    }

    async fn append_journal(
        &self,
        id: ExecutionId,
        entry: serde_json::Value,
    ) -> Result<(), PortsError> {
        self.journals.entry(id).or_default().push(entry);
        Ok(())
    }

    async fn acquire_lease(
        &self,
        id: ExecutionId,
        holder: String,
        ttl: Duration,
    ) -> Result<bool, PortsError> {
        match self.leases.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                if Self::lease_live(occupied.get()) && occupied.get().holder != holder {
                    return Ok(false);
                }
                occupied.insert(Lease { holder, expires_at: Instant::now() + ttl });
                Ok(true)
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Lease { holder, expires_at: Instant::now() + ttl });
                Ok(true)
            }
        }
    }

    async fn renew_lease(
        &self,
        id: ExecutionId,
        holder: &str,
        ttl: Duration,
    ) -> Result<bool, PortsError> {
        let Some(mut lease) = self.leases.get_mut(&id) else {
            return Ok(false);
        };
        if lease.holder != holder || !Self::lease_live(&lease) {
            return Ok(false);
        }
        lease.expires_at = Instant::now() + ttl;
        Ok(true)
    }

    async fn release_lease(&self, id: ExecutionId, holder: &str) -> Result<bool, PortsError> {
        let Some(lease) = self.leases.get(&id) else {
            return Ok(false);
        };
        if lease.holder != holder {
            return Ok(false);
        }
        drop(lease);
        self.leases.remove(&id);
        Ok(true)
    }
}
