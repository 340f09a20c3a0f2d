//! Resource pool — generic pool integrated with the `Resource` trait.
//!
//! `Pool<R>` calls `R::create`, `R::is_valid`, `R::recycle` and `R::cleanup`
//! directly, removing the need for closure factories.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::guard::Guard;
use crate::resource::Resource;

// ---------------------------------------------------------------------------
// PoolConfig
// ---------------------------------------------------------------------------

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for resource pooling
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfig {
    /// Minimum number of resources in the pool
    pub min_size: usize,
    /// Maximum number of resources in the pool
    pub max_size: usize,
    /// Timeout for acquiring a resource from the pool
    pub acquire_timeout: Duration,
    /// Time after which idle resources are removed
    pub idle_timeout: Duration,
    /// Maximum lifetime of a resource
    pub max_lifetime: Duration,
    /// Interval for validation/health checks
    pub validation_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 10,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(3600),
            validation_interval: Duration::from_secs(30),
        }
    }
}

impl PoolConfig {
    /// Validate pool configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::configuration("max_size must be greater than 0"));
        }
        if self.min_size > self.max_size {
            return Err(Error::configuration(format!(
                "min_size ({}) must not exceed max_size ({})",
                self.min_size, self.max_size
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(Error::configuration(
                "acquire_timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pool internals
// ---------------------------------------------------------------------------

/// A pool entry wrapping a resource instance.
struct Entry<T> {
    instance: T,
    created_at: Instant,
    last_used: Instant,
}

impl<T> Entry<T> {
    fn new(instance: T) -> Self {
        let now = Instant::now();
        Self {
            instance,
            created_at: now,
            last_used: now,
        }
    }

    /// Return an entry to the pool, preserving the original `created_at`.
    fn returned(instance: T, created_at: Instant) -> Self {
        Self {
            instance,
            created_at,
            last_used: Instant::now(),
        }
    }

    fn is_expired(&self, config: &PoolConfig) -> bool {
        self.created_at.elapsed() > config.max_lifetime
            || self.last_used.elapsed() > config.idle_timeout
    }
}

/// Pool statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Total successful acquisitions.
    pub total_acquisitions: u64,
    /// Total releases back to pool.
    pub total_releases: u64,
    /// Current number of instances checked out.
    pub active: usize,
    /// Current number of idle instances in pool.
    pub idle: usize,
    /// Total instances ever created.
    pub created: u64,
    /// Total instances ever destroyed.
    pub destroyed: u64,
}

/// Combined pool state: idle queue + statistics under a single lock.
struct PoolState<T> {
    idle: VecDeque<Entry<T>>,
    stats: PoolStats,
    /// Set to true after `shutdown()` to prevent Guard drops from
    /// reinserting instances into the idle queue.
    shutdown: bool,
}

/// Inner shared state for the pool.
struct PoolInner<R: Resource> {
    resource: Arc<R>,
    config: R::Config,
    pool_config: PoolConfig,
    state: Mutex<PoolState<R::Instance>>,
    /// Semaphore limits concurrent active (checked-out) instances.
    /// Idle instances do not hold permits.
    semaphore: Semaphore,
}

// ---------------------------------------------------------------------------
// Pool<R>
// ---------------------------------------------------------------------------

/// Generic resource pool.
///
/// Manages a bounded set of `R::Instance` objects, creating, validating,
/// recycling and cleaning them up via the `Resource` trait.
pub struct Pool<R: Resource> {
    inner: Arc<PoolInner<R>>,
}

impl<R: Resource> Clone for Pool<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> std::fmt::Debug for Pool<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.inner.state.lock().stats.clone();
        f.debug_struct("Pool")
            .field("resource_id", &self.inner.resource.id())
            .field("stats", &stats)
            .finish()
    }
}

impl<R: Resource> Pool<R> {
    /// Create a new pool for the given resource, config, and pool settings.
    ///
    /// # Errors
    /// Returns error if `pool_config` is invalid (e.g. max_size == 0).
    pub fn new(resource: R, config: R::Config, pool_config: PoolConfig) -> Result<Self> {
        pool_config.validate()?;
        let max = pool_config.max_size;

        #[cfg(feature = "tracing")]
        tracing::debug!(
             resource_id = %resource.id(),
             min_size = pool_config.min_size,
             max_size = pool_config.max_size,
             "Created new resource pool"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                resource: Arc::new(resource),
                config,
                pool_config,
                state: Mutex::new(PoolState {
                    idle: VecDeque::with_capacity(max),
                    stats: PoolStats::default(),
                    shutdown: false,
                }),
                semaphore: Semaphore::new(max),
            }),
        })
    }

    /// Acquire a resource instance from the pool.
    ///
    /// Returns an RAII `Guard` that returns the instance to the pool
    /// when dropped. Respects `ctx.cancellation` — if the token is
    /// cancelled while waiting, returns `Error::Unavailable` immediately.
    pub async fn acquire(&self, ctx: &Context) -> Result<Guard<R::Instance>> {
        tokio::select! {
            result = self.acquire_inner(ctx) => result,
            () = ctx.cancellation.cancelled() => {
                Err(Error::Unavailable {
                    resource_id: self.inner.resource.id().to_string(),
                    reason: "Operation cancelled".to_string(),
                    retryable: false,
                })
            }
        }
    }

    /// Inner acquire logic, separated so `acquire` can wrap it in a
    /// cancellation-aware `select!`.
    async fn acquire_inner(&self, ctx: &Context) -> Result<Guard<R::Instance>> {
        let inner = &self.inner;

        // Acquire a permit (limits concurrent active instances)
        let permit =
            tokio::time::timeout(inner.pool_config.acquire_timeout, inner.semaphore.acquire())
                .await
                .map_err(|_| {
                    let state = inner.state.lock();
                    Error::PoolExhausted {
                        resource_id: inner.resource.id().to_string(),
                        current_size: state.stats.active,
                        max_size: inner.pool_config.max_size,
                        waiters: 0,
                    }
                })?
                .map_err(|_| Error::Internal {
                    resource_id: inner.resource.id().to_string(),
                    message: "Pool semaphore closed".to_string(),
                    source: None,
                })?;

        // Try to get an idle instance, tracking created_at for recycled entries.
        let (instance, created_at) = loop {
            let entry = { inner.state.lock().idle.pop_front() };
            match entry {
                Some(entry) if entry.is_expired(&inner.pool_config) => {
                    // Expired — clean up and try next
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Destroying expired resource instance");
                    let _ = inner.resource.cleanup(entry.instance).await;
                    inner.state.lock().stats.destroyed += 1;
                    // Don't add permit back — we'll create a new instance below if needed
                    continue;
                }
                Some(entry) => {
                    // Validate
                    let created_at = entry.created_at;
                    match inner.resource.is_valid(&entry.instance).await {
                        Ok(true) => break (entry.instance, Some(created_at)),
                        _ => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!("Destroying invalid resource instance");
                            let _ = inner.resource.cleanup(entry.instance).await;
                            inner.state.lock().stats.destroyed += 1;
                            continue;
                        }
                    }
                }
                None => {
                    // No idle instances — create new
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Creating new resource instance");
                    let instance = inner.resource.create(&inner.config, ctx).await?;
                    inner.state.lock().stats.created += 1;
                    break (instance, None);
                }
            }
        };

        {
            let mut state = inner.state.lock();
            state.stats.total_acquisitions += 1;
            state.stats.active += 1;
            state.stats.idle = state.idle.len();
        }

        // Forget the permit — we'll add it back when the guard drops.
        permit.forget();

        let pool = self.clone();
        Ok(Guard::new(instance, move |mut inst| {
            // Return instance to pool on drop.
            // We run recycle + return synchronously-ish by spawning a task.
            drop(tokio::spawn(async move {
                let inner = &pool.inner;
                // Try to recycle
                let keep = inner.resource.recycle(&mut inst).await.is_ok();

                if keep && !inner.state.lock().shutdown {
                    let entry = match created_at {
                        Some(ca) => Entry::returned(inst, ca),
                        None => Entry::new(inst),
                    };
                    inner.state.lock().idle.push_back(entry);
                } else {
                    let _ = inner.resource.cleanup(inst).await;
                    inner.state.lock().stats.destroyed += 1;
                }

                {
                    let mut state = inner.state.lock();
                    state.stats.total_releases += 1;
                    state.stats.active = state.stats.active.saturating_sub(1);
                    state.stats.idle = state.idle.len();
                }

                // Return the permit
                inner.semaphore.add_permits(1);
            }));
        }))
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.inner.state.lock().stats.clone()
    }

    /// Run maintenance: evict expired idle instances, ensure min_size.
    pub async fn maintain(&self, ctx: &Context) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(resource_id = %self.inner.resource.id(), "Running pool maintenance");

        let inner = &self.inner;

        // Evict expired idle entries
        let mut to_cleanup = Vec::new();
        {
            let mut state = inner.state.lock();
            let before = state.idle.len();
            let mut kept = VecDeque::with_capacity(state.idle.len());
            while let Some(entry) = state.idle.pop_front() {
                if entry.is_expired(&inner.pool_config) {
                    to_cleanup.push(entry.instance);
                } else {
                    kept.push_back(entry);
                }
            }
            state.idle = kept;
            let removed = before - state.idle.len();
            if removed > 0 {
                state.stats.destroyed += removed as u64;
            }
        }

        for inst in to_cleanup {
            let _ = inner.resource.cleanup(inst).await;
        }

        // Ensure min_size
        let (current_idle, current_active) = {
            let state = inner.state.lock();
            (state.idle.len(), state.stats.active)
        };
        let total = current_idle + current_active;
        if total < inner.pool_config.min_size {
            let needed = inner.pool_config.min_size - total;
            for _ in 0..needed {
                match inner.resource.create(&inner.config, ctx).await {
                    Ok(instance) => {
                        let mut state = inner.state.lock();
                        state.idle.push_back(Entry::new(instance));
                        state.stats.created += 1;
                    }
                    Err(_) => break,
                }
            }
        }

        // Sync idle count
        let mut state = inner.state.lock();
        state.stats.idle = state.idle.len();

        Ok(())
    }

    /// Shut down the pool, cleaning up all idle instances.
    ///
    /// After shutdown:
    /// - New `acquire()` calls fail immediately (semaphore is closed).
    /// - Any `Guard` dropped will clean up its instance instead of
    ///   returning it to the idle queue.
    pub async fn shutdown(&self) -> Result<()> {
        let inner = &self.inner;

        // Close the semaphore so new acquire() calls fail immediately
        // instead of blocking until timeout.
        inner.semaphore.close();

        let entries: Vec<_> = {
            let mut state = inner.state.lock();
            state.shutdown = true;
            state.idle.drain(..).collect()
        };

        for entry in entries {
            let _ = inner.resource.cleanup(entry.instance).await;
            inner.state.lock().stats.destroyed += 1;
        }

        inner.state.lock().stats.idle = 0;
        Ok(())
    }
}
