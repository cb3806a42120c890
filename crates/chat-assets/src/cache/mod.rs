//! Time-bounded memoization of in-flight and completed lookups.
//!
//! The cached unit is a [`Memo`], a shared handle to an asynchronous
//! computation. Every caller asking for the same key before the entry
//! expires attaches to the same computation, so overlapping requests
//! resolve from a single upstream call. Failures are cached like
//! successes until the entry expires.

mod clock;
mod cull;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cull::CullTimer;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::AssetError;

/// Lifetime of entries added without an explicit TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A memoized asynchronous result that any number of callers can await.
pub type Memo<T> = Shared<BoxFuture<'static, Result<T, AssetError>>>;

/// Wrap a future so it can be stored in an [`ExpiringCache`].
pub fn memoize<T, Fut>(fut: Fut) -> Memo<T>
where
    T: Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, AssetError>> + Send + 'static,
{
    fut.boxed().shared()
}

/// How long an entry stays valid.
///
/// `For(Duration::ZERO)` means "do not cache": the value is handed back
/// to the caller without being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    For(Duration),
    Forever,
}

impl Ttl {
    pub const fn secs(secs: u64) -> Self {
        Self::For(Duration::from_secs(secs))
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Self::For(d)
    }
}

struct CacheEntry {
    /// `None` never expires.
    expires_at: Option<Instant>,
    value: Box<dyn Any + Send + Sync>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

struct CacheInner {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

/// Process-wide keyed store of memoized lookups.
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Clone)]
pub struct ExpiringCache {
    inner: Arc<CacheInner>,
}

impl ExpiringCache {
    /// Create a cache driven by the system clock.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                clock,
                default_ttl,
            }),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        match self.inner.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Look up a live entry. An expired entry is removed and reported absent.
    pub fn get<T>(&self, key: &str) -> Option<Memo<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.inner.clock.now();
        let mut entries = self.entries();
        lookup(&mut entries, key, now)
    }

    /// Store `value` under `key` for the default TTL, replacing any prior entry.
    pub fn add<T>(&self, key: impl Into<String>, value: Memo<T>) -> Memo<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.add_with_ttl(key, value, Ttl::For(self.inner.default_ttl))
    }

    /// Store `value` under `key` for `ttl`, replacing any prior entry.
    pub fn add_with_ttl<T>(&self, key: impl Into<String>, value: Memo<T>, ttl: Ttl) -> Memo<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.inner.clock.now();
        let mut entries = self.entries();
        store(&mut entries, key.into(), value.clone(), ttl, now);
        value
    }

    /// Return the live entry for `key`, or build one with `make` and store it.
    ///
    /// The lookup and the insert happen under one lock, so concurrent
    /// callers always share a single computation. `make` only constructs
    /// the future; it must not touch the cache itself.
    pub fn get_or_add<T, F, Fut>(&self, key: &str, ttl: Ttl, make: F) -> Memo<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AssetError>> + Send + 'static,
    {
        let now = self.inner.clock.now();
        let mut entries = self.entries();
        if let Some(memo) = lookup(&mut entries, key, now) {
            tracing::trace!(key, "Cache hit");
            return memo;
        }
        tracing::debug!(key, "Cache miss");
        let memo = memoize(make());
        store(&mut entries, key.to_string(), memo.clone(), ttl, now);
        memo
    }

    /// Remove every expired entry. Returns how many were dropped.
    pub fn cull(&self) -> usize {
        let now = self.inner.clock.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = entries.len(), "Culled expired cache entries");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet culled.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

fn lookup<T>(entries: &mut HashMap<String, CacheEntry>, key: &str, now: Instant) -> Option<Memo<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let entry = entries.get(key)?;
    if entry.is_expired(now) {
        entries.remove(key);
        tracing::trace!(key, "Cache entry expired");
        return None;
    }
    let memo = entry.value.downcast_ref::<Memo<T>>().cloned();
    if memo.is_none() {
        tracing::warn!(key, "Cache entry holds a different value type");
    }
    memo
}

fn store<T>(
    entries: &mut HashMap<String, CacheEntry>,
    key: String,
    value: Memo<T>,
    ttl: Ttl,
    now: Instant,
) where
    T: Clone + Send + Sync + 'static,
{
    let expires_at = match ttl {
        Ttl::Forever => None,
        Ttl::For(d) if d.is_zero() => {
            tracing::trace!(key, "Zero TTL, not caching");
            return;
        }
        Ttl::For(d) => Some(now + d),
    };
    entries.insert(
        key,
        CacheEntry {
            expires_at,
            value: Box::new(value),
        },
    );
}
