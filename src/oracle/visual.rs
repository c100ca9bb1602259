use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use super::retry::{retry, RetryPolicy};
use super::{OracleError, VisualOracle};

fn cache_key(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Fixed set of drawable words, one per line in its file form
#[derive(Debug, Clone, Default)]
pub struct VisualWordList {
    words: HashSet<String>,
}

impl VisualWordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| cache_key(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Load a newline-delimited word list; blank lines and `#` comments are skipped
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read visual word list {}", path.display()))?;
        let list = Self::new(
            content
                .lines()
                .filter(|line| !line.trim_start().starts_with('#')),
        );
        info!(path = %path.display(), words = list.len(), "Loaded visual word list");
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[async_trait]
impl VisualOracle for VisualWordList {
    async fn is_visual(&self, token: &str) -> Result<bool, OracleError> {
        Ok(self.words.contains(&cache_key(token)))
    }
}

type Lookup = Shared<BoxFuture<'static, Result<bool, OracleError>>>;

enum Slot {
    Settled(bool),
    /// Lookup in flight; `id` tells it apart from a later lookup of the same key
    Pending { id: u64, lookup: Lookup },
}

enum Found {
    Cached(bool),
    Wait(Lookup),
}

type Slots = Arc<Mutex<HashMap<String, Slot>>>;

fn lock_slots(slots: &Mutex<HashMap<String, Slot>>) -> MutexGuard<'_, HashMap<String, Slot>> {
    // a panic while holding the lock cannot leave the map half-updated
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record the outcome of lookup `id` unless the key was cleared or replaced meanwhile.
/// Only verdicts are kept; failures free the key for the next caller.
fn settle(slots: &Mutex<HashMap<String, Slot>>, key: &str, id: u64, outcome: &Result<bool, OracleError>) {
    let mut slots = lock_slots(slots);
    let current = matches!(slots.get(key), Some(Slot::Pending { id: pending, .. }) if *pending == id);
    if !current {
        return;
    }
    match outcome {
        Ok(verdict) => {
            slots.insert(key.to_string(), Slot::Settled(*verdict));
        }
        Err(_) => {
            slots.remove(key);
        }
    }
}

/// Memoizing, retrying wrapper around a visual oracle.
///
/// Concurrent callers asking about the same word share one lookup, including its
/// retries, and all of them see its outcome. Transient failures are retried under
/// the [`RetryPolicy`]; once the budget is spent the word is reported as not visual
/// and left uncached so a later scan can ask again. Fatal errors propagate.
pub struct CachedVisualOracle<V> {
    inner: Arc<V>,
    policy: RetryPolicy,
    slots: Slots,
    next_id: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: VisualOracle + 'static> CachedVisualOracle<V> {
    pub fn new(inner: V, policy: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(inner),
            policy,
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_default_policy(inner: V) -> Self {
        Self::new(inner, RetryPolicy::default())
    }

    /// Number of words with a settled verdict
    pub fn len(&self) -> usize {
        lock_slots(&self.slots)
            .values()
            .filter(|slot| matches!(slot, Slot::Settled(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached verdict. Lookups already in flight still answer their
    /// callers but are not recorded.
    pub fn clear(&self) {
        lock_slots(&self.slots).clear();
    }

    /// Lookups answered from the cache or by joining a lookup already in flight
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that went to the inner oracle
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn start_lookup(&self, key: &str) -> (u64, Lookup) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let slots = Arc::clone(&self.slots);
        let policy = self.policy.clone();
        let word = key.to_string();

        let lookup = async move {
            let outcome = retry(&policy, &word, || inner.is_visual(&word)).await;
            settle(&slots, &word, id, &outcome);
            outcome
        }
        .boxed()
        .shared();

        (id, lookup)
    }

    fn find_or_start(&self, key: &str) -> Found {
        let mut slots = lock_slots(&self.slots);
        match slots.get(key) {
            Some(Slot::Settled(verdict)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Found::Cached(*verdict)
            }
            Some(Slot::Pending { lookup, .. }) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Found::Wait(lookup.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let (id, lookup) = self.start_lookup(key);
                slots.insert(
                    key.to_string(),
                    Slot::Pending {
                        id,
                        lookup: lookup.clone(),
                    },
                );
                Found::Wait(lookup)
            }
        }
    }
}

#[async_trait]
impl<V: VisualOracle + 'static> VisualOracle for CachedVisualOracle<V> {
    async fn is_visual(&self, token: &str) -> Result<bool, OracleError> {
        let key = cache_key(token);

        let lookup = match self.find_or_start(&key) {
            Found::Cached(verdict) => {
                debug!(word = %key, verdict, "Visual cache hit");
                return Ok(verdict);
            }
            Found::Wait(lookup) => lookup,
        };

        match lookup.await {
            Ok(verdict) => Ok(verdict),
            Err(OracleError::Exhausted { attempts, last }) => {
                warn!(word = %key, attempts, error = %last, "Visual oracle failed closed");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
