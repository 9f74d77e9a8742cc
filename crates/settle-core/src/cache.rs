//! Results shared across sessions.
//!
//! A `ResultCache` is created once by whoever owns the broader scope (a
//! provider) and handed to every consumer that needs it. Entries are never
//! evicted; the cache lives as long as its last handle.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use crate::error::Result;
use crate::runner::AsyncRunner;
use crate::signal::{Signal, SubId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Miss,
}

pub struct ResultCache<K: 'static, V: 'static> {
    entries: Signal<HashMap<K, V>>,
}

impl<K: 'static, V: 'static> Clone for ResultCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K: Eq + Hash + 'static, V: 'static> Default for ResultCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + 'static, V: 'static> ResultCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Signal::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.entries.with(|m| m.get(key).cloned())
    }

    /// Inserts or overwrites the entry for `key`; other entries are untouched.
    pub fn put(&self, key: K, value: V) {
        self.entries.update(move |m| {
            m.insert(key, value);
        });
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.with(|m| m.contains_key(key))
    }

    /// Keys in no particular order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.entries.with(|m| m.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.with(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.with(HashMap::is_empty)
    }

    /// Called after every `put` with the whole map. A `put` made from inside
    /// the callback is applied once every subscriber has seen this one.
    pub fn subscribe(&self, f: impl Fn(&HashMap<K, V>) + 'static) -> SubId {
        self.entries.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.entries.unsubscribe(id)
    }
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    /// Serves `key` from the cache, or runs `fetch()` on `runner` and stores
    /// a successful result.
    ///
    /// On a hit `runner` goes straight to `Resolved` and `fetch` is never
    /// called. On a miss the value is stored before the runner sees
    /// `Resolved`, and is stored even if the runner's session has been
    /// disposed by then.
    pub fn load<E, F, Fut>(&self, runner: &AsyncRunner<V, E>, key: K, fetch: F) -> Result<CacheLookup>
    where
        E: 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + 'static,
    {
        if let Some(value) = self.get(&key) {
            log::debug!("{}: cache hit for {key:?}", runner.label());
            runner.set_data(value);
            return Ok(CacheLookup::Hit);
        }

        log::debug!("{}: cache miss for {key:?}", runner.label());
        let cache = self.clone();
        let operation = fetch();
        runner.run(Some(async move {
            let value = operation.await?;
            cache.put(key, value.clone());
            Ok::<V, E>(value)
        }))?;
        Ok(CacheLookup::Miss)
    }
}
