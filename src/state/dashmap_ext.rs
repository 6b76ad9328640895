use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Extension helpers for `DashMap` that never hand out shard guards.
///
/// `DashMap::get()` and `DashMap::entry()` return guards that hold a shard
/// lock. Values here are cloned out so the guard drops before the caller
/// touches anything else (in particular another lock).
pub trait DashMapExt<K, V> {
    /// Clone the value for `key` (dropping the DashMap guard immediately).
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone;

    /// Clone the value for `key`, inserting `make()` first if absent.
    ///
    /// Tries a shared read first; on a miss the entry API re-checks under the
    /// shard write lock, so `make` runs at most once per key even when many
    /// callers race on the same new key.
    fn get_or_insert_cloned<Q, F>(&self, key: &Q, make: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        V: Clone,
        F: FnOnce() -> V;

    /// Collect all `(key, value)` pairs by cloning them (dropping guards immediately).
    fn iter_cloned(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone;
}

impl<K, V> DashMapExt<K, V> for DashMap<K, V>
where
    K: Eq + Hash,
{
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).map(|r| r.value().clone())
    }

    fn get_or_insert_cloned<Q, F>(&self, key: &Q, make: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        V: Clone,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get_cloned(key) {
            return value;
        }
        self.entry(key.to_owned()).or_insert_with(make).value().clone()
    }

    fn iter_cloned(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}
