//! Keyed in-memory storage standing in for each service's relational store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use medisupply_core::{DomainError, DomainResult};

/// Ordered key/value store with id allocation.
///
/// Every method is atomic with respect to the others; no lock is held across
/// an `.await` because nothing here is async.
pub trait Store<K, V>: Send + Sync {
    /// Allocate the next identifier (1, 2, 3, ...).
    fn next_id(&self) -> i64;
    fn get(&self, key: &K) -> Option<V>;
    /// Insert unless an existing value `conflicts` with the new one.
    fn insert_unique(&self, key: K, value: V, conflicts: &dyn Fn(&V, &V) -> bool) -> DomainResult<()>;
    /// Change a value in place. `change` works on a copy that is only written
    /// back when it succeeds.
    fn update(&self, key: &K, change: &mut dyn FnMut(&mut V) -> DomainResult<()>) -> DomainResult<V>;
    /// Remove a value once `check` allows it.
    fn remove_if(&self, key: &K, check: &dyn Fn(&V) -> DomainResult<()>) -> DomainResult<V>;
    /// All values in key order.
    fn list(&self) -> Vec<V>;
}

impl<K, V, S> Store<K, V> for Arc<S>
where
    S: Store<K, V> + ?Sized,
{
    fn next_id(&self) -> i64 {
        (**self).next_id()
    }

    fn get(&self, key: &K) -> Option<V> {
        (**self).get(key)
    }

    fn insert_unique(&self, key: K, value: V, conflicts: &dyn Fn(&V, &V) -> bool) -> DomainResult<()> {
        (**self).insert_unique(key, value, conflicts)
    }

    fn update(&self, key: &K, change: &mut dyn FnMut(&mut V) -> DomainResult<()>) -> DomainResult<V> {
        (**self).update(key, change)
    }

    fn remove_if(&self, key: &K, check: &dyn Fn(&V) -> DomainResult<()>) -> DomainResult<V> {
        (**self).remove_if(key, check)
    }

    fn list(&self) -> Vec<V> {
        (**self).list()
    }
}

#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
    seq: AtomicI64,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
            seq: AtomicI64::new(0),
        }
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Store<K, V> for InMemoryStore<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn next_id(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    fn insert_unique(&self, key: K, value: V, conflicts: &dyn Fn(&V, &V) -> bool) -> DomainResult<()> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&key) || map.values().any(|existing| conflicts(existing, &value)) {
            return Err(DomainError::conflict("an equivalent record already exists"));
        }
        map.insert(key, value);
        Ok(())
    }

    fn update(&self, key: &K, change: &mut dyn FnMut(&mut V) -> DomainResult<()>) -> DomainResult<V> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let current = map.get(key).ok_or_else(DomainError::not_found)?;

        let mut next = current.clone();
        change(&mut next)?;
        map.insert(key.clone(), next.clone());
        Ok(next)
    }

    fn remove_if(&self, key: &K, check: &dyn Fn(&V) -> DomainResult<()>) -> DomainResult<V> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let current = map.get(key).ok_or_else(DomainError::not_found)?;
        check(current)?;
        map.remove(key).ok_or_else(DomainError::not_found)
    }

    fn list(&self) -> Vec<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &String, _: &String) -> bool {
        false
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let store: InMemoryStore<i64, String> = InMemoryStore::new();
        assert_eq!(store.next_id(), 1);
        assert_eq!(store.next_id(), 2);
    }

    #[test]
    fn insert_unique_refuses_duplicates_and_conflicts() {
        let store: InMemoryStore<i64, String> = InMemoryStore::new();
        store.insert_unique(1, "a".to_string(), &never).unwrap();

        assert!(matches!(
            store.insert_unique(1, "b".to_string(), &never),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            store.insert_unique(2, "a".to_string(), &|old, new| old == new),
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(store.list(), vec!["a".to_string()]);
    }

    #[test]
    fn failed_update_leaves_value_unchanged() {
        let store: InMemoryStore<i64, String> = InMemoryStore::new();
        store.insert_unique(1, "a".to_string(), &never).unwrap();

        let res = store.update(&1, &mut |v| {
            v.push('!');
            Err(DomainError::invariant("nope"))
        });
        assert!(res.is_err());
        assert_eq!(store.get(&1).as_deref(), Some("a"));

        let updated = store.update(&1, &mut |v| {
            v.push('!');
            Ok(())
        });
        assert_eq!(updated.unwrap(), "a!");
        assert_eq!(store.update(&9, &mut |_| Ok(())), Err(DomainError::NotFound));
    }

    #[test]
    fn remove_if_honours_check() {
        let store: InMemoryStore<i64, String> = InMemoryStore::new();
        store.insert_unique(1, "locked".to_string(), &never).unwrap();

        let locked = |v: &String| {
            if v == "locked" {
                Err(DomainError::invariant("locked"))
            } else {
                Ok(())
            }
        };
        assert!(store.remove_if(&1, &locked).is_err());
        assert!(store.get(&1).is_some());
        assert_eq!(store.remove_if(&1, &|_| Ok(())).unwrap(), "locked");
        assert_eq!(store.remove_if(&1, &|_| Ok(())), Err(DomainError::NotFound));
    }

    #[test]
    fn list_is_key_ordered() {
        let store: InMemoryStore<i64, &'static str> = InMemoryStore::new();
        store.insert_unique(3, "c", &|_, _| false).unwrap();
        store.insert_unique(1, "a", &|_, _| false).unwrap();
        store.insert_unique(2, "b", &|_, _| false).unwrap();
        assert_eq!(store.list(), vec!["a", "b", "c"]);
    }
}
