//! Collaborator interfaces: caching, factories and element conversion

use std::cell::RefCell;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Produces new values on demand
pub trait Factory<E> {
    fn new_instance(&self) -> E;
}

impl<E, F> Factory<E> for F
where
    F: Fn() -> E,
{
    fn new_instance(&self) -> E {
        self()
    }
}

/// Factory that takes construction arguments
pub trait ParamFactory<A, E> {
    fn new_instance_with(&self, args: A) -> E;
}

impl<A, E, F> ParamFactory<A, E> for F
where
    F: Fn(A) -> E,
{
    fn new_instance_with(&self, args: A) -> E {
        self(args)
    }
}

/// Converts one element into another
pub trait ElementConverter<F, T> {
    fn convert(&self, from: &F) -> T;
}

impl<F, T, C> ElementConverter<F, T> for C
where
    C: Fn(&F) -> T,
{
    fn convert(&self, from: &F) -> T {
        self(from)
    }
}

/// Key/value cache.
///
/// `get_or_create` invokes the factory at most once per key before the first
/// successful insertion and returns the stored value afterwards.
/// Implementations are not required to be safe under concurrent first access.
pub trait Cache<K, V: Clone> {
    fn get(&self, key: &K) -> Option<V>;

    fn put(&self, key: K, value: V);

    fn get_or_create(&self, key: K, factory: &dyn Factory<V>) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = factory.new_instance();
        self.put(key, value.clone());
        value
    }
}

/// Hash map backed cache with interior mutability; single-threaded only
#[derive(Debug)]
pub struct HashCache<K, V> {
    entries: RefCell<FxHashMap<K, V>>,
}

impl<K, V> Default for HashCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(FxHashMap::default()),
        }
    }
}

impl<K: Eq + Hash, V> HashCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<K: Eq + Hash, V: Clone> Cache<K, V> for HashCache<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    fn put(&self, key: K, value: V) {
        self.entries.borrow_mut().insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_get_or_create_invokes_factory_once() {
        let cache: HashCache<&str, u32> = HashCache::new();
        let calls = Cell::new(0);
        let factory = || {
            calls.set(calls.get() + 1);
            42
        };

        for _ in 0..5 {
            assert_eq!(cache.get_or_create("answer", &factory), 42);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overrides() {
        let cache = HashCache::new();
        cache.put("k", 1);
        cache.put("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn test_param_factory_and_converter() {
        let repeat = |(value, n): (char, usize)| value.to_string().repeat(n);
        assert_eq!(repeat.new_instance_with(('x', 3)), "xxx");

        let to_len = |s: &String| s.len();
        assert_eq!(to_len.convert(&"four".to_string()), 4);
    }
}
