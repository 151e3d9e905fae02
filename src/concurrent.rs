use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
};

use hashbrown::hash_map::DefaultHashBuilder;
use parking_lot::RwLock;

use crate::{
    container::Container,
    dual_key_index::DualKeyIndex,
    error::Result,
    grouped_key_index::{GroupedKeyIndex, KeyGroups},
};

/// A [`DualKeyIndex`] that can be shared between threads.
///
/// The whole index sits behind a single reader-writer lock. Lookups and snapshots take the lock
/// in shared mode and run alongside each other; [`put`], the removals and [`clear`] take it
/// exclusively. Since references cannot outlive the lock, lookups hand back clones.
///
/// [`put`]: ConcurrentDualKeyIndex::put
/// [`clear`]: ConcurrentDualKeyIndex::clear
pub struct ConcurrentDualKeyIndex<A, B, V, St = DefaultHashBuilder> {
    inner: RwLock<DualKeyIndex<A, B, V, St>>,
}

impl<A, B, V> ConcurrentDualKeyIndex<A, B, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::from(DualKeyIndex::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(DualKeyIndex::with_capacity(capacity))
    }
}

impl<A, B, V, St> ConcurrentDualKeyIndex<A, B, V, St> {
    /// Unwraps the guarded index
    pub fn into_inner(self) -> DualKeyIndex<A, B, V, St> {
        self.inner.into_inner()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().values()
    }

    pub fn render(&self) -> String
    where
        A: fmt::Debug,
        V: fmt::Debug,
    {
        self.inner.read().render_as("ConcurrentDualKeyIndex")
    }
}

impl<A, B, V, St> ConcurrentDualKeyIndex<A, B, V, St>
where
    A: Eq + Hash,
    B: Eq + Hash,
    St: BuildHasher,
{
    /// See [`DualKeyIndex::put`]
    pub fn put(&self, key_a: A, key_b: B, value: V) -> Result<()>
    where
        A: Clone,
        B: Clone,
    {
        self.inner.write().put(key_a, key_b, value)
    }

    pub fn get_by_key_a<Q>(&self, key: &Q) -> Option<V>
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get_by_key_a(key).cloned()
    }

    pub fn get_by_key_b<Q>(&self, key: &Q) -> Option<V>
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get_by_key_b(key).cloned()
    }

    pub fn get_key_a<Q>(&self, key: &Q) -> Option<A>
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: Clone,
    {
        self.inner.read().get_key_a(key).cloned()
    }

    pub fn get_key_b<Q>(&self, key: &Q) -> Option<B>
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        B: Clone,
    {
        self.inner.read().get_key_b(key).cloned()
    }

    pub fn contains_key_a<Q>(&self, key: &Q) -> bool
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains_key_a(key)
    }

    pub fn contains_key_b<Q>(&self, key: &Q) -> bool
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains_key_b(key)
    }

    /// See [`DualKeyIndex::remove_by_key_a`]
    pub fn remove_by_key_a<Q>(&self, key: &Q) -> Result<V>
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove_by_key_a(key)
    }

    /// See [`DualKeyIndex::remove_by_key_b`]
    pub fn remove_by_key_b<Q>(&self, key: &Q) -> Result<V>
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove_by_key_b(key)
    }
}

impl<A, B, V, St> From<DualKeyIndex<A, B, V, St>> for ConcurrentDualKeyIndex<A, B, V, St> {
    fn from(index: DualKeyIndex<A, B, V, St>) -> Self {
        Self {
            inner: RwLock::new(index),
        }
    }
}

impl<A, B, V, St> Default for ConcurrentDualKeyIndex<A, B, V, St>
where
    St: Default + Clone,
{
    fn default() -> Self {
        Self::from(DualKeyIndex::default())
    }
}

impl<A, B, V, St> fmt::Debug for ConcurrentDualKeyIndex<A, B, V, St>
where
    A: fmt::Debug,
    B: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConcurrentDualKeyIndex")
            .field(&*self.inner.read())
            .finish()
    }
}

impl<A, B, V, St> Container<V> for ConcurrentDualKeyIndex<A, B, V, St>
where
    A: fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn is_empty(&self) -> bool {
        ConcurrentDualKeyIndex::is_empty(self)
    }

    fn len(&self) -> usize {
        ConcurrentDualKeyIndex::len(self)
    }

    fn values(&self) -> Vec<V> {
        ConcurrentDualKeyIndex::values(self)
    }

    fn clear(&mut self) {
        ConcurrentDualKeyIndex::clear(self)
    }

    fn render(&self) -> String {
        ConcurrentDualKeyIndex::render(self)
    }
}

/// A [`GroupedKeyIndex`] that can be shared between threads.
///
/// Locking follows [`ConcurrentDualKeyIndex`]: one reader-writer lock over the values, the groups
/// and the reverse index together. [`put`], [`put_secondary_keys`], [`remove`] and [`clear`] are
/// writers.
///
/// [`put`]: ConcurrentGroupedKeyIndex::put
/// [`put_secondary_keys`]: ConcurrentGroupedKeyIndex::put_secondary_keys
/// [`remove`]: ConcurrentGroupedKeyIndex::remove
/// [`clear`]: ConcurrentGroupedKeyIndex::clear
pub struct ConcurrentGroupedKeyIndex<K, S, V, St = DefaultHashBuilder> {
    inner: RwLock<GroupedKeyIndex<K, S, V, St>>,
}

impl<K, S, V> ConcurrentGroupedKeyIndex<K, S, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::from(GroupedKeyIndex::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(GroupedKeyIndex::with_capacity(capacity))
    }
}

impl<K, S, V, St> ConcurrentGroupedKeyIndex<K, S, V, St> {
    /// Unwraps the guarded index
    pub fn into_inner(self) -> GroupedKeyIndex<K, S, V, St> {
        self.inner.into_inner()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().values()
    }

    pub fn render(&self) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        self.inner.read().render_as("ConcurrentGroupedKeyIndex")
    }
}

impl<K, S, V, St> ConcurrentGroupedKeyIndex<K, S, V, St>
where
    K: Eq + Hash,
    S: Eq + Hash,
    St: BuildHasher,
{
    pub fn put(&self, primary_key: K, value: V) -> Option<V> {
        self.inner.write().put(primary_key, value)
    }

    /// See [`GroupedKeyIndex::put_secondary_keys`]
    pub fn put_secondary_keys<G, I>(&self, primary_key: K, group: G, keys: I)
    where
        G: Into<String>,
        I: IntoIterator<Item = S>,
        K: Clone,
        S: Clone,
        St: Clone,
    {
        self.inner
            .write()
            .put_secondary_keys(primary_key, group, keys)
    }

    pub fn has_primary_key<Q>(&self, primary_key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().has_primary_key(primary_key)
    }

    pub fn has_secondary_key<Q>(&self, group: &str, key: &Q) -> bool
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().has_secondary_key(group, key)
    }

    pub fn get<Q>(&self, primary_key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get(primary_key).cloned()
    }

    pub fn get_primary_key<Q>(&self, group: &str, key: &Q) -> Option<K>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        K: Clone,
    {
        self.inner.read().get_primary_key(group, key).cloned()
    }

    pub fn get_by_secondary_key<Q>(&self, group: &str, key: &Q) -> Option<V>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get_by_secondary_key(group, key).cloned()
    }

    /// A deep copy of every group, taken under the read lock
    pub fn get_all_key_groups(&self) -> KeyGroups<K, S, St>
    where
        K: Clone,
        S: Clone,
        St: Clone,
    {
        self.inner.read().get_all_key_groups()
    }

    pub fn secondary_keys<Q>(&self, primary_key: &Q) -> Vec<(String, S)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        S: Clone,
    {
        self.inner.read().secondary_keys(primary_key)
    }

    /// See [`GroupedKeyIndex::remove`]
    pub fn remove<Q>(&self, primary_key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(primary_key)
    }
}

impl<K, S, V, St> From<GroupedKeyIndex<K, S, V, St>> for ConcurrentGroupedKeyIndex<K, S, V, St> {
    fn from(index: GroupedKeyIndex<K, S, V, St>) -> Self {
        Self {
            inner: RwLock::new(index),
        }
    }
}

impl<K, S, V, St> Default for ConcurrentGroupedKeyIndex<K, S, V, St>
where
    St: Default + Clone,
{
    fn default() -> Self {
        Self::from(GroupedKeyIndex::default())
    }
}

impl<K, S, V, St> fmt::Debug for ConcurrentGroupedKeyIndex<K, S, V, St>
where
    K: fmt::Debug,
    S: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConcurrentGroupedKeyIndex")
            .field(&*self.inner.read())
            .finish()
    }
}

impl<K, S, V, St> Container<V> for ConcurrentGroupedKeyIndex<K, S, V, St>
where
    K: fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn is_empty(&self) -> bool {
        ConcurrentGroupedKeyIndex::is_empty(self)
    }

    fn len(&self) -> usize {
        ConcurrentGroupedKeyIndex::len(self)
    }

    fn values(&self) -> Vec<V> {
        ConcurrentGroupedKeyIndex::values(self)
    }

    fn clear(&mut self) {
        ConcurrentGroupedKeyIndex::clear(self)
    }

    fn render(&self) -> String {
        ConcurrentGroupedKeyIndex::render(self)
    }
}
