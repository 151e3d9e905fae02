use std::{
    borrow::Borrow,
    fmt::{self, Write},
    hash::{BuildHasher, Hash},
    iter::FusedIterator,
};

use hashbrown::{hash_map, hash_map::DefaultHashBuilder, HashMap};

use crate::{container::Container, error::Error, error::Result};

// Contains a value and the key B that its key A is bound to.
#[derive(Clone)]
pub(crate) struct MappingPair<P, V> {
    pub(crate) partner: P,
    pub(crate) value: V,
}

impl<P: fmt::Debug, V: fmt::Debug> fmt::Debug for MappingPair<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.partner, self.value)
    }
}

/// A hash map whose values are reachable through either of two keys.
///
/// [`DualKeyIndex`] bijectively binds keys of type `A` to keys of type `B`: every key A has exactly
/// one partner key B and vice versa, for as long as the pair is stored. A value lives with each
/// pair and can be fetched, updated or removed through either key with the same complexity as a
/// [`HashMap`] lookup.
///
/// Internally the index keeps two tables. The first maps key A to its partner key B and the
/// value; the second maps key B back to key A. Both tables are updated together by every mutating
/// method, so they always have the same length and always agree on which keys are paired.
///
/// Rebinding is never implicit. [`put`] refuses to pair a key with anything other than the
/// partner it already has; the old pair must be removed first.
///
/// # Examples
/// ```
/// use keyed_index::{DualKeyIndex, Error};
///
/// let mut index: DualKeyIndex<&str, u32, &str> = DualKeyIndex::new();
/// index.put("alice", 1, "admin").unwrap();
///
/// assert_eq!(index.get_by_key_a("alice"), Some(&"admin"));
/// assert_eq!(index.get_by_key_b(&1), Some(&"admin"));
///
/// // "alice" already belongs to 1
/// assert_eq!(index.put("alice", 2, "guest"), Err(Error::KeyAConflict));
///
/// // Re-putting the same pair only updates the value
/// index.put("alice", 1, "owner").unwrap();
/// assert_eq!(index.get_by_key_b(&1), Some(&"owner"));
///
/// assert_eq!(index.remove_by_key_b(&1), Ok("owner"));
/// assert!(index.is_empty());
/// ```
///
/// [`put`]: DualKeyIndex::put
pub struct DualKeyIndex<A, B, V, St = DefaultHashBuilder> {
    entries: HashMap<A, MappingPair<B, V>, St>,
    keys_a: HashMap<B, A, St>,
}

impl<A, B, V> DualKeyIndex<A, B, V, DefaultHashBuilder> {
    /// Creates an empty index
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index whose tables can each hold `capacity` pairs without reallocating
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<A, B, V, St: Clone> DualKeyIndex<A, B, V, St> {
    /// Creates an empty index that hashes keys with the given builder
    pub fn with_hasher(hash_builder: St) -> Self {
        Self {
            entries: HashMap::with_hasher(hash_builder.clone()),
            keys_a: HashMap::with_hasher(hash_builder),
        }
    }

    /// Creates an empty index with the given capacity and hash builder
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: St) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, hash_builder.clone()),
            keys_a: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }
}

impl<A, B, V, St> DualKeyIndex<A, B, V, St> {
    pub fn hasher(&self) -> &St {
        self.entries.hasher()
    }

    pub fn capacity(&self) -> usize {
        // Both tables grow in lockstep; the smaller one bounds the index
        self.entries.capacity().min(self.keys_a.capacity())
    }

    /// The number of stored pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every pair and value
    pub fn clear(&mut self) {
        log::trace!("clearing dual key index of {} pairs", self.len());
        self.entries.clear();
        self.keys_a.clear();
    }

    /// An iterator over every `(key A, key B, value)` triple, in no particular order
    pub fn iter(&self) -> Iter<'_, A, B, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// A copy of every value, in no particular order
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.entries.values().map(|pair| pair.value.clone()).collect()
    }

    /// Renders the key A to value mapping
    pub fn render(&self) -> String
    where
        A: fmt::Debug,
        V: fmt::Debug,
    {
        self.render_as("DualKeyIndex")
    }

    pub(crate) fn render_as(&self, name: &str) -> String
    where
        A: fmt::Debug,
        V: fmt::Debug,
    {
        let mut digest = format!("{name}: ");
        let _ = write!(digest, "{:?}", ValuesByKeyA(&self.entries));
        digest
    }
}

impl<A, B, V, St> DualKeyIndex<A, B, V, St>
where
    A: Eq + Hash,
    B: Eq + Hash,
    St: BuildHasher,
{
    /// Stores a value under a pair of keys.
    ///
    /// The call succeeds when neither key is stored yet, or when both keys are already bound to
    /// each other, in which case only the value is replaced. Otherwise nothing is modified and
    /// either [`Error::KeyBConflict`] (key B belongs to another key A) or [`Error::KeyAConflict`]
    /// (key A belongs to another key B) is returned.
    pub fn put(&mut self, key_a: A, key_b: B, value: V) -> Result<()>
    where
        A: Clone,
        B: Clone,
    {
        if let Some(bound_a) = self.keys_a.get(&key_b) {
            if *bound_a != key_a {
                return Err(Error::KeyBConflict);
            }
        }
        match self.entries.get_mut(&key_a) {
            Some(pair) if pair.partner != key_b => Err(Error::KeyAConflict),
            Some(pair) => {
                pair.value = value;
                Ok(())
            }
            None => {
                self.keys_a.insert(key_b.clone(), key_a.clone());
                self.entries.insert(
                    key_a,
                    MappingPair {
                        partner: key_b,
                        value,
                    },
                );
                Ok(())
            }
        }
    }

    /// Gets the value stored under the given key A
    pub fn get_by_key_a<Q>(&self, key: &Q) -> Option<&V>
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|pair| &pair.value)
    }

    /// Gets the value stored under the given key B
    pub fn get_by_key_b<Q>(&self, key: &Q) -> Option<&V>
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let key_a = self.keys_a.get(key)?;
        self.entries.get(key_a).map(|pair| &pair.value)
    }

    /// Gets the key A that the given key B is bound to
    pub fn get_key_a<Q>(&self, key: &Q) -> Option<&A>
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keys_a.get(key)
    }

    /// Gets the key B that the given key A is bound to
    pub fn get_key_b<Q>(&self, key: &Q) -> Option<&B>
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|pair| &pair.partner)
    }

    pub fn contains_key_a<Q>(&self, key: &Q) -> bool
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn contains_key_b<Q>(&self, key: &Q) -> bool
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keys_a.contains_key(key)
    }

    /// Removes the pair containing the given key A and returns its value.
    ///
    /// Fails with [`Error::NotFound`] and leaves the index untouched if the key is not stored.
    pub fn remove_by_key_a<Q>(&mut self, key: &Q) -> Result<V>
    where
        A: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pair = self.entries.remove(key).ok_or(Error::NotFound)?;
        self.keys_a.remove(&pair.partner);
        Ok(pair.value)
    }

    /// Removes the pair containing the given key B and returns its value.
    ///
    /// Fails with [`Error::NotFound`] and leaves the index untouched if the key is not stored.
    pub fn remove_by_key_b<Q>(&mut self, key: &Q) -> Result<V>
    where
        B: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let key_a = self.keys_a.remove(key).ok_or(Error::NotFound)?;
        // Every key B has a partner entry, so this only misses if the tables were torn
        let pair = self.entries.remove(&key_a).ok_or(Error::NotFound)?;
        Ok(pair.value)
    }
}

impl<A, B, V, St> Default for DualKeyIndex<A, B, V, St>
where
    St: Default + Clone,
{
    fn default() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<A, B, V, St> Clone for DualKeyIndex<A, B, V, St>
where
    A: Clone,
    B: Clone,
    V: Clone,
    St: Clone,
{
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            keys_a: self.keys_a.clone(),
        }
    }
}

impl<A, B, V, St> PartialEq for DualKeyIndex<A, B, V, St>
where
    A: Eq + Hash,
    B: Eq,
    V: PartialEq,
    St: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        // The key B table is derived from the entries, so comparing entries is enough
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(key, pair)| {
                other.entries.get(key).map_or(false, |theirs| {
                    theirs.partner == pair.partner && theirs.value == pair.value
                })
            })
    }
}

impl<A, B, V, St> Eq for DualKeyIndex<A, B, V, St>
where
    A: Eq + Hash,
    B: Eq,
    V: Eq,
    St: BuildHasher,
{
}

impl<A, B, V, St> fmt::Debug for DualKeyIndex<A, B, V, St>
where
    A: fmt::Debug,
    B: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<A, B, V, St> Container<V> for DualKeyIndex<A, B, V, St>
where
    A: fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn is_empty(&self) -> bool {
        DualKeyIndex::is_empty(self)
    }

    fn len(&self) -> usize {
        DualKeyIndex::len(self)
    }

    fn values(&self) -> Vec<V> {
        DualKeyIndex::values(self)
    }

    fn clear(&mut self) {
        DualKeyIndex::clear(self)
    }

    fn render(&self) -> String {
        DualKeyIndex::render(self)
    }
}

// Debug view of the key A to value mapping, hiding the partner keys.
struct ValuesByKeyA<'a, A, B, V, St>(&'a HashMap<A, MappingPair<B, V>, St>);

impl<A, B, V, St> fmt::Debug for ValuesByKeyA<'_, A, B, V, St>
where
    A: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(key, pair)| (key, &pair.value)))
            .finish()
    }
}

/// An iterator over the `(key A, key B, value)` triples of a [`DualKeyIndex`].
pub struct Iter<'a, A, B, V> {
    inner: hash_map::Iter<'a, A, MappingPair<B, V>>,
}

impl<A, B, V> Clone for Iter<'_, A, B, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A, B, V> fmt::Debug for Iter<'_, A, B, V>
where
    A: fmt::Debug,
    B: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, A, B, V> Iterator for Iter<'a, A, B, V> {
    type Item = (&'a A, &'a B, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, pair)| (key, &pair.partner, &pair.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A, B, V> ExactSizeIterator for Iter<'_, A, B, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<A, B, V> FusedIterator for Iter<'_, A, B, V> {}

impl<'a, A, B, V, St> IntoIterator for &'a DualKeyIndex<A, B, V, St> {
    type Item = (&'a A, &'a B, &'a V);
    type IntoIter = Iter<'a, A, B, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
