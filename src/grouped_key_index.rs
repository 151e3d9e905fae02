use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
};

use hashbrown::{hash_map, hash_map::DefaultHashBuilder, HashMap, HashSet};

use crate::container::Container;

/// Group name -> secondary key -> primary key
pub type KeyGroups<K, S, St = DefaultHashBuilder> = HashMap<String, HashMap<S, K, St>, St>;

// Primary key -> group name -> secondary keys registered for that primary in that group
type ReverseIndex<K, S, St> = HashMap<K, HashMap<String, HashSet<S, St>, St>, St>;

/// A hash map with one primary key per value and any number of named groups of secondary keys.
///
/// Values are stored under a unique primary key. Secondary keys live in named groups, so the same
/// literal key can mean different things in different groups (an `"emails"` group and a
/// `"handles"` group, for example). Within a group, each secondary key points at exactly one
/// primary key; many secondary keys may point at the same primary key.
///
/// Secondary keys are independent from values. They can be registered before or after the value
/// is put, and replacing a value never touches them. Removing a primary key, on the other hand,
/// removes every secondary key registered for it and drops groups that are left empty.
///
/// A reverse index records, per primary key and group, the *set* of secondary keys registered for
/// it. Registering several keys in one group for one primary key therefore still removes all of
/// them on [`remove`]. Re-registering a secondary key under a different primary key moves it: the
/// previous owner forgets it, so removing the previous owner leaves the new binding alone.
///
/// # Examples
/// ```
/// use keyed_index::GroupedKeyIndex;
///
/// let mut users: GroupedKeyIndex<&str, &str, u32> = GroupedKeyIndex::new();
/// users.put("p1", 100);
/// users.put_secondary_keys("p1", "emails", ["a@x.com", "b@x.com"]);
/// users.put_secondary_keys("p1", "handles", ["@a"]);
///
/// assert_eq!(users.get_by_secondary_key("emails", "b@x.com"), Some(&100));
/// assert_eq!(users.get_by_secondary_key("handles", "@a"), Some(&100));
///
/// users.remove("p1");
/// assert!(!users.has_primary_key("p1"));
/// assert!(!users.has_secondary_key("emails", "a@x.com"));
/// assert!(users.get_all_key_groups().is_empty());
/// ```
///
/// [`remove`]: GroupedKeyIndex::remove
pub struct GroupedKeyIndex<K, S, V, St = DefaultHashBuilder> {
    hash_builder: St,
    pub(crate) primary: HashMap<K, V, St>,
    pub(crate) groups: KeyGroups<K, S, St>,
    reverse: ReverseIndex<K, S, St>,
}

impl<K, S, V> GroupedKeyIndex<K, S, V, DefaultHashBuilder> {
    /// Creates an empty index
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with room for `capacity` primary keys
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, S, V, St: Clone> GroupedKeyIndex<K, S, V, St> {
    pub fn with_hasher(hash_builder: St) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: St) -> Self {
        Self {
            primary: HashMap::with_capacity_and_hasher(capacity, hash_builder.clone()),
            groups: HashMap::with_hasher(hash_builder.clone()),
            reverse: HashMap::with_capacity_and_hasher(capacity, hash_builder.clone()),
            hash_builder,
        }
    }
}

impl<K, S, V, St> GroupedKeyIndex<K, S, V, St> {
    pub fn hasher(&self) -> &St {
        &self.hash_builder
    }

    pub fn capacity(&self) -> usize {
        self.primary.capacity()
    }

    /// The number of primary keys holding a value
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every value, every group and the reverse index
    pub fn clear(&mut self) {
        log::trace!(
            "clearing grouped key index of {} values and {} groups",
            self.primary.len(),
            self.groups.len()
        );
        self.primary.clear();
        self.groups.clear();
        self.reverse.clear();
    }

    /// An iterator over every `(primary key, value)` pair, in no particular order
    pub fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.primary.iter()
    }

    /// A copy of every value, in no particular order
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.primary.values().cloned().collect()
    }

    /// Renders the primary key to value mapping
    pub fn render(&self) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        self.render_as("GroupedKeyIndex")
    }

    pub(crate) fn render_as(&self, name: &str) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        format!("{name}: {:?}", self.primary)
    }
}

impl<K, S, V, St> GroupedKeyIndex<K, S, V, St>
where
    K: Eq + Hash,
    S: Eq + Hash,
    St: BuildHasher,
{
    /// Stores a value under a primary key, returning the value it replaced.
    ///
    /// Secondary keys are left as they are.
    pub fn put(&mut self, primary_key: K, value: V) -> Option<V> {
        self.primary.insert(primary_key, value)
    }

    /// Registers secondary keys for a primary key in the named group.
    ///
    /// The group is created on first use. A key already registered in the group for a different
    /// primary key is moved to this one. Passing no keys leaves the index untouched.
    pub fn put_secondary_keys<G, I>(&mut self, primary_key: K, group: G, keys: I)
    where
        G: Into<String>,
        I: IntoIterator<Item = S>,
        K: Clone,
        S: Clone,
        St: Clone,
    {
        let mut keys = keys.into_iter().peekable();
        if keys.peek().is_none() {
            return;
        }
        let group = group.into();
        let hash_builder = &self.hash_builder;
        let group_keys = self
            .groups
            .entry(group.clone())
            .or_insert_with(|| HashMap::with_hasher(hash_builder.clone()));
        let registered = self
            .reverse
            .entry(primary_key.clone())
            .or_insert_with(|| HashMap::with_hasher(hash_builder.clone()))
            .entry(group.clone())
            .or_insert_with(|| HashSet::with_hasher(hash_builder.clone()));

        let mut moved = Vec::new();
        for key in keys {
            if let Some(previous) = group_keys.insert(key.clone(), primary_key.clone()) {
                if previous != primary_key {
                    moved.push((previous, key.clone()));
                }
            }
            registered.insert(key);
        }

        for (previous, key) in moved {
            unlink_reverse(&mut self.reverse, &previous, &group, &key);
        }
    }

    pub fn has_primary_key<Q>(&self, primary_key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.primary.contains_key(primary_key)
    }

    pub fn has_secondary_key<Q>(&self, group: &str, key: &Q) -> bool
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.groups
            .get(group)
            .map_or(false, |group_keys| group_keys.contains_key(key))
    }

    pub fn get<Q>(&self, primary_key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.primary.get(primary_key)
    }

    /// Resolves a secondary key to its primary key
    pub fn get_primary_key<Q>(&self, group: &str, key: &Q) -> Option<&K>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.groups.get(group)?.get(key)
    }

    /// Gets the value whose primary key the secondary key points at.
    ///
    /// Misses if the group, the secondary key or the primary value is absent.
    pub fn get_by_secondary_key<Q>(&self, group: &str, key: &Q) -> Option<&V>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let primary_key = self.get_primary_key(group, key)?;
        self.primary.get(primary_key)
    }

    /// A deep copy of every group, independent of the index
    pub fn get_all_key_groups(&self) -> KeyGroups<K, S, St>
    where
        K: Clone,
        S: Clone,
        St: Clone,
    {
        self.groups.clone()
    }

    /// Every `(group, secondary key)` pair registered for a primary key, in no particular order
    pub fn secondary_keys<Q>(&self, primary_key: &Q) -> Vec<(String, S)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        S: Clone,
    {
        self.reverse
            .get(primary_key)
            .into_iter()
            .flat_map(|groups| groups.iter())
            .flat_map(|(group, keys)| keys.iter().map(move |key| (group.clone(), key.clone())))
            .collect()
    }

    /// Removes a primary key, its value and every secondary key registered for it.
    ///
    /// Groups left without keys are dropped. Removing an absent key does nothing.
    pub fn remove<Q>(&mut self, primary_key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.primary.remove(primary_key);
        if let Some(registered) = self.reverse.remove(primary_key) {
            for (group, keys) in registered {
                let group_keys = match self.groups.get_mut(&group) {
                    Some(group_keys) => group_keys,
                    None => continue,
                };
                // Moved keys are unlinked from their old owner, so everything here is ours
                for key in keys.iter() {
                    group_keys.remove(key);
                }
                log::trace!("removed {} keys from group {:?}", keys.len(), group);
                if group_keys.is_empty() {
                    log::trace!("pruning empty group {:?}", group);
                    self.groups.remove(&group);
                }
            }
        }
        value
    }
}

// Forgets that `owner` registered `key` in `group`, pruning whatever becomes empty.
fn unlink_reverse<K, S, St>(reverse: &mut ReverseIndex<K, S, St>, owner: &K, group: &str, key: &S)
where
    K: Eq + Hash,
    S: Eq + Hash,
    St: BuildHasher,
{
    let owner_groups = match reverse.get_mut(owner) {
        Some(owner_groups) => owner_groups,
        None => return,
    };
    if let Some(keys) = owner_groups.get_mut(group) {
        keys.remove(key);
        if keys.is_empty() {
            owner_groups.remove(group);
        }
    }
    if owner_groups.is_empty() {
        reverse.remove(owner);
    }
}

impl<K, S, V, St> Default for GroupedKeyIndex<K, S, V, St>
where
    St: Default + Clone,
{
    fn default() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, S, V, St> Clone for GroupedKeyIndex<K, S, V, St>
where
    K: Clone,
    S: Clone,
    V: Clone,
    St: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hash_builder: self.hash_builder.clone(),
            primary: self.primary.clone(),
            groups: self.groups.clone(),
            reverse: self.reverse.clone(),
        }
    }
}

impl<K, S, V, St> fmt::Debug for GroupedKeyIndex<K, S, V, St>
where
    K: fmt::Debug,
    S: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedKeyIndex")
            .field("values", &self.primary)
            .field("groups", &self.groups)
            .finish()
    }
}

impl<K, S, V, St> FromIterator<(K, V)> for GroupedKeyIndex<K, S, V, St>
where
    K: Eq + Hash,
    S: Eq + Hash,
    St: BuildHasher + Default + Clone,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut index = Self::default();
        for (primary_key, value) in iter {
            index.put(primary_key, value);
        }
        index
    }
}

impl<K, S, V, St> Container<V> for GroupedKeyIndex<K, S, V, St>
where
    K: fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn is_empty(&self) -> bool {
        GroupedKeyIndex::is_empty(self)
    }

    fn len(&self) -> usize {
        GroupedKeyIndex::len(self)
    }

    fn values(&self) -> Vec<V> {
        GroupedKeyIndex::values(self)
    }

    fn clear(&mut self) {
        GroupedKeyIndex::clear(self)
    }

    fn render(&self) -> String {
        GroupedKeyIndex::render(self)
    }
}
