use crate::{grouped_key_index::KeyGroups, DualKeyIndex, GroupedKeyIndex};
use core::{
    fmt,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};
use hashbrown::HashMap;
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::{SerializeSeq, Serializer},
    Deserializer, {Deserialize, Serialize},
};

pub(crate) struct DualKeyIndexVisitor<A, B, V, S> {
    marker: PhantomData<fn() -> DualKeyIndex<A, B, V, S>>,
}

impl<A, B, V, S> DualKeyIndexVisitor<A, B, V, S> {
    fn new() -> Self {
        DualKeyIndexVisitor {
            marker: PhantomData,
        }
    }
}

impl<'de, A, B, V, S> Visitor<'de> for DualKeyIndexVisitor<A, B, V, S>
where
    A: Deserialize<'de> + Eq + Hash + Clone,
    B: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
    S: BuildHasher + Clone + Default,
{
    type Value = DualKeyIndex<A, B, V, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence of (key A, key B, value) triples")
    }

    fn visit_seq<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: SeqAccess<'de>,
    {
        let mut index: DualKeyIndex<A, B, V, S> = DualKeyIndex::with_capacity_and_hasher(
            access.size_hint().unwrap_or(0),
            Default::default(),
        );

        while let Some((key_a, key_b, value)) = access.next_element::<(A, B, V)>()? {
            index.put(key_a, key_b, value).map_err(<M::Error as de::Error>::custom)?;
        }

        Ok(index)
    }
}

impl<'de, A, B, V, S> Deserialize<'de> for DualKeyIndex<A, B, V, S>
where
    A: Deserialize<'de> + Eq + Hash + Clone,
    B: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
    S: BuildHasher + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(DualKeyIndexVisitor::<A, B, V, S>::new())
    }
}

impl<A, B, V, H> Serialize for DualKeyIndex<A, B, V, H>
where
    A: Serialize,
    B: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;

        for triple in self.iter() {
            seq.serialize_element(&triple)?;
        }

        seq.end()
    }
}

// Wire layout of a grouped index: the values plus the forward group tables. The reverse index is
// rebuilt on load.
#[derive(Serialize)]
#[serde(bound(
    serialize = "K: Serialize + Eq + Hash, S: Serialize + Eq + Hash, V: Serialize, St: BuildHasher"
))]
struct GroupedLayout<'a, K, S, V, St> {
    values: &'a HashMap<K, V, St>,
    groups: &'a KeyGroups<K, S, St>,
}

#[derive(Deserialize)]
#[serde(bound(
    deserialize = "K: Deserialize<'de> + Eq + Hash, S: Deserialize<'de> + Eq + Hash, V: Deserialize<'de>"
))]
struct OwnedGroupedLayout<K, S, V> {
    values: HashMap<K, V>,
    groups: HashMap<String, HashMap<S, K>>,
}

impl<K, S, V, H> Serialize for GroupedKeyIndex<K, S, V, H>
where
    K: Serialize + Eq + Hash,
    S: Serialize + Eq + Hash,
    V: Serialize,
    H: BuildHasher,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        GroupedLayout {
            values: &self.primary,
            groups: &self.groups,
        }
        .serialize(serializer)
    }
}

impl<'de, K, S, V, H> Deserialize<'de> for GroupedKeyIndex<K, S, V, H>
where
    K: Deserialize<'de> + Eq + Hash + Clone,
    S: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
    H: BuildHasher + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let layout = OwnedGroupedLayout::<K, S, V>::deserialize(deserializer)?;
        let mut index = GroupedKeyIndex::with_capacity_and_hasher(layout.values.len(), H::default());
        for (primary_key, value) in layout.values {
            index.put(primary_key, value);
        }
        for (group, keys) in layout.groups {
            for (key, primary_key) in keys {
                index.put_secondary_keys(primary_key, group.as_str(), Some(key));
            }
        }
        Ok(index)
    }
}
